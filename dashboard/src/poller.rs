use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use proofuino_common::PolledStatus;

use crate::device::DeviceApi;

pub type SnapshotSender = watch::Sender<Option<PolledStatus>>;
pub type SnapshotReceiver = watch::Receiver<Option<PolledStatus>>;

/// Owns the polling task. Dropping the handle stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        info!("status poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fetches status immediately, then once per `period`. Fetches never overlap;
/// a slow response delays the next tick instead of stacking requests.
pub fn spawn_poller<D: DeviceApi>(
    device: Arc<D>,
    period: Duration,
    snapshots: SnapshotSender,
) -> PollerHandle {
    info!("polling device status every {}ms", period.as_millis());

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            poll_once(device.as_ref(), &snapshots).await;
        }
    });

    PollerHandle { task }
}

/// One poll. A failure is logged and leaves the current snapshot in place.
pub async fn poll_once<D: DeviceApi + ?Sized>(device: &D, snapshots: &SnapshotSender) -> bool {
    match device.fetch_status().await {
        Ok(snapshot) => {
            debug!("status: {} ({:?})", snapshot.state.as_str(), snapshot.relay);
            snapshots.send_replace(Some(PolledStatus::now(snapshot)));
            true
        }
        Err(err) => {
            warn!("status poll failed: {err}");
            false
        }
    }
}
