use std::io::Write;

use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

use proofuino_common::{view, TargetInput};

use crate::poller::SnapshotReceiver;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Redraws the dashboard on stdout whenever the snapshot or the entry changes.
pub fn spawn_renderer(
    mut snapshots: SnapshotReceiver,
    mut input: watch::Receiver<TargetInput>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let frame = {
                let status = snapshots.borrow_and_update();
                let entry = input.borrow_and_update();
                view::render(status.as_ref(), &entry)
            };

            if let Err(err) = draw(&frame) {
                warn!("failed to draw dashboard: {err}");
            }

            tokio::select! {
                changed = snapshots.changed() => if changed.is_err() { break },
                changed = input.changed() => if changed.is_err() { break },
            }
        }
    })
}

fn draw(frame: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{frame}")?;
    stdout.flush()
}
