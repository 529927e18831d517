use std::sync::Arc;

use tracing::{info, warn};

use proofuino_common::{Command, Power, TargetInput};

use crate::device::DeviceApi;

/// Fire-and-forget command dispatch. Outcomes are logged, never retried, and
/// the snapshot is left for the next poll to refresh.
#[derive(Debug)]
pub struct CommandSender<D> {
    device: Arc<D>,
}

impl<D> Clone for CommandSender<D> {
    fn clone(&self) -> Self {
        Self {
            device: self.device.clone(),
        }
    }
}

impl<D: DeviceApi> CommandSender<D> {
    pub fn new(device: Arc<D>) -> Self {
        Self { device }
    }

    pub async fn dispatch(&self, command: Command) -> bool {
        match self.device.send(command).await {
            Ok(()) => {
                info!("{command} sent");
                true
            }
            Err(err) => {
                warn!("{command} failed: {err}");
                false
            }
        }
    }

    pub async fn submit_target(&self, input: &TargetInput) -> bool {
        self.dispatch(Command::SetTarget(input.value())).await
    }

    pub async fn set_power(&self, power: Power) -> bool {
        self.dispatch(Command::Power(power)).await
    }
}
