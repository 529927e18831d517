pub mod command;
pub mod config;
pub mod endpoints;
pub mod input;
pub mod types;
pub mod view;

pub use command::{Command, CommandRequest, Power, TargetUpdate};
pub use config::{ApiFlavor, ConfigError, DashboardConfig};
pub use endpoints::*;
pub use input::{parse_target, InputError, TargetInput};
pub use types::{PolledStatus, ProofState, RelayState, StatusSnapshot};
