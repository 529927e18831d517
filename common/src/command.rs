use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::ApiFlavor,
    endpoints::{PATH_CONFIG, PATH_OFF, PATH_ON, PATH_TEMPERATURE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

impl Power {
    /// Maps a switch position to the request it should issue.
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            Self::On
        } else {
            Self::Off
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetTarget(i64),
    Power(Power),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTarget(value) => write!(f, "set target {value}°C"),
            Self::Power(power) => write!(f, "power {}", power.as_str()),
        }
    }
}

/// Everything needed to issue one POST to the device.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub path: &'static str,
    pub body: Option<Value>,
}

impl Command {
    pub fn request(self, api: ApiFlavor) -> CommandRequest {
        match (self, api) {
            (Self::SetTarget(value), ApiFlavor::Current) => CommandRequest {
                path: PATH_CONFIG,
                body: Some(json!({ "targetTemperature": value })),
            },
            (Self::SetTarget(value), ApiFlavor::Legacy) => CommandRequest {
                path: PATH_TEMPERATURE,
                body: Some(json!({ "desiredDoughTemperature": value })),
            },
            (Self::Power(Power::On), _) => CommandRequest {
                path: PATH_ON,
                body: None,
            },
            (Self::Power(Power::Off), _) => CommandRequest {
                path: PATH_OFF,
                body: None,
            },
        }
    }
}

/// Target update body as accepted by the device, in either flavor.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TargetUpdate {
    #[serde(rename = "targetTemperature", alias = "desiredDoughTemperature")]
    pub target: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn current_flavor_posts_config() {
        let request = Command::SetTarget(27).request(ApiFlavor::Current);
        assert_eq!(
            request,
            CommandRequest {
                path: "/config",
                body: Some(json!({ "targetTemperature": 27 })),
            }
        );
    }

    #[test]
    fn legacy_flavor_posts_temperature() {
        let request = Command::SetTarget(-3).request(ApiFlavor::Legacy);
        assert_eq!(request.path, "/temperature");
        assert_eq!(request.body, Some(json!({ "desiredDoughTemperature": -3 })));
    }

    #[test]
    fn power_commands_have_no_body() {
        for api in [ApiFlavor::Current, ApiFlavor::Legacy] {
            assert_eq!(
                Command::Power(Power::from_checked(true)).request(api),
                CommandRequest {
                    path: "/on",
                    body: None
                }
            );
            assert_eq!(Command::Power(Power::Off).request(api).path, "/off");
        }
    }

    #[test]
    fn target_update_accepts_both_field_names() {
        let current: TargetUpdate = serde_json::from_str(r#"{"targetTemperature": 26}"#).unwrap();
        let legacy: TargetUpdate =
            serde_json::from_str(r#"{"desiredDoughTemperature": 24.5}"#).unwrap();
        assert_eq!(current.target, 26.0);
        assert_eq!(legacy.target, 24.5);
    }
}
