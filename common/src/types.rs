use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProofState {
    Paused,
    Start,
    Cooldown,
    HoldOn,
    HoldOff,
    BoostOn,
    BoostOff,
    Detention,
    Error,
    /// Any state string this dashboard does not know about, kept verbatim.
    Other(String),
}

impl ProofState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paused => "PAUSED",
            Self::Start => "START",
            Self::Cooldown => "COOLDOWN",
            Self::HoldOn => "HOLD_ON",
            Self::HoldOff => "HOLD_OFF",
            Self::BoostOn => "BOOST_ON",
            Self::BoostOff => "BOOST_OFF",
            Self::Detention => "DETENTION",
            Self::Error => "ERROR",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl From<String> for ProofState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PAUSED" => Self::Paused,
            "START" => Self::Start,
            "COOLDOWN" => Self::Cooldown,
            "HOLD_ON" => Self::HoldOn,
            "HOLD_OFF" => Self::HoldOff,
            "BOOST_ON" => Self::BoostOn,
            "BOOST_OFF" => Self::BoostOff,
            "DETENTION" => Self::Detention,
            "ERROR" => Self::Error,
            _ => Self::Other(raw),
        }
    }
}

impl From<ProofState> for String {
    fn from(state: ProofState) -> Self {
        match state {
            ProofState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelayState {
    #[serde(alias = "on")]
    On,
    #[serde(alias = "off")]
    Off,
}

impl RelayState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// One read of the device. Replaced wholesale on every successful poll.
///
/// Deserializes from either the nested or the flat status schema and always
/// serializes to the nested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireStatus", into = "NestedStatus")]
pub struct StatusSnapshot {
    pub state: ProofState,
    pub target_temp_c: f32,
    pub relay: RelayState,
    pub dough_temp_c: f32,
    pub box_temp_c: f32,
}

/// A snapshot together with the moment the dashboard received it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolledStatus {
    pub snapshot: StatusSnapshot,
    pub received_at: DateTime<Utc>,
}

impl PolledStatus {
    pub fn now(snapshot: StatusSnapshot) -> Self {
        Self {
            snapshot,
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireStatus {
    Nested(NestedStatus),
    Flat(FlatStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedStatus {
    pub state: ProofState,
    pub config: NestedConfig,
    pub sensors: NestedSensors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedConfig {
    #[serde(rename = "targetTemperature", deserialize_with = "temperature")]
    pub target_temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedSensors {
    pub relay: RelayState,
    pub temperatures: NestedTemperatures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedTemperatures {
    #[serde(deserialize_with = "temperature")]
    pub dough: f32,
    #[serde(rename = "box", deserialize_with = "temperature")]
    pub box_: f32,
}

#[derive(Debug, Deserialize)]
struct FlatStatus {
    state: ProofState,
    #[serde(
        rename = "desiredDoughTemperature",
        alias = "targetTemperature",
        deserialize_with = "temperature"
    )]
    target: f32,
    #[serde(alias = "heatmat")]
    relay: RelayState,
    #[serde(rename = "doughTemperature", deserialize_with = "temperature")]
    dough: f32,
    #[serde(rename = "boxTemperature", deserialize_with = "temperature")]
    box_: f32,
}

impl From<WireStatus> for StatusSnapshot {
    fn from(wire: WireStatus) -> Self {
        match wire {
            WireStatus::Nested(nested) => Self {
                state: nested.state,
                target_temp_c: nested.config.target_temperature,
                relay: nested.sensors.relay,
                dough_temp_c: nested.sensors.temperatures.dough,
                box_temp_c: nested.sensors.temperatures.box_,
            },
            WireStatus::Flat(flat) => Self {
                state: flat.state,
                target_temp_c: flat.target,
                relay: flat.relay,
                dough_temp_c: flat.dough,
                box_temp_c: flat.box_,
            },
        }
    }
}

impl From<StatusSnapshot> for NestedStatus {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            state: snapshot.state,
            config: NestedConfig {
                target_temperature: snapshot.target_temp_c,
            },
            sensors: NestedSensors {
                relay: snapshot.relay,
                temperatures: NestedTemperatures {
                    dough: snapshot.dough_temp_c,
                    box_: snapshot.box_temp_c,
                },
            },
        }
    }
}

// Firmware builds report the desired temperature as a stringified float.
fn temperature<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f32>()
            .map_err(|err| serde::de::Error::custom(format!("invalid temperature '{text}': {err}"))),
    }
}
