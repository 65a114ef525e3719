use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Warning category, mapped from the feed's numeric `wtype` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    Storm,
    Rain,
    Snow,
    BlackIce,
    Thunderstorm,
    Heat,
    Cold,
}

impl WarningType {
    /// Map a feed `wtype` code. Unknown codes are `None`, not an error.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Storm),
            2 => Some(Self::Rain),
            3 => Some(Self::Snow),
            4 => Some(Self::BlackIce),
            5 => Some(Self::Thunderstorm),
            6 => Some(Self::Heat),
            7 => Some(Self::Cold),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "storm" => Some(Self::Storm),
            "rain" => Some(Self::Rain),
            "snow" => Some(Self::Snow),
            "black_ice" => Some(Self::BlackIce),
            "thunderstorm" => Some(Self::Thunderstorm),
            "heat" => Some(Self::Heat),
            "cold" => Some(Self::Cold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storm => "storm",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::BlackIce => "black_ice",
            Self::Thunderstorm => "thunderstorm",
            Self::Heat => "heat",
            Self::Cold => "cold",
        }
    }
}

/// Warning severity, mapped from the feed's numeric `wlevel` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Yellow,
    Orange,
    Red,
}

impl WarningLevel {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Yellow),
            2 => Some(Self::Orange),
            3 => Some(Self::Red),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "yellow" => Some(Self::Yellow),
            "orange" => Some(Self::Orange),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

/// One normalized weather warning.
///
/// `raw_data` holds the original feed feature for forward compatibility.
/// It is persisted but never serialized into read responses.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub warning_id: String,
    pub warning_type: Option<WarningType>,
    pub warning_level: Option<WarningLevel>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub geometry: Option<Value>,
    pub municipalities: Vec<String>,
    #[serde(skip_serializing)]
    pub raw_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
