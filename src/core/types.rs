use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ----------- Persisted snapshot -----------------

/// Latest composite snapshot, written once per update run and served by the
/// API. History entries share this shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    pub data_hand: f64,
    pub vibe_hand: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: FetchMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchMetadata {
    pub datasets_fetched: u32,
    pub fetch_status: FetchStatus,
    pub last_attempt: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Complete,
    Partial,
    Failed,
}

impl FetchStatus {
    pub fn from_fetched(datasets_fetched: u32) -> Self {
        match datasets_fetched {
            2.. => FetchStatus::Complete,
            1 => FetchStatus::Partial,
            0 => FetchStatus::Failed,
        }
    }
}

// ----------- Wire types -----------------

/// Response body for `GET /api/current`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockResponse {
    pub data_hand: f64,
    pub vibe_hand: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&CurrentState> for ClockResponse {
    fn from(state: &CurrentState) -> Self {
        Self {
            data_hand: state.data_hand,
            vibe_hand: state.vibe_hand,
            timestamp: state.timestamp,
        }
    }
}
