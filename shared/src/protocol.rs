use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result numbers as they travel over the results API.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub error: f64,
    /// Milliseconds.
    pub total_time: u64,
    pub total_characters: u64,
}

/// Body of `POST /api/results`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResultSubmission {
    pub name: String,
    pub usn: String,
    pub results: ResultPayload,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: Uuid,
    pub name: String,
    pub usn: String,
    pub results: ResultPayload,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaveResponse {
    pub message: String,
    pub result: ResultRecord,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}
