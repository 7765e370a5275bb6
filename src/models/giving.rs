//! Donation and pledge models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded donation by the signed-in member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    /// Fund or campaign the gift goes to
    pub purpose: String,
    /// Amount in minor units (cents)
    pub amount_cents: i64,
    pub given_at: DateTime<Utc>,
}

/// Pledge submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeRequest {
    pub purpose: String,
    pub amount_cents: i64,
    pub note: Option<String>,
}
