//! Sermon-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sermon recording entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
    pub id: String,
    pub title: String,
    pub speaker: Option<String>,
    pub series: Option<String>,
    pub preached_at: DateTime<Utc>,
    pub audio_url: Option<String>,
}
