//! Gallery models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo gallery entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}
