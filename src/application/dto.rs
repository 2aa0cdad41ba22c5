//! Data Transfer Objects for the named-action protocol.
//!
//! Contains the payloads exchanged between callers and the command
//! dispatcher. Wire casing is camelCase to match the stored record format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::domain::item::ProductInfo;
use crate::domain::outfit::OutfitItems;

// ============================================================================
// Request payloads
// ============================================================================

/// Extract a product record from already-obtained page HTML.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPayload {
    pub html: String,
    pub url: String,
    /// Manual-selection path: the image the user right-clicked.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Fetch a page by URL, extract, and optionally save the result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapePayload {
    pub url: String,
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Image used when extraction finds none (the screenshot stand-in).
    #[serde(default)]
    pub fallback_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemPayload {
    pub product: ProductInfo,
    #[serde(default)]
    pub fallback_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemPayload {
    pub added_at: DateTime<Utc>,
}

/// Wholesale collection write, optionally guarded by an expected version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionPayload {
    pub collection: String,
    pub records: Vec<Value>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutfitPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub occasion: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: OutfitItems,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutfitPayload {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutfitPayload {
    pub occasion: String,
    #[serde(default)]
    pub hints: Option<String>,
}

// ============================================================================
// Response envelope
// ============================================================================

/// Uniform response: a payload or an error string, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResponse {
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                error: None,
                data: Some(value),
            },
            Err(e) => {
                error!("failed to serialize response payload: {e}");
                Self::failure(format!("internal serialization error: {e}"))
            }
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}
