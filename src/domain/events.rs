//! Change events broadcast after every successful store write.
//!
//! Delivery is fire-and-forget: surfaces that are closed or not yet
//! subscribed simply miss the notification and re-read on their next load.

use serde::{Deserialize, Serialize};

/// Notification that a named collection changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChanged {
    /// Collection key, e.g. `wardrobe` or `outfits`.
    pub collection: String,
    /// Version after the write; consumers re-read when it moves past
    /// the version they cached.
    pub version: u64,
    /// Record count after the write.
    pub count: usize,
}
