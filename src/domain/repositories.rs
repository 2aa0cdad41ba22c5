//! Repository interfaces for the wardrobe and outfit collections.
//!
//! Contains trait definitions for data access. Collections are small and
//! read whole; the single-record `append`/`remove` primitives exist so the
//! storage layer can make the common insert/delete paths atomic instead of
//! racing wholesale rewrites.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::item::WardrobeItem;
use super::outfit::Outfit;

#[async_trait]
pub trait WardrobeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<WardrobeItem>>;

    /// Atomically add one item and broadcast the change.
    async fn append(&self, item: &WardrobeItem) -> Result<()>;

    /// Remove the item keyed by `added_at`. Returns whether a record matched.
    async fn remove(&self, added_at: DateTime<Utc>) -> Result<bool>;

    /// Wholesale replace. With `expected_version` set, the write is refused
    /// when the stored collection has moved on (optimistic concurrency);
    /// without it, last writer wins. Returns the new version.
    async fn replace_all(
        &self,
        items: &[WardrobeItem],
        expected_version: Option<u64>,
    ) -> Result<u64>;

    async fn version(&self) -> Result<u64>;
}

#[async_trait]
pub trait OutfitRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Outfit>>;

    async fn append(&self, outfit: &Outfit) -> Result<()>;

    /// Remove the outfit keyed by `id`. Returns whether a record matched.
    async fn remove(&self, id: &str) -> Result<bool>;

    async fn replace_all(&self, outfits: &[Outfit], expected_version: Option<u64>) -> Result<u64>;

    async fn version(&self) -> Result<u64>;
}
