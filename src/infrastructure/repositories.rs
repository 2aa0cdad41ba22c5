//! Repository implementations over the JSON collection store.
//!
//! Records are stored as plain JSON values; these adapters do the typed
//! round-trip and key the single-record operations the way the domain
//! identifies things (wardrobe items by `addedAt`, outfits by `id`).
//! A record that no longer deserializes is skipped with a warning rather
//! than wedging the whole collection.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::domain::item::WardrobeItem;
use crate::domain::outfit::Outfit;
use crate::domain::repositories::{OutfitRepository, WardrobeRepository};
use crate::infrastructure::collection_store::{
    CollectionStore, OUTFITS_COLLECTION, WARDROBE_COLLECTION,
};

pub struct JsonWardrobeRepository {
    store: Arc<CollectionStore>,
}

impl JsonWardrobeRepository {
    pub fn new(store: Arc<CollectionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WardrobeRepository for JsonWardrobeRepository {
    async fn list(&self) -> Result<Vec<WardrobeItem>> {
        let records = self.store.get(WARDROBE_COLLECTION).await;
        Ok(decode_records(WARDROBE_COLLECTION, records))
    }

    async fn append(&self, item: &WardrobeItem) -> Result<()> {
        let record = serde_json::to_value(item).context("serializing wardrobe item")?;
        self.store
            .append(WARDROBE_COLLECTION, record)
            .await
            .context("appending wardrobe item")?;
        Ok(())
    }

    async fn remove(&self, added_at: DateTime<Utc>) -> Result<bool> {
        let (removed, _) = self
            .store
            .remove_where(WARDROBE_COLLECTION, |record| {
                record_timestamp(record, "addedAt").is_some_and(|ts| ts == added_at)
            })
            .await
            .context("removing wardrobe item")?;
        Ok(removed > 0)
    }

    async fn replace_all(
        &self,
        items: &[WardrobeItem],
        expected_version: Option<u64>,
    ) -> Result<u64> {
        let records = encode_records(items)?;
        replace(&self.store, WARDROBE_COLLECTION, records, expected_version).await
    }

    async fn version(&self) -> Result<u64> {
        Ok(self.store.version(WARDROBE_COLLECTION).await)
    }
}

pub struct JsonOutfitRepository {
    store: Arc<CollectionStore>,
}

impl JsonOutfitRepository {
    pub fn new(store: Arc<CollectionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OutfitRepository for JsonOutfitRepository {
    async fn list(&self) -> Result<Vec<Outfit>> {
        let records = self.store.get(OUTFITS_COLLECTION).await;
        Ok(decode_records(OUTFITS_COLLECTION, records))
    }

    async fn append(&self, outfit: &Outfit) -> Result<()> {
        let record = serde_json::to_value(outfit).context("serializing outfit")?;
        self.store
            .append(OUTFITS_COLLECTION, record)
            .await
            .context("appending outfit")?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let (removed, _) = self
            .store
            .remove_where(OUTFITS_COLLECTION, |record| {
                record.get("id").and_then(Value::as_str) == Some(id)
            })
            .await
            .context("removing outfit")?;
        Ok(removed > 0)
    }

    async fn replace_all(&self, outfits: &[Outfit], expected_version: Option<u64>) -> Result<u64> {
        let records = encode_records(outfits)?;
        replace(&self.store, OUTFITS_COLLECTION, records, expected_version).await
    }

    async fn version(&self) -> Result<u64> {
        Ok(self.store.version(OUTFITS_COLLECTION).await)
    }
}

fn decode_records<T: serde::de::DeserializeOwned>(collection: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("skipping undecodable record in '{collection}': {e}");
                None
            }
        })
        .collect()
}

fn encode_records<T: serde::Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).context("serializing record"))
        .collect()
}

async fn replace(
    store: &CollectionStore,
    collection: &str,
    records: Vec<Value>,
    expected_version: Option<u64>,
) -> Result<u64> {
    let version = match expected_version {
        Some(expected) => store.set_if_version(collection, records, expected).await?,
        None => store.set(collection, records).await?,
    };
    Ok(version)
}

/// Timestamp field parsed back out of a stored record.
fn record_timestamp(record: &Value, field: &str) -> Option<DateTime<Utc>> {
    record
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{Category, ProductInfo};
    use tempfile::tempdir;

    fn item(title: &str, added_at: DateTime<Utc>) -> WardrobeItem {
        WardrobeItem {
            product: ProductInfo {
                title: title.to_string(),
                ..ProductInfo::empty("https://shop.example/p")
            },
            category: Category::Tops,
            added_at,
        }
    }

    #[tokio::test]
    async fn removal_by_added_at_removes_exactly_one() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            CollectionStore::open(dir.path().join("closet.json"))
                .await
                .unwrap(),
        );
        let repo = JsonWardrobeRepository::new(store);

        let base = Utc::now();
        let items: Vec<_> = (0..3)
            .map(|i| item(&format!("item-{i}"), base + chrono::Duration::milliseconds(i)))
            .collect();
        for it in &items {
            repo.append(it).await.unwrap();
        }

        assert!(repo.remove(items[1].added_at).await.unwrap());

        let remaining = repo.list().await.unwrap();
        let titles: Vec<_> = remaining.iter().map(|i| i.product.title.clone()).collect();
        assert_eq!(titles, vec!["item-0", "item-2"]);

        // Second removal of the same key matches nothing.
        assert!(!repo.remove(items[1].added_at).await.unwrap());

        // Three appends plus one effective removal.
        assert_eq!(repo.version().await.unwrap(), 4);
    }
}
