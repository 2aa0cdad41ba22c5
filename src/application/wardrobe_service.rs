//! Wardrobe use cases: saving captures, listing, filtering, deleting.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::item::{Category, ProductInfo, WardrobeItem};
use crate::domain::repositories::WardrobeRepository;
use crate::infrastructure::classifier;

#[derive(Error, Debug)]
pub enum SaveError {
    /// Matches the original user-facing failure: a capture without any
    /// image is not worth keeping.
    #[error("could not detect product information on this page")]
    NoImage,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Listing filter: category bucket and/or free-text search over
/// title, brand and description.
#[derive(Debug, Clone, Default)]
pub struct WardrobeFilter {
    pub category: Option<Category>,
    pub query: Option<String>,
}

pub struct WardrobeService {
    repo: Arc<dyn WardrobeRepository>,
}

impl WardrobeService {
    pub fn new(repo: Arc<dyn WardrobeRepository>) -> Self {
        Self { repo }
    }

    /// Classify the capture, stamp a unique `added_at` and append it.
    ///
    /// A record without an image falls back to the caller-supplied image
    /// (the screenshot stand-in) when one is given; with no image at all
    /// the save is refused.
    pub async fn save(
        &self,
        mut product: ProductInfo,
        fallback_image: Option<String>,
    ) -> Result<WardrobeItem, SaveError> {
        if !product.has_image() {
            if let Some(fallback) = fallback_image {
                product.image_url = fallback;
            }
        }
        if !product.has_image() {
            return Err(SaveError::NoImage);
        }

        let category = classifier::classify(&product.classification_text());
        let added_at = self.unique_added_at().await?;
        let item = WardrobeItem {
            product,
            category,
            added_at,
        };
        self.repo.append(&item).await?;
        info!(
            title = %item.product.title,
            category = %item.category,
            "item added to wardrobe"
        );
        Ok(item)
    }

    /// Delete by the `added_at` identity. Returns whether a record matched.
    pub async fn delete(&self, added_at: DateTime<Utc>) -> Result<bool> {
        let removed = self.repo.remove(added_at).await?;
        if removed {
            info!("removed wardrobe item added at {added_at}");
        }
        Ok(removed)
    }

    pub async fn list(&self) -> Result<Vec<WardrobeItem>> {
        self.repo.list().await
    }

    /// Wholesale collection replacement for the `update collection` action.
    /// `expected_version` opts in to optimistic concurrency.
    pub async fn replace_all(
        &self,
        items: &[WardrobeItem],
        expected_version: Option<u64>,
    ) -> Result<u64> {
        self.repo.replace_all(items, expected_version).await
    }

    /// Filtered listing, preserving stored order.
    pub async fn search(&self, filter: &WardrobeFilter) -> Result<Vec<WardrobeItem>> {
        let mut items = self.repo.list().await?;
        if let Some(category) = filter.category {
            items.retain(|item| item.category == category);
        }
        if let Some(query) = &filter.query {
            let query = query.to_lowercase();
            if !query.is_empty() {
                items.retain(|item| item.search_text().contains(&query));
            }
        }
        Ok(items)
    }

    /// `added_at` doubles as the item key, so two captures landing on the
    /// same millisecond must not share a timestamp; nudge forward until free.
    async fn unique_added_at(&self) -> Result<DateTime<Utc>> {
        let taken: HashSet<DateTime<Utc>> = self
            .repo
            .list()
            .await?
            .into_iter()
            .map(|item| item.added_at)
            .collect();
        let mut candidate = Utc::now();
        while taken.contains(&candidate) {
            candidate += Duration::milliseconds(1);
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::collection_store::CollectionStore;
    use crate::infrastructure::repositories::JsonWardrobeRepository;
    use tempfile::tempdir;

    async fn service() -> (tempfile::TempDir, WardrobeService) {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            CollectionStore::open(dir.path().join("closet.json"))
                .await
                .unwrap(),
        );
        let repo = Arc::new(JsonWardrobeRepository::new(store));
        (dir, WardrobeService::new(repo))
    }

    fn capture(title: &str, image: &str) -> ProductInfo {
        ProductInfo {
            title: title.to_string(),
            image_url: image.to_string(),
            ..ProductInfo::empty("https://shop.example/p")
        }
    }

    #[tokio::test]
    async fn save_classifies_and_persists() {
        let (_dir, service) = service().await;
        let item = service
            .save(capture("Denim jacket", "https://cdn.example/j.jpg"), None)
            .await
            .unwrap();
        assert_eq!(item.category, Category::Outerwear);

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].added_at, item.added_at);
    }

    #[tokio::test]
    async fn save_without_image_uses_fallback_or_fails() {
        let (_dir, service) = service().await;

        let err = service.save(capture("Socks", ""), None).await.unwrap_err();
        assert!(matches!(err, SaveError::NoImage));

        let item = service
            .save(
                capture("Socks", ""),
                Some("https://cdn.example/screenshot.png".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(item.product.image_url, "https://cdn.example/screenshot.png");
    }

    #[tokio::test]
    async fn search_filters_by_category_and_query() {
        let (_dir, service) = service().await;
        service
            .save(capture("Wool sweater", "https://cdn.example/1.jpg"), None)
            .await
            .unwrap();
        service
            .save(capture("Chelsea boot", "https://cdn.example/2.jpg"), None)
            .await
            .unwrap();

        let shoes = service
            .search(&WardrobeFilter {
                category: Some(Category::Shoes),
                query: None,
            })
            .await
            .unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].product.title, "Chelsea boot");

        let wool = service
            .search(&WardrobeFilter {
                category: None,
                query: Some("WOOL".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(wool.len(), 1);
        assert_eq!(wool[0].product.title, "Wool sweater");
    }

    #[tokio::test]
    async fn duplicate_captures_get_distinct_identities() {
        let (_dir, service) = service().await;
        let a = service
            .save(capture("Tee", "https://cdn.example/t.jpg"), None)
            .await
            .unwrap();
        let b = service
            .save(capture("Tee", "https://cdn.example/t.jpg"), None)
            .await
            .unwrap();
        // Same content is allowed; identity must differ.
        assert_ne!(a.added_at, b.added_at);
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
