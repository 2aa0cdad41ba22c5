//! Named-action command surface.
//!
//! One dispatcher handles every action of the request/response protocol:
//! extract product info, scrape a page, save/delete items, read/replace
//! collections, and compose or generate outfits. Responses are always a
//! payload or an error string; a failure inside a handler never escapes as
//! a transport error, matching the degrade-to-error-message policy of the
//! rest of the system.

use std::sync::Arc;

use scraper::Html;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::application::dto::{
    ActionResponse, DeleteItemPayload, DeleteOutfitPayload, ExtractPayload,
    GenerateOutfitPayload, SaveItemPayload, SaveOutfitPayload, ScrapePayload,
    UpdateCollectionPayload,
};
use crate::application::outfit_service::{OutfitDraft, OutfitService};
use crate::application::wardrobe_service::WardrobeService;
use crate::domain::events::CollectionChanged;
use crate::domain::item::{ExtractionMethod, ExtractionSource, ProductInfo, WardrobeItem};
use crate::domain::outfit::Outfit;
use crate::domain::repositories::{OutfitRepository, WardrobeRepository};
use crate::infrastructure::ai::{AiError, OpenAiChatModel};
use crate::infrastructure::collection_store::{
    CollectionStore, OUTFITS_COLLECTION, WARDROBE_COLLECTION,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::extraction::{ExtractContext, ExtractionError, ProductExtractor};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::repositories::{JsonOutfitRepository, JsonWardrobeRepository};

/// Every action a caller can request, tagged on the `action` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionRequest {
    ExtractProductInfo(ExtractPayload),
    ScrapePage(ScrapePayload),
    SaveItem(SaveItemPayload),
    DeleteItem(DeleteItemPayload),
    GetWardrobe,
    UpdateCollection(UpdateCollectionPayload),
    GetOutfits,
    SaveOutfit(SaveOutfitPayload),
    DeleteOutfit(DeleteOutfitPayload),
    GenerateOutfit(GenerateOutfitPayload),
}

/// Handles named actions against the assembled services.
pub struct Dispatcher {
    extractor: ProductExtractor,
    fetcher: HttpClient,
    wardrobe: WardrobeService,
    outfits: OutfitService,
    store: Arc<CollectionStore>,
}

impl Dispatcher {
    /// Wire up the full stack from configuration. AI generation is enabled
    /// only when an API key is available; everything else works without it.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let extractor = ProductExtractor::with_config(&config.extraction)?;
        let fetcher = HttpClient::with_config(config.http.clone())?;

        let store = Arc::new(CollectionStore::open(config.store_path()?).await?);
        let wardrobe_repo: Arc<dyn WardrobeRepository> =
            Arc::new(JsonWardrobeRepository::new(Arc::clone(&store)));
        let outfit_repo: Arc<dyn OutfitRepository> =
            Arc::new(JsonOutfitRepository::new(Arc::clone(&store)));

        let wardrobe = WardrobeService::new(Arc::clone(&wardrobe_repo));
        let mut outfits = OutfitService::new(outfit_repo, wardrobe_repo);
        match OpenAiChatModel::from_config(config.ai.clone()) {
            Ok(model) => outfits = outfits.with_model(Arc::new(model)),
            Err(AiError::MissingApiKey) => {
                info!("no AI API key configured; outfit generation disabled");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            extractor,
            fetcher,
            wardrobe,
            outfits,
            store,
        })
    }

    /// Change notifications for the underlying collections.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.store.subscribe()
    }

    /// Handle one request. Never fails outward.
    pub async fn handle(&self, request: ActionRequest) -> ActionResponse {
        match request {
            ActionRequest::ExtractProductInfo(payload) => self.extract_product_info(&payload),
            ActionRequest::ScrapePage(payload) => self.scrape_page(payload).await,
            ActionRequest::SaveItem(payload) => {
                self.save_item(payload.product, payload.fallback_image_url).await
            }
            ActionRequest::DeleteItem(payload) => {
                match self.wardrobe.delete(payload.added_at).await {
                    Ok(removed) => ActionResponse::ok(json!({ "removed": removed })),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
            ActionRequest::GetWardrobe => match self.wardrobe.list().await {
                Ok(items) => ActionResponse::ok(items),
                Err(e) => ActionResponse::failure(e.to_string()),
            },
            ActionRequest::UpdateCollection(payload) => self.update_collection(payload).await,
            ActionRequest::GetOutfits => match self.outfits.list().await {
                Ok(outfits) => ActionResponse::ok(outfits),
                Err(e) => ActionResponse::failure(e.to_string()),
            },
            ActionRequest::SaveOutfit(payload) => {
                let draft = OutfitDraft {
                    name: payload.name,
                    occasion: payload.occasion,
                    notes: payload.notes,
                    items: payload.items,
                };
                match self.outfits.create(draft).await {
                    Ok(outfit) => ActionResponse::ok(outfit),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
            ActionRequest::DeleteOutfit(payload) => {
                match self.outfits.delete(&payload.id).await {
                    Ok(removed) => ActionResponse::ok(json!({ "removed": removed })),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
            ActionRequest::GenerateOutfit(payload) => {
                match self
                    .outfits
                    .generate(&payload.occasion, payload.hints.as_deref())
                    .await
                {
                    Ok(outfit) => ActionResponse::ok(outfit),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
        }
    }

    /// Extraction over caller-provided HTML; nothing is persisted.
    fn extract_product_info(&self, payload: &ExtractPayload) -> ActionResponse {
        let html = Html::parse_document(&payload.html);
        let mut ctx = ExtractContext::new(&payload.url);
        if let Some(image_url) = &payload.image_url {
            ctx = ctx.with_known_image(image_url);
        }
        ActionResponse::ok(self.extractor.extract(&html, &ctx))
    }

    async fn scrape_page(&self, payload: ScrapePayload) -> ActionResponse {
        let body = match self.fetcher.fetch_html_string(&payload.url).await {
            Ok(body) => body,
            Err(e) => {
                // Communication failure degrades exactly like extraction
                // failure: a partial record with the error attached, still
                // saveable when a manually chosen image is present.
                warn!("scrape failed for {}: {e}", payload.url);
                let mut product = ProductInfo::empty(&payload.url);
                product.error = Some(ExtractionError::fetch_failed(&payload.url, e).to_string());
                if let Some(image_url) = payload.image_url.clone() {
                    product.image_url = image_url;
                    product.extraction_method =
                        Some(ExtractionMethod::new(ExtractionSource::ManualSelection));
                }
                return self.finish_scrape(product, payload).await;
            }
        };

        // The parsed document is not Send; keep it inside a sync block so
        // it is gone before the next await point.
        let product = {
            let html = Html::parse_document(&body);
            let mut ctx = ExtractContext::new(&payload.url);
            if let Some(image_url) = &payload.image_url {
                ctx = ctx.with_known_image(image_url);
            }
            self.extractor.extract(&html, &ctx)
        };
        self.finish_scrape(product, payload).await
    }

    async fn finish_scrape(&self, product: ProductInfo, payload: ScrapePayload) -> ActionResponse {
        if payload.save {
            self.save_item(product, payload.fallback_image_url).await
        } else {
            ActionResponse::ok(product)
        }
    }

    async fn save_item(
        &self,
        product: ProductInfo,
        fallback_image: Option<String>,
    ) -> ActionResponse {
        match self.wardrobe.save(product, fallback_image).await {
            Ok(item) => ActionResponse::ok(item),
            Err(e) => ActionResponse::failure(e.to_string()),
        }
    }

    /// Wholesale write, schema-checked per collection.
    async fn update_collection(&self, payload: UpdateCollectionPayload) -> ActionResponse {
        match payload.collection.as_str() {
            WARDROBE_COLLECTION => {
                let items: Vec<WardrobeItem> = match decode_all(payload.records) {
                    Ok(items) => items,
                    Err(e) => return ActionResponse::failure(format!("invalid wardrobe record: {e}")),
                };
                match self
                    .wardrobe
                    .replace_all(&items, payload.expected_version)
                    .await
                {
                    Ok(version) => ActionResponse::ok(json!({ "version": version })),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
            OUTFITS_COLLECTION => {
                let outfits: Vec<Outfit> = match decode_all(payload.records) {
                    Ok(outfits) => outfits,
                    Err(e) => return ActionResponse::failure(format!("invalid outfit record: {e}")),
                };
                match self
                    .outfits
                    .replace_all(&outfits, payload.expected_version)
                    .await
                {
                    Ok(version) => ActionResponse::ok(json!({ "version": version })),
                    Err(e) => ActionResponse::failure(e.to_string()),
                }
            }
            other => ActionResponse::failure(format!("unknown collection '{other}'")),
        }
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(
    records: Vec<serde_json::Value>,
) -> Result<Vec<T>, serde_json::Error> {
    records.into_iter().map(serde_json::from_value).collect()
}
