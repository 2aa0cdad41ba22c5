//! Infrastructure layer for extraction, persistence, and external integrations
//!
//! This module provides the HTML extraction engine, the JSON collection
//! store and its repository adapters, the HTTP page fetcher, the chat-model
//! client, and configuration/logging setup.

pub mod ai; // Chat-model client for outfit generation
pub mod classifier; // Keyword category classifier
pub mod collection_store; // JSON-file-backed collections
pub mod config; // Configuration loading and management
pub mod extraction; // Extraction engine (selector cascades and fallbacks)
pub mod http_client; // Page fetcher
pub mod logging; // Logging infrastructure
pub mod repositories; // Repository implementations over the store

// Re-export commonly used items
pub use ai::{AiConfig, AiError, ChatModel, OpenAiChatModel};
pub use collection_store::{
    CollectionStore, OUTFITS_COLLECTION, StoreError, StoreResult, WARDROBE_COLLECTION,
};
pub use config::{AppConfig, ConfigManager, LoggingConfig};
pub use extraction::{
    ExtractContext, ExtractionError, ExtractionResult, ExtractionSelectors, ProductExtractor,
};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::init_logging;
pub use repositories::{JsonOutfitRepository, JsonWardrobeRepository};
