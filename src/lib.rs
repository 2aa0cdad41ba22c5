//! Virtual Closet - wardrobe capture and outfit composition
//!
//! This crate extracts clothing product information from shopping pages
//! (selector cascades with structured-data, meta-tag and largest-image
//! fallbacks), classifies items into wardrobe categories, persists the
//! wardrobe and outfit collections, and optionally composes outfits with a
//! chat model.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

// Re-export the surface most callers need
pub use application::{
    ActionResponse, OutfitDraft, OutfitError, OutfitService, SaveError, SessionAction,
    SessionState, WardrobeFilter, WardrobeService,
};
pub use commands::{ActionRequest, Dispatcher};
pub use domain::{
    Category, CollectionChanged, ExtractionMethod, ExtractionSource, Outfit, OutfitItems,
    OutfitSlot, ProductInfo, WardrobeItem,
};
pub use infrastructure::{
    AppConfig, CollectionStore, ConfigManager, ExtractContext, ExtractionSelectors, HttpClient,
    ProductExtractor,
};
