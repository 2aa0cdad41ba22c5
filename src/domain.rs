//! Domain module - Core business entities
//!
//! This module contains the domain entities and the trait seams the rest of
//! the crate is wired through.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod events;
pub mod item;
pub mod outfit;
pub mod repositories;

// Re-export commonly used items for convenience
pub use events::CollectionChanged;
pub use item::{Category, ExtractionMethod, ExtractionSource, ProductInfo, WardrobeItem};
pub use outfit::{KNOWN_OCCASIONS, Outfit, OutfitItems, OutfitSlot};
pub use repositories::{OutfitRepository, WardrobeRepository};
