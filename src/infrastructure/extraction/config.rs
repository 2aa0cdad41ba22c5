//! Selector configuration for product extraction.
//!
//! Centralized configuration for the CSS selector cascades. Every field is
//! an ordered list tried front to back; order is the priority policy, so
//! site-specific overrides belong at the front.

use serde::{Deserialize, Serialize};

/// Selector cascades for every extracted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSelectors {
    /// Product title candidates.
    pub title: Vec<String>,
    /// Price-bearing elements.
    pub price: Vec<String>,
    /// Brand name candidates (element text or `content` attribute).
    pub brand: Vec<String>,
    /// Short description candidates.
    pub description: Vec<String>,
    /// Long-form product copy candidates.
    pub detailed_description: Vec<String>,
    /// Specific product image selectors.
    pub image: Vec<String>,
    /// Known product container elements searched for a qualifying child image.
    pub image_container: Vec<String>,
    /// Open Graph / Twitter card image meta tags.
    pub meta_image: Vec<String>,
}

impl Default for ExtractionSelectors {
    fn default() -> Self {
        Self {
            title: vec![
                "h1".to_string(),
                "h1.product-title".to_string(),
                ".product-title".to_string(),
                ".product-name".to_string(),
                ".pdp-title".to_string(),
            ],
            price: vec![
                ".price".to_string(),
                ".product-price".to_string(),
                "span.price".to_string(),
                "div.price".to_string(),
                "p.price".to_string(),
                ".pdp-price".to_string(),
                ".sale-price".to_string(),
                ".current-price".to_string(),
            ],
            brand: vec![
                ".brand".to_string(),
                ".product-brand".to_string(),
                "a.brand".to_string(),
                ".vendor".to_string(),
                "[itemprop='brand']".to_string(),
                "meta[property='og:brand']".to_string(),
                "meta[property='product:brand']".to_string(),
            ],
            description: vec![
                ".product-description".to_string(),
                ".description".to_string(),
                "#description".to_string(),
                ".product-details".to_string(),
                "meta[name='description']".to_string(),
                "meta[property='og:description']".to_string(),
            ],
            detailed_description: vec![
                ".product-details-full".to_string(),
                ".product-information".to_string(),
                "#productDetails".to_string(),
                ".product-specs".to_string(),
            ],
            image: vec![
                "img.product-image".to_string(),
                ".product-image img".to_string(),
                ".product-featured-image".to_string(),
                "#product-image".to_string(),
                "img[width='500']".to_string(),
                "img[width='600']".to_string(),
                "img[width='800']".to_string(),
            ],
            image_container: vec![
                ".product-main".to_string(),
                ".product-image-container".to_string(),
                ".product-gallery".to_string(),
                ".product-media".to_string(),
                ".pdp-image".to_string(),
                "[data-testid='product-image']".to_string(),
                ".gallery-image".to_string(),
            ],
            meta_image: vec![
                "meta[property='og:image']".to_string(),
                "meta[name='twitter:image']".to_string(),
            ],
        }
    }
}
