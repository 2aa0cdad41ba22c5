//! Product extraction engine.
//!
//! Turns an arbitrary shopping page into one [`ProductInfo`] record via an
//! ordered waterfall: selector cascades first, then embedded structured
//! data, then meta tags, then a largest-image scan. Each stage runs only
//! when the prior stages left the relevant field empty, so the stage order
//! is the priority policy. Extraction never fails outward; whatever could
//! not be recovered stays empty and the record carries an `error` string
//! when something went wrong along the way.

pub mod brand;
pub mod config;
pub mod context;
pub mod error;
pub mod image;
pub mod price;
pub mod structured_data;

pub use config::ExtractionSelectors;
pub use context::ExtractContext;
pub use error::{ExtractionError, ExtractionResult};
pub use image::ImageCandidate;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::item::{ExtractionMethod, ExtractionSource, ProductInfo};

static DOC_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("static selector"));

static ANY_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector"));

static GENERIC_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span, p, b, strong, td, li").expect("static selector"));

/// Extractor with all selector cascades compiled up front.
pub struct ProductExtractor {
    title_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    brand_selectors: Vec<Selector>,
    description_selectors: Vec<Selector>,
    detailed_description_selectors: Vec<Selector>,
    image_selectors: Vec<Selector>,
    container_selectors: Vec<Selector>,
    meta_image_selectors: Vec<Selector>,
}

impl ProductExtractor {
    /// Create an extractor with the default selector configuration.
    pub fn new() -> ExtractionResult<Self> {
        Self::with_config(&ExtractionSelectors::default())
    }

    /// Create an extractor with a custom selector configuration.
    pub fn with_config(selectors: &ExtractionSelectors) -> ExtractionResult<Self> {
        Ok(Self {
            title_selectors: Self::compile("title", &selectors.title)?,
            price_selectors: Self::compile("price", &selectors.price)?,
            brand_selectors: Self::compile("brand", &selectors.brand)?,
            description_selectors: Self::compile("description", &selectors.description)?,
            detailed_description_selectors: Self::compile(
                "detailed_description",
                &selectors.detailed_description,
            )?,
            image_selectors: Self::compile("image", &selectors.image)?,
            container_selectors: Self::compile("image_container", &selectors.image_container)?,
            meta_image_selectors: Self::compile("meta_image", &selectors.meta_image)?,
        })
    }

    /// Compile selector strings, warning on the invalid ones. Fails only
    /// when a non-empty cascade compiles down to nothing.
    fn compile(field: &str, selector_strings: &[String]) -> ExtractionResult<Vec<Selector>> {
        let mut selectors = Vec::with_capacity(selector_strings.len());
        for raw in selector_strings {
            match Selector::parse(raw) {
                Ok(selector) => selectors.push(selector),
                Err(e) => warn!("failed to compile {field} selector '{raw}': {e}"),
            }
        }
        if selectors.is_empty() && !selector_strings.is_empty() {
            return Err(ExtractionError::NoUsableSelectors {
                field: field.to_string(),
            });
        }
        Ok(selectors)
    }

    /// Run the full waterfall over a parsed page.
    pub fn extract(&self, html: &Html, ctx: &ExtractContext) -> ProductInfo {
        let mut info = ProductInfo::empty(&ctx.url);

        // Seed the title from the document title, as the page itself would
        // display it, before trying the product-specific cascade.
        if let Some(doc_title) = first_text(html, std::slice::from_ref(&*DOC_TITLE)) {
            info.title = doc_title;
        }

        let blocks = structured_data::parse_blocks(html);

        if let Some(title) = first_text(html, &self.title_selectors) {
            info.title = title;
        }

        if let Some(raw) = self.raw_price(html, &blocks) {
            info.price = price::normalize(&raw);
        }

        info.brand = self.find_brand(html, &blocks, &ctx.url).unwrap_or_default();

        if let Some(description) = first_text_or_content(html, &self.description_selectors) {
            info.description = description;
        }
        info.detailed_description = first_text(html, &self.detailed_description_selectors)
            .filter(|text| text.len() > info.description.len());

        match &ctx.known_image_url {
            Some(image_url) => {
                info.image_url = image_url.clone();
                info.extraction_method =
                    Some(ExtractionMethod::new(ExtractionSource::ManualSelection));
            }
            None => {
                if let Some(candidate) = self.find_image(html, &blocks) {
                    info.image_url = candidate.url;
                    info.extraction_method = Some(candidate.method);
                } else {
                    debug!("no image found on {}", ctx.url);
                }
            }
        }

        info
    }

    /// Best raw price string before normalization. Exposed so callers can
    /// inspect the pre-normalization value (e.g. `"19.99 USD"` from an
    /// offer block).
    pub fn raw_price(&self, html: &Html, blocks: &[Value]) -> Option<String> {
        let candidates = price::collect_candidates(html, &self.price_selectors, &GENERIC_TEXT);
        price::select_best(&candidates).or_else(|| structured_data::find_price(blocks))
    }

    fn find_brand(&self, html: &Html, blocks: &[Value], page_url: &str) -> Option<String> {
        brand::from_selectors(html, &self.brand_selectors)
            .or_else(|| structured_data::find_brand(blocks).filter(|b| brand::looks_like_brand(b)))
            .or_else(|| brand::from_url(page_url))
    }

    /// Image waterfall: selector, container, structured data, meta tags,
    /// largest-area scan.
    fn find_image(&self, html: &Html, blocks: &[Value]) -> Option<ImageCandidate> {
        image::by_selector(html, &self.image_selectors)
            .or_else(|| image::by_container(html, &self.container_selectors, &ANY_IMG))
            .or_else(|| {
                structured_data::find_image(blocks).map(|url| ImageCandidate {
                    url,
                    method: ExtractionMethod::new(ExtractionSource::JsonLd),
                })
            })
            .or_else(|| image::by_meta(html, &self.meta_image_selectors))
            .or_else(|| image::by_largest(html, &ANY_IMG))
    }
}

/// First selector in the cascade whose match has non-empty text.
fn first_text(html: &Html, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        if let Some(element) = html.select(selector).next() {
            let text = squash(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Like [`first_text`], falling back to the `content` attribute (meta tags).
fn first_text_or_content(html: &Html, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        if let Some(element) = html.select(selector).next() {
            let text = squash(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
            if let Some(content) = element.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ProductExtractor {
        ProductExtractor::new().expect("default selectors compile")
    }

    #[test]
    fn extractor_builds_with_defaults() {
        assert!(ProductExtractor::new().is_ok());
    }

    #[test]
    fn empty_cascade_is_allowed_but_all_invalid_is_not() {
        let mut selectors = ExtractionSelectors::default();
        selectors.brand = vec![];
        assert!(ProductExtractor::with_config(&selectors).is_ok());

        let mut selectors = ExtractionSelectors::default();
        selectors.brand = vec![":::not-a-selector".to_string()];
        assert!(matches!(
            ProductExtractor::with_config(&selectors),
            Err(ExtractionError::NoUsableSelectors { .. })
        ));
    }

    #[test]
    fn document_title_seeds_the_title_field() {
        let html = Html::parse_document(
            "<html><head><title>Wool Coat | Shop</title></head><body></body></html>",
        );
        let info = extractor().extract(&html, &ExtractContext::new("https://shop.example/p"));
        assert_eq!(info.title, "Wool Coat | Shop");
    }

    #[test]
    fn product_heading_overrides_document_title() {
        let html = Html::parse_document(
            r#"<html><head><title>Shop</title></head>
               <body><h1>Linen Shirt</h1></body></html>"#,
        );
        let info = extractor().extract(&html, &ExtractContext::new("https://shop.example/p"));
        assert_eq!(info.title, "Linen Shirt");
    }

    #[test]
    fn manual_selection_skips_the_image_waterfall() {
        let html = Html::parse_document(
            r#"<html><body><img src="https://cdn.example/other.jpg" width="600" height="600"></body></html>"#,
        );
        let ctx = ExtractContext::new("https://shop.example/p")
            .with_known_image("https://cdn.example/picked.jpg");
        let info = extractor().extract(&html, &ctx);
        assert_eq!(info.image_url, "https://cdn.example/picked.jpg");
        assert_eq!(
            info.extraction_method.unwrap().to_string(),
            "manual-selection"
        );
    }

    #[test]
    fn extraction_without_image_leaves_field_empty() {
        let html = Html::parse_document("<html><body><h1>Socks</h1></body></html>");
        let info = extractor().extract(&html, &ExtractContext::new("https://shop.example/p"));
        assert!(!info.has_image());
        assert!(info.extraction_method.is_none());
    }

    #[test]
    fn selector_price_beats_structured_data() {
        let html = Html::parse_document(
            r#"<html><head>
                <script type="application/ld+json">{"offers":{"price":"99.00","priceCurrency":"USD"}}</script>
               </head>
               <body><span class="price">$49.99</span></body></html>"#,
        );
        let info = extractor().extract(&html, &ExtractContext::new("https://shop.example/p"));
        assert_eq!(info.price, "$49.99");
    }
}
