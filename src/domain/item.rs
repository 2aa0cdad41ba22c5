//! Wardrobe item types: extracted product records and their categories.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which fallback stage produced the image field.
///
/// Recorded for diagnostics so a bad image can be traced back to the
/// strategy that selected it. Serialized as the lowercase tag, with a
/// `-lazy` suffix when the URL came from a lazy-load attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// One of the specific product image selectors matched.
    Selector,
    /// An image found inside a known product container element.
    Container,
    /// JSON-LD structured data block.
    JsonLd,
    /// Open Graph / Twitter card meta tag.
    Meta,
    /// Largest qualifying image on the page.
    Largest,
    /// The user supplied the image URL directly (context menu path).
    ManualSelection,
}

impl ExtractionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selector => "selector",
            Self::Container => "container",
            Self::JsonLd => "json-ld",
            Self::Meta => "meta",
            Self::Largest => "largest",
            Self::ManualSelection => "manual-selection",
        }
    }
}

/// Extraction method tag: source stage plus the lazy-load marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionMethod {
    pub source: ExtractionSource,
    /// True when the URL was substituted from a `data-src`-style attribute.
    pub lazy: bool,
}

impl ExtractionMethod {
    pub fn new(source: ExtractionSource) -> Self {
        Self { source, lazy: false }
    }

    pub fn lazy(source: ExtractionSource) -> Self {
        Self { source, lazy: true }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lazy {
            write!(f, "{}-lazy", self.source.as_str())
        } else {
            f.write_str(self.source.as_str())
        }
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, lazy) = match s.strip_suffix("-lazy") {
            Some(base) => (base, true),
            None => (s, false),
        };
        let source = match base {
            "selector" => ExtractionSource::Selector,
            "container" => ExtractionSource::Container,
            "json-ld" => ExtractionSource::JsonLd,
            "meta" => ExtractionSource::Meta,
            "largest" => ExtractionSource::Largest,
            "manual-selection" => ExtractionSource::ManualSelection,
            other => return Err(format!("unknown extraction method: {other}")),
        };
        Ok(Self { source, lazy })
    }
}

impl Serialize for ExtractionMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExtractionMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Product information assembled from one page extraction.
///
/// Transient: becomes persistent only once wrapped in a [`WardrobeItem`].
/// Text fields default to empty strings when no stage could fill them;
/// `error` carries the reason when extraction degraded to a partial record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub title: String,
    /// Normalized price, e.g. `$19.99`. Empty when nothing parseable was found.
    pub price: String,
    pub brand: String,
    pub description: String,
    /// Long-form product copy, when the page exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    /// Must be an http(s) URL or a data URI; empty when no image was found.
    pub image_url: String,
    /// Source page URL.
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProductInfo {
    /// Empty record seeded with the source URL; extraction stages fill the rest.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            price: String::new(),
            brand: String::new(),
            description: String::new(),
            detailed_description: None,
            image_url: String::new(),
            url: url.into(),
            timestamp: Utc::now(),
            extraction_method: None,
            error: None,
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Concatenated text used by the category classifier.
    pub fn classification_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.description);
        if let Some(detail) = &self.detailed_description {
            text.push(' ');
            text.push_str(detail);
        }
        text.to_lowercase()
    }
}

/// Fixed category buckets, in classifier priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tops,
    Bottoms,
    Shoes,
    Dresses,
    Outerwear,
    Accessories,
    Other,
}

impl Category {
    /// All categories, in classifier priority order (`Other` last as the fallback).
    pub const ALL: [Self; 7] = [
        Self::Tops,
        Self::Bottoms,
        Self::Shoes,
        Self::Dresses,
        Self::Outerwear,
        Self::Accessories,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tops => "tops",
            Self::Bottoms => "bottoms",
            Self::Shoes => "shoes",
            Self::Dresses => "dresses",
            Self::Outerwear => "outerwear",
            Self::Accessories => "accessories",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// A saved wardrobe entry.
///
/// `added_at` doubles as the item's identity within the collection; lookups
/// and deletes key on it alone. Content is never deduplicated, so scraping
/// the same product twice yields two entries with distinct timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    #[serde(flatten)]
    pub product: ProductInfo,
    pub category: Category,
    pub added_at: DateTime<Utc>,
}

impl WardrobeItem {
    /// Text searched by the wardrobe filter (title + brand + description).
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.product.title, self.product.brand, self.product.description
        )
        .to_lowercase()
    }
}
