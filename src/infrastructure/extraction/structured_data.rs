//! Embedded structured data (JSON-LD) reader.
//!
//! Shopping pages commonly embed `script[type="application/ld+json"]`
//! blocks describing the product. The schema nesting varies wildly
//! (`@graph` wrappers, arrays of things, offer lists), so lookups walk the
//! whole value tree for known keys instead of assuming a shape. Malformed
//! blocks are skipped individually; one broken script must not cost us the
//! others.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static LD_JSON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector")
});

/// Parse every JSON-LD block on the page. Unparseable blocks are dropped.
pub fn parse_blocks(html: &Html) -> Vec<Value> {
    let mut blocks = Vec::new();
    for script in html.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => blocks.push(value),
            Err(e) => debug!("skipping malformed JSON-LD block: {}", e),
        }
    }
    blocks
}

/// First absolute image URL found under an `image` key.
pub fn find_image(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .filter_map(|block| find_key(block, "image"))
        .find_map(image_url)
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_absolute(s) => Some(s.clone()),
        // schema.org allows both ["url", ...] and [{"url": ...}, ...]
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(map) => map.get("url").and_then(image_url),
        _ => None,
    }
}

/// Brand name: a `brand` key holding either a string or `{"name": ...}`.
pub fn find_brand(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .filter_map(|block| find_key(block, "brand"))
        .find_map(|brand| match brand {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(map) => match map.get("name") {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            },
            _ => None,
        })
}

/// Raw price string from an `offers` block (or a bare `price` key).
///
/// When the offer carries a `priceCurrency`, the two are joined as
/// `"<price> <currency>"`; normalization happens later in the pipeline.
pub fn find_price(blocks: &[Value]) -> Option<String> {
    for block in blocks {
        if let Some(offers) = find_key(block, "offers") {
            // Offer lists: take the first offer that yields a price.
            let candidates: Vec<&Value> = match offers {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            for offer in candidates {
                if let Some(price) = offer_price(offer) {
                    return Some(price);
                }
            }
        }
        if let Some(price) = find_key(block, "price").and_then(price_text) {
            return Some(price);
        }
    }
    None
}

fn offer_price(offer: &Value) -> Option<String> {
    let price = find_key(offer, "price").and_then(price_text)?;
    match find_key(offer, "priceCurrency").and_then(price_text) {
        Some(currency) => Some(format!("{price} {currency}")),
        None => Some(price),
    }
}

fn price_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Product description text, when present.
pub fn find_description(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .filter_map(|block| find_key(block, "description"))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
}

/// Depth-first search for `key` anywhere in the value tree.
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|nested| find_key(nested, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(ld: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{ld}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn reads_product_offer_with_currency() {
        let blocks = vec![json!({
            "@type": "Product",
            "brand": {"name": "Acme"},
            "offers": {"price": "19.99", "priceCurrency": "USD"}
        })];
        assert_eq!(find_brand(&blocks).as_deref(), Some("Acme"));
        assert_eq!(find_price(&blocks).as_deref(), Some("19.99 USD"));
    }

    #[test]
    fn finds_image_through_graph_nesting() {
        let blocks = vec![json!({
            "@graph": [
                {"@type": "WebPage"},
                {"@type": "Product", "image": ["https://cdn.example/shirt.jpg"]}
            ]
        })];
        assert_eq!(
            find_image(&blocks).as_deref(),
            Some("https://cdn.example/shirt.jpg")
        );
    }

    #[test]
    fn relative_image_urls_are_ignored() {
        let blocks = vec![json!({"image": "/assets/shirt.jpg"})];
        assert_eq!(find_image(&blocks), None);
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let html = page(r#"{"@type": "Product", "brand""#);
        assert!(parse_blocks(&html).is_empty());
    }

    #[test]
    fn numeric_price_is_stringified() {
        let blocks = vec![json!({"offers": {"price": 42.5}})];
        assert_eq!(find_price(&blocks).as_deref(), Some("42.5"));
    }
}
