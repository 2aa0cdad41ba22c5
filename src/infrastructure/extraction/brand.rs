//! Brand name heuristics.
//!
//! Brand selectors routinely match navigation chrome, inline scripts or
//! template debris, so every candidate runs through a plausibility gate
//! before being accepted. The last resort reads the brand out of the page
//! URL itself.

use scraper::{Html, Selector};
use url::Url;

/// Maximum plausible brand length; anything longer is page copy, not a name.
const MAX_BRAND_LEN: usize = 50;

/// Substrings that mark a candidate as leaked code or markup.
const CODE_MARKERS: [&str; 3] = ["window", "function", "var "];

/// URL path segments hinting that a brand name lives nearby.
const BRAND_PATH_KEYWORDS: [&str; 4] = ["brand", "designer", "vendor", "label"];

/// Whether a candidate string plausibly names a brand.
///
/// Rejects empty/oversized strings, anything containing code or markup
/// markers, strings opening with bracket characters, and skip-navigation
/// link text.
pub fn looks_like_brand(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.len() >= MAX_BRAND_LEN {
        return false;
    }
    if text.contains('{') {
        return false;
    }
    if CODE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return false;
    }
    if matches!(text.chars().next(), Some('[' | '(' | '<')) {
        return false;
    }
    if text.starts_with("Skip to") {
        return false;
    }
    true
}

/// First selector whose text or `content` attribute passes the gate.
pub fn from_selectors(html: &Html, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        for element in html.select(selector) {
            let text = element.text().collect::<String>();
            let candidate = if text.trim().is_empty() {
                element.value().attr("content").unwrap_or("")
            } else {
                &text
            };
            let candidate = candidate.trim();
            if looks_like_brand(candidate) {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Brand read from the page URL: the first path segment containing a
/// brand-like keyword, with separators mapped back to spaces.
pub fn from_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let segments = parsed.path_segments()?;
    for segment in segments {
        let lower = segment.to_lowercase();
        if BRAND_PATH_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            let name = segment.replace(['_', '-'], " ").trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_leaked_script_text() {
        assert!(!looks_like_brand("<script>window.x=1</script>"));
        assert!(!looks_like_brand("function track() {}"));
        assert!(!looks_like_brand("var brandName"));
        assert!(!looks_like_brand("{\"brand\":\"x\"}"));
    }

    #[test]
    fn rejects_navigation_and_bracketed_text() {
        assert!(!looks_like_brand("Skip to main content"));
        assert!(!looks_like_brand("[object Object]"));
        assert!(!looks_like_brand("(function(){})"));
    }

    #[test]
    fn accepts_plain_names() {
        assert!(looks_like_brand("Acme & Co."));
        assert!(looks_like_brand("Nordcliff"));
    }

    #[test]
    fn rejects_oversized_candidates() {
        let long = "a".repeat(60);
        assert!(!looks_like_brand(&long));
    }

    #[test]
    fn reads_brand_from_url_path() {
        assert_eq!(
            from_url("https://shop.example/designer-north_ridge/coats/123").as_deref(),
            Some("designer north ridge")
        );
        assert_eq!(from_url("https://shop.example/products/123"), None);
    }

    #[test]
    fn content_attribute_is_a_fallback_for_empty_text() {
        let html = Html::parse_document(
            r#"<html><head><meta property="og:brand" content="Acme"></head><body></body></html>"#,
        );
        let selectors = vec![Selector::parse("meta[property='og:brand']").unwrap()];
        assert_eq!(from_selectors(&html, &selectors).as_deref(), Some("Acme"));
    }
}
