//! Image strategy waterfall.
//!
//! Each strategy inspects the page one way and yields at most one
//! candidate; the orchestrator runs them in priority order and stops at the
//! first hit. Sizes come from the `width`/`height` attributes (there is no
//! layout engine here); a missing attribute counts as 0 and fails the gate.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::item::{ExtractionMethod, ExtractionSource};

/// Minimum width for selector/container hits, exclusive.
const MIN_SELECTOR_WIDTH: u32 = 100;

/// Minimum width and height for the largest-image scan, inclusive.
const MIN_SCAN_DIMENSION: u32 = 100;

/// Lazy-load attributes tried when the `src` is empty or a data URI.
const LAZY_SRC_ATTRS: [&str; 3] = ["data-src", "data-lazy-src", "data-original"];

/// A chosen image plus the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub method: ExtractionMethod,
}

impl ImageCandidate {
    fn new(source: ExtractionSource, resolved: ResolvedSource) -> Self {
        let method = if resolved.lazy {
            ExtractionMethod::lazy(source)
        } else {
            ExtractionMethod::new(source)
        };
        Self {
            url: resolved.url,
            method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedSource {
    url: String,
    lazy: bool,
}

/// Strategy 1: specific product image selectors.
pub fn by_selector(html: &Html, image_selectors: &[Selector]) -> Option<ImageCandidate> {
    for selector in image_selectors {
        for element in html.select(selector) {
            if let Some(resolved) = qualify(element, MIN_SELECTOR_WIDTH) {
                debug!("image via selector: {}", resolved.url);
                return Some(ImageCandidate::new(ExtractionSource::Selector, resolved));
            }
        }
    }
    None
}

/// Strategy 2: qualifying child image of a known product container.
pub fn by_container(
    html: &Html,
    container_selectors: &[Selector],
    img: &Selector,
) -> Option<ImageCandidate> {
    for selector in container_selectors {
        for container in html.select(selector) {
            for element in container.select(img) {
                if let Some(resolved) = qualify(element, MIN_SELECTOR_WIDTH) {
                    debug!("image via container: {}", resolved.url);
                    return Some(ImageCandidate::new(ExtractionSource::Container, resolved));
                }
            }
        }
    }
    None
}

/// Strategy 4: Open Graph / Twitter card meta tags.
pub fn by_meta(html: &Html, meta_selectors: &[Selector]) -> Option<ImageCandidate> {
    for selector in meta_selectors {
        for element in html.select(selector) {
            if let Some(content) = element.value().attr("content") {
                let content = content.trim();
                if is_absolute(content) {
                    debug!("image via meta tag: {content}");
                    return Some(ImageCandidate {
                        url: content.to_string(),
                        method: ExtractionMethod::new(ExtractionSource::Meta),
                    });
                }
            }
        }
    }
    None
}

/// Strategy 5: scan every image and keep the one with the largest rendered
/// area, excluding icons/logos and anything under 100x100. The first of two
/// equal areas wins.
pub fn by_largest(html: &Html, img: &Selector) -> Option<ImageCandidate> {
    let mut best: Option<(u64, ResolvedSource)> = None;
    for element in html.select(img) {
        let Some(resolved) = resolve_source(element) else {
            continue;
        };
        if resolved.url.contains("icon") || resolved.url.contains("logo") {
            continue;
        }
        let width = attr_dimension(element, "width");
        let height = attr_dimension(element, "height");
        if width < MIN_SCAN_DIMENSION || height < MIN_SCAN_DIMENSION {
            continue;
        }
        let area = u64::from(width) * u64::from(height);
        if best.as_ref().is_none_or(|(largest, _)| area > *largest) {
            best = Some((area, resolved));
        }
    }
    best.map(|(area, resolved)| {
        debug!("image via largest-area scan ({area}px²): {}", resolved.url);
        ImageCandidate::new(ExtractionSource::Largest, resolved)
    })
}

/// Apply the size and source gates to one `<img>` element.
fn qualify(element: ElementRef<'_>, min_width: u32) -> Option<ResolvedSource> {
    let resolved = resolve_source(element)?;
    if resolved.url.contains("icon") {
        return None;
    }
    (attr_dimension(element, "width") > min_width).then_some(resolved)
}

/// Resolve an element's usable source URL.
///
/// A direct absolute `src` wins. When the `src` is empty or a data URI
/// (lazy-loaded placeholder), the known lazy attributes are consulted and
/// the result is flagged so the extraction method gets its `-lazy` suffix.
fn resolve_source(element: ElementRef<'_>) -> Option<ResolvedSource> {
    let src = element.value().attr("src").unwrap_or("").trim();
    if is_absolute(src) {
        return Some(ResolvedSource {
            url: src.to_string(),
            lazy: false,
        });
    }
    if src.is_empty() || src.starts_with("data:") {
        for attr in LAZY_SRC_ATTRS {
            if let Some(alt) = element.value().attr(attr) {
                let alt = alt.trim();
                if is_absolute(alt) {
                    return Some(ResolvedSource {
                        url: alt.to_string(),
                        lazy: true,
                    });
                }
            }
        }
    }
    None
}

fn attr_dimension(element: ElementRef<'_>, name: &str) -> u32 {
    element
        .value()
        .attr(name)
        .and_then(|value| value.trim().trim_end_matches("px").parse().ok())
        .unwrap_or(0)
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img_selector() -> Selector {
        Selector::parse("img").unwrap()
    }

    #[test]
    fn largest_scan_prefers_biggest_qualifying_area() {
        let html = Html::parse_document(
            r#"<html><body>
                <img src="https://cdn.example/a.jpg" width="50" height="50">
                <img src="https://cdn.example/b.jpg" width="120" height="120">
                <img src="https://cdn.example/c.jpg" width="300" height="200">
            </body></html>"#,
        );
        let chosen = by_largest(&html, &img_selector()).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/c.jpg");
        assert_eq!(chosen.method.to_string(), "largest");
    }

    #[test]
    fn largest_scan_excludes_icons_and_logos() {
        let html = Html::parse_document(
            r#"<html><body>
                <img src="https://cdn.example/site-logo.png" width="400" height="400">
                <img src="https://cdn.example/favicon-large.png" width="300" height="300">
                <img src="https://cdn.example/shirt.jpg" width="200" height="200">
            </body></html>"#,
        );
        let chosen = by_largest(&html, &img_selector()).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/shirt.jpg");
    }

    #[test]
    fn lazy_attribute_substitutes_for_data_uri_src() {
        let html = Html::parse_document(
            r#"<html><body>
                <img src="data:image/gif;base64,R0lGOD" data-src="https://cdn.example/real.jpg"
                     width="500" height="500">
            </body></html>"#,
        );
        let chosen = by_largest(&html, &img_selector()).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/real.jpg");
        assert_eq!(chosen.method.to_string(), "largest-lazy");
    }

    #[test]
    fn selector_stage_requires_width_above_threshold() {
        let html = Html::parse_document(
            r#"<html><body>
                <img class="product-image" src="https://cdn.example/thumb.jpg" width="80">
                <img class="product-image" src="https://cdn.example/full.jpg" width="600">
            </body></html>"#,
        );
        let selectors = vec![Selector::parse("img.product-image").unwrap()];
        let chosen = by_selector(&html, &selectors).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/full.jpg");
        assert_eq!(chosen.method.to_string(), "selector");
    }

    #[test]
    fn meta_stage_reads_open_graph_content() {
        let html = Html::parse_document(
            r#"<html><head>
                <meta property="og:image" content="https://cdn.example/og.jpg">
            </head><body></body></html>"#,
        );
        let selectors = vec![Selector::parse("meta[property='og:image']").unwrap()];
        let chosen = by_meta(&html, &selectors).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/og.jpg");
        assert_eq!(chosen.method.to_string(), "meta");
    }

    #[test]
    fn container_stage_finds_nested_image() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="product-gallery">
                    <img src="https://cdn.example/gallery.jpg" width="450" height="450">
                </div>
            </body></html>"#,
        );
        let containers = vec![Selector::parse(".product-gallery").unwrap()];
        let chosen = by_container(&html, &containers, &img_selector()).unwrap();
        assert_eq!(chosen.url, "https://cdn.example/gallery.jpg");
        assert_eq!(chosen.method.to_string(), "container");
    }
}
