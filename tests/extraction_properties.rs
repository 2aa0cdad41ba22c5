//! End-to-end extraction behavior over fixture pages.

use scraper::Html;
use virtual_closet::infrastructure::extraction::{
    ExtractContext, ProductExtractor, brand, price, structured_data,
};

fn extractor() -> ProductExtractor {
    ProductExtractor::new().expect("default selectors compile")
}

fn ctx() -> ExtractContext {
    ExtractContext::new("https://shop.example/products/1")
}

#[test]
fn decimal_comma_prices_normalize_to_two_decimals() {
    assert_eq!(price::normalize("19,99"), "$19.99");
}

#[test]
fn thousands_comma_prices_are_stripped() {
    assert_eq!(price::normalize("1,999"), "$1999.00");
}

#[test]
fn brand_validator_rejects_script_text_and_accepts_names() {
    assert!(!brand::looks_like_brand("<script>window.x=1</script>"));
    assert!(brand::looks_like_brand("Glenbrooke"));
}

#[test]
fn json_ld_supplies_brand_and_price_when_selectors_miss() {
    let html = Html::parse_document(
        r#"<html><head>
            <script type="application/ld+json">
            {"@type":"Product","brand":{"name":"Acme"},"offers":{"price":"19.99","priceCurrency":"USD"}}
            </script>
        </head><body><main>A product page with no matching selectors.</main></body></html>"#,
    );

    // The pre-normalization price keeps the currency code from the offer.
    let blocks = structured_data::parse_blocks(&html);
    let raw = extractor().raw_price(&html, &blocks);
    assert_eq!(raw.as_deref(), Some("19.99 USD"));

    let info = extractor().extract(&html, &ctx());
    assert_eq!(info.brand, "Acme");
    assert_eq!(info.price, "$19.99");
}

#[test]
fn largest_image_fallback_picks_biggest_qualifying_area() {
    let html = Html::parse_document(
        r#"<html><body>
            <img src="https://cdn.example/a.jpg" width="50" height="50">
            <img src="https://cdn.example/b.jpg" width="120" height="120">
            <img src="https://cdn.example/c.jpg" width="300" height="200">
        </body></html>"#,
    );
    let info = extractor().extract(&html, &ctx());
    assert_eq!(info.image_url, "https://cdn.example/c.jpg");
    assert_eq!(info.extraction_method.unwrap().to_string(), "largest");
}

#[test]
fn open_graph_only_page_yields_meta_method() {
    let html = Html::parse_document(
        r#"<html><head>
            <meta property="og:image" content="https://cdn.example/og-product.jpg">
        </head><body><h1>Suede loafers</h1></body></html>"#,
    );
    let info = extractor().extract(&html, &ctx());
    assert_eq!(info.image_url, "https://cdn.example/og-product.jpg");
    assert_eq!(info.extraction_method.unwrap().to_string(), "meta");
}

#[test]
fn sale_price_is_preferred_over_struck_out_regular_price() {
    let html = Html::parse_document(
        r#"<html><body>
            <span class="price">Was $89.00</span>
            <span class="price">Now $59.00</span>
        </body></html>"#,
    );
    let info = extractor().extract(&html, &ctx());
    assert_eq!(info.price, "$59.00");
}

#[test]
fn brand_falls_back_to_url_path_segment() {
    let html = Html::parse_document("<html><body><h1>Wool coat</h1></body></html>");
    let ctx = ExtractContext::new("https://shop.example/brand-maison_claire/coats/9");
    let info = extractor().extract(&html, &ctx);
    assert_eq!(info.brand, "brand maison claire");
}

#[test]
fn full_product_page_extracts_every_field() {
    let html = Html::parse_document(
        r#"<html>
        <head><title>Shop</title></head>
        <body>
            <h1 class="product-title">Merino crewneck sweater</h1>
            <div class="brand">Highland Knits</div>
            <span class="price">$129.00</span>
            <p class="product-description">Midweight merino wool, knitted in a classic crew silhouette.</p>
            <div class="product-gallery">
                <img src="https://cdn.example/sweater-front.jpg" width="750" height="1000">
            </div>
        </body></html>"#,
    );
    let info = extractor().extract(&html, &ctx());
    assert_eq!(info.title, "Merino crewneck sweater");
    assert_eq!(info.brand, "Highland Knits");
    assert_eq!(info.price, "$129.00");
    assert!(info.description.starts_with("Midweight merino"));
    assert_eq!(info.image_url, "https://cdn.example/sweater-front.jpg");
    // Specific image selectors miss (no matching class), the gallery
    // container supplies the image.
    assert_eq!(info.extraction_method.unwrap().to_string(), "container");
    assert!(info.error.is_none());
}
