//! Keyword-based category classifier.
//!
//! Buckets are tested in a fixed priority order and the first hit wins, so
//! text matching both "shirt" and "jean" lands in tops. That order is the
//! tie-break policy, not an accident; keep the table sorted accordingly.

use crate::domain::item::Category;

/// Keyword sets per bucket, in priority order.
const KEYWORD_BUCKETS: [(Category, &[&str]); 6] = [
    (
        Category::Tops,
        &["shirt", "top", "tee", "sweater", "blouse", "tank"],
    ),
    (
        Category::Bottoms,
        &["pant", "jean", "skirt", "short", "trouser", "chino"],
    ),
    (
        Category::Shoes,
        &["shoe", "boot", "sneaker", "sandal", "loafer", "heel"],
    ),
    (Category::Dresses, &["dress"]),
    (
        Category::Outerwear,
        &["jacket", "coat", "hoodie", "cardigan", "blazer"],
    ),
    (
        Category::Accessories,
        &["hat", "scarf", "glove", "sock", "belt", "jewelry", "accessory"],
    ),
];

/// Classify lowercased product text into exactly one category.
pub fn classify(text: &str) -> Category {
    let text = text.to_lowercase();
    for (category, keywords) in KEYWORD_BUCKETS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return category;
        }
    }
    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Striped cotton shirt", Category::Tops)]
    #[case("Slim-fit jeans", Category::Bottoms)]
    #[case("leather chelsea boot", Category::Shoes)]
    #[case("Floral midi dress", Category::Dresses)]
    #[case("Down puffer jacket", Category::Outerwear)]
    #[case("Cashmere scarf", Category::Accessories)]
    #[case("Ceramic mug", Category::Other)]
    fn classifies_common_garments(#[case] text: &str, #[case] expected: Category) {
        assert_eq!(classify(text), expected);
    }

    #[test]
    fn bucket_order_breaks_ties() {
        // Matches both the tops and bottoms keyword sets; tops is tested
        // first and must win.
        assert_eq!(classify("denim shirt jean jacket combo"), Category::Tops);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("WOOL SWEATER"), Category::Tops);
    }
}
