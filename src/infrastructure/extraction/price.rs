//! Price candidate collection, ranking and normalization.
//!
//! Price text on shopping pages is adversarial: the same page can carry a
//! struck-through original price, a sale price, "$5 off" coupons and
//! "from $29" range teasers. Candidates are therefore gathered wide, then
//! filtered by phrase and ranked sale-before-regular; a stable sort keeps
//! DOM order as the final tie-break.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Gate for price-selector hits: a currency-prefixed or decimal number.
static CURRENCY_OR_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$€£¥₩]\s*\d|\d+[.,]\d{2}").expect("static regex"));

/// Currency-prefixed amount in free text, with an optional trailing word
/// that disqualifies the match ("$5 off", "$4.99 shipping").
static GENERIC_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([$€£¥₩]\s*\d[\d,]*(?:\.\d{1,2})?)(?:\s+(off|shipping|fee|discount)\b)?")
        .expect("static regex")
});

static CURRENCY_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$€£¥₩]").expect("static regex"));

static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d.,]*").expect("static regex"));

/// Range/teaser phrases that disqualify a candidate outright.
const EXCLUDED_PHRASES: [&str; 4] = ["from", "starting", "up to", "as low as"];

/// Text markers for the active selling price.
const SALE_TERMS: [&str; 3] = ["sale", "now", "current"];

/// Text markers for a struck-through reference price.
const REGULAR_TERMS: [&str; 3] = ["regular", "original", "was"];

/// Collect raw price candidates from the page, in DOM order.
///
/// First pass: elements matching the configured price selectors whose text
/// carries a currency-or-decimal pattern. If that yields nothing, a second
/// pass scans generic text elements for currency-prefixed amounts, skipping
/// amounts followed by "off"/"shipping"/"fee".
pub fn collect_candidates(
    html: &Html,
    price_selectors: &[Selector],
    generic_text: &Selector,
) -> Vec<String> {
    let mut candidates = Vec::new();
    for selector in price_selectors {
        for element in html.select(selector) {
            let text = squash(&element.text().collect::<String>());
            if !text.is_empty() && CURRENCY_OR_DECIMAL.is_match(&text) {
                candidates.push(text);
            }
        }
    }
    if !candidates.is_empty() {
        return candidates;
    }

    for element in html.select(generic_text) {
        let text = squash(&element.text().collect::<String>());
        for captures in GENERIC_AMOUNT.captures_iter(&text) {
            if captures.get(2).is_some() {
                continue;
            }
            // Keep the whole element text so sale/regular markers survive
            // into the ranking step.
            candidates.push(text.clone());
            break;
        }
    }
    candidates
}

/// Pick the best raw candidate: drop range teasers, then stable-sort
/// sale-marked text ahead of regular-marked text. Ties keep input order.
pub fn select_best(candidates: &[String]) -> Option<String> {
    let mut usable: Vec<&String> = candidates
        .iter()
        .filter(|text| {
            let lower = text.to_lowercase();
            !EXCLUDED_PHRASES.iter().any(|phrase| lower.contains(phrase))
        })
        .collect();

    usable.sort_by_key(|text| {
        let lower = text.to_lowercase();
        if SALE_TERMS.iter().any(|term| lower.contains(term)) {
            0
        } else if REGULAR_TERMS.iter().any(|term| lower.contains(term)) {
            2
        } else {
            1
        }
    });

    usable.first().map(|text| (*text).clone())
}

/// Normalize a raw price string to `<symbol><amount with two decimals>`.
///
/// The currency symbol is the first one found, `$` when absent. A comma
/// followed by at most two trailing digits is a decimal separator
/// ("19,99" -> 19.99); any other comma is a thousands separator and is
/// stripped ("1,999" -> 1999). Unparseable input normalizes to empty.
pub fn normalize(raw: &str) -> String {
    let symbol = CURRENCY_SYMBOL
        .find(raw)
        .map_or("$", |m| m.as_str());

    let Some(token) = NUMERIC_TOKEN.find(raw).map(|m| m.as_str()) else {
        return String::new();
    };

    let cleaned = match token.rfind(',') {
        Some(pos) => {
            let fraction = &token[pos + 1..];
            let digits = fraction.chars().take_while(char::is_ascii_digit).count();
            if (1..=2).contains(&digits) && digits == fraction.len() {
                // Decimal comma; anything before it is the integer part.
                let integer: String = token[..pos].chars().filter(char::is_ascii_digit).collect();
                format!("{integer}.{fraction}")
            } else {
                token.replace(',', "")
            }
        }
        None => token.to_string(),
    };

    match cleaned.parse::<f64>() {
        Ok(amount) => format!("{symbol}{amount:.2}"),
        Err(_) => String::new(),
    }
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
