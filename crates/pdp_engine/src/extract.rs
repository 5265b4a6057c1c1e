use pdp_core::ProductFields;
use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts product fields from a raw PDP document.
pub trait Extractor: Send + Sync {
    /// Returns `None` when the embedded payload is absent or unreadable.
    /// Malformed input is a normal case, never an error.
    fn extract(&self, html: &str) -> Option<ProductFields>;
}

// Candidate keys per field, tried in priority order. The site has shipped
// several payload generations; older pages only carry the later entries.
const TITLE_KEYS: &[&str] = &[
    "TituloSinMarca",
    "productDisplayName",
    "productName",
    "productTitle",
];
const CODE_KEYS: &[&str] = &["skuId", "sellerSkuId"];
const LIST_PRICE_KEYS: &[&str] = &["listPrice", "regularPrice", "basePrice"];
const PROMO_PRICE_KEYS: &[&str] = &["promoPrice", "salePrice", "sortPrice", "offerPrice"];

/// Extraction from the `__NEXT_DATA__` JSON island embedded in the page.
#[derive(Debug, Default)]
pub struct NextDataExtractor;

impl Extractor for NextDataExtractor {
    fn extract(&self, html: &str) -> Option<ProductFields> {
        let data = next_data_json(html)?;
        let record = data.pointer("/query/data/mainContent/records/0")?;

        let null = Value::Null;
        let all_meta = record.get("allMeta").unwrap_or(&null);
        let variant = all_meta.pointer("/variants/0").unwrap_or(&null);
        let variant_prices = variant.get("prices").unwrap_or(&null);

        let title = first_string(all_meta, TITLE_KEYS)
            .or_else(|| string_at(variant, "skuName"))
            .or_else(|| string_at(record, "_t"))
            .unwrap_or_default();

        let code = first_string(variant, CODE_KEYS)
            .or_else(|| string_at(all_meta, "productId"))
            .unwrap_or_default();

        let regular_price = first_number(variant_prices, LIST_PRICE_KEYS)
            .or_else(|| first_number(all_meta, LIST_PRICE_KEYS));
        let discount_price = first_number(variant_prices, PROMO_PRICE_KEYS)
            .or_else(|| first_number(all_meta, PROMO_PRICE_KEYS));

        let seller = variant
            .pointer("/offers/bestOffer/sellerName")
            .and_then(value_to_string)
            .or_else(|| variant.pointer("/sellernames/0").and_then(value_to_string))
            .unwrap_or_default();

        Some(ProductFields {
            code,
            title,
            regular_price,
            discount_price,
            seller,
        })
    }
}

fn next_data_json(html: &str) -> Option<Value> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let node = doc.select(&selector).next()?;
    let raw: String = node.text().collect();
    serde_json::from_str(&raw).ok()
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string_at(value, key))
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| number_at(value, key))
}

fn number_at(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
