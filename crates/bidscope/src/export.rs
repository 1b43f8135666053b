//! JSON and CSV exports of a [`BidAnalysis`].

use crate::types::{BidAnalysis, ProductFitType};
use crate::{BidscopeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const JSON_FALLBACK_STEM: &str = "bid_analysis";
pub const CSV_FALLBACK_STEM: &str = "bid_line_items";

const CSV_HEADER: &str = "Item / Service,Quantity,Part #,Description";

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z_]+").expect("static regex is valid"));

/// Pretty-printed JSON of the whole analysis.
pub fn to_json_pretty(analysis: &BidAnalysis) -> Result<String> {
    serde_json::to_string_pretty(analysis)
        .map_err(|e| BidscopeError::serialization_with_source("Failed to serialize analysis", e))
}

/// CSV of the line items, or `None` when there are none.
///
/// Every field is quoted; missing values are empty strings.
///
/// # Example
///
/// ```rust
/// # use bidscope::export::line_items_csv;
/// # let analysis: bidscope::BidAnalysis = serde_json::from_str(r#"{
/// #   "solicitationDetails": {"title": null, "agency": null, "summary": null},
/// #   "relevanceAnalysis": {"isRelevant": null, "reason": null},
/// #   "keyRequirements": {"eligibility": [], "objectives": [],
/// #     "lineItems": [{"name": "Autoclave", "quantity": 2, "partNumber": "M11"}],
/// #     "productFit": {"type": "unspecified", "details": null, "isCarriedBrand": null}},
/// #   "submissionInstructions": {"deadline": null, "formattingAndDelivery": []},
/// #   "financials": {"budgetRange": null, "contractTerm": null},
/// #   "contactAndCompliance": {"pointOfContact": null, "complianceRequirements": []},
/// #   "flags_for_human_review": []
/// # }"#).unwrap();
/// assert_eq!(
///     line_items_csv(&analysis).unwrap(),
///     "Item / Service,Quantity,Part #,Description\n\"Autoclave\",\"2\",\"M11\",\"\""
/// );
/// ```
pub fn line_items_csv(analysis: &BidAnalysis) -> Option<String> {
    let items = &analysis.key_requirements.line_items;
    if items.is_empty() {
        return None;
    }

    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(CSV_HEADER.to_string());
    for item in items {
        let quantity = item.quantity.as_ref().map(|q| q.to_string()).unwrap_or_default();
        let fields = [
            item.name.as_str(),
            quantity.as_str(),
            item.part_number.as_deref().unwrap_or(""),
            item.description.as_deref().unwrap_or(""),
        ];
        rows.push(fields.iter().map(|field| quote(field)).collect::<Vec<_>>().join(","));
    }

    Some(rows.join("\n"))
}

/// File name stem derived from the solicitation title.
///
/// Each run of characters outside `[0-9A-Za-z_]` becomes one underscore; a
/// missing or empty title yields `fallback`.
pub fn file_stem(analysis: &BidAnalysis, fallback: &str) -> String {
    match analysis.solicitation_details.title.as_deref() {
        Some(title) if !title.is_empty() => NON_WORD.replace_all(title, "_").into_owned(),
        _ => fallback.to_string(),
    }
}

/// Human-readable product-fit label, e.g. `Brand Name Or Equal`.
pub fn product_fit_label(fit_type: ProductFitType) -> String {
    fit_type
        .as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineItem, Quantity};
    use serde_json::json;

    fn analysis(title: serde_json::Value, line_items: serde_json::Value) -> BidAnalysis {
        serde_json::from_value(json!({
            "solicitationDetails": { "title": title, "agency": "IHS", "summary": null },
            "relevanceAnalysis": { "isRelevant": true, "reason": null },
            "keyRequirements": {
                "eligibility": [], "objectives": [], "lineItems": line_items,
                "productFit": { "type": "brand_name_or_equal", "details": null, "isCarriedBrand": null }
            },
            "submissionInstructions": { "deadline": null, "formattingAndDelivery": [] },
            "financials": { "budgetRange": null, "contractTerm": null },
            "contactAndCompliance": { "pointOfContact": null, "complianceRequirements": [] },
            "flags_for_human_review": ["Deadline has passed"]
        }))
        .unwrap()
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let a = analysis(
            json!("X"),
            json!([
                { "name": "Monitor, 12\" display", "quantity": 3, "description": "Patient \"vitals\"", "partNumber": null },
                { "name": "Gauze", "quantity": "As needed" }
            ]),
        );
        let csv = line_items_csv(&a).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], "Item / Service,Quantity,Part #,Description");
        assert_eq!(lines[1], r#""Monitor, 12"" display","3","","Patient ""vitals""""#);
        assert_eq!(lines[2], r#""Gauze","As needed","","""#);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_none_without_line_items() {
        assert!(line_items_csv(&analysis(json!("X"), json!([]))).is_none());
    }

    #[test]
    fn test_file_stem() {
        let a = analysis(json!("RFQ #24-117: Dental Chairs (Phase 2)"), json!([]));
        assert_eq!(file_stem(&a, JSON_FALLBACK_STEM), "RFQ_24_117_Dental_Chairs_Phase_2_");

        let untitled = analysis(json!(null), json!([]));
        assert_eq!(file_stem(&untitled, CSV_FALLBACK_STEM), "bid_line_items");

        let empty = analysis(json!(""), json!([]));
        assert_eq!(file_stem(&empty, JSON_FALLBACK_STEM), "bid_analysis");
    }

    #[test]
    fn test_json_export_round_trips_field_names() {
        let mut a = analysis(json!("X"), json!([]));
        a.key_requirements.line_items.push(LineItem {
            name: "Sterilizer".to_string(),
            quantity: Some(Quantity::Text("1".to_string())),
            description: None,
            part_number: Some("M9".to_string()),
        });
        let text = to_json_pretty(&a).unwrap();
        assert!(text.contains("\n  \"solicitationDetails\": {"));
        assert!(text.contains("\"flags_for_human_review\""));
        assert!(text.contains("\"partNumber\": \"M9\""));
        assert!(text.contains("\"type\": \"brand_name_or_equal\""));
    }

    #[test]
    fn test_product_fit_label() {
        assert_eq!(product_fit_label(ProductFitType::BrandNameOrEqual), "Brand Name Or Equal");
        assert_eq!(product_fit_label(ProductFitType::Unspecified), "Unspecified");
    }
}
