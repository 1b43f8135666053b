//! Core data types for documents, aggregated input, and the extraction result.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A file as the user supplied it: name, raw bytes, and the declared MIME type.
///
/// `declared_type` may be empty when the source could not determine one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_type: String,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Plain text produced from one successfully decoded [`UploadedDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedDocument {
    pub name: String,
    pub text: String,
}

/// The text content an extraction request is built from.
///
/// Free-form pasted text and concatenated documents are mutually exclusive;
/// exactly one of them feeds a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AggregatedInput {
    Text(String),
    Documents(String),
}

impl AggregatedInput {
    pub fn text(&self) -> &str {
        match self {
            AggregatedInput::Text(text) | AggregatedInput::Documents(text) => text,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Raw file bytes handed to the extraction capability without decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlinePayload {
    /// Build a payload from an uploaded file, defaulting the MIME type to
    /// `application/octet-stream` when none was declared.
    pub fn from_document(document: &UploadedDocument) -> Self {
        let mime_type = if document.declared_type.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            document.declared_type.clone()
        };
        Self {
            mime_type,
            data: document.bytes.clone(),
        }
    }
}

/// Structured extraction of one bid solicitation.
///
/// Scalar leaves are `Option`s: `None` means the source did not state the value.
/// Required keys must be present in the model output even when their value is
/// `null`; see [`crate::analysis::response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAnalysis {
    pub solicitation_details: SolicitationDetails,
    pub relevance_analysis: RelevanceAnalysis,
    pub key_requirements: KeyRequirements,
    pub submission_instructions: SubmissionInstructions,
    pub financials: Financials,
    pub contact_and_compliance: ContactAndCompliance,
    #[serde(rename = "flags_for_human_review")]
    pub flags_for_human_review: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolicitationDetails {
    #[serde(deserialize_with = "required_nullable")]
    pub title: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub agency: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceAnalysis {
    #[serde(deserialize_with = "required_nullable")]
    pub is_relevant: Option<bool>,
    #[serde(deserialize_with = "required_nullable")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequirements {
    pub eligibility: Vec<String>,
    pub objectives: Vec<String>,
    pub line_items: Vec<LineItem>,
    pub product_fit: ProductFit,
}

/// One equipment, supply, or service request found in the solicitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
}

/// A line-item quantity: either a number or free text such as "As needed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{}", n),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFit {
    #[serde(rename = "type")]
    pub fit_type: ProductFitType,
    #[serde(deserialize_with = "required_nullable")]
    pub details: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub is_carried_brand: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFitType {
    BrandNameOrEqual,
    SpecificBrand,
    Unspecified,
}

impl ProductFitType {
    pub const ALL: [ProductFitType; 3] = [
        ProductFitType::BrandNameOrEqual,
        ProductFitType::SpecificBrand,
        ProductFitType::Unspecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductFitType::BrandNameOrEqual => "brand_name_or_equal",
            ProductFitType::SpecificBrand => "specific_brand",
            ProductFitType::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for ProductFitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInstructions {
    #[serde(deserialize_with = "required_nullable")]
    pub deadline: Option<String>,
    pub formatting_and_delivery: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    #[serde(deserialize_with = "required_nullable")]
    pub budget_range: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub contract_term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAndCompliance {
    #[serde(deserialize_with = "required_nullable")]
    pub point_of_contact: Option<String>,
    pub compliance_requirements: Vec<String>,
}

/// A key that must be present but may hold `null`.
///
/// Using `deserialize_with` without `default` makes serde report a missing key
/// instead of silently producing `None`.
fn required_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
