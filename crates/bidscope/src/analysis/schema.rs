//! The response schema declared alongside every extraction request.
//!
//! The schema uses the capability's uppercase type vocabulary. Every key in a
//! `required` list must be present in the response; nullable scalars may hold
//! `null`. [`crate::types::BidAnalysis`] enforces the same contract on the
//! parsing side.

use once_cell::sync::Lazy;
use serde_json::{Value, json};

static BID_ANALYSIS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let nullable_string = json!({ "type": "STRING", "nullable": true });
    let nullable_bool = json!({ "type": "BOOLEAN", "nullable": true });
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "solicitationDetails": {
                "type": "OBJECT",
                "properties": {
                    "title": nullable_string,
                    "agency": nullable_string,
                    "summary": nullable_string
                },
                "required": ["title", "agency", "summary"]
            },
            "relevanceAnalysis": {
                "type": "OBJECT",
                "properties": {
                    "isRelevant": nullable_bool,
                    "reason": nullable_string
                },
                "required": ["isRelevant", "reason"]
            },
            "keyRequirements": {
                "type": "OBJECT",
                "properties": {
                    "eligibility": string_list,
                    "objectives": string_list,
                    "lineItems": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "name": {
                                    "type": "STRING",
                                    "description": "The name of the equipment, supply, or service."
                                },
                                "quantity": {
                                    "type": "STRING",
                                    "nullable": true,
                                    "description": "The quantity required, as a number or text such as 'As needed'."
                                },
                                "description": {
                                    "type": "STRING",
                                    "nullable": true,
                                    "description": "A brief description of the item."
                                },
                                "partNumber": {
                                    "type": "STRING",
                                    "nullable": true,
                                    "description": "The manufacturer part or model number, if stated."
                                }
                            },
                            "required": ["name"]
                        }
                    },
                    "productFit": {
                        "type": "OBJECT",
                        "properties": {
                            "type": {
                                "type": "STRING",
                                "enum": ["brand_name_or_equal", "specific_brand", "unspecified"]
                            },
                            "details": nullable_string,
                            "isCarriedBrand": nullable_bool
                        },
                        "required": ["type", "details", "isCarriedBrand"]
                    }
                },
                "required": ["eligibility", "objectives", "lineItems", "productFit"]
            },
            "submissionInstructions": {
                "type": "OBJECT",
                "properties": {
                    "deadline": nullable_string,
                    "formattingAndDelivery": string_list
                },
                "required": ["deadline", "formattingAndDelivery"]
            },
            "financials": {
                "type": "OBJECT",
                "properties": {
                    "budgetRange": nullable_string,
                    "contractTerm": nullable_string
                },
                "required": ["budgetRange", "contractTerm"]
            },
            "contactAndCompliance": {
                "type": "OBJECT",
                "properties": {
                    "pointOfContact": nullable_string,
                    "complianceRequirements": string_list
                },
                "required": ["pointOfContact", "complianceRequirements"]
            },
            "flags_for_human_review": string_list
        },
        "required": [
            "solicitationDetails",
            "relevanceAnalysis",
            "keyRequirements",
            "submissionInstructions",
            "financials",
            "contactAndCompliance",
            "flags_for_human_review"
        ]
    })
});

/// The static response schema for [`crate::types::BidAnalysis`].
pub fn bid_analysis_schema() -> &'static Value {
    &BID_ANALYSIS_SCHEMA
}
