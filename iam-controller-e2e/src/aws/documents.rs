//! Policy document helpers.
//!
//! IAM returns policy documents (inline, managed versions, trust policies) as
//! URL-encoded JSON.

use serde_json::Value;

use crate::aws::{AwsError, AwsResult};

/// URL decode a policy document returned by IAM.
pub fn decode_policy_document(encoded: &str) -> AwsResult<String> {
    percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AwsError::PolicyError(format!("Failed to URL decode policy document: {e}")))
}

/// URL decode and parse a policy document returned by IAM.
pub fn parse_policy_document(encoded: &str) -> AwsResult<Value> {
    let decoded = decode_policy_document(encoded)?;
    serde_json::from_str(&decoded)
        .map_err(|e| AwsError::PolicyError(format!("Failed to parse policy document JSON: {e}")))
}

/// Policy text with every whitespace character removed.
///
/// IAM reformats documents it stores, so text comparisons ignore whitespace.
pub fn strip_whitespace(document: &str) -> String {
    document.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True when two policy texts are identical apart from whitespace.
pub fn same_document(expected: &str, actual: &str) -> bool {
    strip_whitespace(expected) == strip_whitespace(actual)
}
