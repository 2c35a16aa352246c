//! Storage encoding for ordered list fields (`files`, `links`).
//!
//! Lists are persisted as a single JSON text column and always decode back
//! to a sequence, never to null.

/// Encode a list of strings for storage.
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored list. Empty, null or undecodable text yields an empty list.
pub fn decode_list(stored: &str) -> Vec<String> {
    if stored.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Option<Vec<String>>>(stored)
        .ok()
        .flatten()
        .unwrap_or_default()
}
