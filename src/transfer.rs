//! JSON export and import of the quote list.
//!
//! The file format is the same JSON array the store persists. Import
//! validates the whole batch before anything is applied: one bad record
//! aborts the entire import.

use crate::error::{Result, VaultError};
use crate::store::Quote;

/// Serialize quotes to a pretty-printed JSON array for download.
pub fn export_json(quotes: &[Quote]) -> Result<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Parse and validate an uploaded quote file. Every record must carry
/// non-empty trimmed text and category; otherwise the batch is rejected
/// wholesale.
pub fn import_json(content: &str) -> Result<Vec<Quote>> {
    let quotes: Vec<Quote> = serde_json::from_str(content)
        .map_err(|e| VaultError::Import(format!("not a valid quote file: {e}")))?;

    for (index, quote) in quotes.iter().enumerate() {
        if quote.text.trim().is_empty() || quote.category.trim().is_empty() {
            return Err(VaultError::Import(format!(
                "record {index} is missing quote text or category"
            )));
        }
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_import_round_trip() {
        let quotes = vec![
            Quote::new("First", "alpha"),
            Quote::new("Second", "beta"),
        ];
        let json = export_json(&quotes).unwrap();
        let parsed = import_json(&json).unwrap();
        assert_eq!(parsed, quotes);
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let result = import_json("this is not json");
        assert!(matches!(result, Err(VaultError::Import(_))));
    }

    #[test]
    fn test_import_rejects_wrong_shape() {
        let result = import_json(r#"{"text": "a lone object, not an array"}"#);
        assert!(matches!(result, Err(VaultError::Import(_))));
    }

    #[test]
    fn test_import_rejects_batch_with_one_bad_record() {
        let json = r#"[
            {"text": "fine", "category": "ok"},
            {"text": "   ", "category": "ok"}
        ]"#;
        let result = import_json(json);
        assert!(matches!(result, Err(VaultError::Import(_))));
    }
}
