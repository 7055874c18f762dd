//! JSON output of a full extraction.

use crate::error::Result;
use crate::model::Extraction;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize headings, records and summary.
pub fn to_json(extraction: &Extraction, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(extraction)?,
        JsonFormat::Compact => serde_json::to_string(extraction)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_extraction;

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample_extraction(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"headings\""));
        assert!(json.contains("Chapter 1"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_round_trips() {
        let extraction = sample_extraction();
        let json = to_json(&extraction, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let parsed: Extraction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.records, extraction.records);
        assert_eq!(parsed.headings, extraction.headings);
    }
}
