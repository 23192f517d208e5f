use serde::{Deserialize, Serialize};

use crate::AppError;

/// Book metadata injected into the generated EPUB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub genre: Option<String>,
}

impl BookMetadata {
    pub fn is_empty(&self) -> bool {
        [&self.title, &self.author, &self.language, &self.genre]
            .iter()
            .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Non-blank title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataField {
    Many(Vec<BookMetadata>),
    One(BookMetadata),
}

/// Parse the `metadata` form field: a JSON object or an array of objects.
///
/// A single object is treated as a one-element array.
pub fn parse_metadata_field(raw: &str) -> Result<Vec<BookMetadata>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let field: MetadataField = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidInput(format!("Invalid metadata JSON: {}", e)))?;
    Ok(match field {
        MetadataField::Many(entries) => entries,
        MetadataField::One(entry) => vec![entry],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_object() {
        let entries = parse_metadata_field(
            r#"{"title":"T","author":"A","language":"en","genre":"Fiction"}"#,
        )
        .expect("parse");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), Some("T"));
        assert_eq!(entries[0].genre.as_deref(), Some("Fiction"));
    }

    #[test]
    fn parses_array_with_partial_entries() {
        let entries =
            parse_metadata_field(r#"[{"title":"One"},{"author":"Someone"}]"#).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title(), None);
        assert_eq!(entries[1].author.as_deref(), Some("Someone"));
    }

    #[test]
    fn blank_field_means_no_metadata() {
        assert!(parse_metadata_field("  ").expect("parse").is_empty());
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let err = parse_metadata_field("{title: nope").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn whitespace_only_fields_count_as_empty() {
        let meta = BookMetadata {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(meta.is_empty());
        assert_eq!(meta.title(), None);
    }
}
