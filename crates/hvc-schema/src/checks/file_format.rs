//! `file_format` membership.

use hvc_core::{JobDocument, JobKind, FILE_FORMAT_KEY};
use serde_json::Value;

use super::Check;
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Checks that `file_format`, when present, names a supported format.
/// Absence is the key-set pass's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFormatValidator;

impl Check for FileFormatValidator {
    fn name(&self) -> &'static str {
        "file_format"
    }

    fn applies_to(&self, _kind: JobKind) -> bool {
        true
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        match document.get(FILE_FORMAT_KEY) {
            None => Vec::new(),
            Some(Value::String(format)) if schema.valid_file_formats().contains(format) => {
                Vec::new()
            }
            Some(other) => vec![ValidationError::InvalidFileFormat {
                format: other.clone(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{extract_train, registry};
    use serde_json::json;

    #[test]
    fn test_supported_formats_pass() {
        let schema = registry();
        for format in ["evtaf", "koumura", "wav_txt", "txt", "npy"] {
            let doc = extract_train(&format!("file_format: {format}\n"));
            assert!(FileFormatValidator.check(&doc, &schema).is_empty(), "{format}");
        }
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let errors = FileFormatValidator.check(&extract_train("file_format: mp3\n"), &registry());
        assert_eq!(
            errors,
            vec![ValidationError::InvalidFileFormat {
                format: json!("mp3")
            }]
        );
        assert_eq!(errors[0].to_string(), "invalid file format \"mp3\"");
    }

    #[test]
    fn test_non_string_format_rejected() {
        let errors = FileFormatValidator.check(&extract_train("file_format: [evtaf]\n"), &registry());
        assert_eq!(errors.len(), 1);
    }
}
