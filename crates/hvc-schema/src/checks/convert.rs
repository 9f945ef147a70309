//! Output conversion types for predict jobs.

use hvc_core::{JobDocument, JobKind, ValueType, CONVERT_KEY};
use serde_json::Value;

use super::Check;
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Checks that every conversion a predict job requests is supported.
///
/// `convert` may be a single name or a sequence of names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertTypeValidator;

impl Check for ConvertTypeValidator {
    fn name(&self) -> &'static str {
        "convert_type"
    }

    fn applies_to(&self, kind: JobKind) -> bool {
        kind == JobKind::Predict
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let requested: Vec<(String, &Value)> = match document.get(CONVERT_KEY) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (format!("{CONVERT_KEY}[{i}]"), item))
                .collect(),
            Some(single) => vec![(CONVERT_KEY.to_string(), single)],
        };

        let mut errors = Vec::new();
        for (key, value) in requested {
            match value {
                Value::String(name) if schema.valid_convert_types().contains(name) => {}
                Value::String(name) => errors.push(ValidationError::InvalidConvertType {
                    convert_type: name.clone(),
                }),
                other => errors.push(ValidationError::MalformedSection {
                    key,
                    expected: "a conversion type name",
                    found: ValueType::of(other),
                }),
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{predict, registry};
    use crate::report::ErrorKind;

    fn check(yaml: &str) -> Vec<ValidationError> {
        ConvertTypeValidator.check(&predict(yaml), &registry())
    }

    #[test]
    fn test_notmat_accepted() {
        assert!(check("convert: notmat\n").is_empty());
        assert!(check("convert: [notmat]\n").is_empty());
    }

    #[test]
    fn test_xml_rejected() {
        assert_eq!(
            check("convert: xml\n"),
            vec![ValidationError::InvalidConvertType {
                convert_type: "xml".to_string()
            }]
        );
    }

    #[test]
    fn test_every_bad_entry_reported_in_order() {
        let errors = check("convert: [xml, notmat, csv]\n");
        let values: Vec<String> = errors.iter().filter_map(|e| e.value()).collect();
        assert_eq!(values, ["\"xml\"", "\"csv\""]);
    }

    #[test]
    fn test_non_string_entry_is_malformed() {
        let errors = check("convert: [notmat, 3]\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::MalformedSection);
        assert_eq!(errors[0].key(), "convert[1]");
    }

    #[test]
    fn test_absent_convert_passes() {
        assert!(check("bird_ID: a\n").is_empty());
    }

    #[test]
    fn test_only_applies_to_predict_jobs() {
        assert!(ConvertTypeValidator.applies_to(JobKind::Predict));
        assert!(!ConvertTypeValidator.applies_to(JobKind::ExtractTrain));
    }
}
