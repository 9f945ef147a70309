//! Keys inside nested parameter sections.

use hvc_core::{JobDocument, JobKind, ValueType};
use serde_json::Value;

use super::Check;
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Checks `spect_params`, `segment_params` and any other section the
/// registry constrains: the section must be a mapping and may only hold
/// its allowed keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionKeyValidator;

impl Check for SectionKeyValidator {
    fn name(&self) -> &'static str {
        "section_keys"
    }

    fn applies_to(&self, _kind: JobKind) -> bool {
        true
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for section in schema.sections() {
            let Some(value) = document.get(section) else {
                continue;
            };
            let Value::Object(fields) = value else {
                errors.push(ValidationError::MalformedSection {
                    key: section.to_string(),
                    expected: "a mapping of parameter names to values",
                    found: ValueType::of(value),
                });
                continue;
            };
            let Some(allowed) = schema.section_keys(section) else {
                continue;
            };
            for key in fields.keys().filter(|k| !allowed.contains(*k)) {
                errors.push(ValidationError::UnknownSectionKey {
                    section: section.to_string(),
                    key: key.clone(),
                });
            }
        }

        errors
    }
}
