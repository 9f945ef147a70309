//! # Validation Passes
//!
//! Each pass inspects one concern of a job document against the registry
//! and returns its findings in discovery order. Passes never fail and
//! never mutate the document.
//!
//! | Pass | Job kinds | Concern |
//! |------|-----------|---------|
//! | [`KeySetValidator`] | all | required / unknown top-level keys |
//! | [`ModelValidator`] | extract_train | model names and model-scoped keys |
//! | [`HyperparameterTypeChecker`] | extract_train | hyperparameter names and types |
//! | [`ConstraintValidator`] | extract_train | probability-output requirement |
//! | [`ConvertTypeValidator`] | predict | requested output conversions |
//! | [`FileFormatValidator`] | all | `file_format` membership |
//! | [`SectionKeyValidator`] | all | keys inside parameter sections |

mod constraint;
mod convert;
mod file_format;
mod hyperparams;
mod keys;
mod model;
mod sections;

pub use constraint::ConstraintValidator;
pub use convert::ConvertTypeValidator;
pub use file_format::FileFormatValidator;
pub use hyperparams::HyperparameterTypeChecker;
pub use keys::KeySetValidator;
pub use model::ModelValidator;
pub use sections::SectionKeyValidator;

use hvc_core::{JobDocument, JobKind, ValueType, MODELS_KEY, MODEL_NAME_KEY};
use serde_json::{Map, Value};

use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// A single validation pass.
pub trait Check {
    /// Short name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether the pass runs for documents of `kind`.
    fn applies_to(&self, kind: JobKind) -> bool;

    /// Inspect `document` and return every finding.
    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError>;
}

/// A well-formed entry of the `models` sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModelEntry<'a> {
    /// Position in the `models` sequence.
    pub index: usize,
    pub name: &'a str,
    pub fields: &'a Map<String, Value>,
}

/// Walk the `models` sequence of a document.
///
/// Returns the well-formed entries plus a `MalformedSection` finding for
/// each entry that could not be read. Only [`ModelValidator`] reports the
/// shape findings; later passes look at the well-formed entries alone.
pub(crate) fn model_entries(document: &JobDocument) -> (Vec<ModelEntry<'_>>, Vec<ValidationError>) {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    let Some(models) = document.get(MODELS_KEY) else {
        return (entries, errors);
    };
    let Value::Array(items) = models else {
        errors.push(ValidationError::MalformedSection {
            key: MODELS_KEY.to_string(),
            expected: "a sequence of model entries",
            found: ValueType::of(models),
        });
        return (entries, errors);
    };

    for (i, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            errors.push(ValidationError::MalformedSection {
                key: format!("{MODELS_KEY}[{i}]"),
                expected: "a mapping",
                found: ValueType::of(item),
            });
            continue;
        };
        match fields.get(MODEL_NAME_KEY) {
            Some(Value::String(name)) => entries.push(ModelEntry {
                index: i,
                name,
                fields,
            }),
            other => errors.push(ValidationError::MalformedSection {
                key: format!("{MODELS_KEY}[{i}].{MODEL_NAME_KEY}"),
                expected: "a model name",
                found: other.map_or(ValueType::Null, ValueType::of),
            }),
        }
    }

    (entries, errors)
}

#[cfg(test)]
pub(crate) mod test_support {
    use hvc_core::{JobDocument, JobKind};

    use crate::registry::SchemaRegistry;

    pub fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    pub fn extract_train(yaml: &str) -> JobDocument {
        JobDocument::from_yaml_str(JobKind::ExtractTrain, yaml).unwrap()
    }

    pub fn predict(yaml: &str) -> JobDocument {
        JobDocument::from_yaml_str(JobKind::Predict, yaml).unwrap()
    }
}
