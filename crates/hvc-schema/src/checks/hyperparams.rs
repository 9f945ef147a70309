//! Hyperparameter names and value types.

use hvc_core::{JobDocument, JobKind, ValueType, HYPERPARAMETERS_KEY, MODELS_KEY};
use serde_json::Value;

use super::{model_entries, Check};
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Checks each declared hyperparameter against the type constraint the
/// registry holds for its `(model, param)` pair.
///
/// Type identity decides acceptance: `5.0` does not satisfy an
/// integer-only constraint. Entries for unknown models are skipped, since
/// [`ModelValidator`](super::ModelValidator) already reports them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperparameterTypeChecker;

impl Check for HyperparameterTypeChecker {
    fn name(&self) -> &'static str {
        "hyperparameter_type"
    }

    fn applies_to(&self, kind: JobKind) -> bool {
        kind.trains_models()
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let (entries, _) = model_entries(document);
        let mut errors = Vec::new();

        for entry in &entries {
            if !schema.is_known_model(entry.name) {
                continue;
            }
            let Some(hyperparameters) = entry.fields.get(HYPERPARAMETERS_KEY) else {
                continue;
            };
            let Value::Object(params) = hyperparameters else {
                errors.push(ValidationError::MalformedSection {
                    key: format!("{MODELS_KEY}[{}].{HYPERPARAMETERS_KEY}", entry.index),
                    expected: "a mapping of hyperparameter names to values",
                    found: ValueType::of(hyperparameters),
                });
                continue;
            };

            for (param, value) in params {
                match schema.hyperparameter_constraint(entry.name, param) {
                    None => errors.push(ValidationError::UnknownHyperparameter {
                        model: entry.name.to_string(),
                        param: param.clone(),
                    }),
                    Some(constraint) if !constraint.accepts_value(value) => {
                        errors.push(ValidationError::InvalidHyperparameterType {
                            model: entry.name.to_string(),
                            param: param.clone(),
                            value: value.clone(),
                            expected: constraint.clone(),
                            found: ValueType::of(value),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        errors
    }
}
