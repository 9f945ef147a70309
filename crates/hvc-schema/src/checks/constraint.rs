//! Cross-field constraints on model entries.

use hvc_core::{JobDocument, JobKind, PROBABILITY_FLAG_KEY};
use serde_json::Value;

use super::{model_entries, Check};
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Requires `predict_proba: true` on every entry whose model is in the
/// registry's must-train-with-probability set.
///
/// Only a boolean `true` satisfies the constraint; `"true"`, `1`, or an
/// absent flag do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl Check for ConstraintValidator {
    fn name(&self) -> &'static str {
        "constraint"
    }

    fn applies_to(&self, kind: JobKind) -> bool {
        kind.trains_models()
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let (entries, _) = model_entries(document);
        entries
            .iter()
            .filter(|entry| schema.requires_probability(entry.name))
            .filter(|entry| entry.fields.get(PROBABILITY_FLAG_KEY) != Some(&Value::Bool(true)))
            .map(|entry| ValidationError::ProbabilityFlagRequired {
                model: entry.name.to_string(),
            })
            .collect()
    }
}
