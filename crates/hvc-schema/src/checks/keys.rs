//! Top-level key sets.

use hvc_core::{JobDocument, JobKind};

use super::Check;
use crate::registry::SchemaRegistry;
use crate::report::ValidationError;

/// Checks top-level keys against the required and optional sets for the
/// document's job kind.
///
/// Missing required keys are reported in ruleset order, then unknown keys
/// in document order. Presence is by membership only.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeySetValidator;

impl Check for KeySetValidator {
    fn name(&self) -> &'static str {
        "key_set"
    }

    fn applies_to(&self, _kind: JobKind) -> bool {
        true
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let job = document.kind();
        let key_sets = schema.key_sets(job);

        let missing = key_sets
            .required()
            .iter()
            .filter(|key| !document.contains_key(key.as_str()))
            .map(|key| ValidationError::MissingRequiredKey {
                job,
                key: key.clone(),
            });

        let unknown = document
            .keys()
            .filter(|key| !key_sets.allows(key))
            .map(|key| ValidationError::UnknownTopLevelKey {
                job,
                key: key.to_string(),
            });

        missing.chain(unknown).collect()
    }
}
