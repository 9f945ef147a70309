//! Model names and model-scoped configuration keys.

use hvc_core::{JobDocument, JobKind, MODEL_NAME_KEY};

use super::{model_entries, Check};
use crate::registry::{KeyRequirement, SchemaRegistry};
use crate::report::ValidationError;

/// Checks every entry of the `models` sequence.
///
/// Key checks are always scoped to the entry's model: a key accepted for
/// `svm` is still rejected on a `knn` entry. Entries naming an unknown
/// model get a single `UnknownModel` finding and no key checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelValidator;

impl Check for ModelValidator {
    fn name(&self) -> &'static str {
        "model"
    }

    fn applies_to(&self, kind: JobKind) -> bool {
        kind.trains_models()
    }

    fn check(&self, document: &JobDocument, schema: &SchemaRegistry) -> Vec<ValidationError> {
        let (entries, mut errors) = model_entries(document);

        for entry in entries {
            if !schema.is_known_model(entry.name) {
                errors.push(ValidationError::UnknownModel {
                    model: entry.name.to_string(),
                });
                continue;
            }

            let allowed = schema.model_keys(entry.name);

            for key in entry.fields.keys().filter(|k| *k != MODEL_NAME_KEY) {
                if !allowed.is_some_and(|keys| keys.contains_key(key)) {
                    errors.push(ValidationError::InvalidModelKey {
                        model: entry.name.to_string(),
                        key: key.clone(),
                    });
                }
            }

            let required = allowed
                .into_iter()
                .flatten()
                .filter(|(_, requirement)| **requirement == KeyRequirement::Required);
            for (key, _) in required {
                if !entry.fields.contains_key(key) {
                    errors.push(ValidationError::MissingModelKey {
                        model: entry.name.to_string(),
                        key: key.clone(),
                    });
                }
            }
        }

        errors
    }
}
