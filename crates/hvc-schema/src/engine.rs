//! # Validation Engine
//!
//! Runs every applicable pass over a document in a fixed order and folds
//! the findings into one [`ValidationReport`].
//!
//! ## Pass Order
//!
//! 1. key set
//! 2. model names and model keys (extract_train)
//! 3. hyperparameter types (extract_train)
//! 4. probability-output constraint (extract_train)
//! 5. convert types (predict)
//! 6. file format
//! 7. parameter section keys
//!
//! The order is part of the output contract: errors are concatenated in
//! pass order, then in the order each pass discovered them.

use hvc_core::JobDocument;

use crate::checks::{
    Check, ConstraintValidator, ConvertTypeValidator, FileFormatValidator,
    HyperparameterTypeChecker, KeySetValidator, ModelValidator, SectionKeyValidator,
};
use crate::registry::SchemaRegistry;
use crate::report::ValidationReport;

/// Every pass, in run order.
pub const PASSES: [&dyn Check; 7] = [
    &KeySetValidator,
    &ModelValidator,
    &HyperparameterTypeChecker,
    &ConstraintValidator,
    &ConvertTypeValidator,
    &FileFormatValidator,
    &SectionKeyValidator,
];

/// Validates documents against a borrowed registry.
///
/// The engine holds no state of its own, so one engine (or many) may be
/// used from any number of threads at once.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'s> {
    schema: &'s SchemaRegistry,
}

impl<'s> ValidationEngine<'s> {
    /// Create an engine that validates against `schema`.
    pub fn new(schema: &'s SchemaRegistry) -> Self {
        Self { schema }
    }

    /// The registry this engine validates against.
    pub fn schema(&self) -> &'s SchemaRegistry {
        self.schema
    }

    /// Validate a single document.
    pub fn validate(&self, document: &JobDocument) -> ValidationReport {
        let kind = document.kind();
        let errors = PASSES
            .iter()
            .filter(|pass| pass.applies_to(kind))
            .flat_map(|pass| pass.check(document, self.schema))
            .collect();
        ValidationReport::from_errors(errors)
    }

    /// Validate each document of a todo list, one report per document.
    pub fn validate_all(&self, documents: &[JobDocument]) -> Vec<ValidationReport> {
        documents.iter().map(|doc| self.validate(doc)).collect()
    }
}

/// Validate `document` against `schema`.
pub fn validate(document: &JobDocument, schema: &SchemaRegistry) -> ValidationReport {
    ValidationEngine::new(schema).validate(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{extract_train, predict, registry};
    use crate::report::{ErrorKind, ValidationError};
    use hvc_core::JobKind;
    use proptest::prelude::*;

    const VALID_TRAIN: &str = "
bird_ID: gy6or6
file_format: evtaf
data_dirs: [/data/gy6or6/032212]
output_dir: /out/gy6or6
labelset: iabcdefghjk
feature_group: knn
spect_params:
  nperseg: 512
  noverlap: 480
  freq_cutoffs: [1000, 8000]
segment_params:
  threshold: 1500
  min_syl_dur: 0.01
  min_silent_dur: 0.006
num_replicates: 5
models:
  - model: knn
    hyperparameters:
      k: 4
  - model: svm
    predict_proba: true
    hyperparameters:
      C: 1
      gamma: 0.01
";

    const VALID_PREDICT: &str = "
bird_ID: gy6or6
file_format: evtaf
data_dirs: [/data/gy6or6/032312]
model_meta_file: /out/gy6or6/knn.meta
output_dir: /out/gy6or6/predict
convert: notmat
";

    fn kinds(report: &ValidationReport) -> Vec<ErrorKind> {
        report.errors().iter().map(ValidationError::kind).collect()
    }

    #[test]
    fn test_pass_order_is_fixed() {
        let names: Vec<&str> = PASSES.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            [
                "key_set",
                "model",
                "hyperparameter_type",
                "constraint",
                "convert_type",
                "file_format",
                "section_keys",
            ]
        );
    }

    #[test]
    fn test_valid_train_document() {
        let report = validate(&extract_train(VALID_TRAIN), &registry());
        assert!(report.is_ok(), "unexpected errors:\n{report}");
    }

    #[test]
    fn test_valid_predict_document() {
        let report = validate(&predict(VALID_PREDICT), &registry());
        assert!(report.is_ok(), "unexpected errors:\n{report}");
    }

    #[test]
    fn test_errors_follow_pass_order() {
        let doc = extract_train(
            "
bird_ID: gy6or6
file_format: mp3
data_dirs: [/data]
labelset: abc
spect_params: {nperseg: 512, foo: 1}
models:
  - model: svm
    hyperparameters: {C: '1', gamma: 1}
",
        );
        let report = validate(&doc, &registry());
        assert_eq!(
            kinds(&report),
            [
                ErrorKind::MissingRequiredKey,
                ErrorKind::InvalidHyperparameterType,
                ErrorKind::ProbabilityFlagRequired,
                ErrorKind::InvalidFileFormat,
                ErrorKind::UnknownSectionKey,
            ]
        );
        assert_eq!(report.errors()[0].key(), "output_dir");
    }

    #[test]
    fn test_predict_skips_model_passes() {
        let doc = predict(&format!(
            "{VALID_PREDICT}models:\n  - model: random_forest\n"
        ));
        let report = validate(&doc, &registry());
        assert_eq!(kinds(&report), [ErrorKind::UnknownTopLevelKey]);
    }

    #[test]
    fn test_train_skips_convert_pass() {
        let doc = extract_train(&format!("{VALID_TRAIN}convert: xml\n"));
        let report = validate(&doc, &registry());
        assert_eq!(kinds(&report), [ErrorKind::UnknownTopLevelKey]);
    }

    #[test]
    fn test_unknown_model_not_checked_further() {
        let doc = extract_train(
            "models:\n  - model: random_forest\n    hyperparameters: {n_trees: 1.5}\n",
        );
        let report = validate(&doc, &registry());
        let model_errors: Vec<&ValidationError> =
            report.errors().iter().filter(|e| e.model().is_some()).collect();
        assert_eq!(
            model_errors,
            [&ValidationError::UnknownModel {
                model: "random_forest".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_all_one_report_per_document() {
        let schema = registry();
        let engine = ValidationEngine::new(&schema);
        let docs = vec![
            predict(VALID_PREDICT),
            predict("bird_ID: a\n"),
            predict(VALID_PREDICT),
        ];
        let reports = engine.validate_all(&docs);
        let ok: Vec<bool> = reports.iter().map(ValidationReport::is_ok).collect();
        assert_eq!(ok, [true, false, true]);
    }

    #[test]
    fn test_engine_usable_across_threads() {
        let schema = registry();
        let engine = ValidationEngine::new(&schema);
        let doc = extract_train(VALID_TRAIN);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| engine.validate(&doc))).collect();
            for h in handles {
                assert!(h.join().unwrap().is_ok());
            }
        });
    }

    fn arb_value() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            (-1.0e6f64..1.0e6).prop_map(serde_json::Value::from),
            "[a-z_]{0,8}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4).prop_map(|m| {
                    serde_json::Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("models".to_string()),
            Just("convert".to_string()),
            Just("file_format".to_string()),
            Just("spect_params".to_string()),
            Just("bird_ID".to_string()),
            "[a-z_]{1,10}",
        ]
    }

    proptest! {
        #[test]
        fn test_validation_is_idempotent(
            fields in prop::collection::btree_map(arb_key(), arb_value(), 0..8),
            train in any::<bool>(),
        ) {
            let kind = if train { JobKind::ExtractTrain } else { JobKind::Predict };
            let doc = JobDocument::new(kind, fields.into_iter().collect());
            let schema = registry();
            let first = validate(&doc, &schema);
            let second = validate(&doc, &schema);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.is_ok(), first.errors().is_empty());
        }
    }
}
