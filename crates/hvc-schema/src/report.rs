//! # Validation Reports
//!
//! Document-level findings are values, not failures. Every pass returns a
//! list of [`ValidationError`]s and the engine collects them into one
//! [`ValidationReport`], so a caller sees every problem with a document
//! after a single validation call.

use std::fmt;

use hvc_core::{
    JobKind, TypeConstraint, ValueType, CONVERT_KEY, FILE_FORMAT_KEY, MODEL_NAME_KEY,
    PROBABILITY_FLAG_KEY,
};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use thiserror::Error;

/// One problem found in a job document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A key required for the job kind is absent.
    #[error("missing required key '{key}' for {job} job")]
    MissingRequiredKey { job: JobKind, key: String },

    /// A top-level key is neither required nor optional for the job kind.
    #[error("unknown key '{key}' for {job} job")]
    UnknownTopLevelKey { job: JobKind, key: String },

    /// No platform declares the model.
    #[error("unknown model '{model}'")]
    UnknownModel { model: String },

    /// A model entry declares a key that model does not accept.
    #[error("key '{key}' is not valid for model '{model}'")]
    InvalidModelKey { model: String, key: String },

    /// A model entry omits a key that model requires.
    #[error("model '{model}' requires key '{key}'")]
    MissingModelKey { model: String, key: String },

    /// A hyperparameter name the model does not define.
    #[error("'{param}' is not a hyperparameter of model '{model}'")]
    UnknownHyperparameter { model: String, param: String },

    /// A hyperparameter value of the wrong type.
    #[error("hyperparameter '{param}' of model '{model}' must be {expected}, found {found} {value}")]
    InvalidHyperparameterType {
        model: String,
        param: String,
        value: Value,
        expected: TypeConstraint,
        found: ValueType,
    },

    /// The model must be trained with probability output enabled.
    #[error("model '{model}' must be trained with 'predict_proba: true'")]
    ProbabilityFlagRequired { model: String },

    /// A requested output conversion is not supported.
    #[error("invalid convert type '{convert_type}'")]
    InvalidConvertType { convert_type: String },

    /// `file_format` names an unsupported format.
    #[error("invalid file format {format}")]
    InvalidFileFormat { format: Value },

    /// A nested parameter section contains a key it does not accept.
    #[error("key '{key}' is not valid in '{section}'")]
    UnknownSectionKey { section: String, key: String },

    /// A value has the wrong structure for its position.
    #[error("'{key}' must be {expected}, found {found}")]
    MalformedSection {
        key: String,
        expected: &'static str,
        found: ValueType,
    },
}

/// Stable identifier for each [`ValidationError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredKey,
    UnknownTopLevelKey,
    UnknownModel,
    InvalidModelKey,
    MissingModelKey,
    UnknownHyperparameter,
    InvalidHyperparameterType,
    ProbabilityFlagRequired,
    InvalidConvertType,
    InvalidFileFormat,
    UnknownSectionKey,
    MalformedSection,
}

impl ErrorKind {
    /// snake_case name used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredKey => "missing_required_key",
            Self::UnknownTopLevelKey => "unknown_top_level_key",
            Self::UnknownModel => "unknown_model",
            Self::InvalidModelKey => "invalid_model_key",
            Self::MissingModelKey => "missing_model_key",
            Self::UnknownHyperparameter => "unknown_hyperparameter",
            Self::InvalidHyperparameterType => "invalid_hyperparameter_type",
            Self::ProbabilityFlagRequired => "probability_flag_required",
            Self::InvalidConvertType => "invalid_convert_type",
            Self::InvalidFileFormat => "invalid_file_format",
            Self::UnknownSectionKey => "unknown_section_key",
            Self::MalformedSection => "malformed_section",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationError {
    /// Which kind of problem this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredKey { .. } => ErrorKind::MissingRequiredKey,
            Self::UnknownTopLevelKey { .. } => ErrorKind::UnknownTopLevelKey,
            Self::UnknownModel { .. } => ErrorKind::UnknownModel,
            Self::InvalidModelKey { .. } => ErrorKind::InvalidModelKey,
            Self::MissingModelKey { .. } => ErrorKind::MissingModelKey,
            Self::UnknownHyperparameter { .. } => ErrorKind::UnknownHyperparameter,
            Self::InvalidHyperparameterType { .. } => ErrorKind::InvalidHyperparameterType,
            Self::ProbabilityFlagRequired { .. } => ErrorKind::ProbabilityFlagRequired,
            Self::InvalidConvertType { .. } => ErrorKind::InvalidConvertType,
            Self::InvalidFileFormat { .. } => ErrorKind::InvalidFileFormat,
            Self::UnknownSectionKey { .. } => ErrorKind::UnknownSectionKey,
            Self::MalformedSection { .. } => ErrorKind::MalformedSection,
        }
    }

    /// The offending key.
    pub fn key(&self) -> &str {
        match self {
            Self::MissingRequiredKey { key, .. }
            | Self::UnknownTopLevelKey { key, .. }
            | Self::InvalidModelKey { key, .. }
            | Self::MissingModelKey { key, .. }
            | Self::UnknownSectionKey { key, .. }
            | Self::MalformedSection { key, .. } => key.as_str(),
            Self::UnknownHyperparameter { param, .. }
            | Self::InvalidHyperparameterType { param, .. } => param.as_str(),
            Self::UnknownModel { .. } => MODEL_NAME_KEY,
            Self::ProbabilityFlagRequired { .. } => PROBABILITY_FLAG_KEY,
            Self::InvalidConvertType { .. } => CONVERT_KEY,
            Self::InvalidFileFormat { .. } => FILE_FORMAT_KEY,
        }
    }

    /// The offending value, rendered as JSON text, where one exists.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::UnknownModel { model } => Some(Value::from(model.as_str()).to_string()),
            Self::InvalidHyperparameterType { value, .. } => Some(value.to_string()),
            Self::InvalidConvertType { convert_type } => {
                Some(Value::from(convert_type.as_str()).to_string())
            }
            Self::InvalidFileFormat { format } => Some(format.to_string()),
            _ => None,
        }
    }

    /// The model the problem is scoped to, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::UnknownModel { model }
            | Self::InvalidModelKey { model, .. }
            | Self::MissingModelKey { model, .. }
            | Self::UnknownHyperparameter { model, .. }
            | Self::InvalidHyperparameterType { model, .. }
            | Self::ProbabilityFlagRequired { model } => Some(model.as_str()),
            _ => None,
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationError", 5)?;
        s.serialize_field("kind", self.kind().as_str())?;
        s.serialize_field("model", &self.model())?;
        s.serialize_field("key", self.key())?;
        s.serialize_field("value", &self.value())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// The outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    ok: bool,
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Build a report; `ok` is true exactly when `errors` is empty.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    /// Whether the document passed every check.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// All findings, in pass order then discovery order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Findings of one kind.
    pub fn errors_of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind() == kind)
    }

    /// Consumes the report and returns the findings.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            return f.write_str("ok");
        }
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_report_is_ok() {
        let report = ValidationReport::from_errors(Vec::new());
        assert!(report.is_ok());
        assert_eq!(report.to_string(), "ok");
    }

    #[test]
    fn test_report_with_errors_is_not_ok() {
        let report = ValidationReport::from_errors(vec![
            ValidationError::MissingRequiredKey {
                job: JobKind::Predict,
                key: "bird_ID".to_string(),
            },
            ValidationError::UnknownModel {
                model: "rf".to_string(),
            },
        ]);
        assert!(!report.is_ok());
        assert_eq!(report.errors().len(), 2);
        assert_eq!(report.errors_of_kind(ErrorKind::UnknownModel).count(), 1);
        let display = report.to_string();
        assert!(display.contains("missing required key 'bird_ID' for predict job"));
        assert!(display.contains("unknown model 'rf'"));
    }

    #[test]
    fn test_hyperparameter_type_message() {
        let e = ValidationError::InvalidHyperparameterType {
            model: "knn".to_string(),
            param: "k".to_string(),
            value: json!(5.0),
            expected: TypeConstraint::Exact(ValueType::Integer),
            found: ValueType::Float,
        };
        assert_eq!(
            e.to_string(),
            "hyperparameter 'k' of model 'knn' must be integer, found float 5.0"
        );
        assert_eq!(e.key(), "k");
        assert_eq!(e.model(), Some("knn"));
        assert_eq!(e.value().as_deref(), Some("5.0"));
    }

    #[test]
    fn test_key_and_value_for_scalar_errors() {
        let e = ValidationError::InvalidConvertType {
            convert_type: "xml".to_string(),
        };
        assert_eq!(e.key(), "convert");
        assert_eq!(e.value().as_deref(), Some("\"xml\""));
        assert_eq!(e.model(), None);

        let e = ValidationError::ProbabilityFlagRequired {
            model: "svm".to_string(),
        };
        assert_eq!(e.key(), "predict_proba");
        assert_eq!(e.value(), None);
    }

    #[test]
    fn test_error_serializes_with_kind_and_message() {
        let e = ValidationError::InvalidModelKey {
            model: "knn".to_string(),
            key: "predict_proba".to_string(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "invalid_model_key");
        assert_eq!(json["model"], "knn");
        assert_eq!(json["key"], "predict_proba");
        assert_eq!(json["value"], Value::Null);
        assert_eq!(json["message"], "key 'predict_proba' is not valid for model 'knn'");
    }

    #[test]
    fn test_report_serializes_ok_flag() {
        let report = ValidationReport::from_errors(vec![ValidationError::InvalidConvertType {
            convert_type: "xml".to_string(),
        }]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["errors"][0]["kind"], "invalid_convert_type");
    }
}
