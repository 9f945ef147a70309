//! # Job Kinds
//!
//! A job document describes either a feature-extraction-and-training run
//! or a prediction run. The two kinds have disjoint key sets and run
//! different validation passes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of pipeline run a job document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Feature extraction followed by model training.
    ExtractTrain,
    /// Label prediction with a previously trained model.
    Predict,
}

impl JobKind {
    /// Returns both job kinds in canonical order.
    pub fn all_kinds() -> &'static [JobKind] {
        &[Self::ExtractTrain, Self::Predict]
    }

    /// Returns the snake_case identifier used in rulesets.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractTrain => "extract_train",
            Self::Predict => "predict",
        }
    }

    /// Names of the config-file sections that hold todo lists for this kind.
    ///
    /// Extract and train runs share one document shape, so either section
    /// name is accepted for them.
    pub fn section_names(&self) -> &'static [&'static str] {
        match self {
            Self::ExtractTrain => &["extract", "train"],
            Self::Predict => &["predict"],
        }
    }

    /// Whether documents of this kind may declare models to train.
    pub fn trains_models(&self) -> bool {
        matches!(self, Self::ExtractTrain)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised job kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job kind '{0}', expected one of: extract_train, predict")]
pub struct UnknownJobKind(pub String);

impl FromStr for JobKind {
    type Err = UnknownJobKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extract_train" | "extract-train" | "extract" | "train" => Ok(Self::ExtractTrain),
            "predict" => Ok(Self::Predict),
            other => Err(UnknownJobKind(other.to_string())),
        }
    }
}
