//! # Schema Registry
//!
//! The ruleset every validation pass reads: valid file formats, key sets
//! per job kind, models per platform, per-model configuration keys and
//! hyperparameter types, conversion types, and the models that must be
//! trained with probability output.
//!
//! ## Load-Time Invariants
//!
//! A registry is only ever constructed through [`SchemaRegistry::load`]
//! (or the `from_path`/`builtin` wrappers), which rejects rulesets where:
//!
//! - a top-level section, or a job kind within a key-set section, is missing;
//! - a model name appears under more than one platform;
//! - `valid_model_keys`, `hyperparameter_types` or
//!   `must_train_with_probability` names a model no platform declares;
//! - a hyperparameter type name is unknown, or a type union is empty;
//! - a model key marker is neither `required` nor `optional`;
//! - a key is both required and optional for the same job kind;
//! - a model in `must_train_with_probability` does not accept
//!   `predict_proba` among its model keys.
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` has no interior mutability and no mutating methods.
//! It is `Send + Sync` and may be shared by reference across threads.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use hvc_core::{JobKind, TypeConstraint, ValueType, PROBABILITY_FLAG_KEY};
use serde::Deserialize;
use thiserror::Error;

/// The ruleset bundled with the crate.
pub const BUILTIN_RULESET: &str = include_str!("../rules/validation.yml");

/// Sections every ruleset must declare.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "valid_file_formats",
    "required_keys",
    "optional_keys",
    "valid_models",
    "valid_model_keys",
    "hyperparameter_types",
    "valid_convert_types",
    "must_train_with_probability",
];

/// Error loading a ruleset. Fatal: without a ruleset no check can run.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The ruleset file could not be read.
    #[error("cannot read ruleset '{path}': {reason}")]
    Read {
        /// Path of the ruleset file.
        path: String,
        /// Underlying IO failure.
        reason: String,
    },

    /// The ruleset is not valid YAML or does not have the expected shape.
    #[error("malformed ruleset: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },

    /// A required section is absent.
    #[error("ruleset is missing section '{0}'")]
    MissingSection(String),

    /// A model is listed under two platforms.
    #[error("model '{model}' is declared by both platform '{first_platform}' and '{second_platform}'")]
    DuplicateModel {
        /// The duplicated model name.
        model: String,
        /// Platform that declared it first.
        first_platform: String,
        /// Platform that declared it again.
        second_platform: String,
    },

    /// A section refers to a model no platform declares.
    #[error("section '{section}' refers to unknown model '{model}'")]
    UnknownModel {
        /// Section containing the reference.
        section: String,
        /// The unknown model name.
        model: String,
    },

    /// A hyperparameter type name is not recognised.
    #[error("hyperparameter '{param}' of model '{model}' uses unknown type '{name}'")]
    InvalidTypeName {
        /// Model owning the hyperparameter.
        model: String,
        /// Hyperparameter name.
        param: String,
        /// The unrecognised type name.
        name: String,
    },

    /// A hyperparameter type union has no members.
    #[error("hyperparameter '{param}' of model '{model}' has an empty type list")]
    EmptyTypeUnion {
        /// Model owning the hyperparameter.
        model: String,
        /// Hyperparameter name.
        param: String,
    },

    /// A model key marker is neither `required` nor `optional`.
    #[error("key '{key}' of model '{model}' has marker '{marker}', expected 'required' or 'optional'")]
    InvalidKeyMarker {
        /// Model owning the key.
        model: String,
        /// Configuration key.
        key: String,
        /// The unrecognised marker.
        marker: String,
    },

    /// A key is listed as both required and optional.
    #[error("key '{key}' is both required and optional for {job} jobs")]
    OverlappingKeys {
        /// Job kind whose key sets overlap.
        job: JobKind,
        /// The overlapping key.
        key: String,
    },

    /// A model must be trained with probability output but may not
    /// declare the flag that enables it.
    #[error("model '{model}' must be trained with probability output but does not accept key '{key}'")]
    ProbabilityFlagNotAccepted {
        /// The model in `must_train_with_probability`.
        model: String,
        /// The flag key missing from its model keys.
        key: &'static str,
    },
}

/// Whether a model configuration key must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRequirement {
    /// Every entry for the model must declare the key.
    Required,
    /// The key may be omitted.
    Optional,
}

impl KeyRequirement {
    fn parse(marker: &str) -> Option<Self> {
        match marker {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }

    /// The marker used in ruleset files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
        }
    }
}

impl std::fmt::Display for KeyRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required and optional top-level keys for one job kind.
#[derive(Debug, Clone, Default)]
pub struct KeySets {
    required: Vec<String>,
    optional: Vec<String>,
}

impl KeySets {
    /// Required keys, in ruleset order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Optional keys, in ruleset order.
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// Whether `key` is required or optional.
    pub fn allows(&self, key: &str) -> bool {
        self.required.iter().chain(&self.optional).any(|k| k == key)
    }
}

/// The loaded, immutable ruleset.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    valid_file_formats: BTreeSet<String>,
    extract_train_keys: KeySets,
    predict_keys: KeySets,
    valid_models: BTreeMap<String, BTreeSet<String>>,
    model_platforms: BTreeMap<String, String>,
    valid_model_keys: BTreeMap<String, BTreeMap<String, KeyRequirement>>,
    hyperparameter_types: BTreeMap<String, BTreeMap<String, TypeConstraint>>,
    valid_convert_types: BTreeSet<String>,
    must_train_with_probability: BTreeSet<String>,
    section_keys: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleset {
    valid_file_formats: Vec<String>,
    required_keys: BTreeMap<JobKind, Vec<String>>,
    optional_keys: BTreeMap<JobKind, Vec<String>>,
    valid_models: BTreeMap<String, Vec<String>>,
    valid_model_keys: BTreeMap<String, RawModelKeys>,
    hyperparameter_types: BTreeMap<String, BTreeMap<String, RawTypeConstraint>>,
    valid_convert_types: Vec<String>,
    must_train_with_probability: Vec<String>,
    #[serde(default)]
    section_keys: BTreeMap<String, Vec<String>>,
}

/// `{key: required|optional}`, or a plain list meaning all optional.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawModelKeys {
    Marked(BTreeMap<String, String>),
    Listed(Vec<String>),
}

/// `int`, or `[int, float]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeConstraint {
    Single(String),
    Union(Vec<String>),
}

impl SchemaRegistry {
    /// Load a ruleset from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaLoadError` describing the first structural problem
    /// found; see the module docs for the full list.
    pub fn load(source: &str) -> Result<Self, SchemaLoadError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| SchemaLoadError::Parse {
                reason: format!("invalid YAML: {e}"),
            })?;

        let serde_yaml::Value::Mapping(ref sections) = value else {
            return Err(SchemaLoadError::Parse {
                reason: "ruleset root must be a mapping".to_string(),
            });
        };
        for name in REQUIRED_SECTIONS {
            if !sections.contains_key(*name) {
                return Err(SchemaLoadError::MissingSection((*name).to_string()));
            }
        }

        let raw: RawRuleset =
            serde_yaml::from_value(value).map_err(|e| SchemaLoadError::Parse {
                reason: e.to_string(),
            })?;
        Self::from_raw(raw)
    }

    /// Load a ruleset from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::Read` if the file cannot be read, or any
    /// error [`SchemaRegistry::load`] returns for its content.
    pub fn from_path(path: &Path) -> Result<Self, SchemaLoadError> {
        let source = std::fs::read_to_string(path).map_err(|e| SchemaLoadError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let registry = Self::load(&source)?;
        tracing::debug!(
            path = %path.display(),
            models = registry.model_count(),
            "loaded ruleset"
        );
        Ok(registry)
    }

    /// Load the ruleset bundled with the crate.
    pub fn builtin() -> Result<Self, SchemaLoadError> {
        Self::load(BUILTIN_RULESET)
    }

    fn from_raw(raw: RawRuleset) -> Result<Self, SchemaLoadError> {
        let extract_train_keys = key_sets(JobKind::ExtractTrain, &raw)?;
        let predict_keys = key_sets(JobKind::Predict, &raw)?;

        let mut valid_models = BTreeMap::new();
        let mut model_platforms: BTreeMap<String, String> = BTreeMap::new();
        for (platform, models) in raw.valid_models {
            for model in &models {
                match model_platforms.get(model) {
                    Some(first) if *first != platform => {
                        return Err(SchemaLoadError::DuplicateModel {
                            model: model.clone(),
                            first_platform: first.clone(),
                            second_platform: platform.clone(),
                        });
                    }
                    _ => {
                        model_platforms.insert(model.clone(), platform.clone());
                    }
                }
            }
            valid_models.insert(platform, models.into_iter().collect::<BTreeSet<_>>());
        }

        let known = |section: &str, model: &str| -> Result<(), SchemaLoadError> {
            if model_platforms.contains_key(model) {
                Ok(())
            } else {
                Err(SchemaLoadError::UnknownModel {
                    section: section.to_string(),
                    model: model.to_string(),
                })
            }
        };

        let mut valid_model_keys: BTreeMap<String, BTreeMap<String, KeyRequirement>> =
            BTreeMap::new();
        for (model, keys) in raw.valid_model_keys {
            known("valid_model_keys", &model)?;
            let keys = match keys {
                RawModelKeys::Listed(keys) => keys
                    .into_iter()
                    .map(|key| (key, KeyRequirement::Optional))
                    .collect(),
                RawModelKeys::Marked(keys) => {
                    let mut marked = BTreeMap::new();
                    for (key, marker) in keys {
                        let requirement = KeyRequirement::parse(&marker).ok_or_else(|| {
                            SchemaLoadError::InvalidKeyMarker {
                                model: model.clone(),
                                key: key.clone(),
                                marker: marker.clone(),
                            }
                        })?;
                        marked.insert(key, requirement);
                    }
                    marked
                }
            };
            valid_model_keys.insert(model, keys);
        }

        let mut hyperparameter_types = BTreeMap::new();
        for (model, params) in raw.hyperparameter_types {
            known("hyperparameter_types", &model)?;
            let mut constraints = BTreeMap::new();
            for (param, raw_constraint) in params {
                let constraint = type_constraint(&model, &param, raw_constraint)?;
                constraints.insert(param, constraint);
            }
            hyperparameter_types.insert(model, constraints);
        }

        for model in &raw.must_train_with_probability {
            known("must_train_with_probability", model)?;
            let accepts_flag = valid_model_keys
                .get(model)
                .is_some_and(|keys| keys.contains_key(PROBABILITY_FLAG_KEY));
            if !accepts_flag {
                return Err(SchemaLoadError::ProbabilityFlagNotAccepted {
                    model: model.clone(),
                    key: PROBABILITY_FLAG_KEY,
                });
            }
        }

        Ok(Self {
            valid_file_formats: raw.valid_file_formats.into_iter().collect(),
            extract_train_keys,
            predict_keys,
            valid_models,
            model_platforms,
            valid_model_keys,
            hyperparameter_types,
            valid_convert_types: raw.valid_convert_types.into_iter().collect(),
            must_train_with_probability: raw.must_train_with_probability.into_iter().collect(),
            section_keys: raw
                .section_keys
                .into_iter()
                .map(|(section, keys)| (section, keys.into_iter().collect()))
                .collect(),
        })
    }

    /// Valid `file_format` identifiers.
    pub fn valid_file_formats(&self) -> &BTreeSet<String> {
        &self.valid_file_formats
    }

    /// Top-level key sets for a job kind.
    pub fn key_sets(&self, kind: JobKind) -> &KeySets {
        match kind {
            JobKind::ExtractTrain => &self.extract_train_keys,
            JobKind::Predict => &self.predict_keys,
        }
    }

    /// Required top-level keys for a job kind, in ruleset order.
    pub fn required_keys(&self, kind: JobKind) -> &[String] {
        self.key_sets(kind).required()
    }

    /// Optional top-level keys for a job kind, in ruleset order.
    pub fn optional_keys(&self, kind: JobKind) -> &[String] {
        self.key_sets(kind).optional()
    }

    /// Model names per platform.
    pub fn valid_models(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.valid_models
    }

    /// The platform declaring `model`, if any.
    pub fn platform_of(&self, model: &str) -> Option<&str> {
        self.model_platforms.get(model).map(String::as_str)
    }

    /// Whether any platform declares `model`.
    pub fn is_known_model(&self, model: &str) -> bool {
        self.model_platforms.contains_key(model)
    }

    /// Total number of models across platforms.
    pub fn model_count(&self) -> usize {
        self.model_platforms.len()
    }

    /// Configuration keys `model` may declare, with their requirement marker.
    pub fn model_keys(&self, model: &str) -> Option<&BTreeMap<String, KeyRequirement>> {
        self.valid_model_keys.get(model)
    }

    /// Hyperparameter constraints for `model`.
    pub fn hyperparameter_types(&self, model: &str) -> Option<&BTreeMap<String, TypeConstraint>> {
        self.hyperparameter_types.get(model)
    }

    /// The constraint for one `(model, param)` pair.
    pub fn hyperparameter_constraint(&self, model: &str, param: &str) -> Option<&TypeConstraint> {
        self.hyperparameter_types.get(model)?.get(param)
    }

    /// Valid conversion types for predict jobs.
    pub fn valid_convert_types(&self) -> &BTreeSet<String> {
        &self.valid_convert_types
    }

    /// Models that must be trained with probability output enabled.
    pub fn must_train_with_probability(&self) -> &BTreeSet<String> {
        &self.must_train_with_probability
    }

    /// Whether `model` must be trained with probability output enabled.
    pub fn requires_probability(&self, model: &str) -> bool {
        self.must_train_with_probability.contains(model)
    }

    /// Allowed keys inside a nested parameter section, if the ruleset
    /// constrains that section.
    pub fn section_keys(&self, section: &str) -> Option<&BTreeSet<String>> {
        self.section_keys.get(section)
    }

    /// Names of all constrained parameter sections.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.section_keys.keys().map(String::as_str)
    }
}

fn key_sets(kind: JobKind, raw: &RawRuleset) -> Result<KeySets, SchemaLoadError> {
    let required = raw
        .required_keys
        .get(&kind)
        .ok_or_else(|| SchemaLoadError::MissingSection(format!("required_keys.{kind}")))?;
    let optional = raw
        .optional_keys
        .get(&kind)
        .ok_or_else(|| SchemaLoadError::MissingSection(format!("optional_keys.{kind}")))?;

    if let Some(key) = required.iter().find(|k| optional.contains(*k)) {
        return Err(SchemaLoadError::OverlappingKeys {
            job: kind,
            key: key.clone(),
        });
    }

    Ok(KeySets {
        required: required.clone(),
        optional: optional.clone(),
    })
}

fn type_constraint(
    model: &str,
    param: &str,
    raw: RawTypeConstraint,
) -> Result<TypeConstraint, SchemaLoadError> {
    let parse = |name: &str| -> Result<ValueType, SchemaLoadError> {
        name.parse().map_err(|_| SchemaLoadError::InvalidTypeName {
            model: model.to_string(),
            param: param.to_string(),
            name: name.to_string(),
        })
    };

    match raw {
        RawTypeConstraint::Single(name) => Ok(TypeConstraint::Exact(parse(&name)?)),
        RawTypeConstraint::Union(names) => {
            if names.is_empty() {
                return Err(SchemaLoadError::EmptyTypeUnion {
                    model: model.to_string(),
                    param: param.to_string(),
                });
            }
            let members = names
                .iter()
                .map(|name| parse(name))
                .collect::<Result<BTreeSet<_>, _>>()?;
            Ok(TypeConstraint::OneOf(members))
        }
    }
}
