//! # Job Documents
//!
//! A [`JobDocument`] is one item of a todo list: the full set of keys that
//! configure a single extract/train or predict run. Documents are plain
//! JSON value trees plus the job kind they were loaded as. Validators
//! borrow them and never mutate them.
//!
//! ## Job File Layout
//!
//! [`load_todo_list`] accepts three shapes:
//!
//! ```yaml
//! # 1. a single document
//! bird_ID: gy6or6
//! file_format: evtaf
//! ...
//!
//! # 2. a bare todo list
//! todo_list:
//!   - bird_ID: gy6or6
//!     ...
//!
//! # 3. a job section holding shared keys and a todo list
//! extract:
//!   spect_params:
//!     nperseg: 512
//!     noverlap: 480
//!   todo_list:
//!     - bird_ID: gy6or6
//!       ...
//! ```
//!
//! In shapes 2 and 3 every key next to `todo_list` is a shared default,
//! copied into each todo item that does not set it itself.
//!
//! When the file has a section for the job kind, keys at the file root
//! are shared defaults too, with the lowest precedence: item keys win over
//! section keys, which win over root keys. Both `extract` and `train`
//! sections are read for extract/train jobs, in that order. Sections that
//! belong to the other job kind are left to that kind's loader.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::job::JobKind;
use crate::value::{yaml_to_json_value, ValueType};

/// Top-level key holding the sequence of model entries to train.
pub const MODELS_KEY: &str = "models";
/// Key inside a model entry naming the model.
pub const MODEL_NAME_KEY: &str = "model";
/// Key inside a model entry holding its hyperparameter mapping.
pub const HYPERPARAMETERS_KEY: &str = "hyperparameters";
/// Key inside a model entry enabling probability output.
pub const PROBABILITY_FLAG_KEY: &str = "predict_proba";
/// Predict-job key listing requested output conversions.
pub const CONVERT_KEY: &str = "convert";
/// Top-level key naming the audio/annotation file format.
pub const FILE_FORMAT_KEY: &str = "file_format";
/// Key holding the sequence of job documents in a job file.
pub const TODO_LIST_KEY: &str = "todo_list";

const INLINE_SOURCE: &str = "<inline>";

/// One job specification.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDocument {
    kind: JobKind,
    fields: Map<String, Value>,
}

impl JobDocument {
    /// Create a document from an already-built key map.
    pub fn new(kind: JobKind, fields: Map<String, Value>) -> Self {
        Self { kind, fields }
    }

    /// Create a document from a value tree whose root must be a mapping.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotAMapping` if `value` is not an object.
    pub fn from_value(kind: JobKind, value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(fields) => Ok(Self::new(kind, fields)),
            other => Err(DocumentError::NotAMapping {
                context: "job document".to_string(),
                found: ValueType::of(&other).to_string(),
            }),
        }
    }

    /// Parse a single document from YAML text.
    pub fn from_yaml_str(kind: JobKind, yaml: &str) -> Result<Self, DocumentError> {
        let value = parse_yaml(yaml, INLINE_SOURCE)?;
        Self::from_value(kind, value)
    }

    /// The kind this document was loaded as.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// All top-level fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a top-level field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Top-level key names, in map order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Load every job document from a YAML or JSON job file.
///
/// The format is chosen from the file extension: `.json` is parsed as
/// JSON, anything else as YAML.
///
/// # Errors
///
/// Returns `DocumentError::Read` if the file cannot be read, `Parse` or
/// `Conversion` if its content is not a valid value tree, and
/// `NotAMapping`/`NotASequence` if it does not have a job-file shape.
pub fn load_todo_list(path: &Path, kind: JobKind) -> Result<Vec<JobDocument>, DocumentError> {
    let label = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: label.clone(),
        reason: e.to_string(),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let root = match ext {
        "json" => serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
            path: label.clone(),
            reason: format!("invalid JSON: {e}"),
        })?,
        _ => parse_yaml(&content, &label)?,
    };

    todo_list_from_value(kind, root)
}

/// Split a parsed job file into its documents.
///
/// See the module docs for the accepted shapes.
pub fn todo_list_from_value(kind: JobKind, root: Value) -> Result<Vec<JobDocument>, DocumentError> {
    let mut root = expect_mapping(root, "job file root")?;

    let sections: Vec<(&str, Value)> = kind
        .section_names()
        .iter()
        .filter_map(|name| root.remove(*name).map(|value| (*name, value)))
        .collect();

    if sections.is_empty() {
        return split_todo_list(kind, root);
    }

    root.retain(|key, _| !is_section_name(key));

    let mut documents = Vec::new();
    if let Some(todo_list) = root.remove(TODO_LIST_KEY) {
        let mut container = root.clone();
        container.insert(TODO_LIST_KEY.to_string(), todo_list);
        documents.extend(split_todo_list(kind, container)?);
    }

    for (name, value) in sections {
        let mut container = expect_mapping(value, &format!("section '{name}'"))?;
        merge_missing(&mut container, &root);
        documents.extend(split_todo_list(kind, container)?);
    }

    Ok(documents)
}

fn is_section_name(key: &str) -> bool {
    JobKind::all_kinds()
        .iter()
        .any(|kind| kind.section_names().contains(&key))
}

/// Copy every `defaults` entry `fields` does not set itself.
fn merge_missing(fields: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, value) in defaults {
        if !fields.contains_key(key) {
            fields.insert(key.clone(), value.clone());
        }
    }
}

fn split_todo_list(
    kind: JobKind,
    mut container: Map<String, Value>,
) -> Result<Vec<JobDocument>, DocumentError> {
    let Some(todo_list) = container.remove(TODO_LIST_KEY) else {
        return Ok(vec![JobDocument::new(kind, container)]);
    };

    let items = match todo_list {
        Value::Array(items) => items,
        other => {
            return Err(DocumentError::NotASequence {
                context: TODO_LIST_KEY.to_string(),
                found: ValueType::of(&other).to_string(),
            })
        }
    };

    let defaults = container;
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let mut fields = expect_mapping(item, &format!("{TODO_LIST_KEY}[{i}]"))?;
            merge_missing(&mut fields, &defaults);
            Ok(JobDocument::new(kind, fields))
        })
        .collect()
}

fn expect_mapping(value: Value, context: &str) -> Result<Map<String, Value>, DocumentError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DocumentError::NotAMapping {
            context: context.to_string(),
            found: ValueType::of(&other).to_string(),
        }),
    }
}

fn parse_yaml(content: &str, label: &str) -> Result<Value, DocumentError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| DocumentError::Parse {
            path: label.to_string(),
            reason: format!("invalid YAML: {e}"),
        })?;
    yaml_to_json_value(&yaml).map_err(|reason| DocumentError::Conversion {
        path: label.to_string(),
        reason,
    })
}
