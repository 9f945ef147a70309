//! # Error Types
//!
//! Failures that happen while turning a job file into `JobDocument`s.
//! These are operational errors: the file could not be read or does not
//! have the shape of a job file at all. Problems with the *content* of a
//! well-shaped document are validation findings and live in `hvc-schema`.

use thiserror::Error;

/// Error loading a job file or building a document from a value tree.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read job file '{path}': {reason}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying IO failure.
        reason: String,
    },

    /// The file is not valid YAML or JSON.
    #[error("cannot parse job file '{path}': {reason}")]
    Parse {
        /// Path of the file, or `<inline>` for in-memory sources.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The YAML tree uses constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed for '{path}': {reason}")]
    Conversion {
        /// Path of the file, or `<inline>` for in-memory sources.
        path: String,
        /// What could not be converted.
        reason: String,
    },

    /// A value that must be a mapping is something else.
    #[error("{context} must be a mapping, found {found}")]
    NotAMapping {
        /// Where in the file the value was found.
        context: String,
        /// The type that was found instead.
        found: String,
    },

    /// `todo_list` is present but not a sequence.
    #[error("{context} must be a sequence of job documents, found {found}")]
    NotASequence {
        /// Where in the file the value was found.
        context: String,
        /// The type that was found instead.
        found: String,
    },
}
