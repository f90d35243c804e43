//! Error types for the binproto-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants split along the three tiers the generator distinguishes: fatal
//! I/O and configuration failures, and recoverable per-file problems that
//! the scanner skips over.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for binproto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all binproto operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The binapi source root does not exist
    #[error("binapi directory not found: '{path}'")]
    SourceRootMissing {
        /// The missing directory
        path: PathBuf,
    },

    /// Directory traversal failed
    #[error("failed to walk '{path}': {source}")]
    Walk {
        /// Root of the traversal
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// Failed to read the configuration file
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for the expected shape
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },

    /// Two resources share the same name
    #[error("duplicate resource name '{name}' in configuration")]
    DuplicateResource {
        /// The repeated resource name
        name: String,
    },

    /// Go source could not be tokenized or parsed
    #[error("go syntax error at line {line}: {message}")]
    GoSyntax {
        /// 1-based line of the offending token
        line: usize,
        /// Description of the problem
        message: String,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Go syntax error
    pub fn go_syntax(line: usize, message: impl Into<String>) -> Self {
        Self::GoSyntax {
            line,
            message: message.into(),
        }
    }

    /// Returns true if this is a recoverable error that should be skipped
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::GoSyntax { .. } | Self::FileRead { .. })
    }
}
