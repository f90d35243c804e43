//! # binproto-core
//!
//! A library for generating proto message schemas from GoVPP binapi bindings.
//!
//! This crate provides the core functionality for:
//! - Parsing Go binding files (`*.ba.go`) and extracting configured structs
//! - Mapping Go field types and names onto proto fields
//! - Rendering a `.proto` schema and optional Go converter functions
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Resource configuration (YAML or built-in defaults)
//! - [`go`]: Go tokenizer and declaration parser
//! - [`scanner`]: binapi tree walking and field extraction
//! - [`schema`]: Type mapping, naming and proto rendering
//! - [`converter`]: Go converter generation
//! - [`pipeline`]: The end-to-end run
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use binproto_core::{build_schema, Config, Scanner};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let types = Scanner::new(&config).scan_dir(Path::new("../govpp/binapi"))?;
//! println!("{}", build_schema(&types, &config).render());
//! # Ok::<(), binproto_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! [`ProtoWriter`] lets callers consume the schema model without going
//! through the text renderer.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod config;
pub mod converter;
pub mod error;
pub mod go;
pub mod pipeline;
pub mod scanner;
pub mod schema;

// Re-export primary types for convenience
pub use config::{Config, ConfigSource, FieldRename, ResourceMapping};
pub use converter::{generate_converters, ConverterOptions};
pub use error::{Error, Result};
pub use pipeline::{run, Options, Report};
pub use scanner::{Scanner, SourceField, SourceType, SourceTypes};
pub use schema::{build_schema, ProtoFile, ProtoWriter, StatsWriter, TextWriter};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
