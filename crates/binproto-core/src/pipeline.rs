//! End-to-end generation run.
//!
//! [`run`] is the whole tool minus flag parsing: load the configuration,
//! scan the binapi tree, then write the schema and, optionally, the Go
//! converters. All settings travel in one [`Options`] value.

use crate::config::{Config, ConfigSource};
use crate::converter::{write_converters, ConverterOptions};
use crate::error::Result;
use crate::scanner::Scanner;
use crate::schema::{build_schema, write_schema, SchemaOutput};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default schema output directory
pub const DEFAULT_OUTPUT_DIR: &str = "proto";

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/proto.yaml";

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Root of the binapi source tree
    pub binapi_dir: PathBuf,
    /// Directory receiving `agent_generated.proto`
    pub output_dir: PathBuf,
    /// Resource configuration file
    pub config_path: PathBuf,
    /// Write the proto schema
    pub emit_proto: bool,
    /// Write the Go converters
    pub emit_converters: bool,
    /// Converter settings
    pub converters: ConverterOptions,
}

impl Options {
    /// Creates options for `binapi_dir` with default values for the rest
    pub fn new(binapi_dir: impl Into<PathBuf>) -> Self {
        Self {
            binapi_dir: binapi_dir.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            emit_proto: true,
            emit_converters: false,
            converters: ConverterOptions::default(),
        }
    }

    /// Sets the schema output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the configuration file
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Enables or disables schema output
    pub fn emit_proto(mut self, emit: bool) -> Self {
        self.emit_proto = emit;
        self
    }

    /// Enables or disables converter output
    pub fn emit_converters(mut self, emit: bool) -> Self {
        self.emit_converters = emit;
        self
    }

    /// Sets the converter settings
    pub fn converters(mut self, converters: ConverterOptions) -> Self {
        self.converters = converters;
        self
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct Report {
    /// Where the configuration came from
    pub config_source: ConfigSource,
    /// Number of binapi types kept by the scanner
    pub types_found: usize,
    /// Schema output, when enabled
    pub schema: Option<SchemaOutput>,
    /// Converter file, when enabled
    pub converters: Option<PathBuf>,
}

/// Loads the configuration, falling back to the built-in list when the
/// file does not exist
pub fn load_config(path: &Path) -> Result<(Config, ConfigSource)> {
    let (config, source) = Config::load_or_default(path)?;
    if source == ConfigSource::Builtin {
        info!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
    }
    Ok((config, source))
}

/// Runs the full pipeline
pub fn run(options: &Options) -> Result<Report> {
    let (config, config_source) = load_config(&options.config_path)?;

    info!("Parsing binapi: {}", options.binapi_dir.display());
    let types = Scanner::new(&config).scan_dir(&options.binapi_dir)?;
    info!("Parsed types: {}", types.len());

    let schema = if options.emit_proto {
        info!("Generating proto in {}", options.output_dir.display());
        let output = write_schema(&build_schema(&types, &config), &options.output_dir)?;
        info!("Wrote {}", output.path.display());
        Some(output)
    } else {
        None
    };

    let converters = if options.emit_converters {
        let path = options.converters.output_path(&options.output_dir);
        info!("Generating converters in {}", path.display());
        write_converters(&types, &config, &options.converters, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(Report {
        config_source,
        types_found: types.len(),
        schema,
        converters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::OUTPUT_FILE;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const FOO: &str = "package foo\n\ntype FooDetails struct {\n\tBarCount uint32 `json:\"bar_count\"`\n}\n";

    const CONFIG: &str = "resources:\n  - name: foo\n    binapi_message: FooDetails\n    proto_message: Foo\n";

    struct Fixture {
        _temp: TempDir,
        options: Options,
    }

    fn fixture(config: Option<&str>) -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("binapi/foo")).unwrap();
        std::fs::write(root.join("binapi/foo/foo.ba.go"), FOO).unwrap();
        if let Some(config) = config {
            std::fs::write(root.join("proto.yaml"), config).unwrap();
        }
        let options = Options::new(root.join("binapi"))
            .output_dir(root.join("out"))
            .config_path(root.join("proto.yaml"));
        Fixture {
            _temp: temp,
            options,
        }
    }

    #[test]
    fn test_minimal_end_to_end() {
        let fixture = fixture(Some(CONFIG));
        let report = run(&fixture.options).unwrap();

        assert_eq!(report.types_found, 1);
        assert!(matches!(report.config_source, ConfigSource::File(_)));
        assert!(report.converters.is_none());

        let schema = report.schema.unwrap();
        assert_eq!(schema.path, fixture.options.output_dir.join(OUTPUT_FILE));
        assert_eq!(
            schema.content,
            "syntax = \"proto3\";\n\
             \n\
             package tnc.agent;\n\
             \n\
             option go_package = \"esba-tnc-api/proto\";\n\
             \n\
             // Auto-generated proto message definitions\n\
             // Source: binapi Details/Reply messages\n\
             \n\
             // foo messages\n\
             message Foo {\n  uint32 bar_count = 1;\n}\n\
             \n\
             \n\
             // This file is auto-generated. Do not edit by hand.\n\
             // Regenerate it with binproto.\n"
        );
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let fixture = fixture(Some(CONFIG));
        let path = fixture.options.output_dir.join(OUTPUT_FILE);

        run(&fixture.options).unwrap();
        let first = std::fs::read(&path).unwrap();
        run(&fixture.options).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let fixture = fixture(None);
        let report = run(&fixture.options).unwrap();

        assert_eq!(report.config_source, ConfigSource::Builtin);
        // FooDetails is not in the built-in list
        assert_eq!(report.types_found, 0);
        let schema = report.schema.unwrap();
        assert_eq!(schema.stats.message_count, 0);
        assert!(!schema.content.contains('{'));
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let fixture = fixture(Some("resources: [ {"));
        let err = run(&fixture.options).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(!fixture.options.output_dir.exists());
    }

    #[test]
    fn test_missing_binapi_dir_is_fatal() {
        let fixture = fixture(Some(CONFIG));
        let options = fixture.options.clone();
        let options = Options {
            binapi_dir: options.binapi_dir.join("nope"),
            ..options
        };
        let err = run(&options).unwrap_err();
        assert!(matches!(err, Error::SourceRootMissing { .. }));
    }

    #[test]
    fn test_converters_only() {
        let fixture = fixture(Some(CONFIG));
        let options = fixture
            .options
            .clone()
            .emit_proto(false)
            .emit_converters(true)
            .converters(ConverterOptions::new().binapi_import("example.com/binapi"));

        let report = run(&options).unwrap();
        assert!(report.schema.is_none());
        let path = report.converters.unwrap();
        assert_eq!(path, options.output_dir.join(crate::converter::OUTPUT_FILE));
        assert!(!options.output_dir.join(OUTPUT_FILE).exists());

        let code = std::fs::read_to_string(path).unwrap();
        assert!(code.contains("\tfoo \"example.com/binapi/foo\"\n"));
        assert!(code.contains("\tout.BarCount = in.BarCount\n"));
    }
}
