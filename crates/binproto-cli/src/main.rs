//! binproto - Generate proto message schemas from GoVPP binapi bindings
//!
//! This tool scans a binapi source tree for configured `Details`/`Reply`
//! structs and writes matching proto messages, plus optional Go converters.

use anyhow::{Context, Result};
use binproto_core::pipeline::{DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_DIR};
use binproto_core::{ConfigSource, ConverterOptions, Options, Report};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Generate proto message schemas from GoVPP binapi bindings
#[derive(Parser, Debug)]
#[command(name = "binproto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the binapi source tree [default: ../govpp/binapi]
    #[arg(long)]
    binapi_dir: Option<PathBuf>,

    /// Output directory for the generated schema
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Resource configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Generate the proto schema
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    proto: bool,

    /// Generate Go converter functions
    #[arg(
        long,
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    converters: bool,

    /// Output file for the converters [default: <OUTPUT>/converters_gen.go]
    #[arg(long)]
    converters_output: Option<PathBuf>,

    /// Go package of the generated converters
    #[arg(long, default_value = binproto_core::converter::DEFAULT_PACKAGE)]
    converters_package: String,

    /// Go import path of the binapi root
    #[arg(long, default_value = binproto_core::converter::DEFAULT_BINAPI_IMPORT)]
    binapi_import: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Builds pipeline options from the parsed flags
    fn options(&self) -> Result<Options> {
        let binapi_dir = match &self.binapi_dir {
            Some(dir) => dir.clone(),
            None => default_binapi_dir()?,
        };

        let mut converters = ConverterOptions::new()
            .package(&self.converters_package)
            .binapi_import(&self.binapi_import);
        if let Some(path) = &self.converters_output {
            converters = converters.output(path);
        }

        Ok(Options::new(binapi_dir)
            .output_dir(&self.output)
            .config_path(&self.config)
            .emit_proto(self.proto)
            .emit_converters(self.converters)
            .converters(converters))
    }
}

/// `../govpp/binapi` relative to the working directory
fn default_binapi_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    Ok(cwd.join("..").join("govpp").join("binapi"))
}

/// Compute a short hash of the content (first 8 chars of blake3)
fn content_hash(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hash.to_hex()[..8].to_string()
}

fn print_summary(report: &Report) {
    if let ConfigSource::File(path) = &report.config_source {
        info!("Loaded config {}", path.display());
    }
    info!("Parsed {} binapi types", report.types_found);

    if let Some(schema) = &report.schema {
        info!(
            "Summary: {} messages, {} lists, {} fields written to {} (hash: {})",
            schema.stats.message_count,
            schema.stats.list_count,
            schema.stats.field_count,
            schema.path.display(),
            content_hash(&schema.content)
        );
    }
    if let Some(path) = &report.converters {
        info!("Converters written to {}", path.display());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = cli.options()?;
    let report = binproto_core::run(&options).with_context(|| {
        format!(
            "Failed to generate from binapi: {}",
            options.binapi_dir.display()
        )
    })?;

    print_summary(&report);
    println!("done");
    Ok(())
}
