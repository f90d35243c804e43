//! Go converter generation.
//!
//! For every resource that made it into the schema, emits a Go function that
//! copies a binapi struct into the generated proto message, plus a list
//! variant when the resource has a list wrapper:
//!
//! ```go
//! func InterfaceFromSwInterfaceDetails(in *interfaces.SwInterfaceDetails) *pb.Interface
//! func InterfaceListFromSwInterfaceDetails(in []*interfaces.SwInterfaceDetails) *pb.InterfaceList
//! ```
//!
//! Field values are converted according to the proto type the schema
//! emitter chose for them. A field with no sound conversion gets a comment
//! in place of an assignment.

use crate::config::{Config, ResourceMapping};
use crate::error::{Error, Result};
use crate::scanner::{SourceField, SourceType, SourceTypes};
use crate::schema::naming::{pluralize, to_go_name};
use crate::schema::types::{map_type, REPEATED};
use crate::schema::{field_name, matched_resources};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default name of the generated Go file
pub const OUTPUT_FILE: &str = "converters_gen.go";

/// Default Go package of the generated file
pub const DEFAULT_PACKAGE: &str = "handler";

/// Default import path of the binapi tree
pub const DEFAULT_BINAPI_IMPORT: &str = "go.fd.io/govpp/binapi";

/// Import alias of the generated proto package
const PROTO_ALIAS: &str = "pb";

/// Options for converter generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Go package of the generated file
    pub package: String,
    /// Import path corresponding to the scanned binapi root
    pub binapi_import: String,
    /// Output file; defaults to `converters_gen.go` in the schema output dir
    pub output: Option<PathBuf>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            binapi_import: DEFAULT_BINAPI_IMPORT.to_string(),
            output: None,
        }
    }
}

impl ConverterOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Go package name
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Sets the binapi import path
    pub fn binapi_import(mut self, import: impl Into<String>) -> Self {
        self.binapi_import = import.into();
        self
    }

    /// Sets an explicit output file
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Output file, falling back to `output_dir/converters_gen.go`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| output_dir.join(OUTPUT_FILE))
    }

    fn import_path(&self, source: &SourceType) -> String {
        if source.rel_dir.is_empty() {
            self.binapi_import.clone()
        } else {
            format!("{}/{}", self.binapi_import, source.rel_dir)
        }
    }
}

/// binapi types with a `String()` method
const STRINGER_TYPES: &[&str] = &["ethernet_types.MacAddress", "ip_types.Address"];

/// Go type that protoc-gen-go uses for a proto scalar
fn go_scalar(proto_type: &str) -> Option<&'static str> {
    match proto_type {
        "uint32" => Some("uint32"),
        "int32" => Some("int32"),
        "bool" => Some("bool"),
        "string" => Some("string"),
        "double" => Some("float64"),
        "float" => Some("float32"),
        _ => None,
    }
}

/// Whether a Go type string names something other than a plain or
/// qualified type
fn is_composite(go_type: &str) -> bool {
    go_type.starts_with("[]") || go_type.starts_with("map[") || go_type == "unknown"
}

/// Expression converting `src` of Go type `go_type` to `proto_type`
fn scalar_expr(go_type: &str, proto_type: &str, src: &str) -> Option<String> {
    let target = go_scalar(proto_type)?;
    if go_type == target {
        return Some(src.to_string());
    }

    match proto_type {
        "string" => {
            if STRINGER_TYPES.contains(&go_type) {
                Some(format!("{}.String()", src))
            } else {
                Some(format!("fmt.Sprint({})", src))
            }
        }
        "bool" => None,
        _ if is_composite(go_type) => None,
        _ => Some(format!("{}({})", target, src)),
    }
}

/// How one schema field is filled in
#[derive(Debug, Clone, PartialEq, Eq)]
enum Conversion {
    /// `out.F = expr`
    Assign(String),
    /// Element-wise copy into a new slice
    Loop {
        elem_type: &'static str,
        elem_expr: String,
    },
    /// No sound conversion
    Unsupported,
}

fn conversion(field: &SourceField, proto_type: &str, converter: Option<&str>) -> Conversion {
    let src = format!("in.{}", field.name);

    if let Some(func) = converter.filter(|c| !c.is_empty()) {
        return Conversion::Assign(format!("{}({})", func, src));
    }

    let Some(elem_proto) = proto_type.strip_prefix(REPEATED) else {
        return scalar_expr(&field.go_type, proto_type, &src)
            .map_or(Conversion::Unsupported, Conversion::Assign);
    };

    let (Some(elem_go), Some(elem_type)) =
        (field.go_type.strip_prefix("[]"), go_scalar(elem_proto))
    else {
        return Conversion::Unsupported;
    };

    match scalar_expr(elem_go, elem_proto, "v") {
        // An array never assigns to a slice, even with matching elements
        Some(expr) if expr == "v" && !field.is_array => Conversion::Assign(src),
        Some(elem_expr) => Conversion::Loop {
            elem_type,
            elem_expr,
        },
        None => Conversion::Unsupported,
    }
}

fn function_name(target: &str, source: &str) -> String {
    format!("{}From{}", target, source)
}

fn write_resource(
    out: &mut String,
    resource: &ResourceMapping,
    source: &SourceType,
) -> std::fmt::Result {
    let alias = &source.package;
    let target = &resource.target_message;
    let func = function_name(target, &source.name);

    writeln!(
        out,
        "// {} converts a binapi {} into {}.{}.",
        func, source.name, PROTO_ALIAS, target
    )?;
    writeln!(
        out,
        "func {}(in *{}.{}) *{}.{} {{",
        func, alias, source.name, PROTO_ALIAS, target
    )?;
    writeln!(out, "\tif in == nil {{")?;
    writeln!(out, "\t\treturn nil")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\tout := &{}.{}{{}}", PROTO_ALIAS, target)?;

    for field in &source.fields {
        let proto_type = map_type(&field.go_type);
        let go_field = to_go_name(&field_name(resource, &field.name));
        let converter = resource
            .find_rename(&field.name)
            .and_then(|r| r.converter.as_deref());

        match conversion(field, &proto_type, converter) {
            Conversion::Assign(expr) => writeln!(out, "\tout.{} = {}", go_field, expr)?,
            Conversion::Loop {
                elem_type,
                elem_expr,
            } => {
                writeln!(
                    out,
                    "\tout.{} = make([]{}, 0, len(in.{}))",
                    go_field, elem_type, field.name
                )?;
                writeln!(out, "\tfor _, v := range in.{} {{", field.name)?;
                writeln!(out, "\t\tout.{0} = append(out.{0}, {1})", go_field, elem_expr)?;
                writeln!(out, "\t}}")?;
            }
            Conversion::Unsupported => writeln!(
                out,
                "\t// out.{}: no automatic conversion from {} to {}",
                go_field, field.go_type, proto_type
            )?,
        }
    }

    writeln!(out, "\treturn out")?;
    writeln!(out, "}}")?;

    if let Some(list) = resource.list_message_name() {
        let list_func = function_name(list, &source.name);
        let list_field = to_go_name(&pluralize(&resource.name));

        writeln!(out)?;
        writeln!(
            out,
            "// {} converts binapi {} messages into {}.{}.",
            list_func, source.name, PROTO_ALIAS, list
        )?;
        writeln!(
            out,
            "func {}(in []*{}.{}) *{}.{} {{",
            list_func, alias, source.name, PROTO_ALIAS, list
        )?;
        writeln!(
            out,
            "\tout := &{}.{}{{{}: make([]*{}.{}, 0, len(in))}}",
            PROTO_ALIAS, list, list_field, PROTO_ALIAS, target
        )?;
        writeln!(out, "\tfor _, item := range in {{")?;
        writeln!(
            out,
            "\t\tout.{0} = append(out.{0}, {1}(item))",
            list_field, func
        )?;
        writeln!(out, "\t}}")?;
        writeln!(out, "\treturn out")?;
        writeln!(out, "}}")?;
    }

    Ok(())
}

/// Generates the converter source for all matched resources
pub fn generate_converters(
    types: &SourceTypes,
    config: &Config,
    options: &ConverterOptions,
) -> String {
    let mut body = String::new();
    let mut imports = BTreeMap::new();

    for (resource, source) in matched_resources(types, config) {
        imports.insert(options.import_path(source), source.package.clone());
        body.push('\n');
        write_resource(&mut body, resource, source).expect("String write cannot fail");
    }
    if !imports.is_empty() {
        imports.insert(config.go_package.clone(), PROTO_ALIAS.to_string());
    }

    let mut out = String::new();
    out.push_str("// Code generated by binproto. DO NOT EDIT.\n\n");
    out.push_str(&format!("package {}\n", options.package));

    if !imports.is_empty() {
        out.push_str("\nimport (\n");
        if body.contains("fmt.Sprint(") {
            out.push_str("\t\"fmt\"\n\n");
        }
        for (path, alias) in &imports {
            out.push_str(&format!("\t{} \"{}\"\n", alias, path));
        }
        out.push_str(")\n");
    }

    out.push_str(&body);
    out
}

/// Generates converters and writes them to `path`
pub fn write_converters(
    types: &SourceTypes,
    config: &Config,
    options: &ConverterOptions,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
    }

    let content = generate_converters(types, config, options);
    std::fs::write(path, content).map_err(|e| Error::file_write(path, e))?;
    debug!("Wrote converters to {}", path.display());
    Ok(())
}
