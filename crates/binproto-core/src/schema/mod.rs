//! Proto schema generation.
//!
//! Turns scanned binapi structs into proto messages:
//!
//! 1. [`build_schema`] walks the configured resources in order and builds a
//!    [`ProtoFile`] model
//! 2. [`ProtoFile::render`] writes `.proto` text through the [`ProtoWriter`]
//!    trait
//! 3. [`write_schema`] puts the result at `<output>/agent_generated.proto`
//!
//! Emission order follows the configuration, never scan order, so the same
//! inputs always produce byte-identical output.

pub mod naming;
pub mod types;
mod writer;

use crate::config::{Config, ResourceMapping};
use crate::error::{Error, Result};
use crate::scanner::{SourceType, SourceTypes};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use writer::{ProtoWriter, StatsWriter, TextWriter};

/// Name of the generated schema file
pub const OUTPUT_FILE: &str = "agent_generated.proto";

/// Hand-maintained schema that generated output may need merging into
pub const HAND_WRITTEN_FILE: &str = "agent.proto";

/// Distinguishes resource messages from their list wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// One message per binapi struct
    Resource,
    /// `repeated` wrapper around a resource message
    List,
}

/// A field of a generated message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoField {
    /// Proto type, possibly prefixed with `repeated `
    pub ty: String,
    /// Field name
    pub name: String,
    /// Field number, starting at 1
    pub number: u32,
}

impl ProtoField {
    /// Creates a field
    pub fn new(ty: impl Into<String>, name: impl Into<String>, number: u32) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            number,
        }
    }
}

/// A generated message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoMessage {
    /// Message name
    pub name: String,
    /// Line comment written above the message
    pub comment: Option<String>,
    /// Resource or list wrapper
    pub kind: MessageKind,
    /// Fields in number order
    pub fields: Vec<ProtoField>,
}

/// A complete generated schema file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    /// Proto package
    pub package: String,
    /// `go_package` option value
    pub go_package: String,
    /// Messages in emission order
    pub messages: Vec<ProtoMessage>,
}

impl ProtoFile {
    /// Feeds every element to `writer`, in output order
    pub fn accept(&self, writer: &mut impl ProtoWriter) -> std::fmt::Result {
        writer.write_header(self)?;
        for message in &self.messages {
            writer.write_message(message)?;
            for field in &message.fields {
                writer.write_field(field)?;
            }
            writer.end_message(message)?;
        }
        writer.write_footer(self)
    }

    /// Renders the schema as `.proto` source
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.accept(&mut TextWriter::new(&mut output))
            .expect("String write cannot fail");
        output
    }

    /// Counts messages and fields
    pub fn stats(&self) -> StatsWriter {
        let mut stats = StatsWriter::default();
        self.accept(&mut stats).expect("StatsWriter cannot fail");
        stats
    }
}

/// Pairs each configured resource with its scanned struct, in configuration
/// order. Schema-only resources and resources whose struct was never found
/// are left out.
pub fn matched_resources<'a>(
    types: &'a SourceTypes,
    config: &'a Config,
) -> impl Iterator<Item = (&'a ResourceMapping, &'a SourceType)> + 'a {
    config.resources.iter().filter_map(move |resource| {
        if resource.is_schema_only() {
            return None;
        }
        let source = types.get(&resource.source_message);
        if source.is_none() {
            debug!(
                "No binapi type {} for resource {}",
                resource.source_message, resource.name
            );
        }
        source.map(|source| (resource, source))
    })
}

/// Proto field name for a binapi field, honouring configured renames
pub fn field_name(resource: &ResourceMapping, source_field: &str) -> String {
    match resource.find_rename(source_field) {
        Some(rename) => rename.target_field.clone(),
        None => naming::to_snake_case(source_field),
    }
}

/// Builds the message for one resource
pub fn resource_message(resource: &ResourceMapping, source: &SourceType) -> ProtoMessage {
    let fields = source
        .fields
        .iter()
        .zip(1..)
        .map(|(field, number)| ProtoField {
            ty: types::map_type(&field.go_type),
            name: field_name(resource, &field.name),
            number,
        })
        .collect();

    ProtoMessage {
        name: resource.target_message.clone(),
        comment: Some(format!("{} messages", resource.name)),
        kind: MessageKind::Resource,
        fields,
    }
}

/// Builds the list wrapper for a resource, if one is configured
pub fn list_message(resource: &ResourceMapping) -> Option<ProtoMessage> {
    let name = resource.list_message_name()?;
    Some(ProtoMessage {
        name: name.to_string(),
        comment: None,
        kind: MessageKind::List,
        fields: vec![ProtoField {
            ty: format!("{}{}", types::REPEATED, resource.target_message),
            name: naming::pluralize(&resource.name),
            number: 1,
        }],
    })
}

/// Builds the schema model for all matched resources
pub fn build_schema(types: &SourceTypes, config: &Config) -> ProtoFile {
    let mut messages = Vec::new();
    for (resource, source) in matched_resources(types, config) {
        messages.push(resource_message(resource, source));
        messages.extend(list_message(resource));
    }

    ProtoFile {
        package: config.package.clone(),
        go_package: config.go_package.clone(),
        messages,
    }
}

/// Result of writing the schema file
#[derive(Debug, Clone)]
pub struct SchemaOutput {
    /// Path of the generated file
    pub path: PathBuf,
    /// Generated text
    pub content: String,
    /// Message and field counts
    pub stats: StatsWriter,
    /// Hand-maintained schema found next to the output, if any
    pub hand_written: Option<PathBuf>,
}

/// Renders `file` into `output_dir`, creating the directory if needed and
/// replacing any previous output.
///
/// A hand-maintained `agent.proto` in the same directory is left untouched;
/// its presence is reported with a warning.
pub fn write_schema(file: &ProtoFile, output_dir: &Path) -> Result<SchemaOutput> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::directory_create(output_dir, e))?;

    let path = output_dir.join(OUTPUT_FILE);
    let content = file.render();
    std::fs::write(&path, &content).map_err(|e| Error::file_write(&path, e))?;

    let hand_written = Some(output_dir.join(HAND_WRITTEN_FILE)).filter(|p| p.is_file());
    if let Some(existing) = &hand_written {
        warn!(
            "Existing proto file {} found; generated {}. Merge manually or update {} if needed.",
            existing.display(),
            path.display(),
            HAND_WRITTEN_FILE
        );
    }

    Ok(SchemaOutput {
        path,
        content,
        stats: file.stats(),
        hand_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::SourceField;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn source(name: &str, fields: &[(&str, &str)]) -> SourceType {
        SourceType {
            name: name.into(),
            package: "interfaces".into(),
            rel_dir: "interface".into(),
            fields: fields
                .iter()
                .map(|(name, go_type)| SourceField {
                    name: name.to_string(),
                    go_type: go_type.to_string(),
                    tag: String::new(),
                    json_name: String::new(),
                    is_array: false,
                })
                .collect(),
            is_details: name.ends_with("Details"),
            is_reply: name.ends_with("Reply"),
        }
    }

    fn types(sources: Vec<SourceType>) -> SourceTypes {
        sources.into_iter().map(|s| (s.name.clone(), s)).collect()
    }

    #[test]
    fn test_resource_message() {
        let resource = ResourceMapping::new("interfaces", "SwInterfaceDetails", "Interface")
            .rename("SwIfIndex", "index", None);
        let source = source(
            "SwInterfaceDetails",
            &[
                ("SwIfIndex", "interface_types.InterfaceIndex"),
                ("L2Address", "ethernet_types.MacAddress"),
                ("LinkMtu", "uint16"),
            ],
        );

        let message = resource_message(&resource, &source);
        assert_eq!(message.name, "Interface");
        assert_eq!(
            message.fields,
            vec![
                ProtoField::new("uint32", "index", 1),
                ProtoField::new("string", "l2_address", 2),
                ProtoField::new("uint32", "link_mtu", 3),
            ]
        );
    }

    #[test]
    fn test_list_message() {
        let resource = ResourceMapping::new("entry", "FooDetails", "Entry").list_message("EntryList");
        let list = list_message(&resource).unwrap();
        assert_eq!(list.name, "EntryList");
        assert_eq!(list.kind, MessageKind::List);
        assert_eq!(list.fields, vec![ProtoField::new("repeated Entry", "entries", 1)]);

        let bare = ResourceMapping::new("version", "ShowVersionReply", "VersionInfo");
        assert!(list_message(&bare).is_none());
        assert!(list_message(&bare.list_message("")).is_none());
    }

    #[test]
    fn test_build_schema_skips_unmatched_and_schema_only() {
        let config = Config::new(vec![
            ResourceMapping::new("missing", "GoneDetails", "Gone").list_message("GoneList"),
            ResourceMapping::new("hardware", "", "HardwareInfo").list_message("HardwareList"),
            ResourceMapping::new("version", "ShowVersionReply", "VersionInfo"),
        ]);
        let types = types(vec![source("ShowVersionReply", &[("Version", "string")])]);

        let schema = build_schema(&types, &config);
        let names: Vec<&str> = schema.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["VersionInfo"]);
    }

    #[test]
    fn test_build_schema_follows_config_order() {
        let config = Config::new(vec![
            ResourceMapping::new("b", "BDetails", "B").list_message("BList"),
            ResourceMapping::new("a", "ADetails", "A"),
        ]);
        let types = types(vec![
            source("ADetails", &[("X", "uint32")]),
            source("BDetails", &[("Y", "bool")]),
        ]);

        let schema = build_schema(&types, &config);
        let names: Vec<&str> = schema.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["B", "BList", "A"]);
        assert_eq!(schema.render(), build_schema(&types, &config).render());
    }

    #[test]
    fn test_write_schema() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested/proto");
        let config = Config::new(vec![ResourceMapping::new("foo", "FooDetails", "Foo")]);
        let types = types(vec![source("FooDetails", &[("BarCount", "uint32")])]);
        let schema = build_schema(&types, &config);

        let output = write_schema(&schema, &output_dir).unwrap();
        assert_eq!(output.path, output_dir.join(OUTPUT_FILE));
        assert!(output.hand_written.is_none());
        assert_eq!(output.stats.message_count, 1);
        let written = std::fs::read_to_string(&output.path).unwrap();
        assert_eq!(written, output.content);
        assert!(written.contains("message Foo {\n  uint32 bar_count = 1;\n}\n"));
        assert!(!written.contains("List"));

        std::fs::write(output_dir.join(HAND_WRITTEN_FILE), "// manual").unwrap();
        std::fs::write(&output.path, "stale").unwrap();
        let again = write_schema(&schema, &output_dir).unwrap();
        assert_eq!(again.hand_written, Some(output_dir.join(HAND_WRITTEN_FILE)));
        assert_eq!(std::fs::read_to_string(&again.path).unwrap(), written);
        assert_eq!(
            std::fs::read_to_string(output_dir.join(HAND_WRITTEN_FILE)).unwrap(),
            "// manual"
        );
    }
}
