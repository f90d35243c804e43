//! binapi source scanning.
//!
//! Walks a binapi tree, parses every `*.ba.go` file and extracts the
//! `...Details` / `...Reply` structs that the configuration asks for.
//!
//! Scanning is best-effort: a file that cannot be read or parsed is skipped
//! without affecting the rest of the walk. Only a failure of the walk itself
//! is reported as an error.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::go::{self, StructField, TypeExpr};
use std::collections::HashMap;
use std::path::{Component, Path};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Suffix of generated binapi binding files
pub const SOURCE_SUFFIX: &str = ".ba.go";

/// Struct name suffixes that mark candidate messages
const MESSAGE_SUFFIXES: [&str; 2] = ["Details", "Reply"];

/// A field of a binapi struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    /// Go field name (e.g. `SwIfIndex`)
    pub name: String,
    /// Declared type as a string (e.g. `interface_types.InterfaceIndex`)
    pub go_type: String,
    /// Raw tag literal, empty when absent
    pub tag: String,
    /// Name from the tag's `json` key, empty when absent
    pub json_name: String,
    /// Declared as a fixed-length array; `go_type` still renders it as `[]T`
    pub is_array: bool,
}

/// A binapi struct selected by the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceType {
    /// Struct name (e.g. `SwInterfaceDetails`)
    pub name: String,
    /// Go package declared by the file
    pub package: String,
    /// Directory of the file relative to the scan root, `/`-separated
    pub rel_dir: String,
    /// Fields in declaration order
    pub fields: Vec<SourceField>,
    /// Name ends in `Details`
    pub is_details: bool,
    /// Name ends in `Reply`
    pub is_reply: bool,
}

/// Scanned types keyed by struct name.
///
/// A struct name seen twice keeps the last declaration visited.
pub type SourceTypes = HashMap<String, SourceType>;

/// Scanner for binapi source trees
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    config: &'a Config,
    suffix: String,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner that keeps the structs named in `config`
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            suffix: SOURCE_SUFFIX.to_string(),
        }
    }

    /// Overrides the file suffix to scan for
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Scans every matching file below `root`
    pub fn scan_dir(&self, root: &Path) -> Result<SourceTypes> {
        if !root.exists() {
            return Err(Error::SourceRootMissing {
                path: root.to_path_buf(),
            });
        }

        debug!("Scanning binapi tree: {}", root.display());

        let mut types = SourceTypes::new();
        let mut files_parsed = 0;

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            // Symlinked bindings are kept; a dangling link fails the read and
            // is skipped like any unreadable file.
            if entry.file_type().is_dir() {
                continue;
            }
            let matches_suffix = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(&self.suffix));
            if !matches_suffix {
                continue;
            }

            let rel_dir = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(slash_path)
                .unwrap_or_default();

            match self.scan_file(path, &rel_dir, &mut types) {
                Ok(found) => {
                    files_parsed += 1;
                    trace!("{}: {} matching types", path.display(), found);
                }
                Err(e) if e.is_recoverable() => {
                    trace!("Skipping {}: {}", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Parsed {} files, kept {} types",
            files_parsed,
            types.len()
        );
        Ok(types)
    }

    fn scan_file(&self, path: &Path, rel_dir: &str, types: &mut SourceTypes) -> Result<usize> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        self.scan_source(&source, rel_dir, types)
    }

    /// Parses one Go source file and records its matching structs into
    /// `types`. Returns the number of structs recorded.
    pub fn scan_source(&self, source: &str, rel_dir: &str, types: &mut SourceTypes) -> Result<usize> {
        let file = go::parse_file(source)?;
        let mut found = 0;

        for spec in file.types {
            let TypeExpr::Struct(fields) = &spec.ty else {
                continue;
            };
            if !MESSAGE_SUFFIXES.iter().any(|s| spec.name.ends_with(s)) {
                continue;
            }
            if self.config.find_by_source_message(&spec.name).is_none() {
                continue;
            }

            debug!("Found {}.{}", file.package, spec.name);
            let source_type = SourceType {
                is_details: spec.name.ends_with("Details"),
                is_reply: spec.name.ends_with("Reply"),
                fields: extract_fields(fields),
                package: file.package.clone(),
                rel_dir: rel_dir.to_string(),
                name: spec.name,
            };
            if let Some(previous) = types.insert(source_type.name.clone(), source_type) {
                debug!(
                    "{} from {} replaced by a later declaration",
                    previous.name, previous.package
                );
            }
            found += 1;
        }

        Ok(found)
    }
}

/// Converts struct fields to [`SourceField`]s in declaration order.
///
/// Embedded fields are skipped. A declaration naming several fields
/// (`A, B uint32`) contributes only its first name.
pub fn extract_fields(fields: &[StructField]) -> Vec<SourceField> {
    fields
        .iter()
        .filter_map(|field| {
            let name = field.names.first()?;
            let tag = field.tag.clone().unwrap_or_default();
            Some(SourceField {
                name: name.clone(),
                go_type: type_string(&field.ty),
                json_name: json_name(&tag),
                tag,
                is_array: matches!(field.ty, TypeExpr::Array { .. }),
            })
        })
        .collect()
}

/// Renders a type expression the way the schema mapper expects it.
///
/// Arrays of any length render as `[]T`; shapes other than names, slices,
/// arrays and maps render as `unknown`.
pub fn type_string(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Ident(name) => name.clone(),
        TypeExpr::Qualified { package, name } => format!("{}.{}", package, name),
        TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => format!("[]{}", type_string(elem)),
        TypeExpr::Map { key, value } => {
            format!("map[{}]{}", type_string(key), type_string(value))
        }
        _ => "unknown".to_string(),
    }
}

/// Extracts the name from a `json:"name,opts"` entry of a raw struct tag
pub fn json_name(tag: &str) -> String {
    let tag = tag.trim_matches('`');
    for part in tag.split_whitespace() {
        if let Some(value) = part.strip_prefix("json:") {
            let value = value.trim_matches('"');
            return value.split(',').next().unwrap_or_default().to_string();
        }
    }
    String::new()
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceMapping;
    use tempfile::TempDir;

    const IFACE: &str = "package interfaces\n\n\
        type SwInterfaceDetails struct {\n\
        \tSwIfIndex interface_types.InterfaceIndex `binapi:\"interface_index,name=sw_if_index\" json:\"sw_if_index,omitempty\"`\n\
        \tTag string\n\
        }\n\n\
        type SwInterfaceDump struct {\n\tSwIfIndex uint32\n}\n\n\
        type ShowVersionReply struct {\n\tVersion string\n}\n\n\
        type UnlistedDetails struct {\n\tX uint32\n}\n";

    fn config() -> Config {
        Config::new(vec![
            ResourceMapping::new("interfaces", "SwInterfaceDetails", "Interface"),
            ResourceMapping::new("version", "ShowVersionReply", "VersionInfo"),
            ResourceMapping::new("dump", "SwInterfaceDump", "Dump"),
        ])
    }

    #[test]
    fn test_type_string() {
        let src = "package p\n\ntype T struct {\n\
            \tA uint8\n\tB ip_types.Address\n\tC []uint32\n\tD [4]byte\n\
            \tE map[string][]ip_types.Prefix\n\tF *uint32\n\tG func()\n}\n";
        let file = go::parse_file(src).unwrap();
        let TypeExpr::Struct(fields) = &file.types[0].ty else {
            panic!("expected struct");
        };
        let types: Vec<String> = fields.iter().map(|f| type_string(&f.ty)).collect();
        assert_eq!(
            types,
            [
                "uint8",
                "ip_types.Address",
                "[]uint32",
                "[]byte",
                "map[string][]ip_types.Prefix",
                "unknown",
                "unknown"
            ]
        );
    }

    #[test]
    fn test_json_name() {
        assert_eq!(
            json_name(r#"`binapi:"u32,name=mtu" json:"mtu,omitempty"`"#),
            "mtu"
        );
        assert_eq!(json_name(r#"`json:"bar_count"`"#), "bar_count");
        assert_eq!(json_name(r#"`binapi:"u32,name=mtu"`"#), "");
        assert_eq!(json_name(""), "");
    }

    #[test]
    fn test_extract_fields_skips_embedded() {
        let src = "package p\n\ntype T struct {\n\tEmbedded\n\tA, B uint16 `json:\"a\"`\n\tC bool\n}\n";
        let file = go::parse_file(src).unwrap();
        let TypeExpr::Struct(fields) = &file.types[0].ty else {
            panic!("expected struct");
        };
        let fields = extract_fields(fields);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "A");
        assert_eq!(fields[0].go_type, "uint16");
        assert_eq!(fields[0].json_name, "a");
        assert_eq!(fields[0].tag, "`json:\"a\"`");
        assert_eq!(fields[1].name, "C");
        assert_eq!(fields[1].tag, "");
        assert!(!fields[1].is_array);
    }

    #[test]
    fn test_extract_fields_marks_arrays() {
        let src = "package p\n\ntype T struct {\n\tMac [6]uint8\n\tIds []uint32\n}\n";
        let file = go::parse_file(src).unwrap();
        let TypeExpr::Struct(fields) = &file.types[0].ty else {
            panic!("expected struct");
        };
        let fields = extract_fields(fields);
        assert_eq!(fields[0].go_type, "[]uint8");
        assert!(fields[0].is_array);
        assert_eq!(fields[1].go_type, "[]uint32");
        assert!(!fields[1].is_array);
    }

    #[test]
    fn test_scan_source_filters() {
        let config = config();
        let scanner = Scanner::new(&config);
        let mut types = SourceTypes::new();

        let found = scanner.scan_source(IFACE, "interface", &mut types).unwrap();
        assert_eq!(found, 2);

        let details = &types["SwInterfaceDetails"];
        assert_eq!(details.package, "interfaces");
        assert_eq!(details.rel_dir, "interface");
        assert!(details.is_details);
        assert!(!details.is_reply);
        assert_eq!(details.fields[0].json_name, "sw_if_index");

        assert!(types["ShowVersionReply"].is_reply);
        // Configured but lacking a Details/Reply suffix
        assert!(!types.contains_key("SwInterfaceDump"));
        // Right suffix but not configured
        assert!(!types.contains_key("UnlistedDetails"));
    }

    #[test]
    fn test_scan_dir_skips_unparseable_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("interface")).unwrap();
        std::fs::create_dir_all(root.join("broken")).unwrap();
        std::fs::write(root.join("interface/interface.ba.go"), IFACE).unwrap();
        std::fs::write(root.join("broken/broken.ba.go"), "package broken\n\ntype {\n").unwrap();
        std::fs::write(
            root.join("interface/helpers.go"),
            "package interfaces\n\ntype HelperDetails struct{ X int }\n",
        )
        .unwrap();

        let config = config();
        let types = Scanner::new(&config).scan_dir(root).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types["SwInterfaceDetails"].rel_dir, "interface");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_dir_follows_symlinked_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("binapi");
        let vendored = temp_dir.path().join("vendor");
        std::fs::create_dir_all(root.join("interface")).unwrap();
        std::fs::create_dir_all(&vendored).unwrap();
        std::fs::write(vendored.join("interface.ba.go"), IFACE).unwrap();
        std::os::unix::fs::symlink(
            vendored.join("interface.ba.go"),
            root.join("interface/interface.ba.go"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            vendored.join("missing.ba.go"),
            root.join("interface/dangling.ba.go"),
        )
        .unwrap();

        let config = config();
        let types = Scanner::new(&config).scan_dir(&root).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types["SwInterfaceDetails"].rel_dir, "interface");
    }

    #[test]
    fn test_scan_dir_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = config();
        let err = Scanner::new(&config)
            .scan_dir(&temp_dir.path().join("binapi"))
            .unwrap_err();
        assert!(matches!(err, Error::SourceRootMissing { .. }));
    }

    #[test]
    fn test_custom_suffix() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("iface.go"), IFACE).unwrap();

        let config = config();
        let scanner = Scanner::new(&config);
        assert!(scanner.scan_dir(temp_dir.path()).unwrap().is_empty());
        let types = scanner.suffix(".go").scan_dir(temp_dir.path()).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types["ShowVersionReply"].rel_dir, "");
    }
}
