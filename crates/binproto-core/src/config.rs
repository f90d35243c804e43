//! Resource configuration.
//!
//! A configuration is an ordered list of [`ResourceMapping`]s tying a binapi
//! message (for example `SwInterfaceDetails`) to the proto message generated
//! for it. It is read from a YAML file:
//!
//! ```yaml
//! resources:
//!   - name: interfaces
//!     binapi_message: SwInterfaceDetails
//!     proto_message: Interface
//!     list_message: InterfaceList
//!     fields:
//!       - binapi_field: SwIfIndex
//!         proto_field: index
//!         converter: uint32
//! ```
//!
//! When no file is present the built-in [`Config::default`] list is used.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default proto package written into the schema header
pub const DEFAULT_PACKAGE: &str = "tnc.agent";

/// Default `go_package` option written into the schema header
pub const DEFAULT_GO_PACKAGE: &str = "esba-tnc-api/proto";

/// Explicit override of a single field's proto name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRename {
    /// Field name as declared in the binapi struct
    #[serde(rename = "binapi_field", alias = "source_field", default)]
    pub source_field: String,
    /// Field name to use verbatim in the proto message
    #[serde(rename = "proto_field", alias = "target_field", default)]
    pub target_field: String,
    /// Go function applied to the value by generated converters
    #[serde(default)]
    pub converter: Option<String>,
}

/// One configured resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceMapping {
    /// Resource name, unique within a configuration (e.g. `interfaces`)
    #[serde(default)]
    pub name: String,
    /// binapi struct name; empty for schema-only messages
    #[serde(rename = "binapi_message", alias = "source_message", default)]
    pub source_message: String,
    /// Generated proto message name
    #[serde(rename = "proto_message", alias = "target_message", default)]
    pub target_message: String,
    /// Generated list wrapper message name, if any
    #[serde(rename = "list_message", alias = "target_list_message", default)]
    pub list_message: Option<String>,
    /// Per-field renames
    #[serde(default)]
    pub fields: Vec<FieldRename>,
}

impl ResourceMapping {
    /// Creates a mapping without a list message or renames
    pub fn new(
        name: impl Into<String>,
        source_message: impl Into<String>,
        target_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_message: source_message.into(),
            target_message: target_message.into(),
            list_message: None,
            fields: Vec::new(),
        }
    }

    /// Sets the list wrapper message name
    pub fn list_message(mut self, list_message: impl Into<String>) -> Self {
        self.list_message = Some(list_message.into());
        self
    }

    /// Adds a field rename
    pub fn rename(
        mut self,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
        converter: Option<&str>,
    ) -> Self {
        self.fields.push(FieldRename {
            source_field: source_field.into(),
            target_field: target_field.into(),
            converter: converter.map(str::to_string),
        });
        self
    }

    /// Returns true when the resource has no binapi counterpart
    pub fn is_schema_only(&self) -> bool {
        self.source_message.is_empty()
    }

    /// The list wrapper message name; an empty name counts as absent
    pub fn list_message_name(&self) -> Option<&str> {
        self.list_message.as_deref().filter(|s| !s.is_empty())
    }

    /// Looks up the rename configured for a binapi field
    pub fn find_rename(&self, source_field: &str) -> Option<&FieldRename> {
        self.fields.iter().find(|f| f.source_field == source_field)
    }
}

fn default_package() -> String {
    DEFAULT_PACKAGE.to_string()
}

fn default_go_package() -> String {
    DEFAULT_GO_PACKAGE.to_string()
}

/// Full generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Resources in emission order
    #[serde(default)]
    pub resources: Vec<ResourceMapping>,
    /// Proto package name
    #[serde(default = "default_package")]
    pub package: String,
    /// Value of the `go_package` file option
    #[serde(default = "default_go_package")]
    pub go_package: String,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// The built-in default list
    Builtin,
}

impl Config {
    /// Creates a configuration from an explicit resource list
    pub fn new(resources: Vec<ResourceMapping>) -> Self {
        Self {
            resources,
            package: default_package(),
            go_package: default_go_package(),
        }
    }

    /// Parses and validates a YAML document
    pub fn from_yaml(yaml: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|source| Error::ConfigParse {
            path: path.into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml, path)?;
        debug!(
            "Loaded {} resources from {}",
            config.resources.len(),
            path.display()
        );
        Ok(config)
    }

    /// Loads the file if it exists, otherwise falls back to the defaults.
    ///
    /// Only a missing file triggers the fallback; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => Ok((config, ConfigSource::File(path.to_path_buf()))),
            Err(Error::ConfigRead { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok((Self::default(), ConfigSource::Builtin))
            }
            Err(e) => Err(e),
        }
    }

    /// Checks that resource names are unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(Error::DuplicateResource {
                    name: resource.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Finds a resource by its name
    pub fn find_resource(&self, name: &str) -> Option<&ResourceMapping> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Finds the resource generated from a binapi message
    pub fn find_by_source_message(&self, message: &str) -> Option<&ResourceMapping> {
        if message.is_empty() {
            return None;
        }
        self.resources.iter().find(|r| r.source_message == message)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(vec![
            ResourceMapping::new("interfaces", "SwInterfaceDetails", "Interface")
                .list_message("InterfaceList"),
            ResourceMapping::new("neighbors", "IPNeighborDetails", "Neighbor")
                .list_message("NeighborList"),
            ResourceMapping::new("fib", "IPRouteV2Details", "FIBEntry").list_message("FIBList"),
            ResourceMapping::new("acl", "ACLDetails", "ACLEntry").list_message("ACLList"),
            ResourceMapping::new("memif", "MemifDetails", "MemifEntry").list_message("MemifList"),
            ResourceMapping::new("srv6", "SrLocalsidDetails", "SRv6Entry").list_message("SRv6List"),
            ResourceMapping::new("version", "ShowVersionReply", "VersionInfo"),
            ResourceMapping::new("hardware", "", "HardwareInfo"),
            ResourceMapping::new("ip_addresses", "IPAddressDetails", "IPAddressEntry")
                .list_message("IPAddressList"),
            ResourceMapping::new("l2_fib", "L2FibTableDetails", "L2FIBEntry")
                .list_message("L2FIBList"),
            ResourceMapping::new("bridge_domains", "BridgeDomainDetails", "BridgeDomainEntry")
                .list_message("BridgeDomainList"),
            ResourceMapping::new("vxlan", "VxlanTunnelDetails", "VXLANEntry")
                .list_message("VXLANList"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
resources:
  - name: interfaces
    binapi_message: SwInterfaceDetails
    proto_message: Interface
    list_message: InterfaceList
    fields:
      - binapi_field: SwIfIndex
        proto_field: index
        converter: uint32
  - name: version
    binapi_message: ShowVersionReply
    proto_message: VersionInfo
    list_message: ""
  - name: hardware
    proto_message: HardwareInfo
"#;

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(SAMPLE, "proto.yaml").unwrap();
        assert_eq!(config.resources.len(), 3);
        assert_eq!(config.package, DEFAULT_PACKAGE);
        assert_eq!(config.go_package, DEFAULT_GO_PACKAGE);

        let interfaces = &config.resources[0];
        assert_eq!(interfaces.source_message, "SwInterfaceDetails");
        assert_eq!(interfaces.list_message_name(), Some("InterfaceList"));
        let rename = interfaces.find_rename("SwIfIndex").unwrap();
        assert_eq!(rename.target_field, "index");
        assert_eq!(rename.converter.as_deref(), Some("uint32"));
        assert!(interfaces.find_rename("Tag").is_none());

        assert_eq!(config.resources[1].list_message_name(), None);
        assert!(config.resources[2].is_schema_only());
    }

    #[test]
    fn test_header_overrides() {
        let yaml = "package: vpp.agent\ngo_package: example.com/proto\nresources: []\n";
        let config = Config::from_yaml(yaml, "proto.yaml").unwrap();
        assert_eq!(config.package, "vpp.agent");
        assert_eq!(config.go_package, "example.com/proto");
        assert!(config.resources.is_empty());
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let yaml = "resources:\n  - name: stats\n    binapi_message: StatsDetails\n  - binapi_message: OtherDetails\n    proto_message: Other\n";
        let config = Config::from_yaml(yaml, "proto.yaml").unwrap();
        assert_eq!(config.resources[0].target_message, "");
        assert_eq!(config.resources[0].source_message, "StatsDetails");
        assert_eq!(config.resources[1].name, "");
        assert_eq!(config.resources[1].target_message, "Other");
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let err = Config::from_yaml("resources: [name: {", "bad.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
resources:
  - { name: fib, binapi_message: A, proto_message: X }
  - { name: fib, binapi_message: B, proto_message: Y }
"#;
        let err = Config::from_yaml(yaml, "dup.yaml").unwrap_err();
        assert!(matches!(err, Error::DuplicateResource { ref name } if name == "fib"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let (config, source) =
            Config::load_or_default(temp_dir.path().join("missing.yaml")).unwrap();
        assert_eq!(source, ConfigSource::Builtin);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("proto.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let (config, source) = Config::load_or_default(&path).unwrap();
        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config.resources.len(), 3);
    }

    #[test]
    fn test_load_or_default_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("proto.yaml");
        std::fs::write(&path, "resources: {{{").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resources.len(), 12);
        assert!(config.validate().is_ok());
        assert!(config.find_resource("hardware").unwrap().is_schema_only());
        assert_eq!(
            config
                .find_by_source_message("ShowVersionReply")
                .map(|r| r.name.as_str()),
            Some("version")
        );
        assert!(config.find_by_source_message("").is_none());
        assert!(config.find_resource("missing").is_none());
    }
}
