//! Go to proto type mapping.
//!
//! Rules are applied in a fixed order and the first match wins:
//!
//! 1. exact lookup in [`PRIMITIVE_TYPES`]
//! 2. substring match against [`DOMAIN_TYPES`]
//! 3. `[]T` maps `T` recursively and prefixes `repeated`
//! 4. anything else becomes [`FALLBACK_TYPE`]
//!
//! The domain rules run before the sequence rule, so a slice of a domain
//! type such as `[]interface_types.InterfaceIndex` maps to the scalar
//! `uint32`.

/// Exact Go spelling to proto spelling. proto has no 8 or 16 bit integers,
/// so narrow widths widen to the 32 bit types.
pub const PRIMITIVE_TYPES: &[(&str, &str)] = &[
    ("uint32", "uint32"),
    ("uint16", "uint32"),
    ("uint8", "uint32"),
    ("int32", "int32"),
    ("int16", "int32"),
    ("int8", "int32"),
    ("bool", "bool"),
    ("string", "string"),
    ("float64", "double"),
    ("float32", "float"),
    ("[]uint32", "repeated uint32"),
    ("[]string", "repeated string"),
];

/// binapi domain types, matched by substring
pub const DOMAIN_TYPES: &[(&str, &str)] = &[
    ("interface_types.InterfaceIndex", "uint32"),
    ("interface_types.IfStatusFlags", "uint32"),
    ("ethernet_types.MacAddress", "string"),
    ("ip_types.Address", "string"),
];

/// Type used for everything the rules do not recognize
pub const FALLBACK_TYPE: &str = "string";

/// Prefix of repeated field types
pub const REPEATED: &str = "repeated ";

/// Maps a Go type string to a proto field type.
///
/// Never fails: unknown types map to `string`.
///
/// ```
/// use binproto_core::schema::types::map_type;
///
/// assert_eq!(map_type("uint8"), "uint32");
/// assert_eq!(map_type("[]ip_types.Prefix"), "repeated string");
/// assert_eq!(map_type("ip_types.AddressFamily"), "string");
/// ```
pub fn map_type(go_type: &str) -> String {
    if let Some((_, proto)) = PRIMITIVE_TYPES.iter().find(|(go, _)| *go == go_type) {
        return proto.to_string();
    }

    if let Some((_, proto)) = DOMAIN_TYPES.iter().find(|(name, _)| go_type.contains(name)) {
        return proto.to_string();
    }

    if let Some(elem) = go_type.strip_prefix("[]") {
        return format!("{}{}", REPEATED, map_type(elem));
    }

    FALLBACK_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(map_type("uint32"), "uint32");
        assert_eq!(map_type("uint16"), "uint32");
        assert_eq!(map_type("uint8"), "uint32");
        assert_eq!(map_type("int8"), "int32");
        assert_eq!(map_type("int16"), "int32");
        assert_eq!(map_type("bool"), "bool");
        assert_eq!(map_type("float64"), "double");
        assert_eq!(map_type("float32"), "float");
        assert_eq!(map_type("[]uint32"), "repeated uint32");
        assert_eq!(map_type("[]string"), "repeated string");
    }

    #[test]
    fn test_unlisted_widths_fall_back_to_string() {
        assert_eq!(map_type("uint64"), "string");
        assert_eq!(map_type("int64"), "string");
        assert_eq!(map_type("int"), "string");
        assert_eq!(map_type("unknown"), "string");
        assert_eq!(map_type(""), "string");
    }

    #[test]
    fn test_domain_types() {
        assert_eq!(map_type("interface_types.InterfaceIndex"), "uint32");
        assert_eq!(map_type("interface_types.IfStatusFlags"), "uint32");
        assert_eq!(map_type("ethernet_types.MacAddress"), "string");
        assert_eq!(map_type("ip_types.Address"), "string");
        assert_eq!(map_type("ip_types.AddressWithPrefix"), "string");
    }

    #[test]
    fn test_domain_rule_precedes_sequence_rule() {
        assert_eq!(map_type("[]interface_types.InterfaceIndex"), "uint32");
        assert_eq!(map_type("map[string]interface_types.IfStatusFlags"), "uint32");
    }

    #[test]
    fn test_sequences() {
        assert_eq!(map_type("[]uint8"), "repeated uint32");
        assert_eq!(map_type("[]byte"), "repeated string");
        assert_eq!(map_type("[]bool"), "repeated bool");
        assert_eq!(map_type("[][]uint32"), "repeated repeated uint32");
    }

    #[test]
    fn test_embedded_brackets_are_not_sequences() {
        assert_eq!(map_type("map[string][]uint32"), "string");
    }

    #[test]
    fn test_never_empty_and_deterministic() {
        for go_type in ["uint32", "[]ip_types.Prefix", "x.Y", "map[a]b", "[]"] {
            let mapped = map_type(go_type);
            assert!(!mapped.is_empty());
            assert_eq!(mapped, map_type(go_type));
        }
        assert_eq!(map_type("[]"), "repeated string");
    }
}
