//! Naming convention utilities for generated output.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `SwIfIndex` | [`to_snake_case`] | `sw_if_index` |
//! | `entry` | [`pluralize`] | `entries` |
//! | `sw_if_index` | [`to_go_name`] | `SwIfIndex` |

/// Convert a Go field name to a proto field name.
///
/// Every ASCII uppercase letter after the first character gets an
/// underscore in front of it, then the whole string is lowercased. Runs of
/// capitals are not treated as acronyms.
///
/// # Examples
///
/// ```
/// use binproto_core::schema::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("SwIfIndex"), "sw_if_index");
/// assert_eq!(to_snake_case("ID"), "i_d");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            result.push('_');
        }
        result.push(c);
    }
    result.to_lowercase()
}

/// Naive English plural used for list field names.
///
/// # Examples
///
/// ```
/// use binproto_core::schema::naming::pluralize;
///
/// assert_eq!(pluralize("interface"), "interfaces");
/// assert_eq!(pluralize("entry"), "entries");
/// assert_eq!(pluralize("bus"), "buses");
/// ```
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        format!("{}ies", stem)
    } else if word.ends_with('s') || word.ends_with('x') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

/// Go identifier protoc-gen-go produces for a proto field name.
///
/// Each word starts upper case and its lowercase run is copied as is. An
/// underscore before a lowercase letter is dropped, any other underscore is
/// kept, and a leading underscore becomes `X`. A lowercase letter after a
/// digit starts a new word.
///
/// ```
/// use binproto_core::schema::naming::to_go_name;
///
/// assert_eq!(to_go_name("sw_if_index"), "SwIfIndex");
/// assert_eq!(to_go_name("i_d"), "ID");
/// assert_eq!(to_go_name("l2tp"), "L2Tp");
/// assert_eq!(to_go_name("vlan_1"), "Vlan_1");
/// ```
pub fn to_go_name(proto_name: &str) -> String {
    let bytes = proto_name.as_bytes();
    let mut result = String::with_capacity(bytes.len() + 1);
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let next_is_lower = bytes.get(i + 1).map_or(false, u8::is_ascii_lowercase);
        match c {
            b'.' if next_is_lower => {}
            b'.' => result.push('_'),
            b'_' if i == 0 || bytes[i - 1] == b'.' => result.push('X'),
            b'_' if next_is_lower => {}
            _ if c.is_ascii_digit() => result.push(c as char),
            _ => {
                result.push(c.to_ascii_uppercase() as char);
                while bytes.get(i + 1).map_or(false, u8::is_ascii_lowercase) {
                    i += 1;
                    result.push(bytes[i] as char);
                }
            }
        }
        i += 1;
    }
    result
}
