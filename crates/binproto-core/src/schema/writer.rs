//! Extensible proto writing traits.
//!
//! [`ProtoFile::accept`](super::ProtoFile::accept) walks a schema and feeds
//! each element to a [`ProtoWriter`]. [`TextWriter`] renders `.proto`
//! source; [`StatsWriter`] only counts.

use super::{MessageKind, ProtoField, ProtoFile, ProtoMessage};
use std::fmt::{Result, Write};

/// Trait for writing proto elements to output.
///
/// Every method defaults to a no-op, so implementors only override the
/// elements they care about.
pub trait ProtoWriter {
    /// Write the file header (syntax, package, options)
    fn write_header(&mut self, file: &ProtoFile) -> Result {
        let _ = file;
        Ok(())
    }

    /// Open a message definition
    fn write_message(&mut self, message: &ProtoMessage) -> Result {
        let _ = message;
        Ok(())
    }

    /// Write a field of the currently open message
    fn write_field(&mut self, field: &ProtoField) -> Result {
        let _ = field;
        Ok(())
    }

    /// Close the currently open message
    fn end_message(&mut self, message: &ProtoMessage) -> Result {
        let _ = message;
        Ok(())
    }

    /// Write the trailing notice
    fn write_footer(&mut self, file: &ProtoFile) -> Result {
        let _ = file;
        Ok(())
    }
}

/// Renders standard `.proto` syntax
pub struct TextWriter<'a, W: Write> {
    writer: &'a mut W,
    indent_str: &'a str,
    indent_level: usize,
}

impl<'a, W: Write> TextWriter<'a, W> {
    /// Creates a writer indenting with two spaces
    pub fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            indent_str: "  ",
            indent_level: 0,
        }
    }

    fn write_indent(&mut self) -> Result {
        for _ in 0..self.indent_level {
            write!(self.writer, "{}", self.indent_str)?;
        }
        Ok(())
    }
}

impl<W: Write> ProtoWriter for TextWriter<'_, W> {
    fn write_header(&mut self, file: &ProtoFile) -> Result {
        writeln!(self.writer, "syntax = \"proto3\";")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "package {};", file.package)?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "option go_package = \"{}\";",
            escape_string(&file.go_package)
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "// Auto-generated proto message definitions")?;
        writeln!(self.writer, "// Source: binapi Details/Reply messages")?;
        writeln!(self.writer)
    }

    fn write_message(&mut self, message: &ProtoMessage) -> Result {
        if let Some(comment) = &message.comment {
            writeln!(self.writer, "// {}", comment)?;
        }
        writeln!(self.writer, "message {} {{", message.name)?;
        self.indent_level += 1;
        Ok(())
    }

    fn write_field(&mut self, field: &ProtoField) -> Result {
        self.write_indent()?;
        writeln!(self.writer, "{} {} = {};", field.ty, field.name, field.number)
    }

    fn end_message(&mut self, _message: &ProtoMessage) -> Result {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.write_indent()?;
        writeln!(self.writer, "}}")?;
        writeln!(self.writer)
    }

    fn write_footer(&mut self, _file: &ProtoFile) -> Result {
        writeln!(self.writer)?;
        writeln!(self.writer, "// This file is auto-generated. Do not edit by hand.")?;
        writeln!(self.writer, "// Regenerate it with binproto.")
    }
}

/// A writer that collects statistics about the schema
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsWriter {
    /// Number of resource messages
    pub message_count: usize,
    /// Number of list wrapper messages
    pub list_count: usize,
    /// Number of fields across all messages
    pub field_count: usize,
}

impl ProtoWriter for StatsWriter {
    fn write_message(&mut self, message: &ProtoMessage) -> Result {
        match message.kind {
            MessageKind::Resource => self.message_count += 1,
            MessageKind::List => self.list_count += 1,
        }
        Ok(())
    }

    fn write_field(&mut self, _field: &ProtoField) -> Result {
        self.field_count += 1;
        Ok(())
    }
}

/// Escape a string for proto syntax
fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ if c.is_ascii_control() => {
                result.push_str(&format!("\\x{:02x}", c as u8));
            }
            _ => result.push(c),
        }
    }
    result
}
