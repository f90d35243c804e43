//! Go source parsing.
//!
//! binapi bindings are Go files, so the scanner needs a Go front end. This
//! module implements just enough of one: a complete tokenizer and a parser
//! for the declaration level of a file. Type declarations are parsed in
//! full; function, variable and constant declarations are checked for
//! balanced brackets and otherwise skipped.
//!
//! ```
//! use binproto_core::go::{parse_file, TypeExpr};
//!
//! let file = parse_file("package demo\n\ntype Pair struct {\n\tA, B uint32 `json:\"a\"`\n}\n")?;
//! assert_eq!(file.package, "demo");
//! let TypeExpr::Struct(fields) = &file.types[0].ty else { unreachable!() };
//! assert_eq!(fields[0].names, ["A", "B"]);
//! # Ok::<(), binproto_core::Error>(())
//! ```

mod lexer;
mod parser;

pub use parser::parse_file;

/// A parsed Go source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    /// Name from the package clause
    pub package: String,
    /// Top-level type declarations in source order
    pub types: Vec<TypeSpec>,
}

/// A single `type` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared type name
    pub name: String,
    /// Declared with `=` (type alias)
    pub alias: bool,
    /// Declared with type parameters
    pub generic: bool,
    /// The declared type
    pub ty: TypeExpr,
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A Go type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Ident(String),
    /// `pkg.T`
    Qualified {
        /// Package qualifier
        package: String,
        /// Type name
        name: String,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T` or `[...]T`
    Array {
        /// Length expression as written
        len: String,
        /// Element type
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        /// Key type
        key: Box<TypeExpr>,
        /// Value type
        value: Box<TypeExpr>,
    },
    /// `chan T` in any direction
    Chan {
        /// Direction
        dir: ChanDir,
        /// Element type
        elem: Box<TypeExpr>,
    },
    /// `func(...) ...`
    Func,
    /// `struct { ... }`
    Struct(Vec<StructField>),
    /// `interface { ... }`
    Interface,
    /// `(T)`
    Paren(Box<TypeExpr>),
    /// `T[A, B]`
    Generic {
        /// Instantiated type
        base: Box<TypeExpr>,
        /// Type arguments
        args: Vec<TypeExpr>,
    },
}

/// One field declaration inside a struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Declared names; empty for embedded fields
    pub names: Vec<String>,
    /// Field type
    pub ty: TypeExpr,
    /// Raw tag literal including its delimiters
    pub tag: Option<String>,
}

impl StructField {
    /// Returns true for embedded (anonymous) fields
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}
