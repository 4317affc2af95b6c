//! Type expressions produced by the resolver.

use crate::structure::StructureId;
use std::fmt;

/// Built-in types the documentation names in prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer,
    Float,
    Boolean,
    Snowflake,
    Null,
    Timestamp,
    Binary,
    ImageData,
    Dict,
}

// (phrase, primitive); a trailing plural `s` is also accepted on lookup.
const VOCABULARY: &[(&str, Primitive)] = &[
    ("string", Primitive::String),
    ("str", Primitive::String),
    ("text", Primitive::String),
    ("integer", Primitive::Integer),
    ("int", Primitive::Integer),
    ("uint", Primitive::Integer),
    ("number", Primitive::Integer),
    ("float", Primitive::Float),
    ("double", Primitive::Float),
    ("boolean", Primitive::Boolean),
    ("bool", Primitive::Boolean),
    ("snowflake", Primitive::Snowflake),
    ("id", Primitive::Snowflake),
    ("null", Primitive::Null),
    ("iso8601 timestamp", Primitive::Timestamp),
    ("timestamp", Primitive::Timestamp),
    ("date", Primitive::Timestamp),
    ("binary", Primitive::Binary),
    ("file contents", Primitive::Binary),
    ("image data", Primitive::ImageData),
    ("dict", Primitive::Dict),
    ("map", Primitive::Dict),
];

// Phrases that deliberately mean "any value".
const UNTYPED: &[&str] = &["mixed", "any"];

impl Primitive {
    /// Look up a phrase in the primitive vocabulary.
    pub fn lookup(phrase: &str) -> Option<Primitive> {
        let phrase = normalize(phrase);
        let find = |p: &str| VOCABULARY.iter().find(|(word, _)| *word == p).map(|(_, prim)| *prim);
        find(&phrase).or_else(|| phrase.strip_suffix('s').and_then(find))
    }

    /// True for phrases that explicitly mean an untyped value.
    pub fn is_untyped(phrase: &str) -> bool {
        UNTYPED.contains(&normalize(phrase).as_str())
    }

    /// Rendered type name.
    pub fn as_type(&self) -> &'static str {
        match self {
            Primitive::String | Primitive::Snowflake | Primitive::Timestamp | Primitive::ImageData => {
                "string"
            }
            Primitive::Integer | Primitive::Float => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Binary => "Blob",
            Primitive::Dict => "Record<string, unknown>",
        }
    }
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace("iso 8601", "iso8601")
}

/// Named reference to a registered structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructureRef {
    pub id: StructureId,
    pub name: String,
}

/// Leaf of a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Basic {
    Primitive(Primitive),
    Structure(StructureRef),
}

/// A type expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Basic(Basic),
    /// Nothing could be resolved; rendered as `unknown`.
    Unknown,
    Array(Box<Symbol>),
    Nullable(Box<Symbol>),
    Or(Box<Symbol>, Box<Symbol>),
    Partial(Box<Symbol>),
}

impl Symbol {
    pub fn primitive(primitive: Primitive) -> Symbol {
        Symbol::Basic(Basic::Primitive(primitive))
    }

    pub fn structure(id: StructureId, name: impl Into<String>) -> Symbol {
        Symbol::Basic(Basic::Structure(StructureRef {
            id,
            name: name.into(),
        }))
    }

    pub fn array(inner: Symbol) -> Symbol {
        Symbol::Array(Box::new(inner))
    }

    pub fn nullable(inner: Symbol) -> Symbol {
        Symbol::Nullable(Box::new(inner))
    }

    pub fn or(left: Symbol, right: Symbol) -> Symbol {
        Symbol::Or(Box::new(left), Box::new(right))
    }

    pub fn partial(inner: Symbol) -> Symbol {
        Symbol::Partial(Box::new(inner))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Symbol::Or(..) | Symbol::Nullable(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Symbol::Unknown)
    }

    /// Canonical type text.
    pub fn serialize(&self) -> String {
        match self {
            Symbol::Basic(Basic::Primitive(p)) => p.as_type().to_string(),
            Symbol::Basic(Basic::Structure(s)) => s.name.clone(),
            Symbol::Unknown => "unknown".to_string(),
            Symbol::Array(inner) => format!("{}[]", parenthesized(inner)),
            Symbol::Nullable(inner) => match inner.as_ref() {
                Symbol::Nullable(_) => inner.serialize(),
                Symbol::Or(..) => format!("({})|null", inner.serialize()),
                _ => format!("{}|null", inner.serialize()),
            },
            Symbol::Or(left, right) => format!("{}|{}", left.serialize(), right.serialize()),
            Symbol::Partial(inner) => format!("Partial<{}>", inner.serialize()),
        }
    }

    /// The innermost leaf reached through Array, Nullable and Partial
    /// wrappers. A union has no single root and yields `None`, as does
    /// an unknown leaf.
    pub fn root_symbol(&self) -> Option<&Basic> {
        match self {
            Symbol::Basic(basic) => Some(basic),
            Symbol::Array(inner) | Symbol::Nullable(inner) | Symbol::Partial(inner) => {
                inner.root_symbol()
            }
            Symbol::Or(..) | Symbol::Unknown => None,
        }
    }

    /// Every structure referenced anywhere in the expression, in
    /// left-to-right order without repeats.
    pub fn structures(&self) -> Vec<&StructureRef> {
        let mut found = Vec::new();
        self.collect_structures(&mut found);
        found
    }

    fn collect_structures<'s>(&'s self, found: &mut Vec<&'s StructureRef>) {
        match self {
            Symbol::Basic(Basic::Structure(s)) => {
                if !found.iter().any(|f| f.id == s.id) {
                    found.push(s);
                }
            }
            Symbol::Basic(Basic::Primitive(_)) | Symbol::Unknown => {}
            Symbol::Array(inner) | Symbol::Nullable(inner) | Symbol::Partial(inner) => {
                inner.collect_structures(found)
            }
            Symbol::Or(left, right) => {
                left.collect_structures(found);
                right.collect_structures(found);
            }
        }
    }
}

fn parenthesized(symbol: &Symbol) -> String {
    if symbol.is_union() {
        format!("({})", symbol.serialize())
    } else {
        symbol.serialize()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
