//! Named structures generated from documentation tables.

use crate::output::FileId;
use crate::symbol::Symbol;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static RE_NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?[0-9]+|0x[0-9a-fA-F]+|[0-9]+\s*<<\s*[0-9]+|-?[0-9]+\.[0-9]+)$").unwrap()
});

static RE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Index of a structure in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StructureId(pub(crate) usize);

impl StructureId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Interface,
    Enum,
}

/// A generated type definition.
#[derive(Debug, Clone)]
pub struct Structure {
    pub(crate) id: StructureId,
    pub(crate) name: String,
    pub(crate) file: FileId,
    /// Anchor of the section the structure was generated from.
    pub(crate) source: String,
    pub(crate) body: StructureBody,
}

#[derive(Debug, Clone)]
pub enum StructureBody {
    Interface(Vec<Field>),
    Enum(Vec<Constant>),
}

/// Interface member from a `field | type | description` row.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub optional: bool,
    pub ty: Symbol,
    pub description: Option<String>,
}

/// Enum member from a `name | value` or `flag | value` row.
#[derive(Debug, Clone)]
pub struct Constant {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

impl Structure {
    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> StructureKind {
        match self.body {
            StructureBody::Interface(_) => StructureKind::Interface,
            StructureBody::Enum(_) => StructureKind::Enum,
        }
    }

    pub fn body(&self) -> &StructureBody {
        &self.body
    }

    pub fn fields(&self) -> &[Field] {
        match &self.body {
            StructureBody::Interface(fields) => fields,
            StructureBody::Enum(_) => &[],
        }
    }

    pub fn constants(&self) -> &[Constant] {
        match &self.body {
            StructureBody::Enum(constants) => constants,
            StructureBody::Interface(_) => &[],
        }
    }

    /// Declaration text for this structure.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        match &self.body {
            StructureBody::Interface(fields) => {
                out.push_str(&format!("export interface {} {{\n", self.name));
                for field in fields {
                    push_description(&mut out, field.description.as_deref());
                    out.push_str(&format!(
                        "\t{}{}: {};\n",
                        property_key(&field.key),
                        if field.optional { "?" } else { "" },
                        field.ty
                    ));
                }
            }
            StructureBody::Enum(constants) => {
                out.push_str(&format!("export enum {} {{\n", self.name));
                for constant in constants {
                    push_description(&mut out, constant.description.as_deref());
                    out.push_str(&format!("\t{} = {},\n", constant.name, constant.value));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

fn push_description(out: &mut String, description: Option<&str>) {
    if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
        out.push_str(&format!("\t/** {} */\n", desc.replace("*/", "*\\/")));
    }
}

fn property_key(key: &str) -> String {
    if RE_IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        serde_json::to_string(key).unwrap_or_else(|_| format!("\"{}\"", key))
    }
}

/// Structure name for a section title: "Channel Object" → "Channel",
/// "Guild Member Flags" → "GuildMemberFlags". `None` if nothing usable is
/// left.
pub fn structure_name(title: &str) -> Option<String> {
    let mut words: Vec<&str> = title.split_whitespace().collect();
    if words.len() > 1 {
        if let Some(last) = words.last() {
            if last.eq_ignore_ascii_case("object") || last.eq_ignore_ascii_case("structure") {
                words.pop();
            }
        }
    }
    let name = pascal_case(&words.join(" "));
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(name),
        Some(_) => Some(format!("_{}", name)),
        None => None,
    }
}

fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Strip markdown emphasis, code spans and escapes from a table cell.
pub fn clean_cell(text: &str) -> String {
    text.replace(['*', '`'], "")
        .replace("\\_", "_")
        .replace('\\', "")
        .trim()
        .to_string()
}

/// Field key and optional flag from a `field` cell: "nick?" → ("nick", true).
pub fn field_key(cell: &str) -> Option<(String, bool)> {
    let cleaned = clean_cell(cell);
    let key = cleaned.split_whitespace().next()?;
    match key.strip_suffix('?') {
        Some(stripped) if !stripped.is_empty() => Some((stripped.to_string(), true)),
        Some(_) => None,
        None => Some((key.to_string(), false)),
    }
}

/// Enum constant identifier: "GUILD_TEXT" stays, "Send Messages" →
/// "SEND_MESSAGES".
pub fn constant_name(cell: &str) -> Option<String> {
    let cleaned = clean_cell(cell);
    let name = cleaned
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_uppercase())
        .collect::<Vec<_>>()
        .join("_");
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => Some(format!("_{}", name)),
        Some(_) => Some(name),
        None => None,
    }
}

/// Enum value text: numbers and shift expressions are kept, everything else
/// becomes a string literal.
pub fn constant_value(cell: &str) -> String {
    let cleaned = clean_cell(cell);
    let unquoted = cleaned
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(&cleaned);
    if RE_NUMERIC_VALUE.is_match(unquoted) {
        unquoted.to_string()
    } else {
        serde_json::to_string(unquoted).unwrap_or_else(|_| format!("\"{}\"", unquoted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Primitive;

    #[test]
    fn names_from_titles() {
        assert_eq!(structure_name("Channel Object").as_deref(), Some("Channel"));
        assert_eq!(structure_name("Channel Structure").as_deref(), Some("Channel"));
        assert_eq!(structure_name("Guild Member Flags").as_deref(), Some("GuildMemberFlags"));
        assert_eq!(structure_name("Thread-specific fields").as_deref(), Some("ThreadSpecificFields"));
        assert_eq!(structure_name("Object").as_deref(), Some("Object"));
        assert_eq!(structure_name("2FA Levels").as_deref(), Some("_2FALevels"));
        assert_eq!(structure_name("%").as_deref(), None);
    }

    #[test]
    fn field_keys() {
        assert_eq!(field_key("nick?"), Some(("nick".to_string(), true)));
        assert_eq!(field_key("\\*guild_id"), Some(("guild_id".to_string(), false)));
        assert_eq!(field_key("`id` \\*\\*"), Some(("id".to_string(), false)));
        assert_eq!(field_key(""), None);
        assert_eq!(field_key("?"), None);
    }

    #[test]
    fn constant_names_and_values() {
        assert_eq!(constant_name("GUILD_TEXT").as_deref(), Some("GUILD_TEXT"));
        assert_eq!(constant_name("Send Messages").as_deref(), Some("SEND_MESSAGES"));
        assert_eq!(constant_name("2").as_deref(), Some("_2"));
        assert_eq!(constant_value("1 << 4"), "1 << 4");
        assert_eq!(constant_value("`0x10`"), "0x10");
        assert_eq!(constant_value("\"online\""), "\"online\"");
        assert_eq!(constant_value("dnd"), "\"dnd\"");
    }

    #[test]
    fn interface_declaration() {
        let structure = Structure {
            id: StructureId(0),
            name: "Channel".to_string(),
            file: FileId(0),
            source: "RESOURCES_CHANNEL/channel-object".to_string(),
            body: StructureBody::Interface(vec![
                Field {
                    key: "id".to_string(),
                    optional: false,
                    ty: Symbol::primitive(Primitive::Snowflake),
                    description: Some("the id of this channel".to_string()),
                },
                Field {
                    key: "rtc-region".to_string(),
                    optional: true,
                    ty: Symbol::nullable(Symbol::primitive(Primitive::String)),
                    description: None,
                },
            ]),
        };
        assert_eq!(
            structure.serialize(),
            "export interface Channel {\n\t/** the id of this channel */\n\tid: string;\n\t\"rtc-region\"?: string|null;\n}\n"
        );
        assert_eq!(structure.kind(), StructureKind::Interface);
        assert!(structure.constants().is_empty());
    }

    #[test]
    fn enum_declaration() {
        let structure = Structure {
            id: StructureId(1),
            name: "ChannelTypes".to_string(),
            file: FileId(0),
            source: String::new(),
            body: StructureBody::Enum(vec![Constant {
                name: "GUILD_TEXT".to_string(),
                value: "0".to_string(),
                description: Some("a text channel".to_string()),
            }]),
        };
        assert_eq!(
            structure.serialize(),
            "export enum ChannelTypes {\n\t/** a text channel */\n\tGUILD_TEXT = 0,\n}\n"
        );
    }
}
