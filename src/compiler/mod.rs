//! Structure registry and the compilation pass.
//!
//! The [`Compiler`] owns the link index, the structure registry and the output
//! graph. Structures are materialized lazily: the first time a link to a
//! resource section is resolved (or, with `resolve_all`, when the walk reaches
//! it) its qualifying table is turned into an interface or enum. Registration
//! is keyed by structure name and the first registration wins.

mod phrase;
mod resolve;

pub use phrase::{tokenize, Token};

use crate::document::{Document, Row, Section, Table};
use crate::links::{self, LinkIndex, LinkTarget, DEFAULT_NESTING_THRESHOLD};
use crate::output::{self, FileId, OutputFile, OutputGraph};
use crate::request::{self, Request, RequestEntry, RequestLine};
use crate::structure::{self, Constant, Field, Structure, StructureBody, StructureId, StructureKind};
use crate::symbol::Symbol;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Columns a table must have to define a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub kind: StructureKind,
    /// Column naming each member.
    pub key: &'static str,
    /// Column holding the member's type or value.
    pub value: &'static str,
}

impl TableShape {
    fn matches(&self, table: &Table) -> bool {
        table.has_columns(&[self.key, self.value])
    }
}

const INTERFACE: TableShape = TableShape {
    kind: StructureKind::Interface,
    key: "field",
    value: "type",
};

const ENUM_BY_NAME: TableShape = TableShape {
    kind: StructureKind::Enum,
    key: "name",
    value: "value",
};

const ENUM_BY_FLAG: TableShape = TableShape {
    kind: StructureKind::Enum,
    key: "flag",
    value: "value",
};

/// Header groups in priority order. Every candidate table is tried against a
/// group before the next group is considered.
const HEADER_GROUPS: &[&[TableShape]] = &[&[INTERFACE], &[ENUM_BY_NAME, ENUM_BY_FLAG]];

/// Shape of `table`, if it qualifies at all.
pub fn classify(table: &Table) -> Option<TableShape> {
    HEADER_GROUPS
        .iter()
        .flat_map(|group| group.iter())
        .find(|shape| shape.matches(table))
        .copied()
}

/// First qualifying table of `section` or of one of its immediate child
/// sections.
pub fn find_resource_table(section: &Section) -> Option<(&Table, TableShape)> {
    let candidates: Vec<&Table> = section
        .tables()
        .chain(section.sections().flat_map(Section::tables))
        .collect();
    pick_table(&candidates)
}

/// First qualifying table that belongs to `section` itself: its own tables,
/// then those of child sections naming the same structure
/// (`Channel Object` > `Channel Structure`).
pub fn owned_resource_table(section: &Section) -> Option<(&Table, TableShape)> {
    let name = structure::structure_name(&section.title);
    let candidates: Vec<&Table> = section
        .tables()
        .chain(
            section
                .sections()
                .filter(|child| name.is_some() && structure::structure_name(&child.title) == name)
                .flat_map(Section::tables),
        )
        .collect();
    pick_table(&candidates)
}

fn pick_table<'t>(candidates: &[&'t Table]) -> Option<(&'t Table, TableShape)> {
    HEADER_GROUPS.iter().find_map(|group| {
        candidates.iter().find_map(|table| {
            group
                .iter()
                .find(|shape| shape.matches(table))
                .map(|shape| (*table, *shape))
        })
    })
}

#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Heading level above which ancestors prefix deeply nested anchors.
    pub nesting_threshold: usize,
    /// Register every resource section, not only those reached via links.
    pub resolve_all: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            nesting_threshold: DEFAULT_NESTING_THRESHOLD,
            resolve_all: true,
        }
    }
}

pub struct Compiler<'a> {
    documents: &'a [Document],
    options: CompilerOptions,
    links: LinkIndex<'a>,
    structures: Vec<Structure>,
    by_name: HashMap<String, StructureId>,
    outputs: OutputGraph,
    requests: Vec<Request>,
}

impl<'a> Compiler<'a> {
    /// Index every section of `documents`. Nothing is resolved yet.
    pub fn new(documents: &'a [Document], options: CompilerOptions) -> Self {
        let links = LinkIndex::build(documents, options.nesting_threshold);
        debug!("indexed {} anchors across {} documents", links.len(), documents.len());
        Self {
            documents,
            options,
            links,
            structures: Vec::new(),
            by_name: HashMap::new(),
            outputs: OutputGraph::new(),
            requests: Vec::new(),
        }
    }

    pub fn links(&self) -> &LinkIndex<'a> {
        &self.links
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn structure(&self, id: StructureId) -> &Structure {
        &self.structures[id.0]
    }

    pub fn structure_by_name(&self, name: &str) -> Option<&Structure> {
        self.by_name.get(name).map(|id| self.structure(*id))
    }

    pub fn outputs(&self) -> &OutputGraph {
        &self.outputs
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Walk every section once in document order: collect requests, and
    /// register resource sections when `resolve_all` is set. Sections nested
    /// inside a request belong to that request.
    pub fn compile(&mut self) {
        let documents = self.documents;
        let threshold = self.options.nesting_threshold;
        let mut targets: Vec<LinkTarget<'a>> = Vec::new();
        for document in documents {
            document.root.walk(&mut |ancestors, section| {
                if section.level == 0 {
                    return;
                }
                if ancestors.iter().any(|a| request::parse_title(&a.title).is_some()) {
                    return;
                }
                let anchor = links::normalize_target(&links::get_link(
                    &document.path,
                    ancestors,
                    section,
                    threshold,
                ));
                targets.push(LinkTarget {
                    document,
                    section,
                    anchor,
                });
            });
        }

        for target in targets {
            if let Some(line) = request::parse_title(&target.section.title) {
                self.add_request(&target, line);
            } else if self.options.resolve_all {
                // A heading that only groups other structures registers nothing itself.
                if let Some((table, shape)) = owned_resource_table(target.section) {
                    self.add_owned_section(&target, table, shape);
                }
            }
        }
    }

    /// Materialize the structure defined by a resource section.
    ///
    /// Returns `None` when neither the section nor its immediate children
    /// hold a qualifying table, or the title yields no usable name; callers
    /// treat the reference as untyped.
    pub fn add_resource_section(&mut self, target: &LinkTarget<'a>) -> Option<StructureId> {
        let Some((table, shape)) = find_resource_table(target.section) else {
            warn!(
                "no field or value table under \"{}\" ({})",
                target.section.title, target.anchor
            );
            return None;
        };
        self.add_owned_section(target, table, shape)
    }

    fn add_owned_section(
        &mut self,
        target: &LinkTarget<'a>,
        table: &Table,
        shape: TableShape,
    ) -> Option<StructureId> {
        let Some(name) = structure::structure_name(&target.section.title) else {
            warn!("cannot derive a structure name from \"{}\"", target.section.title);
            return None;
        };
        Some(self.add_structure(name, shape, target.document, &target.anchor, table))
    }

    /// Register a structure named `name` populated from `table`.
    ///
    /// If the name is already registered the cached structure is returned and
    /// `table` is not read. Otherwise the structure is registered first, then
    /// assigned to the output file of `document`, then populated; member
    /// types that link back to it therefore resolve to the cached entry.
    pub fn add_structure(
        &mut self,
        name: String,
        shape: TableShape,
        document: &Document,
        source: &str,
        table: &Table,
    ) -> StructureId {
        if let Some(id) = self.by_name.get(&name) {
            debug!("structure {} already registered", name);
            return *id;
        }

        let file = self.outputs.file_for(&output::module_path(&document.path));
        let id = StructureId(self.structures.len());
        let body = match shape.kind {
            StructureKind::Interface => StructureBody::Interface(Vec::new()),
            StructureKind::Enum => StructureBody::Enum(Vec::new()),
        };
        self.structures.push(Structure {
            id,
            name: name.clone(),
            file,
            source: source.to_string(),
            body,
        });
        self.by_name.insert(name, id);
        self.outputs.assign(file, id);

        let body = match shape.kind {
            StructureKind::Interface => StructureBody::Interface(self.fields(shape, table)),
            StructureKind::Enum => StructureBody::Enum(constants(shape, table)),
        };
        if let StructureBody::Interface(fields) = &body {
            self.register_imports(file, fields);
        }
        self.structures[id.0].body = body;
        id
    }

    fn fields(&mut self, shape: TableShape, table: &Table) -> Vec<Field> {
        let mut fields = Vec::new();
        for row in table.rows() {
            let Some((key, optional)) = table.cell(row, shape.key).and_then(structure::field_key) else {
                continue;
            };
            let ty = match table.cell(row, shape.value) {
                Some(phrase) => self.resolve_type(phrase),
                None => Symbol::Unknown,
            };
            fields.push(Field {
                key,
                optional,
                ty,
                description: description(table, row),
            });
        }
        fields
    }

    fn register_imports(&mut self, file: FileId, fields: &[Field]) {
        for field in fields {
            for referenced in field.ty.structures() {
                self.outputs
                    .register_import(file, &self.structures[referenced.id.0]);
            }
        }
    }

    fn add_request(&mut self, target: &LinkTarget<'a>, line: RequestLine) {
        let base = structure::structure_name(&line.name).unwrap_or_else(|| "Request".to_string());

        let body = self.request_structure(target, &format!("{}JsonParams", base), |title| {
            title.contains("json") && title.contains("params")
        });
        let query = self.request_structure(target, &format!("{}Query", base), |title| {
            title.contains("query string params")
        });
        let response = target
            .section
            .paragraphs()
            .find_map(request::response_phrase)
            .map(|phrase| self.resolve_type(&phrase));

        debug!("request {} {} {}", line.method.as_str(), line.path, target.anchor);
        self.requests.push(Request {
            name: line.name,
            method: line.method,
            path: line.path,
            parameters: line.parameters,
            source: target.anchor.clone(),
            body,
            query,
            response,
        });
    }

    /// Interface built from the first child section of a request whose
    /// lower-cased title satisfies `wanted` and holds a field table.
    fn request_structure<F>(&mut self, target: &LinkTarget<'a>, name: &str, wanted: F) -> Option<Symbol>
    where
        F: Fn(&str) -> bool,
    {
        let table = target
            .section
            .sections()
            .filter(|child| wanted(&child.title.to_lowercase()))
            .find_map(|child| child.tables().find(|t| INTERFACE.matches(t)))?;
        let id = self.add_structure(name.to_string(), INTERFACE, target.document, &target.anchor, table);
        Some(Symbol::structure(id, self.structure(id).name()))
    }

    /// Consume the compiler, keeping the registry, files and requests.
    pub fn finish(self) -> Program {
        Program {
            structures: self.structures,
            outputs: self.outputs,
            requests: self.requests,
        }
    }
}

fn constants(shape: TableShape, table: &Table) -> Vec<Constant> {
    let mut constants = Vec::new();
    for row in table.rows() {
        let Some(name) = table.cell(row, shape.key).and_then(structure::constant_name) else {
            continue;
        };
        let Some(value) = table.cell(row, shape.value).filter(|v| !v.trim().is_empty()) else {
            debug!("enum constant {} has no value", name);
            continue;
        };
        constants.push(Constant {
            name,
            value: structure::constant_value(value),
            description: description(table, row),
        });
    }
    constants
}

fn description(table: &Table, row: &Row) -> Option<String> {
    table
        .cell(row, "description")
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Result of a compilation run.
#[derive(Debug, Clone)]
pub struct Program {
    structures: Vec<Structure>,
    outputs: OutputGraph,
    requests: Vec<Request>,
}

impl Program {
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn structure(&self, id: StructureId) -> &Structure {
        &self.structures[id.0]
    }

    pub fn structure_by_name(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name() == name)
    }

    /// Output files that own at least one structure, in creation order.
    pub fn files(&self) -> impl Iterator<Item = &OutputFile> {
        self.outputs.files().iter().filter(|f| !f.structures().is_empty())
    }

    pub fn file(&self, id: FileId) -> &OutputFile {
        self.outputs.get(id)
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Pretty-printed JSON array of every documented request.
    pub fn request_manifest(&self) -> serde_json::Result<String> {
        let entries: Vec<RequestEntry<'_>> = self.requests.iter().map(Request::entry).collect();
        serde_json::to_string_pretty(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_str;

    const CHANNEL: &str = "\
# Channel Resource

## Channel Object

Represents a guild or DM channel.

###### Channel Structure

| Field | Type | Description |
|---|---|---|
| id | snowflake | the id of this channel |
| type | integer | the [type of channel](#DOCS_RESOURCES_CHANNEL/channel-object-channel-types) |
| guild_id? | snowflake | the id of the guild |
| recipients? | array of [user](#DOCS_RESOURCES_USER/user-object) objects | the recipients of the DM |
| owner? | ?[user](#DOCS_RESOURCES_USER/user-object) | the owner |
| parent_id? | ?snowflake | parent category |

###### Channel Types

| Type | ID | Description |
|---|---|---|
| GUILD_TEXT | 0 | a text channel |

## Get Channel % GET /channels/{channel.id#DOCS_RESOURCES_CHANNEL/channel-object}

Get a channel by ID. Returns a [channel](#DOCS_RESOURCES_CHANNEL/channel-object) object.

## Modify Channel % PATCH /channels/{channel.id#DOCS_RESOURCES_CHANNEL/channel-object}

###### JSON Params

| Field | Type | Description |
|---|---|---|
| name | string | 1-100 character channel name |

###### Query String Params

| Field | Type | Description |
|---|---|---|
| reason | string | audit log reason |
";

    const USER: &str = "\
# Users

## User Object

###### User Structure

| Field | Type | Description |
|---|---|---|
| id | snowflake | the user's id |
| flags? | integer | the [flags](#DOCS_RESOURCES_USER/user-object-user-flags) on the account |

###### User Flags

| Value | Name | Description |
|---|---|---|
| 1 << 0 | STAFF | Discord Employee |
| 1 << 1 | PARTNER | Partnered Server Owner |
";

    fn corpus() -> Vec<Document> {
        vec![
            parse_str("docs/resources/Channel.md", CHANNEL),
            parse_str("docs/resources/User.md", USER),
        ]
    }

    fn options(resolve_all: bool) -> CompilerOptions {
        CompilerOptions {
            resolve_all,
            ..Default::default()
        }
    }

    #[test]
    fn interface_group_wins_over_enum_group() {
        let doc = parse_str(
            "a.md",
            "## Mixed\n| Name | Value |\n|---|---|\n| A | 1 |\n\n| Field | Type |\n|---|---|\n| id | string |\n",
        );
        let section = doc.root.sections().next().unwrap();
        let (table, shape) = find_resource_table(section).unwrap();
        assert_eq!(shape.kind, StructureKind::Interface);
        assert!(table.has_columns(&["field", "type"]));
    }

    #[test]
    fn flag_tables_are_enums() {
        let doc = parse_str("a.md", "## Bits\n| Flag | Value |\n|---|---|\n| A | 1 << 0 |\n");
        let section = doc.root.sections().next().unwrap();
        assert_eq!(find_resource_table(section).map(|(_, s)| s), Some(ENUM_BY_FLAG));
    }

    #[test]
    fn only_immediate_children_are_searched() {
        let doc = parse_str("a.md", "## Outer\n### Middle\n#### Inner\n| Field | Type |\n|---|---|\n| a | string |\n");
        let outer = doc.root.sections().next().unwrap();
        assert!(find_resource_table(outer).is_none());
        let middle = outer.sections().next().unwrap();
        assert!(find_resource_table(middle).is_some());
    }

    #[test]
    fn owned_tables_skip_differently_named_children() {
        let doc = parse_str(
            "a.md",
            "# Stickers\n## Sticker Object\n| Field | Type |\n|---|---|\n| id | snowflake |\n",
        );
        let stickers = doc.root.sections().next().unwrap();
        assert!(owned_resource_table(stickers).is_none());
        assert!(find_resource_table(stickers).is_some());
        let sticker = stickers.sections().next().unwrap();
        assert!(owned_resource_table(sticker).is_some());
    }

    #[test]
    fn grouping_headings_register_no_structure_of_their_own() {
        let documents = vec![parse_str(
            "docs/resources/Sticker.md",
            "\
# Stickers

## Sticker Object

| Field | Type |
|---|---|
| id | snowflake |
| name | string |

## Sticker Item Object

###### Sticker Item Structure

| Field | Type |
|---|---|
| id | snowflake |
",
        )];
        let mut compiler = Compiler::new(&documents, options(true));
        compiler.compile();
        let names: Vec<_> = compiler.structures().iter().map(Structure::name).collect();
        assert_eq!(names, vec!["Sticker", "StickerItem"]);
        assert_eq!(compiler.structure_by_name("Sticker").unwrap().source(), "DOCS_RESOURCES_STICKER/sticker-object");
    }

    #[test]
    fn lazy_resolution_registers_linked_structures() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(false));
        let ty = compiler.resolve_type("[channel](#DOCS_RESOURCES_CHANNEL/channel-object) object");
        assert_eq!(ty.serialize(), "Channel");

        let channel = compiler.structure_by_name("Channel").unwrap();
        let rendered: Vec<_> = channel
            .fields()
            .iter()
            .map(|f| format!("{}{}:{}", f.key, if f.optional { "?" } else { "" }, f.ty))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "id:string",
                "type:number",
                "guild_id?:string",
                "recipients?:User[]",
                "owner?:User|null",
                "parent_id?:string|null",
            ]
        );
        // User was reached through Channel; the user flags enum through User.
        assert!(compiler.structure_by_name("User").is_some());
        assert!(compiler.structure_by_name("UserFlags").is_none());
    }

    #[test]
    fn repeated_links_share_one_structure() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(false));
        let first = compiler.resolve_type("[user](#DOCS_RESOURCES_USER/user-object)");
        let second = compiler.resolve_type("array of [user](#DOCS_RESOURCES_USER/user-object) objects");
        assert_eq!(first.serialize(), "User");
        assert_eq!(second.serialize(), "User[]");
        assert_eq!(compiler.structures().len(), 1);
        let file = compiler.outputs().by_path("docs/resources/User").unwrap();
        assert_eq!(file.structures().len(), 1);
    }

    #[test]
    fn cross_file_references_become_imports() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(true));
        compiler.compile();
        let program = compiler.finish();

        let channel = program.structure_by_name("Channel").unwrap();
        let user = program.structure_by_name("User").unwrap();
        let channel_file = program.file(channel.file());
        let imports: Vec<_> = channel_file.imports().map(|(name, _)| name).collect();
        assert_eq!(imports, vec!["User"]);
        assert!(!channel_file.imports_structure(channel.id()));
        assert!(program.file(user.file()).imports().next().is_none());
    }

    #[test]
    fn compile_collects_requests() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(true));
        compiler.compile();
        let program = compiler.finish();

        let requests = program.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].name, "Get Channel");
        assert_eq!(requests[0].path, "/channels/{channel_id}");
        assert_eq!(requests[0].response.as_ref().map(Symbol::serialize).as_deref(), Some("Channel"));

        let modify = &requests[1];
        assert_eq!(modify.body.as_ref().map(Symbol::serialize).as_deref(), Some("ModifyChannelJsonParams"));
        assert_eq!(modify.query.as_ref().map(Symbol::serialize).as_deref(), Some("ModifyChannelQuery"));
        assert!(modify.response.is_none());
        // Request parameter tables are not registered as standalone resources.
        assert!(program.structure_by_name("JsonParams").is_none());
    }

    #[test]
    fn resolve_all_registers_unreferenced_enums() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(true));
        compiler.compile();
        let flags = compiler.structure_by_name("UserFlags").unwrap();
        assert_eq!(flags.kind(), StructureKind::Enum);
        let names: Vec<_> = flags.constants().iter().map(|c| (c.name.as_str(), c.value.as_str())).collect();
        assert_eq!(names, vec![("STAFF", "1 << 0"), ("PARTNER", "1 << 1")]);
    }

    #[test]
    fn missing_table_yields_no_structure() {
        let doc = parse_str("a.md", "## Lonely\nJust words.\n");
        let documents = vec![doc];
        let mut compiler = Compiler::new(&documents, options(false));
        assert_eq!(compiler.resolve_type("[lonely](#A/lonely)"), Symbol::Unknown);
        assert!(compiler.structures().is_empty());
    }

    #[test]
    fn request_manifest_is_json() {
        let documents = corpus();
        let mut compiler = Compiler::new(&documents, options(true));
        compiler.compile();
        let manifest = compiler.finish().request_manifest().unwrap();
        let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(value[1]["method"], "PATCH");
        assert_eq!(value[1]["parameters"][0], "channel_id");
    }
}
