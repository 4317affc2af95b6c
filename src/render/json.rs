//! JSON renderer: structured output for tooling integration.
//!
//! Each output file becomes one JSON document listing its imports and the
//! structures it owns, with member types already rendered to text.

use crate::compiler::Program;
use crate::output::OutputFile;
use crate::render::Renderer;
use crate::structure::{Structure, StructureBody, StructureKind};
use crate::Result;
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
struct FileJson<'p> {
    path: &'p str,
    imports: Vec<ImportJson<'p>>,
    structures: Vec<StructureJson<'p>>,
}

#[derive(Serialize)]
struct ImportJson<'p> {
    name: &'p str,
    from: &'p str,
}

#[derive(Serialize)]
struct StructureJson<'p> {
    name: &'p str,
    kind: StructureKind,
    source: &'p str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldJson<'p>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    constants: Vec<ConstantJson<'p>>,
}

#[derive(Serialize)]
struct FieldJson<'p> {
    key: &'p str,
    optional: bool,
    #[serde(rename = "type")]
    ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'p str>,
}

#[derive(Serialize)]
struct ConstantJson<'p> {
    name: &'p str,
    value: &'p str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'p str>,
}

impl Renderer for JsonRenderer {
    fn render(&self, program: &Program, file: &OutputFile) -> Result<String> {
        let json = FileJson {
            path: file.path(),
            imports: file
                .imports()
                .map(|(name, import)| ImportJson {
                    name,
                    from: program.file(import.from).path(),
                })
                .collect(),
            structures: file
                .structures()
                .iter()
                .map(|id| structure_json(program.structure(*id)))
                .collect(),
        };
        let mut out = serde_json::to_string_pretty(&json)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn structure_json(structure: &Structure) -> StructureJson<'_> {
    let (fields, constants) = match structure.body() {
        StructureBody::Interface(fields) => (
            fields
                .iter()
                .map(|f| FieldJson {
                    key: &f.key,
                    optional: f.optional,
                    ty: f.ty.serialize(),
                    description: f.description.as_deref(),
                })
                .collect(),
            Vec::new(),
        ),
        StructureBody::Enum(constants) => (
            Vec::new(),
            constants
                .iter()
                .map(|c| ConstantJson {
                    name: &c.name,
                    value: &c.value,
                    description: c.description.as_deref(),
                })
                .collect(),
        ),
    };
    StructureJson {
        name: structure.name(),
        kind: structure.kind(),
        source: structure.source(),
        fields,
        constants,
    }
}
