//! TypeScript renderer: type-only imports followed by declarations.

use crate::compiler::Program;
use crate::output::{relative_module, OutputFile};
use crate::render::Renderer;
use crate::Result;
use std::collections::BTreeMap;

pub struct TypeScriptRenderer;

impl Renderer for TypeScriptRenderer {
    fn render(&self, program: &Program, file: &OutputFile) -> Result<String> {
        let mut out = String::new();

        let imports = render_imports(program, file);
        if !imports.is_empty() {
            out.push_str(&imports);
            out.push('\n');
        }

        let declarations: Vec<String> = file
            .structures()
            .iter()
            .map(|id| program.structure(*id).serialize())
            .collect();
        out.push_str(&declarations.join("\n"));
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "ts"
    }
}

/// One `import type` line per imported file, files sorted by module path.
fn render_imports(program: &Program, file: &OutputFile) -> String {
    let mut by_file: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, import) in file.imports() {
        by_file.entry(program.file(import.from).path()).or_default().push(name);
    }

    let mut out = String::new();
    for (path, names) in by_file {
        out.push_str(&format!(
            "import type {{ {} }} from \"{}\";\n",
            names.join(", "),
            relative_module(file.path(), path)
        ));
    }
    out
}
