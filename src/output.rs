//! Output files and the import graph between them.

use crate::structure::{Structure, StructureId};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Index of an output file in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(pub(crate) usize);

/// A generated module: the structures it owns and those it imports.
#[derive(Debug, Clone)]
pub struct OutputFile {
    id: FileId,
    /// Module path without extension, e.g. "resources/Channel".
    path: String,
    structures: Vec<StructureId>,
    owned: HashSet<StructureId>,
    /// Keyed by structure name so iteration is sorted by name.
    imports: BTreeMap<String, Import>,
}

/// An imported structure and the file that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Import {
    pub structure: StructureId,
    pub from: FileId,
}

impl OutputFile {
    fn new(id: FileId, path: String) -> Self {
        Self {
            id,
            path,
            structures: Vec::new(),
            owned: HashSet::new(),
            imports: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Owned structures in registration order.
    pub fn structures(&self) -> &[StructureId] {
        &self.structures
    }

    pub fn owns(&self, structure: StructureId) -> bool {
        self.owned.contains(&structure)
    }

    /// Imported structures sorted by name.
    pub fn imports(&self) -> impl Iterator<Item = (&str, Import)> {
        self.imports.iter().map(|(name, import)| (name.as_str(), *import))
    }

    pub fn imports_structure(&self, structure: StructureId) -> bool {
        self.imports.values().any(|i| i.structure == structure)
    }

    fn assign(&mut self, structure: StructureId) {
        if self.owned.insert(structure) {
            self.structures.push(structure);
            self.imports.retain(|_, import| import.structure != structure);
        }
    }

    /// Record that this file references `structure`. A no-op for structures
    /// the file owns.
    pub fn register_import(&mut self, structure: &Structure) {
        if structure.file() == self.id || self.owns(structure.id()) {
            return;
        }
        self.imports.insert(
            structure.name().to_string(),
            Import {
                structure: structure.id(),
                from: structure.file(),
            },
        );
    }
}

/// All output files, addressed by id or module path.
#[derive(Debug, Clone, Default)]
pub struct OutputGraph {
    files: Vec<OutputFile>,
    by_path: BTreeMap<String, FileId>,
}

impl OutputGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// File for a module path, created on first use.
    pub fn file_for(&mut self, path: &str) -> FileId {
        if let Some(id) = self.by_path.get(path) {
            return *id;
        }
        let id = FileId(self.files.len());
        self.files.push(OutputFile::new(id, path.to_string()));
        self.by_path.insert(path.to_string(), id);
        id
    }

    pub fn get(&self, id: FileId) -> &OutputFile {
        &self.files[id.0]
    }

    pub fn by_path(&self, path: &str) -> Option<&OutputFile> {
        self.by_path.get(path).map(|id| self.get(*id))
    }

    /// Files in creation order.
    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    pub fn assign(&mut self, file: FileId, structure: StructureId) {
        self.files[file.0].assign(structure);
    }

    pub fn register_import(&mut self, file: FileId, structure: &Structure) {
        self.files[file.0].register_import(structure);
    }
}

/// Module path for a source document: "resources/Channel.md" →
/// "resources/Channel".
pub fn module_path(source: &str) -> String {
    let source = source.trim_start_matches("./");
    match source.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') && !stem.is_empty() => stem.to_string(),
        _ => source.to_string(),
    }
}

/// Relative module specifier from one module path to another:
/// ("resources/Guild", "resources/Channel") → "./Channel".
pub fn relative_module(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = from.split('/').collect();
    let from_dir = &from_dir[..from_dir.len().saturating_sub(1)];
    let target: Vec<&str> = to.split('/').collect();

    let common = from_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dir.len() - common;
    let rest = target[common..].join("/");
    if ups == 0 {
        format!("./{}", rest)
    } else {
        format!("{}{}", "../".repeat(ups), rest)
    }
}
