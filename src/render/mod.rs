//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod typescript;

use crate::compiler::Program;
use crate::output::OutputFile;
use crate::{Error, Result};

/// Trait for rendering one output file of a compiled program.
pub trait Renderer {
    fn render(&self, program: &Program, file: &OutputFile) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "typescript" | "ts" => Ok(Box::new(typescript::TypeScriptRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}
