//! docgraph: compile markdown API documentation into a typed symbol graph.
//!
//! Documents are parsed into section trees, every section gets a stable
//! anchor, and the prose type phrases found in `field | type` tables are
//! resolved into [`Symbol`] trees. Sections referenced by links become named
//! interfaces and enums, grouped into output files with the imports they
//! need between them.
//!
//! ```
//! use docgraph::{compile, document, CompilerOptions};
//!
//! let docs = vec![document::parse_str(
//!     "resources/User.md",
//!     "## User Object\n| Field | Type |\n|---|---|\n| id | snowflake |\n",
//! )];
//! let program = compile(&docs, CompilerOptions::default());
//! assert_eq!(program.structures()[0].name(), "User");
//! ```

pub mod compiler;
pub mod document;
pub mod error;
pub mod links;
pub mod output;
pub mod render;
pub mod request;
pub mod source;
pub mod structure;
pub mod symbol;

pub use compiler::{Compiler, CompilerOptions, Program};
pub use document::Document;
pub use error::{Error, Result};
pub use symbol::Symbol;

/// Run a full compilation over `documents`.
pub fn compile(documents: &[Document], options: CompilerOptions) -> Program {
    let mut compiler = Compiler::new(documents, options);
    compiler.compile();
    compiler.finish()
}
