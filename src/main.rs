//! docgraph: compile markdown API documentation into type declarations.
//!
//! Two modes:
//!
//! - **stdin mode**: `docgraph < Channel.md` prints the declarations
//! - **file mode**: `docgraph -o types -r docs docs/resources/*.md` writes one
//!   declaration file per source document that defines structures

use anyhow::{Context, Result};
use clap::Parser;
use docgraph::compiler::{CompilerOptions, Program};
use docgraph::links::DEFAULT_NESTING_THRESHOLD;
use docgraph::render::{self, Renderer};
use docgraph::source::{self, Source};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "docgraph",
    about = "Compile markdown API documentation into typed declarations"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: typescript (default, alias ts), json
    #[arg(short = 'f', long, default_value = "typescript")]
    format: String,

    /// Source root stripped from input paths before deriving anchors and
    /// output paths
    #[arg(short = 'r', long)]
    root: Option<PathBuf>,

    /// Document path assumed for stdin input
    #[arg(long, default_value = "stdin.md")]
    stdin_path: String,

    /// Write the documented request manifest (JSON) to this file
    #[arg(long)]
    requests: Option<PathBuf>,

    /// Only emit structures reachable through links
    #[arg(long)]
    linked_only: bool,

    /// Heading level above which ancestors prefix nested anchors
    #[arg(long, default_value_t = DEFAULT_NESTING_THRESHOLD)]
    nesting_threshold: usize,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            nesting_threshold: self.nesting_threshold,
            resolve_all: !self.linked_only,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

/// Log to stderr. `RUST_LOG` overrides the default `warn` filter unless
/// `--verbose` is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// stdin mode: read one document from stdin, print every rendered file.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let sources = vec![Source::new(cli.stdin_path.as_str(), &input)];
    let program = compile(&sources, cli.compiler_options());
    let renderer = render::create_renderer(&cli.format)?;

    let mut rendered = Vec::new();
    for file in program.files() {
        rendered.push(renderer.render(&program, file)?);
    }
    print!("{}", rendered.join("\n"));

    write_requests(&program, cli.requests.as_deref())
}

/// file mode: compile every input together, write one file per module.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    // Fail on a bad format before reading anything.
    let renderer = render::create_renderer(&cli.format)?;

    let input_files = source::expand_inputs(&cli.files)?;
    let sources = source::read_sources(&input_files, cli.root.as_deref())?;
    let program = compile(&sources, cli.compiler_options());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let mut written = 0;
    for file in program.files() {
        let out_path = output_path(output_dir, file.path(), renderer.as_ref());
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let text = renderer.render(&program, file)?;
        fs::write(&out_path, text).with_context(|| format!("failed to write {}", out_path.display()))?;
        debug!("wrote {}", out_path.display());
        written += 1;
    }
    info!(
        "{} structures in {} files from {} sources",
        program.structures().len(),
        written,
        sources.len()
    );

    write_requests(&program, cli.requests.as_deref())
}

fn compile(sources: &[Source], options: CompilerOptions) -> Program {
    let documents: Vec<_> = sources.iter().map(Source::parse).collect();
    docgraph::compile(&documents, options)
}

fn write_requests(program: &Program, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let manifest = program
        .request_manifest()
        .context("failed to serialize request manifest")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, manifest + "\n").with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Output location of a module: "resources/Channel" → `<dir>/resources/Channel.ts`.
fn output_path(output_dir: &Path, module: &str, renderer: &dyn Renderer) -> PathBuf {
    output_dir.join(format!("{}.{}", module, renderer.file_extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_keep_module_directories() {
        let renderer = render::create_renderer("ts").unwrap();
        assert_eq!(
            output_path(Path::new("out"), "resources/Channel", renderer.as_ref()),
            PathBuf::from("out/resources/Channel.ts")
        );
    }

    #[test]
    fn linked_only_disables_resolve_all() {
        let cli = Cli::parse_from(["docgraph", "--linked-only", "a.md"]);
        let options = cli.compiler_options();
        assert!(!options.resolve_all);
        assert_eq!(options.nesting_threshold, DEFAULT_NESTING_THRESHOLD);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["docgraph"]);
        assert_eq!(cli.format, "typescript");
        assert_eq!(cli.stdin_path, "stdin.md");
        assert!(cli.compiler_options().resolve_all);
    }
}
