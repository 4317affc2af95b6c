//! Line-array sources: input expansion and file reading.

use crate::document::{self, Document};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of documentation sources.
pub const SOURCE_EXTENSION: &str = "md";

/// One documentation file, split into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Path relative to the source root, `/`-separated.
    pub path: String,
    pub lines: Vec<String>,
}

impl Source {
    pub fn new(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn parse(&self) -> Document {
        document::parse(&self.path, &self.lines)
    }
}

/// Expand input arguments into a sorted, deduplicated list of files.
///
/// Each argument may be a file, a directory (scanned recursively for `.md`
/// files) or a glob pattern.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let pattern = if path.is_dir() {
            format!("{}/**/*.{}", pattern.trim_end_matches('/'), SOURCE_EXTENSION)
        } else {
            pattern.clone()
        };
        let matches: Vec<_> = glob::glob(&pattern)
            .map_err(|source| Error::Glob {
                pattern: pattern.clone(),
                source,
            })?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read every file into a [`Source`] whose path is relative to `root`.
/// Unreadable files are skipped with a warning; reading nothing is an error.
pub fn read_sources(paths: &[PathBuf], root: Option<&Path>) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for path in paths {
        match read_source(path, root) {
            Ok(source) => {
                debug!("read {} ({} lines)", source.path, source.lines.len());
                sources.push(source);
            }
            Err(err) => warn!("skipping {}: {}", path.display(), err),
        }
    }
    if sources.is_empty() {
        return Err(Error::NoInput);
    }
    Ok(sources)
}

fn read_source(path: &Path, root: Option<&Path>) -> Result<Source> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Source::new(relative_path(path, root), &text))
}

/// `path` relative to `root` with `/` separators. Paths outside the root are
/// kept whole.
pub fn relative_path(path: &Path, root: Option<&Path>) -> String {
    let relative = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_strip_root() {
        let root = Path::new("docs");
        assert_eq!(
            relative_path(Path::new("docs/resources/Channel.md"), Some(root)),
            "resources/Channel.md"
        );
        assert_eq!(relative_path(Path::new("./other/A.md"), Some(root)), "other/A.md");
        assert_eq!(relative_path(Path::new("A.md"), None), "A.md");
    }

    #[test]
    fn directories_expand_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("resources")).unwrap();
        fs::write(dir.path().join("resources/Channel.md"), "# C\n").unwrap();
        fs::write(dir.path().join("Intro.md"), "# I\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = expand_inputs(&[dir.path().to_string_lossy().into_owned()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| relative_path(p, Some(dir.path())))
            .collect();
        assert_eq!(names, vec!["Intro.md", "resources/Channel.md"]);
    }

    #[test]
    fn duplicates_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.md");
        fs::write(&file, "# A\n").unwrap();
        let arg = file.to_string_lossy().into_owned();
        let files = expand_inputs(&[arg.clone(), arg]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn unreadable_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("A.md");
        fs::write(&good, "# A\nline\n").unwrap();
        let missing = dir.path().join("missing.md");

        let sources = read_sources(&[good, missing.clone()], Some(dir.path())).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].path, "A.md");
        assert_eq!(sources[0].lines, vec!["# A", "line"]);

        assert!(matches!(read_sources(&[missing], None), Err(Error::NoInput)));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        assert!(matches!(expand_inputs(&["[".to_string()]), Err(Error::Glob { .. })));
    }
}
