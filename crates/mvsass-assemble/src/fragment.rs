//! Fragment discovery.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::AssembleError;

/// Match options shared by exclusion and manifest patterns.
///
/// `*` never crosses a `/`, so `_mvs.scss` only names the top-level file.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One source stylesheet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Path relative to the source root, `/`-separated
    pub relative: String,

    /// Path on disk
    pub path: PathBuf,

    /// Raw file contents
    pub contents: Vec<u8>,
}

impl Fragment {
    /// Trailing runs of path components, longest first.
    ///
    /// `functions/_number.scss` yields `functions/_number.scss` then `_number.scss`.
    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        let rel = self.relative.as_str();
        std::iter::once(rel).chain(rel.match_indices('/').map(move |(i, _)| &rel[i + 1..]))
    }
}

/// Compile a list of glob patterns.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, AssembleError> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| AssembleError::pattern(p, e)))
        .collect()
}

/// Discover every fragment under `root` with the given extension.
///
/// Fragments whose relative path matches an `exclude` glob are dropped. The
/// result is sorted by relative path and fully read into memory.
pub fn discover(
    root: &Path,
    extension: &str,
    exclude: &[String],
) -> Result<Vec<Fragment>, AssembleError> {
    if !root.is_dir() {
        return Err(AssembleError::MissingSourceRoot {
            path: root.to_path_buf(),
        });
    }

    let exclude = compile_patterns(exclude)?;
    let mut fragments = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            AssembleError::read(path, e.into())
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != extension {
            continue;
        }

        let relative = relative_slash_path(root, path);

        if exclude
            .iter()
            .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
        {
            tracing::debug!("Excluded {}", relative);
            continue;
        }

        let contents = fs::read(path).map_err(|e| AssembleError::read(path, e))?;

        fragments.push(Fragment {
            relative,
            path: path.to_path_buf(),
            contents,
        });
    }

    fragments.sort_by(|a, b| a.relative.cmp(&b.relative));

    Ok(fragments)
}

/// Relative path with `/` separators regardless of platform.
fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
