//! Assembly configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// What to do with fragments the manifest does not name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlistedPolicy {
    /// Append them after the manifested fragments, in lexical path order
    #[default]
    Append,

    /// Leave them out of the artifact
    Exclude,
}

/// Configuration for assembling the library.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Directory scanned recursively for fragments
    pub source_root: PathBuf,

    /// Fragment file extension, without the dot
    pub extension: String,

    /// Globs, relative to the source root, removed before ordering
    pub exclude: Vec<String>,

    /// Order manifest entries
    pub order: Vec<String>,

    /// Path of the assembled artifact
    pub output: PathBuf,

    /// Glob of auxiliary files copied next to the artifact
    pub auxiliary: Option<String>,

    /// Directory receiving the auxiliary files
    pub auxiliary_dest: PathBuf,

    /// Fail on manifest entries that match zero or several fragments
    pub strict_manifest: bool,

    /// Handling of fragments absent from the manifest
    pub unlisted: UnlistedPolicy,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            extension: "scss".to_string(),
            exclude: vec!["_mvs.scss".to_string()],
            order: default_order(),
            output: PathBuf::from("dist/mvsass.scss"),
            auxiliary: Some("src/ruby/*.rb".to_string()),
            auxiliary_dest: PathBuf::from("dist"),
            strict_manifest: false,
            unlisted: UnlistedPolicy::Append,
        }
    }
}

/// The library's canonical fragment order.
pub fn default_order() -> Vec<String> {
    [
        "_variables.scss",
        "functions/_number.scss",
        "functions/_string.scss",
        "functions/_list.scss",
        "functions/_map.scss",
        "functions/_mvs.scss",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
