//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'mvsass build' to assemble the library.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# mvsass build configuration

[library]
# Directory holding the library fragments
source_root = "src"

# Aggregate file rebuilt by the ordered merge, never concatenated directly
exclude = ["_mvs.scss"]

# Concatenation order; entries may name a trailing part of the path
order = [
    "_variables.scss",
    "functions/_number.scss",
    "functions/_string.scss",
    "functions/_list.scss",
    "functions/_map.scss",
    "functions/_mvs.scss",
]

# Assembled artifact
output = "dist/mvsass.scss"

# Helper files copied next to the artifact
auxiliary = "src/ruby/*.rb"
auxiliary_dest = "dist"

# Fail when an order entry matches no fragment or several fragments
strict_manifest = false

# Fragments missing from `order`: "append" or "exclude"
unlisted = "append"

[example]
root = "examples"
sass_dir = "examples/base/sass"
css_dir = "examples/base/css"
load_paths = ["examples/_core/sass"]
style = "expanded"
optimize = true
beautify = true

[server]
port = 8000
open = "html/index.html"
"#;
