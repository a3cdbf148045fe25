//! Clean commands.

use std::path::Path;

use anyhow::{Context, Result};
use mvsass_assemble::clean_outputs;
use mvsass_example::clean_css_dirs;

use crate::config::load_config;

/// Remove compiled example CSS, and the library output when `library` is set.
pub fn run(config_path: &Path, library: bool) -> Result<()> {
    let file_config = load_config(config_path)?;

    let removed = clean_css_dirs(&file_config.example.root)
        .context("Failed to clean example CSS")?;

    let mut count = removed.len();

    if library {
        let removed = clean_outputs(&file_config.assemble_config())
            .context("Failed to clean library output")?;
        count += removed.len();
    }

    if count == 0 {
        tracing::info!("Nothing to clean");
    }

    Ok(())
}
