//! Example site commands.

use std::path::Path;

use anyhow::{Context, Result};
use mvsass_example::{clean_css_dirs, ExampleCompiler};
use mvsass_server::DevServer;

use crate::config::load_config;

/// Compile the example stylesheets once.
pub fn compile(config_path: &Path) -> Result<()> {
    let file_config = load_config(config_path)?;

    let sheets = ExampleCompiler::new(file_config.example_config())
        .compile_all()
        .context("Example build failed")?;

    for sheet in &sheets {
        tracing::info!("Wrote {}", sheet.css.display());
    }

    Ok(())
}

/// Clean and compile the examples, then watch and host them.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let file_config = load_config(config_path)?;

    clean_css_dirs(&file_config.example.root).context("Failed to clean example CSS")?;

    // Compile errors are logged; the server still starts
    match ExampleCompiler::new(file_config.example_config()).compile_all() {
        Ok(sheets) => tracing::info!("Compiled {} example stylesheets", sheets.len()),
        Err(e) => tracing::error!("Example build failed: {}", e),
    }

    let mut config = file_config.server_config();
    if let Some(port) = port {
        config.port = port;
    }
    config.open = open;

    tracing::info!("Starting example server on port {}", config.port);

    DevServer::new(config).start().await?;

    Ok(())
}
