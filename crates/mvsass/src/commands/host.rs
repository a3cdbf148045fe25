//! Example hosting command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use mvsass_server::DevServer;

use crate::config::load_config;

/// Run the host command.
pub async fn run(config_path: &Path, port: Option<u16>, dir: Option<PathBuf>) -> Result<()> {
    let file_config = load_config(config_path)?;

    let mut config = file_config.server_config();
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(dir) = dir {
        config.root = dir;
    }
    config.watch = false;

    if !config.root.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'mvsass compile-example' first.",
            config.root.display()
        );
    }

    DevServer::new(config).start().await?;

    Ok(())
}
