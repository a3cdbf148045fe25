//! Configuration file loading (mvsass.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mvsass_assemble::{AssembleConfig, UnlistedPolicy};
use mvsass_example::{ExampleConfig, OutputStyle};
use mvsass_server::DevServerConfig;
use serde::Deserialize;

/// Configuration file structure (mvsass.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub example: ExampleSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "mvsass_assemble::config::default_order")]
    pub order: Vec<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_auxiliary")]
    pub auxiliary: Option<String>,
    #[serde(default = "default_auxiliary_dest")]
    pub auxiliary_dest: PathBuf,
    #[serde(default)]
    pub strict_manifest: bool,
    #[serde(default)]
    pub unlisted: UnlistedPolicy,
}

#[derive(Debug, Deserialize)]
pub struct ExampleSettings {
    #[serde(default = "default_example_root")]
    pub root: PathBuf,
    #[serde(default = "default_sass_dir")]
    pub sass_dir: PathBuf,
    #[serde(default = "default_css_dir")]
    pub css_dir: PathBuf,
    #[serde(default = "default_load_paths")]
    pub load_paths: Vec<PathBuf>,
    #[serde(default)]
    pub style: OutputStyle,
    #[serde(default = "default_true")]
    pub optimize: bool,
    #[serde(default = "default_true")]
    pub beautify: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_open")]
    pub open: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        let defaults = AssembleConfig::default();
        Self {
            source_root: defaults.source_root,
            exclude: defaults.exclude,
            order: defaults.order,
            output: defaults.output,
            auxiliary: defaults.auxiliary,
            auxiliary_dest: defaults.auxiliary_dest,
            strict_manifest: defaults.strict_manifest,
            unlisted: defaults.unlisted,
        }
    }
}

impl Default for ExampleSettings {
    fn default() -> Self {
        let defaults = ExampleConfig::default();
        Self {
            root: default_example_root(),
            sass_dir: defaults.sass_dir,
            css_dir: defaults.css_dir,
            load_paths: defaults.load_paths,
            style: defaults.style,
            optimize: defaults.optimize,
            beautify: defaults.beautify,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            open: default_open(),
        }
    }
}

fn default_source_root() -> PathBuf {
    AssembleConfig::default().source_root
}
fn default_exclude() -> Vec<String> {
    AssembleConfig::default().exclude
}
fn default_output() -> PathBuf {
    AssembleConfig::default().output
}
fn default_auxiliary() -> Option<String> {
    AssembleConfig::default().auxiliary
}
fn default_auxiliary_dest() -> PathBuf {
    AssembleConfig::default().auxiliary_dest
}
fn default_example_root() -> PathBuf {
    PathBuf::from("examples")
}
fn default_sass_dir() -> PathBuf {
    ExampleConfig::default().sass_dir
}
fn default_css_dir() -> PathBuf {
    ExampleConfig::default().css_dir
}
fn default_load_paths() -> Vec<PathBuf> {
    ExampleConfig::default().load_paths
}
fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_open() -> String {
    "html/index.html".to_string()
}

impl ConfigFile {
    /// Assembler configuration.
    pub fn assemble_config(&self) -> AssembleConfig {
        let lib = &self.library;
        AssembleConfig {
            source_root: lib.source_root.clone(),
            exclude: lib.exclude.clone(),
            order: lib.order.clone(),
            output: lib.output.clone(),
            auxiliary: lib.auxiliary.clone(),
            auxiliary_dest: lib.auxiliary_dest.clone(),
            strict_manifest: lib.strict_manifest,
            unlisted: lib.unlisted,
            ..Default::default()
        }
    }

    /// Example pipeline configuration.
    pub fn example_config(&self) -> ExampleConfig {
        let ex = &self.example;
        ExampleConfig {
            sass_dir: ex.sass_dir.clone(),
            css_dir: ex.css_dir.clone(),
            load_paths: ex.load_paths.clone(),
            style: ex.style,
            optimize: ex.optimize,
            beautify: ex.beautify,
            ..Default::default()
        }
    }

    /// Development server configuration.
    pub fn server_config(&self) -> DevServerConfig {
        DevServerConfig {
            root: self.example.root.clone(),
            port: self.server.port,
            host: self.server.host.clone(),
            open_path: self.server.open.clone(),
            example: self.example_config(),
            ..Default::default()
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}
