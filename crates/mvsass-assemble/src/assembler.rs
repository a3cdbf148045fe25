//! Library assembly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AssembleConfig;
use crate::error::AssembleError;
use crate::fragment::{self, Fragment};
use crate::manifest::OrderManifest;
use crate::stage::{normalize, Staging};

/// Result of an assembly run.
#[derive(Debug)]
pub struct AssembleReport {
    /// Path of the written artifact
    pub artifact: PathBuf,

    /// Relative paths of the concatenated fragments, in order
    pub fragments: Vec<String>,

    /// Manifest entries that matched no fragment
    pub skipped: Vec<String>,

    /// Paths of the copied auxiliary files
    pub auxiliary: Vec<PathBuf>,

    /// Size of the artifact in bytes
    pub bytes: u64,

    /// Total run time in milliseconds
    pub duration_ms: u64,
}

/// An auxiliary file read ahead of the write phase.
struct AuxiliaryFile {
    source: PathBuf,
    name: std::ffi::OsString,
    contents: Vec<u8>,
}

/// Assembles the library artifact.
///
/// Callers must not run two assemblies against the same destination at once.
pub struct Assembler {
    config: AssembleConfig,
}

impl Assembler {
    /// Create a new assembler.
    pub fn new(config: AssembleConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AssembleConfig {
        &self.config
    }

    /// Assemble the library and copy the auxiliary files.
    ///
    /// Every input is read before any destination is touched, and the
    /// destinations are replaced only once all outputs are written.
    pub fn assemble(&self) -> Result<AssembleReport, AssembleError> {
        let start = Instant::now();
        let config = &self.config;

        let fragments =
            fragment::discover(&config.source_root, &config.extension, &config.exclude)?;
        tracing::debug!(
            "Discovered {} fragments under {}",
            fragments.len(),
            config.source_root.display()
        );

        let manifest = OrderManifest::new(&config.order)?;
        let ordered = manifest.order(fragments, config.unlisted, config.strict_manifest)?;

        for entry in &ordered.skipped {
            tracing::warn!("Manifest entry '{}' matched no fragment, skipping", entry);
        }

        let artifact = concatenate(&ordered.fragments);
        let auxiliary = self.read_auxiliary()?;

        let artifact_dir = config.output.parent().unwrap_or(Path::new(""));
        self.check_destination(artifact_dir)?;
        self.check_destination(&config.auxiliary_dest)?;

        let staging = Staging::new(&[artifact_dir, config.auxiliary_dest.as_path()])?;

        staging
            .write(&config.output, &artifact)
            .map_err(|e| AssembleError::write(&config.output, e))?;

        let mut copied = Vec::with_capacity(auxiliary.len());
        for file in &auxiliary {
            let dest = config.auxiliary_dest.join(&file.name);
            staging
                .write(&dest, &file.contents)
                .map_err(|e| AssembleError::AuxiliaryCopyFailure {
                    path: file.source.clone(),
                    source: e,
                })?;
            copied.push(dest);
        }

        staging.commit()?;

        let name = config
            .output
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("artifact");
        tracing::info!("Combined {} {}", name, format_size(artifact.len() as u64));
        if !copied.is_empty() {
            let total: usize = auxiliary.iter().map(|f| f.contents.len()).sum();
            tracing::info!(
                "Copied {} auxiliary files {}",
                copied.len(),
                format_size(total as u64)
            );
        }

        Ok(AssembleReport {
            artifact: config.output.clone(),
            fragments: ordered.fragments.into_iter().map(|f| f.relative).collect(),
            skipped: ordered.skipped,
            auxiliary: copied,
            bytes: artifact.len() as u64,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Expand the auxiliary glob and read every match.
    fn read_auxiliary(&self) -> Result<Vec<AuxiliaryFile>, AssembleError> {
        let Some(pattern) = &self.config.auxiliary else {
            return Ok(Vec::new());
        };

        let paths = glob::glob(pattern).map_err(|e| AssembleError::pattern(pattern, e))?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| AssembleError::AuxiliaryCopyFailure {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;

            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().map(|n| n.to_os_string()) else {
                continue;
            };

            let contents = fs::read(&path).map_err(|e| AssembleError::AuxiliaryCopyFailure {
                path: path.clone(),
                source: e,
            })?;

            files.push(AuxiliaryFile {
                source: path,
                name,
                contents,
            });
        }

        files.sort_by(|a, b| a.source.cmp(&b.source));

        if files.is_empty() {
            tracing::warn!("Auxiliary pattern '{}' matched no files", pattern);
        }

        Ok(files)
    }

    /// Refuse destinations whose removal would delete the sources.
    fn check_destination(&self, dest: &Path) -> Result<(), AssembleError> {
        if dest.file_name().is_none() {
            return Ok(());
        }

        let dest_abs = normalize(dest).map_err(|e| AssembleError::write(dest, e))?;
        let source_abs = normalize(&self.config.source_root)
            .map_err(|e| AssembleError::read(&self.config.source_root, e))?;

        if source_abs.starts_with(&dest_abs) {
            return Err(AssembleError::write(
                dest,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "destination contains the source root {}",
                        self.config.source_root.display()
                    ),
                ),
            ));
        }
        Ok(())
    }
}

/// Concatenate fragment contents verbatim, in order.
pub fn concatenate(fragments: &[Fragment]) -> Vec<u8> {
    let total = fragments.iter().map(|f| f.contents.len()).sum();
    let mut out = Vec::with_capacity(total);
    for fragment in fragments {
        tracing::debug!(
            "+ {} ({})",
            fragment.relative,
            format_size(fragment.contents.len() as u64)
        );
        out.extend_from_slice(&fragment.contents);
    }
    out
}

/// Remove the artifact directory and the auxiliary destination.
///
/// Returns the directories that were removed.
pub fn clean_outputs(config: &AssembleConfig) -> Result<Vec<PathBuf>, AssembleError> {
    let mut targets: Vec<&Path> = Vec::new();
    if let Some(dir) = config.output.parent().filter(|p| p.file_name().is_some()) {
        targets.push(dir);
    }
    if config.auxiliary_dest.file_name().is_some() {
        targets.push(config.auxiliary_dest.as_path());
    }

    let mut removed = Vec::new();
    for target in targets {
        if !target.is_dir() {
            continue;
        }
        fs::remove_dir_all(target).map_err(|e| AssembleError::write(target, e))?;
        tracing::info!("Removed {}", target.display());
        removed.push(target.to_path_buf());
    }

    Ok(removed)
}

/// Human-readable size using decimal units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];

    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}
