//! Library build command.

use std::path::Path;

use anyhow::{Context, Result};
use mvsass_assemble::{format_size, Assembler};

use crate::config::load_config;

/// Run the build command.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!("Assembling library...");

    let file_config = load_config(config_path)?;

    let mut config = file_config.assemble_config();
    config.strict_manifest |= strict;

    let report = Assembler::new(config)
        .assemble()
        .context("Library build failed")?;

    tracing::info!(
        "Combined {} fragments into {} ({}) in {}ms",
        report.fragments.len(),
        report.artifact.display(),
        format_size(report.bytes),
        report.duration_ms
    );

    for path in &report.auxiliary {
        tracing::info!("Copied {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(root: &Path, order: &str) -> std::path::PathBuf {
        let config = format!(
            r#"
[library]
source_root = "{root}/src"
order = {order}
output = "{root}/dist/mvsass.scss"
auxiliary = "{root}/src/ruby/*.rb"
auxiliary_dest = "{root}/dist"
"#,
            root = root.display(),
            order = order,
        );
        let path = root.join("mvsass.toml");
        fs::write(&path, config).unwrap();
        path
    }

    #[test]
    fn builds_from_config_file() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/functions")).unwrap();
        fs::write(root.join("src/_variables.scss"), "$x:1;").unwrap();
        fs::write(root.join("src/functions/_number.scss"), "@function n(){}").unwrap();
        fs::write(root.join("src/_mvs.scss"), "@import 'variables';").unwrap();

        let config = write_config(root, r#"["_variables.scss", "functions/_number.scss"]"#);
        run(&config, false).unwrap();

        assert_eq!(
            fs::read_to_string(root.join("dist/mvsass.scss")).unwrap(),
            "$x:1;@function n(){}"
        );
    }

    #[test]
    fn strict_flag_overrides_config() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/_variables.scss"), "$x:1;").unwrap();

        let config = write_config(root, r#"["_variables.scss", "_gone.scss"]"#);

        assert!(run(&config, false).is_ok());
        let err = run(&config, true).unwrap_err();
        assert!(format!("{:#}", err).contains("_gone.scss"));
    }
}
