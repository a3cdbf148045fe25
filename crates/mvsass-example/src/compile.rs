//! Example stylesheet compilation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Deserialize;
use walkdir::WalkDir;

use mvsass_assemble::format_size;

use crate::optimize::CssPipeline;

/// Output style of the compiled CSS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// One declaration per line; `nested` is accepted as an alias
    #[default]
    #[serde(alias = "nested")]
    Expanded,

    /// Everything on one line
    Compressed,
}

impl From<OutputStyle> for grass::OutputStyle {
    fn from(style: OutputStyle) -> Self {
        match style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        }
    }
}

/// Configuration for compiling the example site.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    /// Directory holding the example SCSS
    pub sass_dir: PathBuf,

    /// Directory receiving compiled CSS
    pub css_dir: PathBuf,

    /// Extra import paths
    pub load_paths: Vec<PathBuf>,

    /// Compiled output style
    pub style: OutputStyle,

    /// Write `-opt` variants
    pub optimize: bool,

    /// Write `-opt-beauty` variants
    pub beautify: bool,

    /// Indentation used by the beautifier
    pub indent: String,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            sass_dir: PathBuf::from("examples/base/sass"),
            css_dir: PathBuf::from("examples/base/css"),
            load_paths: vec![PathBuf::from("examples/_core/sass")],
            style: OutputStyle::Expanded,
            optimize: true,
            beautify: true,
            indent: "\t".to_string(),
        }
    }
}

/// One compiled example stylesheet.
#[derive(Debug, Clone)]
pub struct CompiledSheet {
    /// Source SCSS file
    pub source: PathBuf,

    /// Compiled CSS
    pub css: PathBuf,

    /// Optimized CSS, if written
    pub optimized: Option<PathBuf>,

    /// Beautified optimized CSS, if written
    pub beautified: Option<PathBuf>,
}

/// Errors that can occur while compiling examples.
#[derive(Debug, thiserror::Error)]
pub enum ExampleError {
    #[error("Example sources not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to read {}: {message}", path.display())]
    ReadError { path: PathBuf, message: String },

    #[error("Failed to compile {}: {message}", path.display())]
    CompileError { path: PathBuf, message: String },

    #[error("Failed to optimize {}: {message}", path.display())]
    OptimizeError { path: PathBuf, message: String },

    #[error("Failed to write {}: {message}", path.display())]
    WriteError { path: PathBuf, message: String },
}

/// Compiles the example site's stylesheets.
pub struct ExampleCompiler {
    config: ExampleConfig,
}

impl ExampleCompiler {
    /// Create a new example compiler.
    pub fn new(config: ExampleConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ExampleConfig {
        &self.config
    }

    /// Compile every entry stylesheet.
    pub fn compile_all(&self) -> Result<Vec<CompiledSheet>, ExampleError> {
        let start = Instant::now();
        let sheets = self.discover_sheets()?;

        let results: Vec<Result<CompiledSheet, ExampleError>> = sheets
            .par_iter()
            .map(|path| self.compile_sheet(path))
            .collect();

        let compiled = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Compiled {} example stylesheets in {}ms",
            compiled.len(),
            start.elapsed().as_millis()
        );

        Ok(compiled)
    }

    /// Entry stylesheets: `.scss` files that are not `_` partials.
    pub fn discover_sheets(&self) -> Result<Vec<PathBuf>, ExampleError> {
        if !self.config.sass_dir.is_dir() {
            return Err(ExampleError::SourceNotFound(self.config.sass_dir.clone()));
        }

        let mut sheets = Vec::new();

        for entry in WalkDir::new(&self.config.sass_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ExampleError::ReadError {
                path: e.path().unwrap_or(&self.config.sass_dir).to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "scss" {
                continue;
            }

            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if filename.starts_with('_') {
                continue;
            }

            sheets.push(path.to_path_buf());
        }

        Ok(sheets)
    }

    /// Compile one stylesheet and write its variants.
    pub fn compile_sheet(&self, source: &Path) -> Result<CompiledSheet, ExampleError> {
        let relative = source.strip_prefix(&self.config.sass_dir).unwrap_or(source);
        let css_path = self.config.css_dir.join(relative).with_extension("css");

        let start = Instant::now();
        let css = self.compile_scss(source)?;
        tracing::info!(
            "Compile time {}ms, {} before optimization: {}",
            start.elapsed().as_millis(),
            css_path.display(),
            format_size(css.len() as u64)
        );
        write_output(&css_path, &css)?;

        let mut sheet = CompiledSheet {
            source: source.to_path_buf(),
            css: css_path.clone(),
            optimized: None,
            beautified: None,
        };

        if !self.config.optimize {
            return Ok(sheet);
        }

        let start = Instant::now();
        let optimized =
            CssPipeline::optimize(&css).map_err(|message| ExampleError::OptimizeError {
                path: css_path.clone(),
                message,
            })?;
        let opt_path = with_suffix(&css_path, "-opt");
        tracing::info!(
            "Optimization time {}ms, {} after optimization: {}",
            start.elapsed().as_millis(),
            opt_path.display(),
            format_size(optimized.len() as u64)
        );
        write_output(&opt_path, &optimized)?;

        if self.config.beautify {
            let start = Instant::now();
            let beautified = CssPipeline::beautify(&optimized, &self.config.indent).map_err(
                |message| ExampleError::OptimizeError {
                    path: opt_path.clone(),
                    message,
                },
            )?;
            let beauty_path = with_suffix(&opt_path, "-beauty");
            tracing::info!(
                "Beautifying time {}ms, {} after beautifying: {}",
                start.elapsed().as_millis(),
                beauty_path.display(),
                format_size(beautified.len() as u64)
            );
            write_output(&beauty_path, &beautified)?;
            sheet.beautified = Some(beauty_path);
        }

        sheet.optimized = Some(opt_path);

        Ok(sheet)
    }

    /// Run grass over one file.
    fn compile_scss(&self, source: &Path) -> Result<String, ExampleError> {
        let mut options = grass::Options::default().style(self.config.style.into());
        for path in &self.config.load_paths {
            options = options.load_path(path);
        }

        grass::from_path(source, &options).map_err(|e| ExampleError::CompileError {
            path: source.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Insert `suffix` between a file's stem and extension.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

fn write_output(path: &Path, contents: &str) -> Result<(), ExampleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExampleError::WriteError {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    fs::write(path, contents).map_err(|e| ExampleError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Remove every directory named `css` below `root`.
///
/// Returns the removed directories.
pub fn clean_css_dirs(root: &Path) -> Result<Vec<PathBuf>, ExampleError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut targets = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| ExampleError::ReadError {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_dir() && entry.depth() > 0 && entry.file_name() == "css" {
            targets.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    for target in &targets {
        fs::remove_dir_all(target).map_err(|e| ExampleError::WriteError {
            path: target.clone(),
            message: e.to_string(),
        })?;
        tracing::info!("Removed {}", target.display());
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config_in(root: &Path) -> ExampleConfig {
        ExampleConfig {
            sass_dir: root.join("examples/base/sass"),
            css_dir: root.join("examples/base/css"),
            load_paths: vec![root.join("examples/_core/sass")],
            ..Default::default()
        }
    }

    #[test]
    fn compiles_all_variants() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "examples/_core/sass/_core.scss", "$accent: #336699;");
        write(
            root,
            "examples/base/sass/main.scss",
            "@import 'core';\n.box { .title { color: $accent; } }\n",
        );

        let compiled = ExampleCompiler::new(config_in(root)).compile_all().unwrap();

        assert_eq!(compiled.len(), 1);
        let sheet = &compiled[0];
        let css_dir = root.join("examples/base/css");
        assert_eq!(sheet.css, css_dir.join("main.css"));
        assert_eq!(sheet.optimized, Some(css_dir.join("main-opt.css")));
        assert_eq!(sheet.beautified, Some(css_dir.join("main-opt-beauty.css")));

        let css = fs::read_to_string(&sheet.css).unwrap();
        assert!(css.contains(".box .title"));
        assert!(css.contains("#336699"));

        let optimized = fs::read_to_string(css_dir.join("main-opt.css")).unwrap();
        assert!(!optimized.contains('\n'));

        let beautified = fs::read_to_string(css_dir.join("main-opt-beauty.css")).unwrap();
        assert!(beautified.contains("\n\tcolor"));
    }

    #[test]
    fn skips_partials() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "examples/base/sass/_partial.scss", ".p { color: red; }");
        write(root, "examples/base/sass/site.scss", ".s { color: red; }");

        let sheets = ExampleCompiler::new(config_in(root)).discover_sheets().unwrap();

        assert_eq!(sheets, vec![root.join("examples/base/sass/site.scss")]);
    }

    #[test]
    fn optimization_can_be_disabled() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "examples/base/sass/site.scss", ".s { color: red; }");

        let config = ExampleConfig {
            optimize: false,
            ..config_in(root)
        };
        let compiled = ExampleCompiler::new(config).compile_all().unwrap();

        assert_eq!(compiled[0].optimized, None);
        assert!(!root.join("examples/base/css/site-opt.css").exists());
    }

    #[test]
    fn reports_compile_errors() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "examples/base/sass/broken.scss", ".a { color: $undefined; }");

        let result = ExampleCompiler::new(config_in(root)).compile_all();

        assert!(matches!(result, Err(ExampleError::CompileError { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entries_fail_discovery() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "examples/base/sass/site.scss", ".s { color: red; }");
        let dangling = root.join("examples/base/sass/gone");
        std::os::unix::fs::symlink(root.join("nowhere"), &dangling).unwrap();

        let result = ExampleCompiler::new(config_in(root)).discover_sheets();

        match result {
            Err(ExampleError::ReadError { path, .. }) => assert_eq!(path, dangling),
            other => panic!("expected ReadError, got {other:?}"),
        }
    }

    #[test]
    fn missing_sources_are_reported() {
        let temp = tempdir().unwrap();
        let result = ExampleCompiler::new(config_in(temp.path())).compile_all();
        assert!(matches!(result, Err(ExampleError::SourceNotFound(_))));
    }

    #[test]
    fn cleans_nested_css_dirs() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("examples");
        write(&root, "base/css/main.css", "a{}");
        write(&root, "other/css/x.css", "b{}");
        write(&root, "base/sass/main.scss", "a{}");

        let removed = clean_css_dirs(&root).unwrap();

        assert_eq!(removed, vec![root.join("base/css"), root.join("other/css")]);
        assert!(root.join("base/sass/main.scss").exists());
    }

    #[test]
    fn suffixes_file_names() {
        assert_eq!(
            with_suffix(Path::new("css/main.css"), "-opt"),
            PathBuf::from("css/main-opt.css")
        );
        assert_eq!(
            with_suffix(Path::new("css/main-opt.css"), "-beauty"),
            PathBuf::from("css/main-opt-beauty.css")
        );
    }
}
