//! Staged output directories.
//!
//! Outputs are written into temporary directories next to their final
//! location and swapped in only once every write has succeeded. A failed run
//! leaves the previous outputs in place.

use std::fs;
use std::io;
use std::env;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::error::AssembleError;

/// A staged replacement for one destination directory.
#[derive(Debug)]
struct Stage {
    root: PathBuf,
    dir: TempDir,
}

/// Set of staged destination directories.
#[derive(Debug)]
pub struct Staging {
    stages: Vec<Stage>,
}

impl Staging {
    /// Create stages for the given destination directories.
    ///
    /// A destination nested inside another shares its ancestor's stage.
    pub fn new(destinations: &[&Path]) -> Result<Self, AssembleError> {
        let mut candidates = Vec::with_capacity(destinations.len());
        for &dest in destinations {
            let normalized = normalize(dest).map_err(|e| AssembleError::write(dest, e))?;
            if dest.file_name().is_none() || normalized.file_name().is_none() {
                return Err(AssembleError::write(
                    dest,
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "destination must be a named directory",
                    ),
                ));
            }
            candidates.push(normalized);
        }
        candidates.sort_by_key(|p| p.components().count());

        let mut roots: Vec<PathBuf> = Vec::new();
        for candidate in candidates {
            if !roots.iter().any(|r| candidate.starts_with(r)) {
                roots.push(candidate);
            }
        }

        let mut stages = Vec::with_capacity(roots.len());
        for root in roots {
            let parent = root.parent().unwrap_or(Path::new("/"));

            fs::create_dir_all(parent).map_err(|e| AssembleError::write(parent, e))?;

            let dir = tempfile::Builder::new()
                .prefix(".mvsass-stage-")
                .tempdir_in(parent)
                .map_err(|e| AssembleError::write(parent, e))?;

            tracing::debug!("Staging {} in {}", root.display(), dir.path().display());
            stages.push(Stage { root, dir });
        }

        Ok(Self { stages })
    }

    /// Destination directories that will be replaced on commit.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.stages.iter().map(|s| s.root.as_path())
    }

    /// Write a file destined for `dest` into its stage.
    pub fn write(&self, dest: &Path, contents: &[u8]) -> io::Result<()> {
        let staged = self.staged_path(dest)?;
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(staged, contents)
    }

    /// Location inside a stage for a final destination path.
    fn staged_path(&self, dest: &Path) -> io::Result<PathBuf> {
        let normalized = normalize(dest)?;
        self.stages
            .iter()
            .find_map(|s| {
                normalized
                    .strip_prefix(&s.root)
                    .ok()
                    .map(|rel| s.dir.path().join(rel))
            })
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is outside every staged destination", dest.display()),
                )
            })
    }

    /// Replace each destination directory with its stage.
    pub fn commit(self) -> Result<(), AssembleError> {
        for stage in self.stages {
            if stage.root.is_dir() {
                fs::remove_dir_all(&stage.root)
                    .map_err(|e| AssembleError::write(&stage.root, e))?;
            } else if stage.root.exists() {
                fs::remove_file(&stage.root).map_err(|e| AssembleError::write(&stage.root, e))?;
            }

            fs::rename(stage.dir.path(), &stage.root)
                .map_err(|e| AssembleError::write(&stage.root, e))?;
        }

        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
///
/// Symlinks are not followed, so two spellings of one directory compare equal
/// only when they differ by `.`/`..` components or by relative versus absolute
/// form.
pub(crate) fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn nested_destinations_share_a_stage() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        let ruby = dist.join("ruby");

        let staging = Staging::new(&[ruby.as_path(), dist.as_path()]).unwrap();

        let roots: Vec<_> = staging.roots().collect();
        assert_eq!(roots, vec![dist.as_path()]);
    }

    #[test]
    fn commit_replaces_previous_contents() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("stale.scss"), "old").unwrap();

        let staging = Staging::new(&[dist.as_path()]).unwrap();
        staging.write(&dist.join("mvsass.scss"), b"new").unwrap();
        staging.commit().unwrap();

        assert!(!dist.join("stale.scss").exists());
        assert_eq!(fs::read_to_string(dist.join("mvsass.scss")).unwrap(), "new");
    }

    #[test]
    fn dropping_without_commit_keeps_previous_outputs() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("mvsass.scss"), "old").unwrap();

        {
            let staging = Staging::new(&[dist.as_path()]).unwrap();
            staging.write(&dist.join("mvsass.scss"), b"half").unwrap();
        }

        assert_eq!(fs::read_to_string(dist.join("mvsass.scss")).unwrap(), "old");
        let leftovers = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1, "stage directory should be removed");
    }

    #[test]
    fn rejects_paths_outside_stages() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        let staging = Staging::new(&[dist.as_path()]).unwrap();

        let err = staging.write(&temp.path().join("elsewhere.txt"), b"x");
        assert!(err.is_err());
    }

    #[test]
    fn respelled_destinations_share_a_stage() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        let respelled = temp.path().join("build/../dist/.");

        let staging = Staging::new(&[dist.as_path(), respelled.as_path()]).unwrap();
        assert_eq!(staging.roots().count(), 1);

        staging.write(&dist.join("mvsass.scss"), b"lib").unwrap();
        staging
            .write(&respelled.join("parentsSelector.rb"), b"rb")
            .unwrap();
        staging.commit().unwrap();

        assert_eq!(fs::read_to_string(dist.join("mvsass.scss")).unwrap(), "lib");
        assert_eq!(
            fs::read_to_string(dist.join("parentsSelector.rb")).unwrap(),
            "rb"
        );
    }

    #[test]
    fn normalizes_relative_and_dotted_paths() {
        let cwd = env::current_dir().unwrap();

        assert_eq!(normalize(Path::new("./dist")).unwrap(), cwd.join("dist"));
        assert_eq!(normalize(Path::new("dist")).unwrap(), cwd.join("dist"));
        assert_eq!(
            normalize(Path::new("/srv/site/./out/../dist")).unwrap(),
            PathBuf::from("/srv/site/dist")
        );
    }

    #[test]
    fn rejects_unnamed_destinations() {
        for dest in ["", ".", "/", "dist/.."] {
            let result = Staging::new(&[Path::new(dest)]);
            assert!(
                matches!(result, Err(AssembleError::WriteFailure { .. })),
                "{dest:?} should be rejected"
            );
        }
    }
}
