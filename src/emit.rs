//! Output files that are removed unless the whole build succeeds.

use std::path::{Path, PathBuf};

use crate::error::{Error, Stage};

/// Writes output files and deletes all of them on drop, unless committed.
///
/// A file is registered before the write starts,
/// so partially written files are removed too.
#[derive(Debug, Default)]
pub struct OutputGuard {
    paths: Vec<PathBuf>,
    committed: bool,
}

impl OutputGuard {
    #[inline]
    pub fn new() -> Self {
        OutputGuard::default()
    }

    /// Writes `data` to `path`.
    pub fn write(&mut self, path: &Path, data: &[u8]) -> Result<(), Error> {
        self.paths.push(path.to_path_buf());
        std::fs::write(path, data).map_err(|source| Error::Io {
            stage: Stage::Writing,
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Wrote {} bytes to '{}'.", data.len(), path.display());
        Ok(())
    }

    /// Keeps all written files.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => log::info!("Removed '{}'.", path.display()),
                Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Failed to remove '{}': {}.", path.display(), e);
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.otf");

        let mut guard = OutputGuard::new();
        guard.write(&path, b"OTTO").unwrap();
        guard.commit();

        assert_eq!(std::fs::read(&path).unwrap(), b"OTTO");
    }

    #[test]
    fn failed_build_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.otf");
        let second = dir.path().join("missing").join("a.ttf");

        let mut guard = OutputGuard::new();
        guard.write(&first, b"OTTO").unwrap();
        assert!(first.exists());

        let err = guard.write(&second, b"\x00\x01\x00\x00").unwrap_err();
        assert_eq!(err.stage(), Stage::Writing);
        assert_eq!(err.exit_code(), 1);

        drop(guard);
        assert!(!first.exists());
        assert!(!second.exists());
    }
}
