use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use admin_logging::admin_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ExportFile;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("export directory {dir:?} is unusable: {reason}")]
    ExportDir { dir: PathBuf, reason: String },
    #[error("invalid export filename: {0:?}")]
    InvalidFilename(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes export files into one directory via temp file and rename.
///
/// Readers never observe a partially written CSV.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(PersistError::InvalidFilename(filename.to_string()));
        }
        self.prepare_dir()?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        admin_info!("Wrote {} bytes to {}", content.len(), target.display());
        Ok(target)
    }

    /// Creates the export directory on first use.
    fn prepare_dir(&self) -> Result<(), PersistError> {
        let unusable = |reason: String| PersistError::ExportDir {
            dir: self.dir.clone(),
            reason,
        };
        match fs::metadata(&self.dir) {
            Ok(meta) if !meta.is_dir() => return Err(unusable("not a directory".into())),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|e| unusable(e.to_string()))?;
                admin_info!("Created export directory {}", self.dir.display());
            }
            Err(err) => return Err(unusable(err.to_string())),
        }
        Ok(())
    }

    pub fn write_export(&self, export: &ExportFile) -> Result<PathBuf, PersistError> {
        self.write(&export.filename, &export.bytes)
    }
}
