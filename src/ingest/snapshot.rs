// src/ingest/snapshot.rs
// =============================================================================
// The bookmark snapshot: one JSON file holding the last list of URLs the
// extension sent us, e.g. ["https://a.example", "https://b.example"].
//
// Every save replaces the whole file. The new contents are written to a
// temporary file next to the snapshot and then renamed over it, so a reader
// always sees either the previous list or the new one, never half a file.
// =============================================================================

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    // Serializes writers inside this process; the rename handles readers
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the snapshot with `urls`
    pub fn save(&self, urls: &[String]) -> Result<()> {
        // The lock guards no data, so a poisoned lock is still usable
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer(&mut tmp, urls)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        log::debug!("Wrote {} bookmark(s) to {}", urls.len(), self.path.display());
        Ok(())
    }

    /// Reads the snapshot. No file yet means no bookmarks yet.
    pub fn load(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        Ok(serde_json::from_str(&content)?)
    }
}
