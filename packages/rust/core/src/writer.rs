//! Output folder writer.
//!
//! Every entity owns a disjoint set of paths under the output folder. The
//! writer records each path it writes during a run; a second write to the
//! same path is a [`BockError::Conflict`] instead of a silent overwrite.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use bock_shared::{BockError, Result};

/// Writes rendered output below one output folder.
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Output path of `file` inside the folder owned by entity `uri`.
    pub fn entity_path(&self, uri: &str, file: &str) -> PathBuf {
        self.root.join(uri.trim_start_matches('/')).join(file)
    }

    /// Write `contents` to `relative` (a path below the output root).
    pub fn write(&self, relative: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
        self.write_path(self.root.join(relative), contents)
    }

    /// Write `file` inside the folder owned by entity `uri`.
    pub fn write_entity(&self, uri: &str, file: &str, contents: &[u8]) -> Result<()> {
        self.write_path(self.entity_path(uri, file), contents)
    }

    fn write_path(&self, path: PathBuf, contents: &[u8]) -> Result<()> {
        self.claim(&path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BockError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| BockError::io(&path, e))?;

        debug!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }

    /// Serialize `value` as pretty JSON into `file` of entity `uri`.
    pub fn write_entity_json<T: Serialize>(&self, uri: &str, file: &str, value: &T) -> Result<()> {
        let json = to_json(value)?;
        self.write_entity(uri, file, &json)
    }

    /// Serialize `value` as pretty JSON to `relative`.
    pub fn write_json<T: Serialize>(&self, relative: impl AsRef<Path>, value: &T) -> Result<()> {
        let json = to_json(value)?;
        self.write(relative, &json)
    }

    /// Recursively copy the directory `src` to `relative` below the output root.
    ///
    /// Returns the number of files copied.
    #[instrument(skip_all, fields(src = %src.display()))]
    pub fn copy_tree(&self, src: &Path, relative: impl AsRef<Path>) -> Result<usize> {
        let dst = self.root.join(relative);
        let mut copied = 0;

        for entry in WalkDir::new(src).sort_by_file_name() {
            let entry = entry.map_err(|e| BockError::Walk {
                path: e.path().unwrap_or(src).to_path_buf(),
                message: e.to_string(),
            })?;

            let Ok(suffix) = entry.path().strip_prefix(src) else {
                continue;
            };
            let target = dst.join(suffix);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| BockError::io(&target, e))?;
                continue;
            }

            self.claim(&target)?;
            std::fs::copy(entry.path(), &target).map_err(|e| BockError::io(&target, e))?;
            copied += 1;
        }

        debug!(copied, dst = %dst.display(), "copied tree");
        Ok(copied)
    }

    /// Number of files written so far.
    pub fn written_count(&self) -> usize {
        self.claimed.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn claim(&self, path: &Path) -> Result<()> {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        if !claimed.insert(path.to_path_buf()) {
            return Err(BockError::conflict(format!(
                "'{}' would be written twice",
                path.display()
            )));
        }
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut json =
        serde_json::to_vec_pretty(value).map_err(|e| BockError::Render(format!("json: {e}")))?;
    json.push(b'\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_entity_files_under_their_uri() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());

        writer
            .write_entity("/Notes/setup", "raw/index.html", b"<p>raw</p>")
            .unwrap();
        let path = dir.path().join("Notes/setup/raw/index.html");
        assert_eq!(std::fs::read(&path).unwrap(), b"<p>raw</p>");
    }

    #[test]
    fn second_write_to_a_path_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());

        writer.write_entity("/a", "index.html", b"one").unwrap();
        let err = writer.write("a/index.html", b"two").unwrap_err();
        assert!(matches!(err, BockError::Conflict { .. }));
        assert_eq!(std::fs::read(dir.path().join("a/index.html")).unwrap(), b"one");
    }

    #[test]
    fn json_is_pretty_and_newline_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());

        writer
            .write_json("tree.json", &serde_json::json!({ "name": "ROOT" }))
            .unwrap();
        let text = std::fs::read_to_string(dir.path().join("tree.json")).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"name\": \"ROOT\""));
    }

    #[test]
    fn copy_tree_copies_nested_files() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("img")).unwrap();
        std::fs::write(src.path().join("style.css"), "body{}").unwrap();
        std::fs::write(src.path().join("img/logo.svg"), "<svg/>").unwrap();

        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path());
        let copied = writer.copy_tree(src.path(), "assets").unwrap();

        assert_eq!(copied, 2);
        assert!(out.path().join("assets/style.css").is_file());
        assert!(out.path().join("assets/img/logo.svg").is_file());
        assert_eq!(writer.written_count(), 2);
    }
}
