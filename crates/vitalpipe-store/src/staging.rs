//! Crash-safe staging area between workers and the flusher
//!
//! Layout: `{staging_root}/{type}/{task_id}.json`, one file per task that
//! yielded records, holding the ordered record list as pretty-printed
//! JSON so staged data stays inspectable with a pager. Files are
//! published by temp-write-fsync-rename: a sweep either sees a complete
//! file or nothing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::Record;
use crate::task::RecordType;

pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Open (creating if needed) the staging area and its type dirs.
    pub fn new(root: &Path) -> Result<Self> {
        for rt in RecordType::ALL {
            let dir = root.join(rt.dir_name());
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create staging dir: {}", dir.display()))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn type_dir(&self, record_type: RecordType) -> PathBuf {
        self.root.join(record_type.dir_name())
    }

    pub fn file_path(&self, record_type: RecordType, task_id: &str) -> PathBuf {
        self.type_dir(record_type).join(format!("{task_id}.json"))
    }

    /// Atomically publish the record list for a task.
    ///
    /// The rename only happens after the temp file is synced, so a file
    /// that is visible under its final name is durably complete. Callers
    /// mark the owning task completed strictly after this returns.
    pub fn stage(
        &self,
        record_type: RecordType,
        task_id: &str,
        records: &[Record],
    ) -> Result<PathBuf> {
        let path = self.file_path(record_type, task_id);
        let tmp = self.type_dir(record_type).join(format!("{task_id}.json.tmp"));

        let json = serde_json::to_string_pretty(records).context("staging serialization")?;
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("cannot create {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("cannot write {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("cannot sync {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot publish {}", path.display()))?;
        Ok(path)
    }

    /// Staged files for one type, sorted; in-flight `.tmp` files are
    /// invisible here.
    pub fn list(&self, record_type: RecordType) -> Result<Vec<PathBuf>> {
        let pattern = self.type_dir(record_type).join("*.json");
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Load a staged record list.
    pub fn load(path: &Path) -> Result<Vec<Record>> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt staging file: {}", path.display()))
    }

    /// Remove a fully-consumed staged file.
    pub fn remove(path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("cannot remove {}", path.display()))
    }

    /// Delete `.tmp` leftovers from workers that died mid-write.
    pub fn cleanup_tmp(&self) -> Result<usize> {
        let mut count = 0;
        for rt in RecordType::ALL {
            let pattern = self.type_dir(rt).join("*.json.tmp");
            for entry in glob::glob(&pattern.to_string_lossy()).context("invalid glob pattern")? {
                let Ok(path) = entry else { continue };
                log::info!("removing stale staging tmp: {}", path.display());
                fs::remove_file(&path)
                    .with_context(|| format!("cannot remove {}", path.display()))?;
                count += 1;
            }
        }
        Ok(count)
    }
}
