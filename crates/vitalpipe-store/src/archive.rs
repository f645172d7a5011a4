//! Permanent record archive: one collection per record type
//!
//! Layout: `{archive_root}/{type}/{record_id}.json`. Appends are keyed
//! by record id, so re-appending after a partially-flushed sweep is a
//! harmless overwrite rather than a duplicate.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::RecordType;

/// Canonicalized archive document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub name: String,
    /// Parsed event dates keyed by type name ("birth", "death", ...).
    /// A death record commonly carries both a birth and a death date.
    pub dates: BTreeMap<String, NaiveDate>,
    pub location: String,
    pub collection: String,
    pub surname: String,
    pub year: i32,
}

pub struct FsArchive {
    root: PathBuf,
}

impl FsArchive {
    /// Open (creating if needed) the archive and its per-type collections.
    ///
    /// Failure here is the unreachable-infrastructure case and should
    /// abort startup.
    pub fn new(root: &Path) -> Result<Self> {
        for rt in RecordType::ALL {
            let dir = root.join(rt.dir_name());
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create archive dir: {}", dir.display()))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn collection_dir(&self, record_type: RecordType) -> PathBuf {
        self.root.join(record_type.dir_name())
    }

    fn doc_path(&self, record_type: RecordType, id: &str) -> PathBuf {
        self.collection_dir(record_type).join(format!("{id}.json"))
    }

    /// Upsert a document keyed by its record id.
    pub fn append(&self, record_type: RecordType, record: &StoredRecord) -> Result<()> {
        let path = self.doc_path(record_type, &record.id);
        let tmp = self
            .collection_dir(record_type)
            .join(format!("{}.json.tmp", record.id));
        let json = serde_json::to_string_pretty(record).context("archive serialization")?;
        fs::write(&tmp, json).with_context(|| format!("cannot write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot commit {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, record_type: RecordType, id: &str) -> Result<Option<StoredRecord>> {
        let path = self.doc_path(record_type, id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let record = serde_json::from_str(&json)
            .with_context(|| format!("corrupt archive doc: {}", path.display()))?;
        Ok(Some(record))
    }

    /// Number of documents in one collection.
    pub fn count(&self, record_type: RecordType) -> Result<usize> {
        let pattern = self.collection_dir(record_type).join("*.json");
        Ok(glob::glob(&pattern.to_string_lossy())
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .count())
    }
}
