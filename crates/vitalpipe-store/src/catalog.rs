//! Task catalog: a uniquely-keyed collection of task documents
//!
//! Layout: one JSON document per task, `{catalog_dir}/{task_id}.json`.
//! Every mutation is a single-file atomic operation so concurrent
//! planners and workers never need a shared lock:
//! - insert writes a tmp doc and claims the final name with a hard
//!   link, so the claim is the uniqueness check and a torn write is
//!   never visible under the final name
//! - completion rewrites the document via temp-write-then-rename

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::task::{RecordType, Task};

/// The catalog's four conditional operations.
///
/// Duplicate inserts and duplicate completion marks are silent no-ops,
/// never errors; only catalog unavailability surfaces as Err.
pub trait Catalog {
    fn exists(&self, id: &str) -> Result<bool>;

    /// Returns true iff the task was newly created.
    fn insert_if_absent(&self, task: &Task) -> Result<bool>;

    /// Pending tasks for (type, year), sorted by id for resumable
    /// iteration, at most `limit`.
    fn list_pending(&self, record_type: RecordType, year: i32, limit: usize) -> Result<Vec<Task>>;

    /// Idempotent: marking an already-completed id succeeds silently.
    fn mark_completed(&self, id: &str) -> Result<()>;
}

/// Filesystem-backed catalog.
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    /// Open (creating if needed) a catalog rooted at `root`.
    ///
    /// Failure here is the unreachable-infrastructure case and should
    /// abort startup.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("cannot create catalog dir: {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read_task(&self, path: &Path) -> Result<Task> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read task doc: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt task doc: {}", path.display()))
    }

    fn write_task(&self, task: &Task) -> Result<()> {
        let path = self.doc_path(&task.id);
        let tmp = self.root.join(format!("{}.json.tmp", task.id));
        let json = serde_json::to_string_pretty(task).context("task doc serialization")?;
        fs::write(&tmp, json)
            .with_context(|| format!("cannot write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot commit {}", path.display()))?;
        Ok(())
    }

    /// (pending, completed) task counts per record type, for status views.
    pub fn counts(&self) -> Result<std::collections::BTreeMap<u8, (usize, usize)>> {
        let pattern = self.root.join("*.json");
        let mut counts = std::collections::BTreeMap::new();
        for rt in RecordType::ALL {
            counts.insert(rt.code(), (0, 0));
        }

        for entry in glob::glob(&pattern.to_string_lossy()).context("invalid glob pattern")? {
            let Ok(path) = entry else { continue };
            match self.read_task(&path) {
                Ok(task) => {
                    let slot = counts.entry(task.record_type.code()).or_insert((0, 0));
                    if task.completed {
                        slot.1 += 1;
                    } else {
                        slot.0 += 1;
                    }
                }
                Err(e) => log::warn!("skipping catalog entry: {e:#}"),
            }
        }
        Ok(counts)
    }
}

impl Catalog for FsCatalog {
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.doc_path(id).exists())
    }

    fn insert_if_absent(&self, task: &Task) -> Result<bool> {
        let path = self.doc_path(&task.id);
        // the pid keeps concurrent planner processes off each other's
        // tmp, and away from the tmp `mark_completed` renames over
        let tmp = self
            .root
            .join(format!("{}.{}.json.tmp", task.id, std::process::id()));
        let json = serde_json::to_string_pretty(task).context("task doc serialization")?;
        fs::write(&tmp, json).with_context(|| format!("cannot write {}", tmp.display()))?;

        let claimed = match fs::hard_link(&tmp, &path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => false,
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                return Err(e)
                    .with_context(|| format!("cannot create task doc: {}", path.display()));
            }
        };
        fs::remove_file(&tmp).with_context(|| format!("cannot remove {}", tmp.display()))?;
        Ok(claimed)
    }

    fn list_pending(&self, record_type: RecordType, year: i32, limit: usize) -> Result<Vec<Task>> {
        let pattern = self.root.join("*.json");
        let mut pending = Vec::new();

        for entry in glob::glob(&pattern.to_string_lossy()).context("invalid glob pattern")? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("catalog listing: {e}");
                    continue;
                }
            };
            match self.read_task(&path) {
                Ok(task) => {
                    if task.record_type == record_type && task.year == year && !task.completed {
                        pending.push(task);
                    }
                }
                Err(e) => log::warn!("skipping catalog entry: {e:#}"),
            }
        }

        pending.sort_by(|a, b| a.id.cmp(&b.id));
        pending.truncate(limit);
        Ok(pending)
    }

    fn mark_completed(&self, id: &str) -> Result<()> {
        let path = self.doc_path(id);
        let mut task = self.read_task(&path)?;
        if task.completed {
            return Ok(());
        }
        task.completed = true;
        self.write_task(&task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (tempfile::TempDir, FsCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let cat = FsCatalog::new(dir.path()).unwrap();
        (dir, cat)
    }

    #[test]
    fn insert_then_exists() {
        let (_dir, cat) = catalog();
        let task = Task::new(RecordType::Death, 1, 2000, 1);
        assert!(!cat.exists(&task.id).unwrap());
        assert!(cat.insert_if_absent(&task).unwrap());
        assert!(cat.exists(&task.id).unwrap());
    }

    #[test]
    fn duplicate_insert_is_silent_noop() {
        let (_dir, cat) = catalog();
        let task = Task::new(RecordType::Death, 1, 2000, 1);
        assert!(cat.insert_if_absent(&task).unwrap());
        assert!(!cat.insert_if_absent(&task).unwrap());
        assert_eq!(
            cat.list_pending(RecordType::Death, 2000, 100).unwrap().len(),
            1
        );
    }

    #[test]
    fn interrupted_insert_leaves_no_claimed_doc() {
        // a crash before the link leaves only a tmp: the id does not
        // exist, stays plannable, and a later insert claims it cleanly
        let (dir, cat) = catalog();
        let task = Task::new(RecordType::Death, 1, 2000, 1);
        let tmp = dir
            .path()
            .join(format!("{}.{}.json.tmp", task.id, std::process::id()));
        fs::write(&tmp, b"{ torn").unwrap();

        assert!(!cat.exists(&task.id).unwrap());
        assert!(cat.insert_if_absent(&task).unwrap());
        assert!(!tmp.exists());

        let pending = cat.list_pending(RecordType::Death, 2000, 10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, task.id);
    }

    #[test]
    fn list_pending_filters_type_year_and_completion() {
        let (_dir, cat) = catalog();
        let wanted = Task::new(RecordType::Death, 1, 2000, 1);
        let other_type = Task::new(RecordType::Birth, 1, 2000, 1);
        let other_year = Task::new(RecordType::Death, 1, 2001, 1);
        let done = Task::new(RecordType::Death, 2, 2000, 1);
        for t in [&wanted, &other_type, &other_year, &done] {
            cat.insert_if_absent(t).unwrap();
        }
        cat.mark_completed(&done.id).unwrap();

        let pending = cat.list_pending(RecordType::Death, 2000, 100).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, wanted.id);
    }

    #[test]
    fn list_pending_is_sorted_and_limited() {
        let (_dir, cat) = catalog();
        for page in 1..=5 {
            cat.insert_if_absent(&Task::new(RecordType::Death, 1, 2000, page))
                .unwrap();
        }
        let all = cat.list_pending(RecordType::Death, 2000, 100).unwrap();
        assert_eq!(all.len(), 5);
        let ids: Vec<_> = all.iter().map(|t| t.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let limited = cat.list_pending(RecordType::Death, 2000, 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, ids[0]);
    }

    #[test]
    fn mark_completed_transitions_once() {
        let (_dir, cat) = catalog();
        let task = Task::new(RecordType::Death, 1, 2000, 1);
        cat.insert_if_absent(&task).unwrap();

        cat.mark_completed(&task.id).unwrap();
        assert!(cat.list_pending(RecordType::Death, 2000, 100).unwrap().is_empty());

        // duplicate mark succeeds silently
        cat.mark_completed(&task.id).unwrap();
        assert!(cat.list_pending(RecordType::Death, 2000, 100).unwrap().is_empty());
    }

    #[test]
    fn mark_completed_unknown_id_is_error() {
        let (_dir, cat) = catalog();
        assert!(cat.mark_completed("no-such-task").is_err());
    }

    #[test]
    fn counts_split_pending_and_completed() {
        let (_dir, cat) = catalog();
        let a = Task::new(RecordType::Death, 1, 2000, 1);
        let b = Task::new(RecordType::Death, 1, 2000, 2);
        let c = Task::new(RecordType::Birth, 1, 2000, 1);
        for t in [&a, &b, &c] {
            cat.insert_if_absent(t).unwrap();
        }
        cat.mark_completed(&b.id).unwrap();

        let counts = cat.counts().unwrap();
        assert_eq!(counts[&RecordType::Death.code()], (1, 1));
        assert_eq!(counts[&RecordType::Birth.code()], (1, 0));
        assert_eq!(counts[&RecordType::Divorce.code()], (0, 0));
    }

    #[test]
    fn corrupt_doc_is_skipped_in_listing() {
        let (dir, cat) = catalog();
        cat.insert_if_absent(&Task::new(RecordType::Death, 1, 2000, 1))
            .unwrap();
        fs::write(dir.path().join("garbage.json"), b"not json").unwrap();

        let pending = cat.list_pending(RecordType::Death, 2000, 100).unwrap();
        assert_eq!(pending.len(), 1);
    }
}
