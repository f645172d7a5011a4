//! Stage-to-store flusher
//!
//! Sweeps the staging area and drains each staged file into the archive.
//! Deletion happens only after every record in a file has been offered
//! to the archive; because appends are keyed by record id, reprocessing
//! a file whose deletion failed just overwrites the same documents.

use anyhow::Result;

use crate::archive::FsArchive;
use crate::convert;
use crate::hash::short_id;
use crate::staging::StagingArea;
use crate::task::RecordType;

/// Outcome tally for one sweep.
#[derive(Debug, Default, PartialEq)]
pub struct SweepStats {
    /// Files fully processed and deleted.
    pub files_flushed: usize,
    /// Files that could not be parsed and were left in place.
    pub files_unreadable: usize,
    /// Files processed but left in place because deletion failed.
    pub files_undeletable: usize,
    pub records_stored: usize,
    /// Records skipped over conversion or append failures.
    pub records_skipped: usize,
}

impl SweepStats {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    pub fn log(&self) {
        if self.is_noop() {
            log::debug!("flush sweep: staging area empty");
            return;
        }
        log::info!(
            "flush sweep: {} files flushed, {} records stored, {} skipped, {} unreadable, {} undeletable",
            self.files_flushed,
            self.records_stored,
            self.records_skipped,
            self.files_unreadable,
            self.files_undeletable,
        );
    }
}

pub struct Flusher<'a> {
    staging: &'a StagingArea,
    archive: &'a FsArchive,
}

impl<'a> Flusher<'a> {
    pub fn new(staging: &'a StagingArea, archive: &'a FsArchive) -> Self {
        Self { staging, archive }
    }

    /// Drain every staged file across all four type directories.
    ///
    /// Per-record failures are logged and skipped; per-file parse
    /// failures skip the whole file without touching it. Only a staging
    /// directory that cannot be listed at all is an error.
    pub fn sweep(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();
        for rt in RecordType::ALL {
            self.sweep_type(rt, &mut stats)?;
        }
        stats.log();
        Ok(stats)
    }

    fn sweep_type(&self, record_type: RecordType, stats: &mut SweepStats) -> Result<()> {
        for path in self.staging.list(record_type)? {
            let records = match StagingArea::load(&path) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("skipping unreadable staging file: {e:#}");
                    stats.files_unreadable += 1;
                    continue;
                }
            };

            for record in &records {
                let doc = match convert::convert(record_type, record) {
                    Ok(doc) => doc,
                    Err(e) => {
                        log::warn!(
                            "skipping record {} in {}: {e}",
                            short_id(&record.id),
                            path.display()
                        );
                        stats.records_skipped += 1;
                        continue;
                    }
                };
                match self.archive.append(record_type, &doc) {
                    Ok(()) => stats.records_stored += 1,
                    Err(e) => {
                        log::warn!("skipping record {}: {e:#}", short_id(&record.id));
                        stats.records_skipped += 1;
                    }
                }
            }

            match StagingArea::remove(&path) {
                Ok(()) => stats.files_flushed += 1,
                Err(e) => {
                    // safe to leave: the next sweep re-appends by id
                    log::warn!("staging file not deleted, will reprocess: {e:#}");
                    stats.files_undeletable += 1;
                }
            }
        }
        Ok(())
    }
}
