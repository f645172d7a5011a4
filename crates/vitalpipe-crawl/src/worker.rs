//! Fetch-and-stage worker pool
//!
//! A fixed-size pool drains one batch of pending tasks. Per task the
//! ordering is fixed: fetch, extract, atomic staging publish, and only
//! then the completion mark. A completed task therefore either produced
//! no records or its staging file is already durable; any interruption
//! leaves the task pending and a rerun repeats it harmlessly.

use std::sync::Mutex;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use vitalpipe_core::{TaskQueue, is_shutdown_requested};
use vitalpipe_store::catalog::Catalog;
use vitalpipe_store::hash::short_id;
use vitalpipe_store::record::Record;
use vitalpipe_store::staging::StagingArea;
use vitalpipe_store::task::{RecordType, Task};

use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::surnames::SurnameList;
use crate::url::{PAGE_SIZE, SearchUrls};

/// Pending tasks pulled per crawl invocation.
pub const PENDING_BATCH: usize = 10_000;

#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Tasks pulled from the catalog this run.
    pub tasks: usize,
    /// Tasks that staged records and were marked completed.
    pub completed: usize,
    /// Tasks completed as genuinely empty result pages.
    pub empty: usize,
    /// Left pending: fetch returned nothing.
    pub fetch_failed: usize,
    /// Left pending: page structure not recognized.
    pub extract_failed: usize,
    /// Left pending: staging or catalog trouble, or an unknown surname id.
    pub failed: usize,
    pub records_staged: usize,
}

impl CrawlStats {
    pub fn log(&self) {
        log::info!(
            "crawl: {} tasks, {} completed ({} records staged), {} empty, {} fetch failures, {} extract failures, {} failed",
            self.tasks,
            self.completed,
            self.records_staged,
            self.empty,
            self.fetch_failed,
            self.extract_failed,
            self.failed,
        );
    }
}

enum TaskOutcome {
    Staged(usize),
    Empty,
    FetchFailed,
    ExtractFailed,
    Failed,
}

/// Crawl one batch of pending (type, year) tasks with a worker pool.
#[allow(clippy::too_many_arguments)]
pub fn crawl<C, F, E>(
    catalog: &C,
    fetcher: &F,
    extractor: &E,
    staging: &StagingArea,
    urls: &SearchUrls,
    surnames: &SurnameList,
    record_type: RecordType,
    year: i32,
    workers: usize,
    progress: &ProgressBar,
) -> Result<CrawlStats>
where
    C: Catalog + Sync,
    F: PageFetcher + Sync,
    E: Extractor + Sync,
{
    let stale = staging.cleanup_tmp().context("stale staging cleanup")?;
    if stale > 0 {
        log::info!("removed {stale} stale staging tmp files");
    }

    let pending = catalog.list_pending(record_type, year, PENDING_BATCH)?;
    if pending.is_empty() {
        log::info!("no pending tasks for {record_type} year={year}");
        return Ok(CrawlStats::default());
    }
    log::info!(
        "crawling {} pending tasks for {record_type} year={year} with {workers} workers",
        pending.len()
    );

    let queue = TaskQueue::new(pending);
    progress.set_length(queue.total() as u64);
    let stats = Mutex::new(CrawlStats::default());

    rayon::scope(|s| {
        for _ in 0..workers.max(1) {
            s.spawn(|_| {
                while let Some(task) = queue.next() {
                    if is_shutdown_requested() {
                        break;
                    }
                    progress.set_message(format!("{} p{}", short_id(&task.id), task.page));
                    let outcome =
                        process_task(catalog, fetcher, extractor, staging, urls, surnames, task);

                    let mut stats = stats.lock().expect("worker thread panicked");
                    stats.tasks += 1;
                    match outcome {
                        TaskOutcome::Staged(n) => {
                            stats.completed += 1;
                            stats.records_staged += n;
                        }
                        TaskOutcome::Empty => stats.empty += 1,
                        TaskOutcome::FetchFailed => stats.fetch_failed += 1,
                        TaskOutcome::ExtractFailed => stats.extract_failed += 1,
                        TaskOutcome::Failed => stats.failed += 1,
                    }
                    drop(stats);
                    progress.inc(1);
                }
            });
        }
    });

    let stats = stats.into_inner().expect("worker thread panicked");
    stats.log();
    Ok(stats)
}

fn process_task<C, F, E>(
    catalog: &C,
    fetcher: &F,
    extractor: &E,
    staging: &StagingArea,
    urls: &SearchUrls,
    surnames: &SurnameList,
    task: &Task,
) -> TaskOutcome
where
    C: Catalog,
    F: PageFetcher,
    E: Extractor,
{
    let Some(surname) = surnames.get(task.surname_id) else {
        log::warn!(
            "task {}: surname id {} not in reference list",
            short_id(&task.id),
            task.surname_id
        );
        return TaskOutcome::Failed;
    };

    let url = urls.search(task.record_type, surname, task.year, PAGE_SIZE, task.page);
    let Some(html) = fetcher.fetch(&url) else {
        log::debug!("task {}: fetch failed, left pending", short_id(&task.id));
        return TaskOutcome::FetchFailed;
    };

    let Some(raw) = extractor.records(&html) else {
        log::debug!("task {}: unrecognized page, left pending", short_id(&task.id));
        return TaskOutcome::ExtractFailed;
    };

    if raw.is_empty() {
        // an empty page is a terminal outcome, not a failure
        return match catalog.mark_completed(&task.id) {
            Ok(()) => {
                log::info!(
                    "task {}: empty page, completed (surname={surname} page={})",
                    short_id(&task.id),
                    task.page
                );
                TaskOutcome::Empty
            }
            Err(e) => {
                log::error!("task {}: completion mark failed: {e:#}", short_id(&task.id));
                TaskOutcome::Failed
            }
        };
    }

    let raw_count = raw.len();
    let records: Vec<Record> = raw
        .into_iter()
        .filter_map(|fields| Record::from_fields(task.record_type, surname, task.year, fields))
        .collect();
    if records.len() < raw_count {
        log::debug!(
            "task {}: dropped {} entries missing id fields",
            short_id(&task.id),
            raw_count - records.len()
        );
    }
    if records.is_empty() {
        // entries were present but none usable; treat like an
        // unrecognized page so a later run retries it
        log::warn!("task {}: no usable entries, left pending", short_id(&task.id));
        return TaskOutcome::ExtractFailed;
    }

    if let Err(e) = staging.stage(task.record_type, &task.id, &records) {
        log::error!("task {}: staging failed: {e:#}", short_id(&task.id));
        return TaskOutcome::Failed;
    }

    // the staging publish is durable from here on; completion comes last
    match catalog.mark_completed(&task.id) {
        Ok(()) => {
            log::info!(
                "task {}: {} records staged (surname={surname} page={})",
                short_id(&task.id),
                records.len(),
                task.page
            );
            TaskOutcome::Staged(records.len())
        }
        Err(e) => {
            // staged but still pending; the rerun refetches and republishes
            log::error!("task {}: completion mark failed: {e:#}", short_id(&task.id));
            TaskOutcome::Failed
        }
    }
}
