//! Coverage planner
//!
//! For one (type, year): probe every surname whose page-1 task is not
//! yet cataloged, read the total result count off the probe page, and
//! insert one pending task per result page. A failed probe inserts
//! nothing at all, so the surname is retried by the next invocation:
//! coverage is guaranteed across repeated runs, not within one.

use anyhow::Result;
use vitalpipe_core::is_shutdown_requested;
use vitalpipe_store::catalog::Catalog;
use vitalpipe_store::task::{RecordType, Task, task_id};

use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::surnames::SurnameList;
use crate::url::{PAGE_SIZE, PROBE_PAGE_SIZE, SearchUrls};

#[derive(Debug, Default, PartialEq)]
pub struct PlanStats {
    /// Surnames whose page-1 task already existed.
    pub already_planned: usize,
    /// Surnames successfully probed this run.
    pub probed: usize,
    /// Surnames skipped because the probe failed or the total could not
    /// be extracted; retried next invocation.
    pub skipped: usize,
    /// New pending tasks inserted.
    pub pages_inserted: usize,
}

impl PlanStats {
    pub fn log(&self) {
        log::info!(
            "plan: {} probed, {} already planned, {} skipped, {} pages inserted",
            self.probed,
            self.already_planned,
            self.skipped,
            self.pages_inserted,
        );
    }
}

/// Expand (type, year) coverage across the whole surname list.
pub fn plan<C, F, E>(
    catalog: &C,
    fetcher: &F,
    extractor: &E,
    urls: &SearchUrls,
    surnames: &SurnameList,
    record_type: RecordType,
    year: i32,
) -> Result<PlanStats>
where
    C: Catalog,
    F: PageFetcher,
    E: Extractor,
{
    let mut stats = PlanStats::default();

    for (surname_id, surname) in surnames.iter() {
        if is_shutdown_requested() {
            log::warn!("plan interrupted, resumes on next invocation");
            break;
        }

        let page1 = task_id(record_type, surname_id, year, 1);
        if catalog.exists(&page1)? {
            stats.already_planned += 1;
            continue;
        }

        let probe_url = urls.search(record_type, surname, year, PROBE_PAGE_SIZE, 1);
        let Some(html) = fetcher.fetch(&probe_url) else {
            log::debug!("probe failed for surname={surname}, skipping");
            stats.skipped += 1;
            continue;
        };
        let Some(total) = extractor.result_total(&html) else {
            log::debug!("no result total for surname={surname}, skipping");
            stats.skipped += 1;
            continue;
        };
        stats.probed += 1;

        let pages = total.div_ceil(u64::from(PAGE_SIZE));
        log::debug!("surname={surname} year={year}: {total} records, {pages} pages");
        for page in 1..=pages {
            let task = Task::new(record_type, surname_id, year, page as u32);
            if catalog.insert_if_absent(&task)? {
                stats.pages_inserted += 1;
            }
        }
    }

    stats.log();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalpipe_store::catalog::FsCatalog;

    /// Probe stub: answers a body of "total=<n>" per surname, or nothing.
    struct StubFetcher;

    impl PageFetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Option<String> {
            if url.contains("LastName=smith") {
                Some("total=0".to_string())
            } else if url.contains("LastName=johnson") {
                Some("total=1500".to_string())
            } else if url.contains("LastName=williams") {
                Some("total=1000".to_string())
            } else {
                None
            }
        }
    }

    struct StubExtractor;

    impl Extractor for StubExtractor {
        fn result_total(&self, html: &str) -> Option<u64> {
            html.strip_prefix("total=")?.parse().ok()
        }

        fn records(&self, _html: &str) -> Option<Vec<crate::extract::FieldMap>> {
            Some(Vec::new())
        }
    }

    fn surnames() -> SurnameList {
        SurnameList::from_entries([
            (0, "smith".to_string()),
            (1, "johnson".to_string()),
            (2, "williams".to_string()),
        ])
    }

    fn urls() -> SearchUrls {
        SearchUrls::new("http://example.com/x", None)
    }

    #[test]
    fn page_counts_follow_probed_totals() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FsCatalog::new(dir.path()).unwrap();

        let stats = plan(
            &catalog,
            &StubFetcher,
            &StubExtractor,
            &urls(),
            &surnames(),
            RecordType::Death,
            2000,
        )
        .unwrap();

        // totals {0, 1500, 1000} → {0, 2, 1} pages
        assert_eq!(stats.probed, 3);
        assert_eq!(stats.pages_inserted, 3);
        let pending = catalog.list_pending(RecordType::Death, 2000, 100).unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|t| !t.completed));

        let mut johnson_pages: Vec<u32> = pending
            .iter()
            .filter(|t| t.surname_id == 1)
            .map(|t| t.page)
            .collect();
        johnson_pages.sort_unstable();
        assert_eq!(johnson_pages, vec![1, 2]);
        assert!(pending.iter().all(|t| t.surname_id != 0));
    }

    #[test]
    fn second_run_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FsCatalog::new(dir.path()).unwrap();
        let (urls, names) = (urls(), surnames());

        plan(&catalog, &StubFetcher, &StubExtractor, &urls, &names, RecordType::Death, 2000)
            .unwrap();
        let second =
            plan(&catalog, &StubFetcher, &StubExtractor, &urls, &names, RecordType::Death, 2000)
                .unwrap();

        assert_eq!(second.pages_inserted, 0);
        // johnson and williams have a page-1 task; zero-total smith is re-probed
        assert_eq!(second.already_planned, 2);
        assert_eq!(second.probed, 1);
        assert_eq!(
            catalog.list_pending(RecordType::Death, 2000, 100).unwrap().len(),
            3
        );
    }

    #[test]
    fn failed_probe_skips_surname_for_this_run() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FsCatalog::new(dir.path()).unwrap();
        let names = SurnameList::from_entries([(7, "unreachable".to_string())]);

        let stats = plan(
            &catalog,
            &StubFetcher,
            &StubExtractor,
            &urls(),
            &names,
            RecordType::Death,
            2000,
        )
        .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.pages_inserted, 0);
        assert!(!catalog.exists(&task_id(RecordType::Death, 7, 2000, 1)).unwrap());
    }

    #[test]
    fn probe_skips_do_not_block_other_surnames() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FsCatalog::new(dir.path()).unwrap();
        let names = SurnameList::from_entries([
            (7, "unreachable".to_string()),
            (8, "williams".to_string()),
        ]);

        let stats = plan(
            &catalog,
            &StubFetcher,
            &StubExtractor,
            &urls(),
            &names,
            RecordType::Death,
            2000,
        )
        .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.pages_inserted, 1);
        assert!(catalog.exists(&task_id(RecordType::Death, 8, 2000, 1)).unwrap());
    }
}
