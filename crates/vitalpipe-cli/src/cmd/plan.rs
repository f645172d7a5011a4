//! Plan subcommand - expand (type, year) coverage into pending tasks

use anyhow::{Context, Result};
use clap::Args;
use vitalpipe_crawl::{HttpFetcher, SearchUrls, SurnameList, VitalSearchExtractor, plan};
use vitalpipe_store::{FsCatalog, RecordType};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Record type: 1-4 or birth|death|marriage|divorce
    #[arg(value_parser = super::parse_record_type)]
    pub record_type: RecordType,

    /// Query year
    #[arg(value_parser = clap::value_parser!(i32).range(1900..=2015))]
    pub year: i32,
}

pub fn run(args: PlanArgs, config: &Config) -> Result<()> {
    let catalog =
        FsCatalog::new(&config.paths.catalog_dir).context("catalog unreachable at startup")?;
    let surnames = SurnameList::load(&config.crawl.surnames_file)?;
    let urls = SearchUrls::new(&config.crawl.base_url, config.crawl.activity_id.as_deref());
    let fetcher = HttpFetcher::new(
        config.crawl.max_retries,
        config.crawl.session_cookie.clone(),
    );

    log::info!(
        "planning {} year={} over {} surnames",
        args.record_type,
        args.year,
        surnames.len()
    );
    plan(
        &catalog,
        &fetcher,
        &VitalSearchExtractor,
        &urls,
        &surnames,
        args.record_type,
        args.year,
    )?;
    Ok(())
}
