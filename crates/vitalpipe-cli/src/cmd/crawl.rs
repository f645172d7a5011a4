//! Crawl subcommand - run the fetch-and-stage worker pool

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use vitalpipe_crawl::{HttpFetcher, SearchUrls, SurnameList, VitalSearchExtractor, crawl};
use vitalpipe_store::{FsCatalog, RecordType, StagingArea};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Record type: 1-4 or birth|death|marriage|divorce
    #[arg(value_parser = super::parse_record_type)]
    pub record_type: RecordType,

    /// Query year
    #[arg(value_parser = clap::value_parser!(i32).range(1900..=2015))]
    pub year: i32,

    /// Number of pool workers (default from config)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<8.cyan.bold} {bar:30.green/dim} {pos:>5}/{len:5} {wide_msg:.dim}")
        .expect("invalid template")
}

pub fn run(args: CrawlArgs, config: &Config, multi: &MultiProgress, is_tty: bool) -> Result<()> {
    let catalog =
        FsCatalog::new(&config.paths.catalog_dir).context("catalog unreachable at startup")?;
    let staging =
        StagingArea::new(&config.paths.staging_dir).context("staging unreachable at startup")?;
    let surnames = SurnameList::load(&config.crawl.surnames_file)?;
    let urls = SearchUrls::new(&config.crawl.base_url, config.crawl.activity_id.as_deref());
    let fetcher = HttpFetcher::new(
        config.crawl.max_retries,
        config.crawl.session_cookie.clone(),
    );

    let workers = args.workers.unwrap_or(config.crawl.workers).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("cannot build worker pool")?;

    let bar = if is_tty {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(bar_style());
        bar.set_prefix("crawl");
        bar
    } else {
        ProgressBar::hidden()
    };

    pool.install(|| {
        crawl(
            &catalog,
            &fetcher,
            &VitalSearchExtractor,
            &staging,
            &urls,
            &surnames,
            args.record_type,
            args.year,
            workers,
            &bar,
        )
    })?;
    bar.finish_and_clear();
    Ok(())
}
