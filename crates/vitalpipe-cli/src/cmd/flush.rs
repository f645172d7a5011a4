//! Flush subcommand - recurring stage-to-store sweep

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use vitalpipe_core::is_shutdown_requested;
use vitalpipe_store::{Flusher, FsArchive, StagingArea};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct FlushArgs {
    /// Sweep interval in seconds (default from config)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,
}

pub fn run(args: FlushArgs, config: &Config) -> Result<()> {
    let staging =
        StagingArea::new(&config.paths.staging_dir).context("staging unreachable at startup")?;
    let archive =
        FsArchive::new(&config.paths.archive_dir).context("archive unreachable at startup")?;
    let flusher = Flusher::new(&staging, &archive);

    if args.once {
        flusher.sweep()?;
        return Ok(());
    }

    let interval = Duration::from_secs(args.interval.unwrap_or(config.flush.interval_secs));
    log::info!("flush loop: sweeping every {}s", interval.as_secs());
    loop {
        flusher.sweep()?;
        if sleep_interruptibly(interval) {
            log::info!("flush loop stopping");
            return Ok(());
        }
    }
}

/// Sleep for `interval` in short steps; true when shutdown was requested.
fn sleep_interruptibly(interval: Duration) -> bool {
    let step = Duration::from_millis(500);
    let mut elapsed = Duration::ZERO;
    while elapsed < interval {
        if is_shutdown_requested() {
            return true;
        }
        std::thread::sleep(step.min(interval - elapsed));
        elapsed += step;
    }
    is_shutdown_requested()
}
