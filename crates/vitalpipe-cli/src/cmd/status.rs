//! Status subcommand - per-type convergence view
//!
//! Progress is the monotonic shrinkage of pending-task and staged-file
//! counts; this is the operator's window into it.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use vitalpipe_store::{FsArchive, FsCatalog, RecordType, StagingArea};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let catalog =
        FsCatalog::new(&config.paths.catalog_dir).context("catalog unreachable at startup")?;
    let staging =
        StagingArea::new(&config.paths.staging_dir).context("staging unreachable at startup")?;
    let archive =
        FsArchive::new(&config.paths.archive_dir).context("archive unreachable at startup")?;

    let counts = catalog.counts()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Type").fg(Color::Cyan),
            Cell::new("Pending").fg(Color::Cyan),
            Cell::new("Completed").fg(Color::Cyan),
            Cell::new("Staged files").fg(Color::Cyan),
            Cell::new("Stored records").fg(Color::Cyan),
        ]);

    for rt in RecordType::ALL {
        let (pending, completed) = counts.get(&rt.code()).copied().unwrap_or((0, 0));
        table.add_row(vec![
            rt.dir_name().to_string(),
            pending.to_string(),
            completed.to_string(),
            staging.list(rt)?.len().to_string(),
            archive.count(rt)?.to_string(),
        ]);
    }

    eprintln!("\n{table}");
    Ok(())
}
