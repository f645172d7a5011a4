//! vitalpipe - crash-safe crawl pipeline for vital-record collections
//!
//! Plans page-level crawl tasks over a surname list, fetches and stages
//! result pages with a worker pool, and flushes staged records into the
//! permanent per-type store.

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::MultiProgress;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "vitalpipe")]
#[command(about = "Crash-safe crawl pipeline for vital-record collections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress info logs (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./vitalpipe.toml or ~/.config/vitalpipe/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Expand (type, year) coverage into pending page tasks
    Plan(cmd::plan::PlanArgs),
    /// Crawl pending page tasks with the worker pool
    Crawl(cmd::crawl::CrawlArgs),
    /// Sweep staged files into the permanent store
    Flush(cmd::flush::FlushArgs),
    /// Show per-type task and record counts
    Status,
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let multi = MultiProgress::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — the progress bar shows activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = std::io::stderr().is_terminal();
    let quiet = cli.quiet || (is_tty && !cli.debug);
    vitalpipe_core::init_logging(quiet, cli.debug, is_tty.then_some(&multi));

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Plan(args) => {
            vitalpipe_core::install_signal_handlers();
            cmd::plan::run(args, &config)
        }
        Command::Crawl(args) => {
            vitalpipe_core::install_signal_handlers();
            cmd::crawl::run(args, &config, &multi, is_tty)
        }
        Command::Flush(args) => {
            vitalpipe_core::install_signal_handlers();
            cmd::flush::run(args, &config)
        }
        Command::Status => cmd::status::run(&config),
        Command::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Catalog dir",
        &config.paths.catalog_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Staging dir",
        &config.paths.staging_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Archive dir",
        &config.paths.archive_dir.display().to_string(),
    ]);
    table.add_row(vec!["Base URL", &config.crawl.base_url]);
    table.add_row(vec![
        "Surname list",
        &config.crawl.surnames_file.display().to_string(),
    ]);
    table.add_row(vec!["Workers", &config.crawl.workers.to_string()]);
    table.add_row(vec!["Max retries", &config.crawl.max_retries.to_string()]);
    table.add_row(vec![
        "Session cookie",
        if config.crawl.session_cookie.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec![
        "Flush interval",
        &format!("{}s", config.flush.interval_secs),
    ]);

    eprintln!("\n{table}");
}
