//! Subcommand implementations

pub mod crawl;
pub mod flush;
pub mod plan;
pub mod status;

use vitalpipe_store::RecordType;

/// clap value parser for record type arguments.
pub fn parse_record_type(s: &str) -> Result<RecordType, String> {
    RecordType::from_arg(s)
        .ok_or_else(|| format!("expected 1-4 or birth|death|marriage|divorce, got {s:?}"))
}
