//! HTML extraction seam for result pages
//!
//! Both operations answer Option: None means the page structure was not
//! recognized, which callers treat as transient and retry on a later
//! run. A recognized page with zero result boxes is a real empty result.

use std::collections::BTreeMap;

use scraper::{Html, Selector};

/// Extracted field labels and values for the records on one page.
pub type FieldMap = BTreeMap<String, String>;

pub trait Extractor {
    /// Total result count for the query, from the page's result summary.
    fn result_total(&self, html: &str) -> Option<u64>;

    /// All records on the page, in page order. None when the page is not
    /// a recognizable result page; Some(empty) when it genuinely holds
    /// no records.
    fn records(&self, html: &str) -> Option<Vec<FieldMap>>;
}

/// Extractor for the site's vital-search result markup: result boxes
/// under the results container, one field/fieldValue pair per row, with
/// a trailing action row on every box.
#[derive(Debug, Default)]
pub struct VitalSearchExtractor;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

impl Extractor for VitalSearchExtractor {
    fn result_total(&self, html: &str) -> Option<u64> {
        let doc = Html::parse_document(html);
        let span = selector("span");
        doc.select(&span)
            .find_map(|el| parse_total(&el.text().collect::<String>()))
    }

    fn records(&self, html: &str) -> Option<Vec<FieldMap>> {
        let doc = Html::parse_document(html);
        let container_sel = selector("#resultsLists");
        let box_sel = selector("div.resultBox");
        let row_sel = selector("div.resultRow");
        let field_sel = selector("div.field");
        let value_sel = selector("div.fieldValue");

        let container = doc.select(&container_sel).next()?;

        let mut records = Vec::new();
        for result_box in container.select(&box_sel) {
            let rows: Vec<_> = result_box.select(&row_sel).collect();
            if rows.len() < 2 {
                // nothing but the trailing action row
                continue;
            }

            let mut fields = FieldMap::new();
            for row in &rows[..rows.len() - 1] {
                let Some(label) = row.select(&field_sel).next() else {
                    continue;
                };
                let Some(value) = row.select(&value_sel).next() else {
                    continue;
                };
                let label = text_of(label);
                let label = label.trim_end_matches(':');
                fields.insert(label.to_string(), text_of(value));
            }
            if !fields.is_empty() {
                records.push(fields);
            }
        }
        Some(records)
    }
}

fn text_of(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse "Showing 1-10 of 25,000" into 25000.
fn parse_total(text: &str) -> Option<u64> {
    let rest = text.trim().strip_prefix("Showing")?;
    let (_, tail) = rest.split_once(" of ")?;
    let digits: String = tail
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
