//! Conversion from staged records to archive documents

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::archive::StoredRecord;
use crate::record::{FIELD_COLLECTION, FIELD_LOCATION, FIELD_NAME, Record};
use crate::task::RecordType;

/// A record that cannot be canonicalized for the archive.
///
/// The flusher logs these and moves on; one bad record never aborts its
/// staging file.
#[derive(Debug)]
pub enum ConvertError {
    MissingField(&'static str),
    UnparseableDate { field: &'static str, value: String },
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field: {field}"),
            Self::UnparseableDate { field, value } => {
                write!(f, "unparseable date in {field}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Parse the site's date strings: "Sep 25, 2000", "September 25, 2000",
/// "09/25/2000", or a bare year (taken as Jan 1).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for format in ["%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
    }
    if let Ok(year) = s.parse::<i32>() {
        if (1000..=9999).contains(&year) {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

/// Canonicalize a staged record for `record_type`'s collection.
///
/// Name, location, collection, and a parseable type-specific date are
/// required. Other date fields present on the record (a death record
/// usually also carries a birth date) are parsed opportunistically and
/// dropped when unparseable.
pub fn convert(record_type: RecordType, record: &Record) -> Result<StoredRecord, ConvertError> {
    let name = record
        .fields
        .get(FIELD_NAME)
        .ok_or(ConvertError::MissingField(FIELD_NAME))?;
    let location = record
        .fields
        .get(FIELD_LOCATION)
        .ok_or(ConvertError::MissingField(FIELD_LOCATION))?;
    let collection = record
        .fields
        .get(FIELD_COLLECTION)
        .ok_or(ConvertError::MissingField(FIELD_COLLECTION))?;

    let mut dates = BTreeMap::new();
    for rt in RecordType::ALL {
        let Some(value) = record.fields.get(rt.date_field()) else {
            continue;
        };
        match parse_date(value) {
            Some(date) => {
                dates.insert(rt.date_key().to_string(), date);
            }
            None if rt == record_type => {
                return Err(ConvertError::UnparseableDate {
                    field: rt.date_field(),
                    value: value.clone(),
                });
            }
            None => {}
        }
    }
    if !dates.contains_key(record_type.date_key()) {
        return Err(ConvertError::MissingField(record_type.date_field()));
    }

    Ok(StoredRecord {
        id: record.id.clone(),
        name: name.clone(),
        dates,
        location: location.clone(),
        collection: collection.clone(),
        surname: record.surname.clone(),
        year: record.year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(fields: &[(&str, &str)]) -> Record {
        let map: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Record::from_fields(RecordType::Death, "smith", 2000, map)
            .expect("test record must carry id fields")
    }

    #[test]
    fn converts_full_death_record() {
        let rec = staged(&[
            ("Name", "Robert P. Smith"),
            ("Birth Date", "Jun 22, 1910"),
            ("Death Date", "Aug 8, 2000"),
            ("Location", "Middletown, CT"),
            ("Collection", "Connecticut Death Records"),
        ]);
        let doc = convert(RecordType::Death, &rec).unwrap();
        assert_eq!(doc.name, "Robert P. Smith");
        assert_eq!(
            doc.dates["death"],
            NaiveDate::from_ymd_opt(2000, 8, 8).unwrap()
        );
        assert_eq!(
            doc.dates["birth"],
            NaiveDate::from_ymd_opt(1910, 6, 22).unwrap()
        );
        assert_eq!(doc.surname, "smith");
        assert_eq!(doc.year, 2000);
        assert_eq!(doc.id, rec.id);
    }

    #[test]
    fn missing_collection_is_error() {
        let rec = staged(&[
            ("Name", "Robert P. Smith"),
            ("Death Date", "Aug 8, 2000"),
            ("Location", "Middletown, CT"),
        ]);
        match convert(RecordType::Death, &rec) {
            Err(ConvertError::MissingField(f)) => assert_eq!(f, FIELD_COLLECTION),
            other => panic!("expected missing collection, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_own_date_is_error() {
        let rec = staged(&[
            ("Name", "Robert P. Smith"),
            ("Death Date", "sometime in summer"),
            ("Location", "Middletown, CT"),
            ("Collection", "Connecticut Death Records"),
        ]);
        assert!(matches!(
            convert(RecordType::Death, &rec),
            Err(ConvertError::UnparseableDate { field: "Death Date", .. })
        ));
    }

    #[test]
    fn unparseable_other_date_is_dropped() {
        let rec = staged(&[
            ("Name", "Robert P. Smith"),
            ("Birth Date", "unknown"),
            ("Death Date", "Aug 8, 2000"),
            ("Location", "Middletown, CT"),
            ("Collection", "Connecticut Death Records"),
        ]);
        let doc = convert(RecordType::Death, &rec).unwrap();
        assert!(doc.dates.contains_key("death"));
        assert!(!doc.dates.contains_key("birth"));
    }

    #[test]
    fn date_formats() {
        assert_eq!(
            parse_date("Sep 25, 2000"),
            NaiveDate::from_ymd_opt(2000, 9, 25)
        );
        assert_eq!(
            parse_date("September 25, 2000"),
            NaiveDate::from_ymd_opt(2000, 9, 25)
        );
        assert_eq!(
            parse_date("09/25/2000"),
            NaiveDate::from_ymd_opt(2000, 9, 25)
        );
        assert_eq!(parse_date("2000"), NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(parse_date(" Jan 4, 2000 "), NaiveDate::from_ymd_opt(2000, 1, 4));
        assert_eq!(parse_date("last spring"), None);
        assert_eq!(parse_date("99"), None);
    }
}
