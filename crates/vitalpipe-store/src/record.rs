//! Staged records extracted from result pages

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash;
use crate::task::RecordType;

/// Extracted field label holding the person's name.
pub const FIELD_NAME: &str = "Name";
/// Extracted field label holding the event location.
pub const FIELD_LOCATION: &str = "Location";
/// Extracted field label holding the source collection.
pub const FIELD_COLLECTION: &str = "Collection";

/// One extracted vital record, as staged between crawl and store.
///
/// `fields` holds the raw extracted labels and values; surname and year
/// are denormalized from the owning task so the flusher never needs the
/// catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub surname: String,
    pub year: i32,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    /// Build a record from an extracted field map.
    ///
    /// Returns None when an id input (name, the type-specific date,
    /// location) is missing; such entries are unusable downstream.
    pub fn from_fields(
        record_type: RecordType,
        surname: &str,
        year: i32,
        fields: BTreeMap<String, String>,
    ) -> Option<Self> {
        let name = fields.get(FIELD_NAME)?;
        let date = fields.get(record_type.date_field())?;
        let location = fields.get(FIELD_LOCATION)?;
        let id = record_id(name, date, location);
        Some(Self {
            id,
            surname: surname.to_string(),
            year,
            fields,
        })
    }
}

/// Record id for downstream dedup, independent of the task that found it.
pub fn record_id(name: &str, date: &str, location: &str) -> String {
    hash::fingerprint(&[name, date, location])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death_fields() -> BTreeMap<String, String> {
        BTreeMap::from([
            (FIELD_NAME.to_string(), "Robert P. Smith".to_string()),
            ("Death Date".to_string(), "Aug 8, 2000".to_string()),
            (FIELD_LOCATION.to_string(), "Middletown, CT".to_string()),
            (FIELD_COLLECTION.to_string(), "CT Death Records".to_string()),
        ])
    }

    #[test]
    fn from_fields_assigns_stable_id() {
        let a = Record::from_fields(RecordType::Death, "smith", 2000, death_fields()).unwrap();
        let b = Record::from_fields(RecordType::Death, "smith", 2000, death_fields()).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(
            a.id,
            record_id("Robert P. Smith", "Aug 8, 2000", "Middletown, CT")
        );
    }

    #[test]
    fn from_fields_requires_type_date() {
        let mut fields = death_fields();
        fields.remove("Death Date");
        assert!(Record::from_fields(RecordType::Death, "smith", 2000, fields.clone()).is_none());

        // the same map is fine for a type whose date it does carry
        fields.insert("Birth Date".to_string(), "Jun 22, 1910".to_string());
        assert!(Record::from_fields(RecordType::Birth, "smith", 1910, fields).is_some());
    }

    #[test]
    fn from_fields_requires_name_and_location() {
        let mut no_name = death_fields();
        no_name.remove(FIELD_NAME);
        assert!(Record::from_fields(RecordType::Death, "smith", 2000, no_name).is_none());

        let mut no_loc = death_fields();
        no_loc.remove(FIELD_LOCATION);
        assert!(Record::from_fields(RecordType::Death, "smith", 2000, no_loc).is_none());
    }

    #[test]
    fn missing_collection_is_tolerated_here() {
        // collection is enforced at conversion time, not at staging time
        let mut fields = death_fields();
        fields.remove(FIELD_COLLECTION);
        assert!(Record::from_fields(RecordType::Death, "smith", 2000, fields).is_some());
    }

    #[test]
    fn serde_roundtrip() {
        let rec = Record::from_fields(RecordType::Death, "smith", 2000, death_fields()).unwrap();
        let json = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
