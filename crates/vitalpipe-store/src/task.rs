//! Record types and crawl task identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash;

/// The four vital-record collections, keyed by their site query codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RecordType {
    Birth = 1,
    Death = 2,
    Marriage = 3,
    Divorce = 4,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [Self::Birth, Self::Death, Self::Marriage, Self::Divorce];

    /// Site query code (1-4).
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Birth),
            2 => Some(Self::Death),
            3 => Some(Self::Marriage),
            4 => Some(Self::Divorce),
            _ => None,
        }
    }

    /// Parse a CLI argument: the numeric code or the collection name.
    pub fn from_arg(s: &str) -> Option<Self> {
        match s {
            "birth" => Some(Self::Birth),
            "death" => Some(Self::Death),
            "marriage" => Some(Self::Marriage),
            "divorce" => Some(Self::Divorce),
            _ => s.parse::<u8>().ok().and_then(Self::from_code),
        }
    }

    /// Directory name used in staging and archive layouts.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Birth => "birth",
            Self::Death => "death",
            Self::Marriage => "marriage",
            Self::Divorce => "divorce",
        }
    }

    /// Extracted field label carrying this type's date.
    pub fn date_field(self) -> &'static str {
        match self {
            Self::Birth => "Birth Date",
            Self::Death => "Death Date",
            Self::Marriage => "Marriage Date",
            Self::Divorce => "Divorce Date",
        }
    }

    /// Key used for this type's date in stored documents.
    pub fn date_key(self) -> &'static str {
        self.dir_name()
    }

    /// Year query parameter name in the search URL.
    pub fn year_param(self) -> &'static str {
        match self {
            Self::Birth => "BirthYear",
            Self::Death => "DeathYear",
            Self::Marriage => "MarriageYear",
            Self::Divorce => "DivorceYear",
        }
    }
}

impl From<RecordType> for u8 {
    fn from(rt: RecordType) -> u8 {
        rt.code()
    }
}

impl TryFrom<u8> for RecordType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid record type code: {code}"))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One unit of crawl work: a single result page of a
/// (type, surname, year) query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub surname_id: u32,
    pub year: i32,
    pub page: u32,
    pub completed: bool,
}

impl Task {
    /// Build a pending task; the id is a pure function of the coordinates.
    pub fn new(record_type: RecordType, surname_id: u32, year: i32, page: u32) -> Self {
        Self {
            id: task_id(record_type, surname_id, year, page),
            record_type,
            surname_id,
            year,
            page,
            completed: false,
        }
    }
}

/// Deterministic task id for a (type, surname, year, page) coordinate.
pub fn task_id(record_type: RecordType, surname_id: u32, year: i32, page: u32) -> String {
    hash::fingerprint(&[
        &record_type.code().to_string(),
        &surname_id.to_string(),
        &year.to_string(),
        &page.to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_deterministic() {
        let a = task_id(RecordType::Death, 17, 2000, 3);
        let b = task_id(RecordType::Death, 17, 2000, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn task_id_varies_per_coordinate() {
        let base = task_id(RecordType::Death, 17, 2000, 3);
        assert_ne!(base, task_id(RecordType::Birth, 17, 2000, 3));
        assert_ne!(base, task_id(RecordType::Death, 18, 2000, 3));
        assert_ne!(base, task_id(RecordType::Death, 17, 2001, 3));
        assert_ne!(base, task_id(RecordType::Death, 17, 2000, 4));
    }

    #[test]
    fn new_task_is_pending() {
        let t = Task::new(RecordType::Marriage, 5, 1950, 1);
        assert!(!t.completed);
        assert_eq!(t.id, task_id(RecordType::Marriage, 5, 1950, 1));
    }

    #[test]
    fn record_type_codes_roundtrip() {
        for rt in RecordType::ALL {
            assert_eq!(RecordType::from_code(rt.code()), Some(rt));
        }
        assert_eq!(RecordType::from_code(0), None);
        assert_eq!(RecordType::from_code(5), None);
    }

    #[test]
    fn from_arg_accepts_code_and_name() {
        assert_eq!(RecordType::from_arg("2"), Some(RecordType::Death));
        assert_eq!(RecordType::from_arg("death"), Some(RecordType::Death));
        assert_eq!(RecordType::from_arg("Death"), None);
        assert_eq!(RecordType::from_arg("7"), None);
    }

    #[test]
    fn serde_uses_integer_code() {
        let t = Task::new(RecordType::Death, 17, 2000, 3);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"type\":2"));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record_type, RecordType::Death);
        assert_eq!(back.id, t.id);
    }

    #[test]
    fn serde_rejects_bad_code() {
        let json = r#"{"id":"x","type":9,"surname_id":1,"year":2000,"page":1,"completed":false}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }
}
