//! Search URL construction for the vital-records site

use vitalpipe_store::RecordType;

/// Records per crawled result page.
pub const PAGE_SIZE: u32 = 1000;

/// Page size for planner probe fetches; only the result total matters.
pub const PROBE_PAGE_SIZE: u32 = 10;

/// Builds vital-search query URLs against a configured base.
#[derive(Debug, Clone)]
pub struct SearchUrls {
    base: String,
    activity_id: Option<String>,
}

impl SearchUrls {
    pub fn new(base: &str, activity_id: Option<&str>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            activity_id: activity_id.map(str::to_string),
        }
    }

    /// URL for one result page of a (type, surname, year) query.
    ///
    /// The site wants the year under a type-specific parameter name and
    /// the page size/number repeated under their AP twins.
    pub fn search(
        &self,
        record_type: RecordType,
        surname: &str,
        year: i32,
        page_size: u32,
        page: u32,
    ) -> String {
        let mut url = format!(
            "{}?_act=VitalSearchResult&LastName={}&{}={}\
             &Country=US&State=&Location=US&ShowSummaryLink=1&RecordType={}",
            self.base,
            encode(surname),
            record_type.year_param(),
            year,
            record_type.code(),
        );
        if let Some(id) = &self.activity_id {
            url.push_str("&activityID=");
            url.push_str(id);
        }
        url.push_str(&format!(
            "&pagesize={page_size}&pageNumber={page}&pagesizeAP={page_size}&pageNumberAP={page}"
        ));
        url
    }
}

/// Minimal query-value encoding; the surname reference list is plain
/// ASCII apart from the occasional space or apostrophe.
fn encode(s: &str) -> String {
    s.replace(' ', "%20").replace('\'', "%27")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> SearchUrls {
        SearchUrls::new("http://example.com/member/Default.aspx", None)
    }

    #[test]
    fn death_query_parameters() {
        let url = urls().search(RecordType::Death, "smith", 2000, 1000, 3);
        assert!(url.starts_with("http://example.com/member/Default.aspx?_act=VitalSearchResult"));
        assert!(url.contains("LastName=smith"));
        assert!(url.contains("DeathYear=2000"));
        assert!(url.contains("RecordType=2"));
        assert!(url.contains("pagesize=1000"));
        assert!(url.contains("pageNumber=3"));
        assert!(url.contains("pagesizeAP=1000"));
        assert!(url.contains("pageNumberAP=3"));
        assert!(!url.contains("activityID"));
    }

    #[test]
    fn year_param_follows_record_type() {
        let u = urls();
        assert!(u.search(RecordType::Birth, "smith", 1950, 10, 1).contains("BirthYear=1950"));
        assert!(
            u.search(RecordType::Marriage, "smith", 1950, 10, 1)
                .contains("MarriageYear=1950")
        );
        assert!(
            u.search(RecordType::Divorce, "smith", 1950, 10, 1)
                .contains("DivorceYear=1950")
        );
    }

    #[test]
    fn activity_id_is_appended_when_configured() {
        let u = SearchUrls::new("http://example.com/x", Some("abc-123"));
        assert!(u.search(RecordType::Death, "smith", 2000, 10, 1).contains("activityID=abc-123"));
    }

    #[test]
    fn surname_is_encoded() {
        let url = urls().search(RecordType::Death, "o'neil van dyke", 2000, 10, 1);
        assert!(url.contains("LastName=o%27neil%20van%20dyke"));
    }
}
