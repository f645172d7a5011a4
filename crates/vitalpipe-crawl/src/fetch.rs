//! Page fetching seam
//!
//! Fetch failures are transient by contract: the fetcher answers
//! html-or-nothing and callers leave the task pending on nothing. Login
//! and session management happen outside the pipeline; an established
//! session cookie can be passed through.

use vitalpipe_core::http;

/// Fetches one result page. None means "not this time": network error,
/// non-retryable status, or an empty body.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Option<String>;
}

/// Production fetcher over the shared HTTP client.
pub struct HttpFetcher {
    max_retries: u32,
    session_cookie: Option<String>,
}

impl HttpFetcher {
    pub fn new(max_retries: u32, session_cookie: Option<String>) -> Self {
        Self {
            max_retries,
            session_cookie,
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<String> {
        match http::get_text_with_retry(url, self.session_cookie.as_deref(), self.max_retries) {
            Ok(body) if body.trim().is_empty() => {
                log::debug!("empty response body");
                None
            }
            Ok(body) => Some(body),
            Err(e) => {
                log::warn!("fetch failed: {e}");
                None
            }
        }
    }
}
