//! Blocking HTTP facade over a shared async client.
//!
//! Uses async reqwest internally but presents a sync interface so the
//! planner and the rayon worker pool can call it directly.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout (result pages are small HTML bodies)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Base delay for exponential backoff between retry attempts
const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// HTTP failure with optional status code.
#[derive(Debug)]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(s) => write!(f, "HTTP {s}: {}", self.message),
            None => write!(f, "HTTP error: {}", self.message),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Rate limits, server errors, and transport failures are worth retrying;
    /// other 4xx responses are not.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            Some(429) | Some(500..=599) => true,
            Some(_) => false,
            None => true,
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Blocking GET returning the response body as text.
///
/// `cookie` is attached as a `Cookie` header when present (session
/// management itself happens outside the pipeline).
pub fn get_text(url: &str, cookie: Option<&str>) -> Result<String, HttpError> {
    SHARED_RUNTIME.handle().block_on(async {
        let mut req = SHARED_CLIENT.get(url);
        if let Some(c) = cookie {
            req = req.header(reqwest::header::COOKIE, c);
        }
        let resp = req
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HttpError::from_reqwest(&e))?;
        resp.text().await.map_err(|e| HttpError::from_reqwest(&e))
    })
}

/// Blocking GET with exponential-backoff retry on retryable failures.
pub fn get_text_with_retry(
    url: &str,
    cookie: Option<&str>,
    max_retries: u32,
) -> Result<String, HttpError> {
    let mut attempt = 0u32;
    loop {
        match get_text(url, cookie) {
            Ok(body) => return Ok(body),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                log::debug!("request attempt {attempt}/{max_retries} failed: {e}, retrying in {delay:?}");
                std::thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}
