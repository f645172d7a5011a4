//! Vitalpipe Core - shared infrastructure for the vital-records pipeline
//!
//! Logging, the blocking HTTP facade, the worker-pool task queue, and
//! graceful-shutdown plumbing used by the planner, crawler, and flusher.

pub mod http;
pub mod logging;
pub mod shutdown;
pub mod work_queue;

// Re-exports for convenience
pub use http::{HttpError, get_text, get_text_with_retry};
pub use logging::{SuspendingLogger, init_logging};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
pub use work_queue::TaskQueue;
