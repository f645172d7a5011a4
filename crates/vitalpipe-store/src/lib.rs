//! Vitalpipe Store - durable state for the vital-records pipeline
//!
//! Task identity, the idempotent task catalog, the crash-safe staging
//! area, the permanent record archive, and the stage-to-store flusher.
//! Everything durable is a JSON document committed by atomic rename; no
//! component here touches the network or a thread pool.

pub mod archive;
pub mod catalog;
pub mod convert;
pub mod flush;
pub mod hash;
pub mod record;
pub mod staging;
pub mod task;

// Re-exports for convenience
pub use archive::{FsArchive, StoredRecord};
pub use catalog::{Catalog, FsCatalog};
pub use convert::{ConvertError, convert};
pub use flush::{Flusher, SweepStats};
pub use hash::{fingerprint, short_id};
pub use record::Record;
pub use staging::StagingArea;
pub use task::{RecordType, Task};
