//! Pipeline entry points for feed operations.
//!
//! - `run_sanitize`: Rewrite forbidden keys in place (with backup/rollback)
//! - `run_audit`: Check every ROM URL and persist the reports
//! - `run_publish`: Upload the feed to the tree store in chunks
//! - `run_pipeline`: All of the above in order

pub mod audit;
pub mod load;
pub mod pipeline;
pub mod publish;
pub mod sanitize;

pub use audit::run_audit;
pub use load::{LoadedFeed, load_feed};
pub use pipeline::{PipelineOptions, run_pipeline};
pub use publish::{open_store, run_publish};
pub use sanitize::{run_sanitize, sanitize_file};
