//! Immutable data types for resumable downloads.
//!
//! Configuration, the resolved download target, the range request/response
//! pair, per-call retry state, and the records handed to callbacks.

pub mod diagnostics;
pub mod options;
pub mod progress;
pub mod range;
pub mod state;
pub mod target;

pub use diagnostics::{AttemptOutcome, AttemptRecord};
pub use options::{Backoff, ResumeOptions};
pub use progress::Progress;
pub use range::{DEFAULT_RANGE_UNIT, RangeRequest, RangeResponseInfo};
pub use state::RetryAttemptState;
pub use target::DownloadTarget;
