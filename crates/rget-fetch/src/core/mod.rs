//! Pure transformations for the resume loop.
//!
//! Nothing in here touches the network or the filesystem: range arithmetic,
//! header parsing, filename derivation, stall detection, status
//! classification and backoff.

mod filename;
mod guard;
mod range;
mod retry;
mod status;

pub use filename::resolve_filename;
pub use guard::{GuardVerdict, ProgressGuard};
pub use range::{RangeCalculator, parse_content_range};
pub use retry::retry_delay;
pub use status::{StatusClass, classify, is_redirect};
