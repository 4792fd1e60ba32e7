//! Resumable HTTP downloads over byte-range requests.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Options, ranges, progress and diagnostic records
//! - [`core`] - Pure transformations: range arithmetic, `Content-Range`
//!   parsing, filename derivation, stall detection
//! - [`effects`] - The transport trait, the staging-file writer and the
//!   resume loop
//!
//! A download asks for one chunk at a time starting at the current size of
//! a `<destination>.<ext>` staging file. Each partial response is appended
//! to it; when a response covers the last byte of the resource the staging
//! file is renamed over the destination. A server that ignores ranges and
//! answers `200` gets its body written straight to the destination.
//!
//! ```no_run
//! # async fn run() -> rget_fetch::Result<()> {
//! use rget_fetch::{ReqwestClient, ResumeClient, ResumeOptions};
//!
//! let client = ResumeClient::new(ReqwestClient::new().map_err(|e| {
//!     rget_fetch::Error::Connection(e.to_string())
//! })?);
//! let done = client
//!     .download_resume("GET", "https://example.com/video.mp4", ResumeOptions::default())
//!     .await?;
//! println!("{done:?}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{RangeCalculator, resolve_filename};
pub use data::{AttemptOutcome, AttemptRecord, Backoff, Progress, ResumeOptions};
pub use effects::{
    Completion, Decision, DownloadSession, PartialFileWriter, Request, Response, ResumeClient,
    ResumePolicy, RetryPolicy, Transport,
};
#[cfg(feature = "reqwest")]
pub use effects::{ReqwestClient, ReqwestTransportError};
pub use error::{Error, Result};
