//! Error types for rget-fetch.
//!
//! Every terminal outcome of a resume loop that is not a success is one of
//! these variants.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No response was received, or the body stream broke mid-transfer.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server answered 416: the local partial state and the remote
    /// resource disagree.
    #[error("range not satisfiable (content-range: {})", content_range.as_deref().unwrap_or("<none>"))]
    RangeNotSatisfiable { content_range: Option<String> },

    /// The received range stopped advancing; the partial file was discarded.
    #[error("download stalled at byte {end} after {attempts} attempts")]
    StalledProgress { end: u64, attempts: u32 },

    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("206 response without a Content-Range header")]
    MissingContentRange,

    /// A partial response that does not start where the staging file ends.
    /// Nothing from it was written.
    #[error("server sent a range starting at byte {got}, expected {expected}")]
    UnexpectedRange { expected: u64, got: u64 },

    /// The last range arrived but the staging file does not hold exactly
    /// the announced total. The staging file is kept.
    #[error("staged {actual} bytes but the resource is {expected} bytes")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("malformed Content-Range header: {0:?}")]
    MalformedContentRange(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Fs(#[from] rget_fs::Error),
}

impl Error {
    /// Whether running the same download again can be expected to make
    /// progress from the partial file left in place.
    pub fn is_resumable(&self) -> bool {
        !matches!(
            self,
            Error::StalledProgress { .. }
                | Error::RangeNotSatisfiable { .. }
                | Error::UnexpectedRange { .. }
                | Error::MissingContentRange
                | Error::MalformedContentRange(_)
                | Error::InvalidUrl(_)
                | Error::InvalidOptions(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
