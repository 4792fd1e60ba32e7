use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::diagnostics::AttemptRecord;
use super::progress::Progress;
use super::range::DEFAULT_RANGE_UNIT;
use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_PARTIAL_EXT: &str = "part";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_STALL_CHECK_INTERVAL: u32 = 5;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Constant(Duration),
    /// `base * 2^retry`.
    Exponential(Duration),
}

impl Default for Backoff {
    fn default() -> Self { Backoff::Constant(DEFAULT_RETRY_DELAY) }
}

/// Per-session configuration for a resumable download.
///
/// Nothing here is process-wide: two sessions with different options can run
/// side by side.
///
/// # Examples
///
/// ```
/// use rget_fetch::data::ResumeOptions;
/// use std::time::Duration;
///
/// let options = ResumeOptions::default()
///     .chunk_size(10 * 1024 * 1024)
///     .file_path("downloads/video.mp4")
///     .retry_delay(Duration::from_millis(20))
///     .debug(true);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct ResumeOptions {
    /// Bytes requested per range request.
    ///
    /// Default: 50 MiB
    pub chunk_size: u64,

    /// Explicit destination. When `None` the destination is derived from
    /// the request URL and placed under `download_dir`.
    pub file_path: Option<PathBuf>,

    /// Suffix of the staging file: `<destination>.<partial_ext>`.
    ///
    /// Default: `"part"`
    pub partial_ext: String,

    /// Unit token used in `Range` headers.
    ///
    /// Default: `"bytes"`
    pub range_unit: String,

    /// Directory for derived destinations.
    ///
    /// Default: `downloads`
    pub download_dir: PathBuf,

    /// Delay between attempts.
    ///
    /// Default: constant 50ms
    pub backoff: Backoff,

    /// How many 5xx responses are retried before giving up. `0` makes any
    /// server error terminal.
    ///
    /// Default: 0
    pub server_error_retries: u32,

    /// Every this many attempts the received end offset must have moved.
    ///
    /// Default: 5
    pub stall_check_interval: u32,

    /// Emit one diagnostic record per attempt.
    pub debug: bool,

    /// Extra request headers sent on every attempt. `Range` is always
    /// overridden.
    pub headers: Arc<[(String, String)]>,

    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,

    /// Sink for diagnostic records; only called when `debug` is set.
    pub on_attempt: Option<Arc<dyn Fn(&AttemptRecord) + Send + Sync>>,
}

impl fmt::Debug for ResumeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeOptions")
            .field("chunk_size", &self.chunk_size)
            .field("file_path", &self.file_path)
            .field("partial_ext", &self.partial_ext)
            .field("range_unit", &self.range_unit)
            .field("download_dir", &self.download_dir)
            .field("backoff", &self.backoff)
            .field("server_error_retries", &self.server_error_retries)
            .field("stall_check_interval", &self.stall_check_interval)
            .field("debug", &self.debug)
            .field("headers", &self.headers)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .field("on_attempt", &self.on_attempt.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl Default for ResumeOptions {
    fn default() -> Self {
        Self {
            chunk_size:           DEFAULT_CHUNK_SIZE,
            file_path:            None,
            partial_ext:          DEFAULT_PARTIAL_EXT.to_string(),
            range_unit:           DEFAULT_RANGE_UNIT.to_string(),
            download_dir:         PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            backoff:              Backoff::default(),
            server_error_retries: 0,
            stall_check_interval: DEFAULT_STALL_CHECK_INTERVAL,
            debug:                false,
            headers:              Arc::new([]),
            on_progress:          None,
            on_attempt:           None,
        }
    }
}

impl ResumeOptions {
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    #[must_use]
    pub fn partial_ext(mut self, partial_ext: impl Into<String>) -> Self {
        self.partial_ext = partial_ext.into();
        self
    }

    #[must_use]
    pub fn range_unit(mut self, range_unit: impl Into<String>) -> Self {
        self.range_unit = range_unit.into();
        self
    }

    #[must_use]
    pub fn download_dir(mut self, download_dir: impl Into<PathBuf>) -> Self {
        self.download_dir = download_dir.into();
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Shorthand for a constant backoff.
    #[must_use]
    pub fn retry_delay(self, delay: Duration) -> Self { self.backoff(Backoff::Constant(delay)) }

    #[must_use]
    pub fn server_error_retries(mut self, retries: u32) -> Self {
        self.server_error_retries = retries;
        self
    }

    #[must_use]
    pub fn stall_check_interval(mut self, interval: u32) -> Self {
        self.stall_check_interval = interval;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Add a single request header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// Replace all request headers.
    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Arc::from(headers);
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    #[must_use]
    pub fn on_attempt(mut self, on_attempt: Arc<dyn Fn(&AttemptRecord) + Send + Sync>) -> Self {
        self.on_attempt = Some(on_attempt);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidOptions("chunk_size must be greater than 0".into()));
        }
        if self.stall_check_interval == 0 {
            return Err(Error::InvalidOptions(
                "stall_check_interval must be greater than 0".into(),
            ));
        }
        if self.partial_ext.is_empty() {
            return Err(Error::InvalidOptions("partial_ext must not be empty".into()));
        }
        if self.range_unit.is_empty() || self.range_unit.contains(['=', ' ']) {
            return Err(Error::InvalidOptions(format!(
                "invalid range unit {:?}",
                self.range_unit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResumeOptions::default();
        assert_eq!(options.chunk_size, 50 * 1024 * 1024);
        assert_eq!(options.partial_ext, "part");
        assert_eq!(options.range_unit, "bytes");
        assert_eq!(options.download_dir, PathBuf::from("downloads"));
        assert_eq!(options.backoff, Backoff::Constant(Duration::from_millis(50)));
        assert_eq!(options.server_error_retries, 0);
        assert_eq!(options.stall_check_interval, 5);
        assert!(!options.debug);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_header_appends() {
        let options = ResumeOptions::default()
            .header("Authorization", "Bearer token")
            .header("User-Agent", "rget");
        assert_eq!(options.headers.len(), 2);
        assert_eq!(options.headers[1], ("User-Agent".to_string(), "rget".to_string()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ResumeOptions::default().chunk_size(0).validate().is_err());
        assert!(ResumeOptions::default().stall_check_interval(0).validate().is_err());
        assert!(ResumeOptions::default().partial_ext("").validate().is_err());
        assert!(ResumeOptions::default().range_unit("by tes").validate().is_err());
    }

    #[test]
    fn test_debug_elides_callbacks() {
        let options = ResumeOptions::default().on_progress(Arc::new(|_| {}));
        let rendered = format!("{options:?}");
        assert!(rendered.contains("on_progress: Some(\"{ ... }\")"));
        assert!(rendered.contains("on_attempt: None"));
    }
}
