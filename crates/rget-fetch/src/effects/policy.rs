//! The decision function run after every exchange.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{GuardVerdict, ProgressGuard, StatusClass, classify, parse_content_range, retry_delay};
use crate::data::{Backoff, DownloadTarget, Progress, ResumeOptions};
use crate::effects::http::{Request, Response};
use crate::effects::writer::PartialFileWriter;
use crate::error::{Error, Result};

/// How a resume loop ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The last partial response reached the end of the resource and the
    /// staging file was renamed over the destination.
    Finalized { path: PathBuf, bytes: u64 },
    /// The server ignored the range and sent the whole body, which was
    /// written directly to the destination.
    WholeFile { path: PathBuf, bytes: u64 },
    /// A redirect the transport did not follow; nothing was written.
    Redirected { status: u16, location: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Stop(Completion),
}

/// Decides, after each exchange, whether the loop goes round again.
///
/// Called with the 0-based attempt number, the request that was sent, and
/// either the response or the transport error. Returning `Err` ends the
/// loop with that error.
pub trait RetryPolicy: Send {
    fn decide<E>(
        &mut self,
        attempt: u32,
        request: &Request,
        outcome: std::result::Result<Response<E>, E>,
    ) -> impl Future<Output = Result<Decision>> + Send
    where
        E: std::error::Error + Send + Sync + 'static;

    /// Wait before the attempt that follows `attempt`.
    fn delay(&self, attempt: u32) -> Duration;
}

/// The resume state machine: persists partial content, finalizes on the
/// last range, and stops on anything it cannot make progress with.
pub struct ResumePolicy {
    writer:               PartialFileWriter,
    guard:                ProgressGuard,
    backoff:              Backoff,
    server_error_retries: u32,
    server_errors_seen:   u32,
    on_progress:          Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl ResumePolicy {
    pub fn new(target: &DownloadTarget, options: &ResumeOptions) -> Self {
        Self {
            writer:               PartialFileWriter::new(target),
            guard:                ProgressGuard::new(options.stall_check_interval),
            backoff:              options.backoff,
            server_error_retries: options.server_error_retries,
            server_errors_seen:   0,
            on_progress:          options.on_progress.clone(),
        }
    }

    pub fn writer(&self) -> &PartialFileWriter { &self.writer }

    pub fn guard(&self) -> &ProgressGuard { &self.guard }

    async fn on_partial<E>(&mut self, attempt: u32, response: Response<E>) -> Result<Decision>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let header = response.header("content-range").ok_or(Error::MissingContentRange)?;
        let info = parse_content_range(header)?;

        let persisted = self.writer.persisted_len()?;
        if info.start != persisted {
            tracing::warn!(attempt, range = %info, persisted, "range does not continue staging file");
            return Err(Error::UnexpectedRange {
                expected: persisted,
                got:      info.start,
            });
        }

        let appended = self.writer.append_stream(response.body).await?;
        tracing::debug!(attempt, range = %info, appended, "persisted partial content");

        if info.is_final() {
            let staged = self.writer.persisted_len()?;
            if staged != info.total {
                return Err(Error::SizeMismatch {
                    expected: info.total,
                    actual:   staged,
                });
            }
            self.writer.finalize().await?;
            let bytes = rget_fs::file_len(self.writer.destination())?;
            self.report(bytes, info.total, attempt);
            tracing::info!(
                destination = %self.writer.destination().display(),
                bytes,
                attempts = attempt + 1,
                "download complete"
            );
            return Ok(Decision::Stop(Completion::Finalized {
                path: self.writer.destination().to_path_buf(),
                bytes,
            }));
        }

        self.report(self.writer.persisted_len()?, info.total, attempt);

        match self.guard.observe(attempt, info.end) {
            GuardVerdict::Progressing => Ok(Decision::Retry),
            GuardVerdict::Stalled { end } => {
                tracing::warn!(
                    attempt,
                    end,
                    "received range stopped advancing; discarding staging file"
                );
                self.writer.discard();
                Err(Error::StalledProgress {
                    end,
                    attempts: attempt + 1,
                })
            }
        }
    }

    async fn on_whole_body<E>(&mut self, attempt: u32, response: Response<E>) -> Result<Decision>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        // Superseded by the full body, whatever attempt this is.
        self.writer.discard();
        let bytes = self.writer.write_whole(response.body).await?;
        self.report(bytes, Some(bytes), attempt);
        tracing::info!(
            destination = %self.writer.destination().display(),
            bytes,
            "server sent the whole file"
        );
        Ok(Decision::Stop(Completion::WholeFile {
            path: self.writer.destination().to_path_buf(),
            bytes,
        }))
    }

    fn report(&self, bytes_persisted: u64, total: impl Into<Option<u64>>, attempt: u32) {
        if let Some(ref callback) = self.on_progress {
            callback(&Progress::new(bytes_persisted, total.into(), attempt));
        }
    }
}

impl RetryPolicy for ResumePolicy {
    async fn decide<E>(
        &mut self,
        attempt: u32,
        request: &Request,
        outcome: std::result::Result<Response<E>, E>,
    ) -> Result<Decision>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(attempt, url = %request.url, error = %e, "no response");
                return Err(Error::Connection(e.to_string()));
            }
        };

        let status = response.status;
        tracing::debug!(attempt, url = %request.url, status, "response received");

        match classify(status) {
            StatusClass::Partial => self.on_partial(attempt, response).await,
            StatusClass::WholeBody => self.on_whole_body(attempt, response).await,
            StatusClass::Redirect => Ok(Decision::Stop(Completion::Redirected {
                status,
                location: response.header("location").map(str::to_string),
            })),
            StatusClass::RangeNotSatisfiable => Err(Error::RangeNotSatisfiable {
                content_range: response.header("content-range").map(str::to_string),
            }),
            StatusClass::ServerError if self.server_errors_seen < self.server_error_retries => {
                self.server_errors_seen += 1;
                tracing::debug!(
                    attempt,
                    status,
                    retry = self.server_errors_seen,
                    "server error, retrying"
                );
                Ok(Decision::Retry)
            }
            StatusClass::ServerError | StatusClass::Other => Err(Error::UnexpectedStatus { status }),
        }
    }

    fn delay(&self, attempt: u32) -> Duration { retry_delay(attempt, self.backoff) }
}
