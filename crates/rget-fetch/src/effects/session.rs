//! The sequential resume loop.

use url::Url;

use crate::core::RangeCalculator;
use crate::data::{AttemptOutcome, AttemptRecord, DownloadTarget, ResumeOptions};
use crate::effects::http::{Request, Response, Transport};
use crate::effects::policy::{Completion, Decision, ResumePolicy, RetryPolicy};
use crate::effects::writer::PartialFileWriter;
use crate::error::{Error, Result};

/// One download driven to completion over a single transport.
///
/// Each attempt re-reads the staging file's size, asks for the next chunk
/// from that offset, and hands the outcome to a [`RetryPolicy`]. Only one
/// request is ever in flight.
pub struct DownloadSession<T: Transport> {
    transport: T,
    options:   ResumeOptions,
}

impl<T: Transport> DownloadSession<T> {
    pub fn new(transport: T, options: ResumeOptions) -> Self { Self { transport, options } }

    pub fn options(&self) -> &ResumeOptions { &self.options }

    /// Downloads `url` using `method`, resuming from whatever the staging
    /// file already holds.
    pub async fn resume(&self, method: &str, url: &str) -> Result<Completion> {
        self.resume_with(method, url, ResumePolicy::new).await
    }

    /// Like [`resume`](Self::resume), but each outcome is judged by the
    /// policy `make_policy` builds for the resolved target.
    pub async fn resume_with<P, F>(&self, method: &str, url: &str, make_policy: F) -> Result<Completion>
    where
        P: RetryPolicy,
        F: FnOnce(&DownloadTarget, &ResumeOptions) -> P,
    {
        self.options.validate()?;
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        let target = DownloadTarget::resolve(&url, &self.options);

        tracing::info!(
            url = %target.source_url,
            destination = %target.destination.display(),
            partial = %target.partial.display(),
            chunk_size = target.chunk_size,
            "starting resumable download"
        );

        let calculator = RangeCalculator::new(target.chunk_size, target.range_unit.clone());
        let staging = PartialFileWriter::new(&target);
        let mut policy = make_policy(&target, &self.options);
        let mut attempt: u32 = 0;

        loop {
            let persisted = staging.persisted_len()?;
            let range = calculator.next_range(persisted);

            let mut request = Request::new(method, target.source_url.clone());
            for (name, value) in self.options.headers.iter() {
                request.set_header(name.as_str(), value.as_str());
            }
            request.set_header("Range", range.header_value());
            tracing::debug!(attempt, persisted, range = %range, "requesting range");

            let outcome = self.transport.send(&request).await;
            if self.options.debug {
                self.record(attempt, &request, &outcome);
            }

            match policy.decide(attempt, &request, outcome).await? {
                Decision::Stop(completion) => return Ok(completion),
                Decision::Retry => {
                    tokio::time::sleep(policy.delay(attempt)).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    fn record<E: std::error::Error>(
        &self,
        attempt: u32,
        request: &Request,
        outcome: &std::result::Result<Response<E>, E>,
    ) {
        let outcome = match outcome {
            Ok(response) => AttemptOutcome::Response {
                status:  response.status,
                headers: response.headers.clone(),
            },
            Err(e) => AttemptOutcome::Failed { error: e.to_string() },
        };
        let record = AttemptRecord {
            attempt,
            method: request.method.clone(),
            url: request.url.to_string(),
            request_headers: request.headers.clone(),
            outcome,
        };
        record.emit();
        if let Some(ref on_attempt) = self.options.on_attempt {
            on_attempt(&record);
        }
    }
}

/// A reusable entry point holding only the transport.
///
/// Options are supplied per call, so concurrent downloads through one
/// client do not share configuration.
pub struct ResumeClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ResumeClient<T> {
    pub fn new(transport: T) -> Self { Self { transport } }

    pub fn transport(&self) -> &T { &self.transport }

    pub async fn download_resume(
        &self,
        method: &str,
        url: &str,
        options: ResumeOptions,
    ) -> Result<Completion> {
        DownloadSession::new(&self.transport, options).resume(method, url).await
    }
}
