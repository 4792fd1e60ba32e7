//! Per-attempt diagnostic records.

use serde::Serialize;

/// One request/response exchange, as seen by the resume loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt:         u32,
    pub method:          String,
    pub url:             String,
    pub request_headers: Vec<(String, String)>,
    pub outcome:         AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Response {
        status:  u16,
        headers: Vec<(String, String)>,
    },
    Failed {
        error: String,
    },
}

impl AttemptRecord {
    /// Writes the record as a structured event on the `rget::stats` target.
    pub fn emit(&self) {
        match &self.outcome {
            AttemptOutcome::Response { status, headers } => tracing::debug!(
                target: "rget::stats",
                attempt = self.attempt,
                method = %self.method,
                url = %self.url,
                request_headers = ?self.request_headers,
                status,
                response_headers = ?headers,
                "attempt completed"
            ),
            AttemptOutcome::Failed { error } => tracing::debug!(
                target: "rget::stats",
                attempt = self.attempt,
                method = %self.method,
                url = %self.url,
                request_headers = ?self.request_headers,
                %error,
                "attempt failed"
            ),
        }
    }
}
