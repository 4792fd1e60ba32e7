//! Network and filesystem effects.
//!
//! The transport is a trait so the resume loop can run against `reqwest`
//! in production and a scripted server in tests.

mod http;
mod policy;
mod session;
mod writer;

pub use http::{BoxStream, Request, Response, Transport};
#[cfg(feature = "reqwest")]
pub use http::{ReqwestClient, ReqwestTransportError};
pub use policy::{Completion, Decision, ResumePolicy, RetryPolicy};
pub use session::{DownloadSession, ResumeClient};
pub use writer::PartialFileWriter;
