use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An outgoing request: method, URL, and the full header list to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method:  String,
    pub url:     Url,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Vec::new(),
        }
    }

    /// Sets `name`, replacing any existing header with the same
    /// case-insensitive name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> { find_header(&self.headers, name) }
}

/// A response as the transport hands it over: status, headers, and an
/// unread body stream.
pub struct Response<E> {
    pub status:  u16,
    pub headers: Vec<(String, String)>,
    pub body:    BoxStream<'static, Result<Bytes, E>>,
}

impl<E> Response<E> {
    pub fn header(&self, name: &str) -> Option<&str> { find_header(&self.headers, name) }
}

impl<E> std::fmt::Debug for Response<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"{ ... }")
            .finish()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// The request/response exchange primitive the resume loop is built on.
///
/// Implementations own connection handling, TLS, timeouts and redirect
/// following. A timeout or connection failure is reported as `Err`; any
/// status code, including errors, is an `Ok` response.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Scripted implementations in tests
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response<Self::Error>, Self::Error>> + Send;
}

impl<T: Transport> Transport for &T {
    type Error = T::Error;

    fn send(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response<Self::Error>, Self::Error>> + Send {
        (**self).send(request)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::TryStreamExt;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    pub enum ReqwestTransportError {
        #[error(transparent)]
        Http(#[from] reqwest::Error),

        #[error("invalid HTTP method {0:?}")]
        InvalidMethod(String),
    }

    /// Production transport using reqwest.
    ///
    /// Redirects are followed by reqwest itself, so a 3xx only reaches the
    /// resume loop when the redirect policy gives up.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self, ReqwestTransportError> {
            let client = reqwest::Client::builder().build()?;
            Ok(Self { client })
        }

        /// Client with explicit connect and per-read timeouts.
        pub fn with_timeouts(
            connect_timeout: Duration,
            read_timeout: Duration,
        ) -> Result<Self, ReqwestTransportError> {
            let client = reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .read_timeout(read_timeout)
                .build()?;
            Ok(Self { client })
        }

        pub fn from_client(client: reqwest::Client) -> Self { Self { client } }
    }

    impl Transport for ReqwestClient {
        type Error = ReqwestTransportError;

        async fn send(&self, request: &Request) -> Result<Response<Self::Error>, Self::Error> {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|_| ReqwestTransportError::InvalidMethod(request.method.clone()))?;

            let mut builder = self.client.request(method, request.url.clone());
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.bytes_stream().map_err(ReqwestTransportError::from);

            Ok(Response {
                status,
                headers,
                body: Box::pin(body),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestClient, ReqwestTransportError};
