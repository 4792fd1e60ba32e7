#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use futures_util::stream;
use rget_fetch::effects::BoxStream;
use rget_fetch::{Request, Response, Transport};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// One canned exchange.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        status:  u16,
        headers: Vec<(String, String)>,
        body:    Vec<u8>,
    },
    /// Headers arrive, then the body breaks after `body`.
    BrokenBody {
        status:  u16,
        headers: Vec<(String, String)>,
        body:    Vec<u8>,
        error:   String,
    },
    Fail(String),
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn partial(start: u64, end: u64, total: u64, body: &[u8]) -> Self {
        Reply::Respond {
            status:  206,
            headers: vec![content_range(start, end, total)],
            body:    body.to_vec(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        match &mut self {
            Reply::Respond { headers, .. } | Reply::BrokenBody { headers, .. } => {
                headers.push((name.to_string(), value.to_string()))
            }
            Reply::Fail(_) => {}
        }
        self
    }
}

pub fn content_range(start: u64, end: u64, total: u64) -> (String, String) {
    ("Content-Range".to_string(), format!("bytes {start}-{end}/{total}"))
}

/// Plays back a fixed list of replies, recording every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies:  Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies:  Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replays `reply` `times` times.
    pub fn repeating(reply: Reply, times: usize) -> Self { Self::new(std::iter::repeat_n(reply, times)) }

    pub fn requests(&self) -> Vec<Request> { self.requests.lock().unwrap().clone() }

    pub fn ranges(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.header("range").unwrap_or_default().to_string())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    type Error = MockError;

    async fn send(&self, request: &Request) -> Result<Response<MockError>, MockError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MockError("script exhausted".into()))?;

        match reply {
            Reply::Respond { status, headers, body } => Ok(Response {
                status,
                headers,
                body: body_of(vec![Ok(Bytes::from(body))]),
            }),
            Reply::BrokenBody {
                status,
                headers,
                body,
                error,
            } => Ok(Response {
                status,
                headers,
                body: body_of(vec![Ok(Bytes::from(body)), Err(MockError(error))]),
            }),
            Reply::Fail(message) => Err(MockError(message)),
        }
    }
}

/// Serves `content` honoring `Range: bytes=S-E`, optionally capping how
/// many bytes a single response carries.
pub struct RangeServer {
    content:      Vec<u8>,
    max_response: Option<usize>,
    ignore_range: bool,
    requests:     Mutex<Vec<Request>>,
}

impl RangeServer {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            max_response: None,
            ignore_range: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn max_response(mut self, max: usize) -> Self {
        self.max_response = Some(max);
        self
    }

    pub fn ignore_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    pub fn requests(&self) -> Vec<Request> { self.requests.lock().unwrap().clone() }

    pub fn ranges(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.header("range").unwrap_or_default().to_string())
            .collect()
    }

    fn reply(&self, request: &Request) -> Response<MockError> {
        let total = self.content.len() as u64;
        let range = request.header("range").and_then(parse_range);

        let (start, end) = match range {
            Some(range) if !self.ignore_range => range,
            _ => {
                return Response {
                    status:  200,
                    headers: vec![("Content-Length".into(), total.to_string())],
                    body:    body_of(vec![Ok(Bytes::from(self.content.clone()))]),
                };
            }
        };

        if start >= total {
            return Response {
                status:  416,
                headers: vec![("Content-Range".into(), format!("bytes */{total}"))],
                body:    body_of(Vec::new()),
            };
        }

        let mut end = end.min(total - 1);
        if let Some(max) = self.max_response {
            end = end.min(start + max as u64 - 1);
        }
        let slice = self.content[start as usize..=end as usize].to_vec();
        Response {
            status:  206,
            headers: vec![content_range(start, end, total)],
            body:    body_of(vec![Ok(Bytes::from(slice))]),
        }
    }
}

impl Transport for RangeServer {
    type Error = MockError;

    async fn send(&self, request: &Request) -> Result<Response<MockError>, MockError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply(request))
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

fn body_of(chunks: Vec<Result<Bytes, MockError>>) -> BoxStream<'static, Result<Bytes, MockError>> {
    Box::pin(stream::iter(chunks))
}

pub fn sample(len: usize) -> Vec<u8> { (0..len).map(|i| (i % 251) as u8).collect() }
