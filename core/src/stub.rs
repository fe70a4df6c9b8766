//! Recording transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use url::Url;

use crate::config::FineractConfig;
use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

pub(crate) const STUB_BASE_URL: &str = "http://localhost:3000";

pub(crate) struct StubReply(HttpResponse);

impl StubReply {
    pub(crate) fn ok(body: Value) -> Self {
        Self(HttpResponse::json(200, &body))
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }
}

/// Requests seen by a `StubTransport`, shared with the test body.
#[derive(Clone, Default)]
pub(crate) struct Recorded(Arc<Mutex<Vec<HttpRequest>>>);

impl Recorded {
    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub(crate) fn get(&self, index: usize) -> HttpRequest {
        self.0.lock().unwrap()[index].clone()
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.0.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

struct StubTransport {
    replies: Mutex<VecDeque<HttpResponse>>,
    recorded: Recorded,
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.recorded.0.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no stubbed reply left".to_string()))
    }
}

/// A handler whose transport replays `replies` in order.
pub(crate) fn stub_handler(replies: Vec<StubReply>) -> (Arc<RequestHandler>, Recorded) {
    let recorded = Recorded::default();
    let transport = StubTransport {
        replies: Mutex::new(replies.into_iter().map(|r| r.0).collect()),
        recorded: recorded.clone(),
    };
    let handler = RequestHandler::new(FineractConfig::new(STUB_BASE_URL), transport);
    (Arc::new(handler), recorded)
}

/// Path of a recorded request, relative to the stub base URL.
pub(crate) fn path_of(request: &HttpRequest) -> String {
    Url::parse(&request.url).unwrap().path().to_string()
}

pub(crate) fn query_of(request: &HttpRequest) -> Vec<(String, String)> {
    Url::parse(&request.url)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

pub(crate) fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
    query_of(request)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

pub(crate) fn body_of(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
