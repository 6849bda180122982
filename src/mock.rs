use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::config::Credential;
use crate::error::{GistError, Result};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    pub authorization: String,
}

/// Scripted in-memory transport for tests.
///
/// Responses are handed out in the order they were queued. Every request
/// is recorded, so tests can count calls and look at paths and bodies.
/// Uses `RefCell` since the client is single-threaded.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<ApiResponse>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: impl Into<String>) -> &Self {
        self.responses.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(status, body.to_string())
    }

    /// Queue a transport-level failure (no status code).
    pub fn push_error(&self, error: GistError) -> &Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    /// Queue one listing page per entry, each holding `size` gists, all
    /// with distinct ids and a single file named `file_<n>.py`.
    pub fn push_pages(&self, sizes: &[usize]) -> &Self {
        let mut n = 0;
        for &size in sizes {
            let page: Vec<Value> = (0..size)
                .map(|_| {
                    n += 1;
                    gist_json(&format!("id{n}"), &[&format!("file_{n}.py")])
                })
                .collect();
            self.push_json(200, Value::Array(page));
        }
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.request.method == method)
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &ApiRequest, credential: &Credential) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            request: request.clone(),
            authorization: credential.authorization(),
        });
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(GistError::Transport(format!(
                "no scripted response for {} {}",
                request.method, request.path
            )))
        })
    }
}

/// Minimal gist payload the way the listing endpoint returns it.
pub fn gist_json(id: &str, files: &[&str]) -> Value {
    let files: serde_json::Map<String, Value> = files
        .iter()
        .map(|f| (f.to_string(), serde_json::json!({ "filename": f })))
        .collect();
    serde_json::json!({
        "id": id,
        "public": true,
        "files": files,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}
