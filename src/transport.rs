// Transport layer: one blocking request in, status and body out. The
// client above this never touches reqwest directly, which lets tests swap
// in `mock::MockTransport`.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method as HttpMethod;

use crate::config::{Config, Credential};
use crate::error::{GistError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response; the status is whatever the service returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with `Remote` unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GistError::Remote {
                status: self.status,
                body: self.body,
            })
        }
    }
}

pub trait Transport {
    /// Perform one request. Only transport-level failures are errors here;
    /// non-2xx statuses come back as a normal `ApiResponse`.
    fn execute(&self, request: &ApiRequest, credential: &Credential) -> Result<ApiResponse>;
}

/// reqwest blocking client bound to one API base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("gistyc/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest, credential: &Credential) -> Result<ApiResponse> {
        let method = match request.method {
            Method::Get => HttpMethod::GET,
            Method::Post => HttpMethod::POST,
            Method::Patch => HttpMethod::PATCH,
            Method::Delete => HttpMethod::DELETE,
        };
        let mut auth = HeaderValue::from_str(&credential.authorization()).map_err(|_| {
            GistError::InvalidArgument("token contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);

        log::debug!("{} {}", request.method, request.path);
        let mut req = self
            .client
            .request(method, self.url(&request.path))
            .header(AUTHORIZATION, auth)
            .query(&request.query);
        if let Some(body) = &request.body {
            req = req
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let res = req.send()?;
        let status = res.status().as_u16();
        let body = res.text()?;
        log::debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse { status, body })
    }
}
