//! HTTP types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `Client` builds `HttpRequest`
//! values without touching the network; a `Transport` (the default one or a
//! caller-supplied one) turns them into `HttpResponse` values. Responses are
//! handed back untouched, since interpreting them is the caller's job.
//!
//! Fields are owned (`String`, `Vec`, `Url`) so a request can outlive the
//! client that built it and be moved to another thread for execution.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use ureq::http::Method;
use url::Url;

use crate::error::ApiError;

/// HTTP method for a request.
///
/// Any valid method token is accepted; tokens without a named variant are
/// carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Other(String),
}

impl HttpMethod {
    /// Token as sent on the request line.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Other(token) => token,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    /// Empty means `GET`. Standard methods match case-insensitively; any other
    /// valid token becomes `Other` with its case kept.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(HttpMethod::Get);
        }
        let token = Method::from_bytes(s.as_bytes())
            .map_err(|_| ApiError::InvalidMethod(s.to_string()))?;
        let method = match s.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            _ => HttpMethod::Other(token.as_str().to_string()),
        };
        Ok(method)
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::new_request` and its `build_*` wrappers. The client
/// never retains it; execute it with `Client::execute` or any `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the JSON body, or `None` if the request has no body.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<Option<T>, ApiError> {
        self.body
            .as_deref()
            .map(|body| serde_json::from_str::<T>(body))
            .transpose()
            .map_err(ApiError::from)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport`. Status codes are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
