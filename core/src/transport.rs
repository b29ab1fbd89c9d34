//! The execution seam between built requests and the network.
//!
//! # Design
//! `Client` owns a `Transport` but never calls it while building a request.
//! Callers either execute through `Client::execute` or hand the
//! `HttpRequest` to a transport of their own. `UreqTransport` is the default
//! and is constructed fresh per client, so there is no process-wide agent.

use tracing::debug;
use ureq::http::{Request, Response};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Something that can execute an `HttpRequest` and return an `HttpResponse`
/// or a transport error.
///
/// Implementations must return non-2xx responses as data. Interpreting the
/// status is left to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The `Host` header carried by built requests is not forwarded; the wire
/// host always comes from the request URL.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Agent with ureq's status-code-as-error behavior disabled and
    /// extension methods allowed.
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent (timeouts, proxies, TLS). The agent should
    /// have `http_status_as_error(false)` or error statuses come back as
    /// `ApiError::Transport`, and `allow_non_standard_methods(true)` to send
    /// extension methods.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "executing request");

        let url = request.url.as_str();
        let body = request.body.as_deref();
        let headers = &request.headers;

        let mut response = match &request.method {
            HttpMethod::Get => send_without_body(apply_headers(self.agent.get(url), headers), body),
            HttpMethod::Head => send_without_body(apply_headers(self.agent.head(url), headers), body),
            HttpMethod::Delete => {
                send_without_body(apply_headers(self.agent.delete(url), headers), body)
            }
            HttpMethod::Post => send_with_body(apply_headers(self.agent.post(url), headers), body),
            HttpMethod::Put => send_with_body(apply_headers(self.agent.put(url), headers), body),
            HttpMethod::Patch => send_with_body(apply_headers(self.agent.patch(url), headers), body),
            method @ (HttpMethod::Options | HttpMethod::Trace | HttpMethod::Other(_)) => {
                send_any(&self.agent, method, url, headers, body)
            }
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;

        debug!(status, "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

fn apply_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("host") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Methods without a typed ureq builder go through `Agent::run`. An absent
/// body is sent as an empty one.
fn send_any(
    agent: &Agent,
    method: &HttpMethod,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> Result<Response<Body>> {
    let mut builder = Request::builder().method(method.as_str()).uri(url);
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("host") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    let request = builder
        .body(body.unwrap_or_default().as_bytes())
        .map_err(|e| ApiError::Transport(format!("cannot send {method} request: {e}")))?;
    agent.run(request).map_err(transport_error)
}

fn send_without_body(builder: RequestBuilder<WithoutBody>, body: Option<&str>) -> Result<Response<Body>> {
    match body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
    .map_err(transport_error)
}

fn send_with_body(builder: RequestBuilder<WithBody>, body: Option<&str>) -> Result<Response<Body>> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
    .map_err(transport_error)
}

fn transport_error(e: ureq::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}
