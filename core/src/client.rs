//! Request builder for the Etsy v3 API.
//!
//! # Design
//! `Client` holds its configuration and a transport, and is never mutated by
//! building a request. `new_request` is a pure transform from
//! (configuration, method, relative path, body) to an `HttpRequest`. The
//! caller decides when and how to execute it.
//!
//! Every request carries the same five headers, in this order:
//! `Content-Type`, `Accept`, `x-api-key`, `Host`, `User-Agent`. OAuth
//! credentials are stored but no `Authorization` header is built from them.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;
use url::Url;

use crate::config::{
    ClientBuilder, Options, API_VERSION, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HOST_HEADER,
};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Typed absent body for `Client::new_request`.
pub const NO_BODY: Option<&'static ()> = None;

/// Configured handle through which requests are built.
///
/// Cheap to clone; clones share the transport. Safe to share across threads
/// for request construction.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    user_agent: String,
    options: Options,
}

impl Client {
    /// Client with no options: empty API key, default base URL, user agent
    /// and transport.
    pub fn new() -> Self {
        Self::from_parts(
            Arc::new(UreqTransport::new()),
            default_base_url(),
            DEFAULT_USER_AGENT.to_string(),
            Options::default(),
        )
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        base_url: Url,
        user_agent: String,
        options: Options,
    ) -> Self {
        Self {
            transport,
            base_url,
            user_agent,
            options,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Replace the user agent for requests built from now on.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Build a request for `method` on `path`, resolved against the base URL.
    ///
    /// `path` should not start with `/`: standard relative resolution would
    /// then replace the base path instead of extending it. If `body` is
    /// `Some`, it is JSON encoded into the request body; pass `NO_BODY` for
    /// a request without one.
    pub fn new_request<B>(&self, method: &str, path: &str, body: Option<&B>) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let (url, body) = self.resolve(path, body)?;
        let method: HttpMethod = method.parse()?;
        Ok(self.assemble(method, url, body))
    }

    pub fn build_get(&self, path: &str) -> Result<HttpRequest> {
        let (url, body) = self.resolve(path, NO_BODY)?;
        Ok(self.assemble(HttpMethod::Get, url, body))
    }

    pub fn build_delete(&self, path: &str) -> Result<HttpRequest> {
        let (url, body) = self.resolve(path, NO_BODY)?;
        Ok(self.assemble(HttpMethod::Delete, url, body))
    }

    pub fn build_post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest> {
        let (url, body) = self.resolve(path, Some(body))?;
        Ok(self.assemble(HttpMethod::Post, url, body))
    }

    pub fn build_put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest> {
        let (url, body) = self.resolve(path, Some(body))?;
        Ok(self.assemble(HttpMethod::Put, url, body))
    }

    pub fn build_patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest> {
        let (url, body) = self.resolve(path, Some(body))?;
        Ok(self.assemble(HttpMethod::Patch, url, body))
    }

    /// Execute `request` with this client's transport. The response is
    /// returned as received, whatever its status.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request)
    }

    fn resolve<B>(&self, path: &str, body: Option<&B>) -> Result<(Url, Option<String>)>
    where
        B: Serialize + ?Sized,
    {
        // Checked per call: the base URL is caller-supplied and never corrected.
        if !self.base_url.path().ends_with('/') {
            return Err(ApiError::MalformedBaseUrl(self.base_url.to_string()));
        }
        let url = self.base_url.join(path)?;
        let body = body.map(|b| serde_json::to_string(b)).transpose()?;
        Ok((url, body))
    }

    fn assemble(&self, method: HttpMethod, url: Url, body: Option<String>) -> HttpRequest {
        trace!(%method, %url, has_body = body.is_some(), "built request");
        HttpRequest {
            method,
            url,
            headers: self.headers(),
            body,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("x-api-key".to_string(), self.options.api_key().to_string()),
            ("Host".to_string(), HOST_HEADER.to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ]
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("options", &self.options)
            .field("api_version", &API_VERSION)
            .finish_non_exhaustive()
    }
}

fn default_base_url() -> Url {
    match Url::parse(DEFAULT_BASE_URL) {
        Ok(url) => url,
        Err(e) => unreachable!("default base URL is valid: {e}"),
    }
}
