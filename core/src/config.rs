//! Client configuration.
//!
//! # Design
//! `ClientBuilder` is an explicit record of named optional settings. Each
//! setting is validated in `build`, and the first invalid one aborts
//! construction with `ApiError::Config`, so a partially configured `Client`
//! is never handed out.
//!
//! The base URL is parsed but not normalized: a base without a trailing slash
//! is accepted here and rejected by every `Client::new_request` call.

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use ureq::http::HeaderValue;
use url::Url;

use crate::client::Client;
use crate::error::{ApiError, Result};
use crate::transport::{Transport, UreqTransport};

/// Version of the remote API this client targets.
pub const API_VERSION: &str = "3.0.0";

pub const DEFAULT_BASE_URL: &str = "https://api.etsy.com/v3/application/";

pub const DEFAULT_USER_AGENT: &str = "go-etsy";

/// Value of the `Host` header attached to every request. It differs from the
/// host of `DEFAULT_BASE_URL`; see DESIGN.md before changing either.
pub const HOST_HEADER: &str = "openapi.etsy.com";

/// Authentication settings attached to a `Client`.
///
/// `user_id` and `access_token` are only needed for endpoints that require
/// delegated-user (OAuth2) scope. They are set together by
/// `ClientBuilder::with_oauth` but nothing enforces the pairing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Options {
    api_key: String,
    user_id: Option<u64>,
    access_token: Option<String>,
}

impl Options {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn user_id(&self) -> Option<u64> {
        self.user_id
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("api_key", &redact(&self.api_key))
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_deref().map(redact))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Builder for `Client`. Start with `Client::builder()`.
#[derive(Default)]
pub struct ClientBuilder {
    options: Options,
    base_url: Option<String>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key sent as `x-api-key` on every request.
    pub fn with_app(mut self, api_key: impl Into<String>) -> Self {
        self.options.api_key = api_key.into();
        self
    }

    /// Set the user id and OAuth access token for endpoints that need
    /// delegated-user scope.
    pub fn with_oauth(mut self, user_id: u64, access_token: impl Into<String>) -> Self {
        self.options.user_id = Some(user_id);
        self.options.access_token = Some(access_token.into());
        self
    }

    /// Override `DEFAULT_BASE_URL`, e.g. to point at a mock server.
    /// Relative paths are joined onto it, so it should end with `/`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Execute requests through `transport` instead of a fresh `UreqTransport`.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client> {
        check_header_value("API key", &self.options.api_key)?;
        if let Some(token) = &self.options.access_token {
            check_header_value("OAuth access token", token)?;
        }

        let base_url = match &self.base_url {
            Some(raw) => {
                let url = Url::parse(raw)
                    .map_err(|e| ApiError::Config(format!("base URL {raw:?}: {e}")))?;
                if url.cannot_be_a_base() {
                    return Err(ApiError::Config(format!(
                        "base URL {raw:?} cannot have paths joined onto it"
                    )));
                }
                url
            }
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        check_header_value("user agent", &user_agent)?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(UreqTransport::new()));

        trace!(base_url = %base_url, user_agent = %user_agent, "client configured");
        Ok(Client::from_parts(transport, base_url, user_agent, self.options))
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("options", &self.options)
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("transport", &self.transport.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

fn check_header_value(what: &str, value: &str) -> Result<()> {
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| ApiError::Config(format!("{what} is not a valid HTTP header value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_options() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(client.options().api_key(), "");
        assert!(client.options().user_id().is_none());
        assert!(client.options().access_token().is_none());
    }

    #[test]
    fn with_oauth_sets_both_fields() {
        let client = ClientBuilder::new()
            .with_app("key")
            .with_oauth(42, "token")
            .build()
            .unwrap();
        assert_eq!(client.options().api_key(), "key");
        assert_eq!(client.options().user_id(), Some(42));
        assert_eq!(client.options().access_token(), Some("token"));
    }

    #[test]
    fn later_option_wins() {
        let client = ClientBuilder::new()
            .with_app("first")
            .with_app("second")
            .build()
            .unwrap();
        assert_eq!(client.options().api_key(), "second");
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let err = ClientBuilder::new().with_app("bad\nkey").build().unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("API key")));
    }

    #[test]
    fn first_failing_option_is_reported() {
        let err = ClientBuilder::new()
            .with_app("bad\nkey")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("API key")));
    }

    #[test]
    fn access_token_with_control_char_is_rejected() {
        let err = ClientBuilder::new()
            .with_oauth(1, "tok\r\nen")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("access token")));
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let err = ClientBuilder::new().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn opaque_base_url_is_rejected() {
        let err = ClientBuilder::new()
            .base_url("mailto:shop@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn base_url_without_trailing_slash_is_kept_as_is() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:3000/v3/application")
            .build()
            .unwrap();
        assert_eq!(client.base_url().path(), "/v3/application");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let options = ClientBuilder::new()
            .with_app("secret-key")
            .with_oauth(7, "secret-token")
            .build()
            .unwrap()
            .options()
            .clone();
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("user_id: Some(7)"));
    }
}
