//! Error types for the Etsy API client.
//!
//! # Design
//! Every failure is returned to the caller; nothing is retried or recovered
//! here. Configuration problems surface from `ClientBuilder::build`, request
//! problems from `Client::new_request`, and network problems from a
//! `Transport`. Status codes are not errors at this layer: a 4xx/5xx response
//! is still an `HttpResponse`.

use thiserror::Error;

/// Errors returned by client construction, request building and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A configuration option could not be applied. No client was built.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The base URL path does not end with `/`, so relative paths would
    /// replace its last segment instead of extending it.
    #[error("BaseURL must have a trailing slash, but {0:?} does not")]
    MalformedBaseUrl(String),

    /// The relative path could not be resolved against the base URL.
    #[error("invalid request URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The method string is not an HTTP method this client can send.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
