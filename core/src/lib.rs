//! Request-building client core for the Etsy Open API v3.
//!
//! # Overview
//! Holds configuration (base URL, API key, optional OAuth credentials, user
//! agent) and turns a method, a relative path and an optional JSON payload
//! into an `HttpRequest`. Executing the request and interpreting the response
//! are left to the caller (host-does-IO pattern); a default blocking
//! transport is provided for convenience.
//!
//! # Design
//! - `Client` is immutable while building requests; building is a pure
//!   transform and never performs I/O.
//! - Configuration goes through `ClientBuilder`, which validates every
//!   setting and fails on the first bad one.
//! - `Transport` is the only seam to the network. Inject one with
//!   `ClientBuilder::transport`, or get a fresh `UreqTransport`.
//! - Response parsing, pagination, rate limiting and retries are out of
//!   scope.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{Client, NO_BODY};
pub use config::{ClientBuilder, Options, API_VERSION, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HOST_HEADER};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
