//! # HTTP Module
//!
//! HTTP/1.1 server and a minimal traced client.
//!
//! ## Features
//!
//! - httparse-backed request/response model with builder construction
//! - Defensive request-line version guard (501 echo, clean close)
//! - Traced dispatch through the route table with a Server span per request
//! - Untraced telemetry endpoints serving and resetting the export buffer

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use client::HttpClient;
pub use config::HttpServerConfig;
pub use context::RequestContext;
pub use error::{HttpError, HttpResult};
pub use headers::HeaderMap;
pub use request::{scan_version, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
pub use server::{HttpServer, HttpStats};
