//! # Arclight
//!
//! A traced REST server kernel: declarative route resolution plus
//! distributed trace propagation, validated end to end over real sockets.
//!
//! ## Features
//!
//! - Immutable route table with `{name}` templates, literal-over-template
//!   precedence, and locator delegation resolved at build time
//! - Accept/Content-Type negotiation distinguishing 404, 406, and 415
//! - One Server span per request, Client spans for outbound calls, W3C-style
//!   carrier propagation across network hops
//! - Append-only span export buffer served and reset over HTTP
//! - Defensive request-line version guard (501 echo, clean close)
//!
//! ## Architecture
//!
//! Every subsystem implements the [`module::ModuleContract`] trait for
//! uniform lifecycle management; the binary wires the tracing module and
//! the HTTP server together from TOML configuration.

pub mod app;
pub mod config;
pub mod module;
pub mod modules;
