//! # Route Table Module
//!
//! Declarative route metadata and an immutable resolution table.
//!
//! ## Features
//!
//! - `{name}` path templates, one segment per placeholder, no regex
//! - Literal-over-template precedence at every path position
//! - Resource locators delegating to inline sub-routes or named groups,
//!   expanded at build time with cycle detection
//! - Accept/Content-Type negotiation distinguishing 404, 406, and 415

pub mod error;
pub mod media;
pub mod route;
pub mod table;

pub use error::{ResolveError, RouterError, RouterResult};
pub use media::{intersects, parse_accept, MediaType};
pub use route::{
    handler_fn, HandlerFuture, ParamSource, ParamSpec, PathParams, PathTemplate, Route,
    RouteBuilder, RouteHandler, TemplateSegment,
};
pub use table::{RouteMatch, RouteTable, RouteTableBuilder};
