//! Route metadata: path templates, parameter declarations, and handlers.
//!
//! Routes are plain immutable value records, builder-constructed at startup.
//! There is no runtime discovery; everything a route knows is declared when
//! the table is assembled.

use super::error::{RouterError, RouterResult};
use super::media::{self, MediaType};
use crate::modules::http::context::RequestContext;
use crate::modules::http::error::HttpResult;
use crate::modules::http::response::Response;
use http::Method;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// Where a declared parameter is sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Path template segment.
    Path,
    /// Query string entry.
    Query,
    /// Request header.
    Header,
    /// Form field.
    Form,
    /// Request body.
    Body,
    /// Aggregate of other parameters.
    Bean,
}

/// Declarative description of a handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter source.
    pub source: ParamSource,
    /// Parameter name.
    pub name: String,
    /// Whether the parameter must be present.
    pub required: bool,
}

impl ParamSpec {
    /// Declare a required path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            source: ParamSource::Path,
            name: name.into(),
            required: true,
        }
    }

    /// Declare a query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            source: ParamSource::Query,
            name: name.into(),
            required: false,
        }
    }

    /// Declare a header parameter.
    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            source: ParamSource::Header,
            name: name.into(),
            required: false,
        }
    }

    /// Declare a body parameter.
    #[must_use]
    pub fn body() -> Self {
        Self {
            source: ParamSource::Body,
            name: String::new(),
            required: true,
        }
    }

    /// Mark the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the parameter as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// One segment of a compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal segment (exact match).
    Literal(String),
    /// Named parameter (`{name}`), matching exactly one segment.
    Param(String),
}

/// A compiled `/seg/{name}` path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// `{name}` placeholders match exactly one segment. Parameter names must
    /// be unique within a template.
    pub fn compile(template: &str) -> RouterResult<Self> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        for part in template.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(RouterError::InvalidTemplate {
                        template: template.to_string(),
                        reason: "empty parameter name".to_string(),
                    });
                }
                if !seen.insert(name.to_string()) {
                    return Err(RouterError::InvalidTemplate {
                        template: template.to_string(),
                        reason: format!("duplicate parameter '{name}'"),
                    });
                }
                segments.push(TemplateSegment::Param(name.to_string()));
            } else if part.contains('{') || part.contains('}') {
                return Err(RouterError::InvalidTemplate {
                    template: template.to_string(),
                    reason: format!("malformed segment '{part}'"),
                });
            } else {
                segments.push(TemplateSegment::Literal(part.to_string()));
            }
        }

        let raw = if segments.is_empty() {
            "/".to_string()
        } else {
            let mut raw = String::new();
            for segment in &segments {
                raw.push('/');
                match segment {
                    TemplateSegment::Literal(s) => raw.push_str(s),
                    TemplateSegment::Param(name) => {
                        raw.push('{');
                        raw.push_str(name);
                        raw.push('}');
                    },
                }
            }
            raw
        };

        Ok(Self { raw, segments })
    }

    /// The normalized template string, e.g. `/param/{paramId}`.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Parameter names declared by the template.
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                TemplateSegment::Param(name) => Some(name.as_str()),
                TemplateSegment::Literal(_) => None,
            })
            .collect()
    }

    /// Concatenate two templates, recompiling the result.
    pub fn join(&self, other: &PathTemplate) -> RouterResult<PathTemplate> {
        let combined = format!("{}{}", self.raw, other.raw);
        PathTemplate::compile(&combined)
    }

    /// Match a concrete path against the whole template, extracting
    /// parameter values on success.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                TemplateSegment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                },
                TemplateSegment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                },
            }
        }

        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Path parameter values extracted during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    /// Insert a parameter value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a parameter value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no parameters were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Boxed future returned by route handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResult<Response>> + Send + 'static>>;

/// A request handler bound to a terminal route.
pub trait RouteHandler: Send + Sync {
    /// Handle a dispatched request.
    fn handle(&self, ctx: RequestContext) -> HandlerFuture;
}

struct FnHandler<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> RouteHandler for FnHandler<F, Fut>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = HttpResult<Response>> + Send + 'static,
{
    fn handle(&self, ctx: RequestContext) -> HandlerFuture {
        Box::pin((self.f)(ctx))
    }
}

/// Wrap an async closure as a shareable route handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResult<Response>> + Send + 'static,
{
    Arc::new(FnHandler {
        f,
        _marker: PhantomData,
    })
}

/// An immutable route record.
///
/// A terminal route binds an HTTP method and template to a handler. A
/// locator route has no method; it delegates further matching to inline
/// sub-routes or to a named route group, and is expanded away when the
/// table is built.
#[derive(Clone)]
pub struct Route {
    name: String,
    method: Option<Method>,
    template: PathTemplate,
    produces: Vec<MediaType>,
    consumes: Vec<MediaType>,
    params: Vec<ParamSpec>,
    blocking: bool,
    asynchronous: bool,
    handler: Option<Arc<dyn RouteHandler>>,
    delegate: Option<String>,
    sub_routes: Vec<Route>,
}

impl Route {
    /// Start building a GET route.
    #[must_use]
    pub fn get(template: impl Into<String>) -> RouteBuilder {
        Self::method(Method::GET, template)
    }

    /// Start building a POST route.
    #[must_use]
    pub fn post(template: impl Into<String>) -> RouteBuilder {
        Self::method(Method::POST, template)
    }

    /// Start building a route for the given method.
    #[must_use]
    pub fn method(method: Method, template: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(Some(method), template.into())
    }

    /// Start building a locator route (no method, delegates to sub-routes).
    #[must_use]
    pub fn locator(template: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(None, template.into())
    }

    /// Route name (defaults to the template).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP method; `None` marks a locator.
    #[must_use]
    pub fn http_method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Compiled path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Media types this route can produce, in preference order.
    #[must_use]
    pub fn produces(&self) -> &[MediaType] {
        &self.produces
    }

    /// Media types this route accepts as request bodies.
    #[must_use]
    pub fn consumes(&self) -> &[MediaType] {
        &self.consumes
    }

    /// Declared handler parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Whether the handler must run off the connection task.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Whether the handler completes asynchronously.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.asynchronous
    }

    /// Whether this route is a locator.
    #[must_use]
    pub fn is_locator(&self) -> bool {
        self.method.is_none()
    }

    /// Bound handler (terminal routes only).
    #[must_use]
    pub fn handler(&self) -> Option<&Arc<dyn RouteHandler>> {
        self.handler.as_ref()
    }

    /// Named group this locator delegates to.
    #[must_use]
    pub fn delegate(&self) -> Option<&str> {
        self.delegate.as_deref()
    }

    /// Inline sub-routes of a locator.
    #[must_use]
    pub fn sub_routes(&self) -> &[Route] {
        &self.sub_routes
    }

    /// Re-root this route under a locator prefix.
    pub(super) fn with_prefix(&self, prefix: &PathTemplate) -> RouterResult<Route> {
        let template = prefix.join(&self.template)?;
        let mut route = self.clone();
        route.name = template.raw().to_string();
        route.template = template;
        Ok(route)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("template", &self.template.raw())
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .field("blocking", &self.blocking)
            .field("async", &self.asynchronous)
            .field("locator", &self.is_locator())
            .field("sub_routes", &self.sub_routes.len())
            .finish()
    }
}

/// Builder for [`Route`].
pub struct RouteBuilder {
    name: Option<String>,
    method: Option<Method>,
    template: String,
    produces: Vec<String>,
    consumes: Vec<String>,
    params: Vec<ParamSpec>,
    blocking: bool,
    asynchronous: bool,
    handler: Option<Arc<dyn RouteHandler>>,
    delegate: Option<String>,
    sub_routes: Vec<Route>,
}

impl RouteBuilder {
    fn new(method: Option<Method>, template: String) -> Self {
        Self {
            name: None,
            method,
            template,
            produces: Vec::new(),
            consumes: Vec::new(),
            params: Vec::new(),
            blocking: false,
            asynchronous: false,
            handler: None,
            delegate: None,
            sub_routes: Vec::new(),
        }
    }

    /// Override the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a produced media type.
    #[must_use]
    pub fn produces(mut self, media: impl Into<String>) -> Self {
        self.produces.push(media.into());
        self
    }

    /// Add a consumed media type.
    #[must_use]
    pub fn consumes(mut self, media: impl Into<String>) -> Self {
        self.consumes.push(media.into());
        self
    }

    /// Declare a handler parameter.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Mark the handler as blocking.
    #[must_use]
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    /// Mark the handler as asynchronous.
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }

    /// Bind the handler.
    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Delegate to a named route group (locators only).
    #[must_use]
    pub fn delegate(mut self, group: impl Into<String>) -> Self {
        self.delegate = Some(group.into());
        self
    }

    /// Add an inline sub-route (locators only).
    #[must_use]
    pub fn sub_route(mut self, route: Route) -> Self {
        self.sub_routes.push(route);
        self
    }

    /// Validate the metadata and build the route.
    pub fn build(self) -> RouterResult<Route> {
        let template = PathTemplate::compile(&self.template)?;
        let produces = media::parse_all(&self.produces)?;
        let consumes = media::parse_all(&self.consumes)?;

        let invalid = |reason: &str| RouterError::InvalidRoute {
            route: template.raw().to_string(),
            reason: reason.to_string(),
        };

        if self.blocking && self.asynchronous {
            return Err(invalid("a route cannot be both blocking and async"));
        }

        match self.method {
            Some(_) => {
                if self.delegate.is_some() || !self.sub_routes.is_empty() {
                    return Err(invalid("a terminal route cannot delegate to sub-routes"));
                }
                if self.handler.is_none() {
                    return Err(invalid("a terminal route requires a handler"));
                }
            },
            None => {
                if self.handler.is_some() {
                    return Err(invalid("a locator route cannot bind a handler"));
                }
                if self.delegate.is_none() && self.sub_routes.is_empty() {
                    return Err(invalid(
                        "a locator route requires a delegate or at least one sub-route",
                    ));
                }
            },
        }

        let template_params: HashSet<&str> = template.param_names().into_iter().collect();
        for param in &self.params {
            if param.source == ParamSource::Path && !template_params.contains(param.name.as_str())
            {
                return Err(invalid(&format!(
                    "path parameter '{}' is not declared in the template",
                    param.name
                )));
            }
        }

        Ok(Route {
            name: self
                .name
                .unwrap_or_else(|| template.raw().to_string()),
            method: self.method,
            template,
            produces,
            consumes,
            params: self.params,
            blocking: self.blocking,
            asynchronous: self.asynchronous,
            handler: self.handler,
            delegate: self.delegate,
            sub_routes: self.sub_routes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::http::response::Response;

    fn noop_handler() -> Arc<dyn RouteHandler> {
        handler_fn(|_ctx| async { Ok(Response::ok().build()) })
    }

    #[test]
    fn test_template_compile() {
        let template = PathTemplate::compile("/param/{paramId}").unwrap();
        assert_eq!(template.raw(), "/param/{paramId}");
        assert_eq!(template.segments().len(), 2);
        assert_eq!(template.param_names(), vec!["paramId"]);
    }

    #[test]
    fn test_template_normalizes() {
        let template = PathTemplate::compile("deep/path/").unwrap();
        assert_eq!(template.raw(), "/deep/path");

        let root = PathTemplate::compile("/").unwrap();
        assert_eq!(root.raw(), "/");
        assert!(root.segments().is_empty());
    }

    #[test]
    fn test_template_rejects_malformed() {
        assert!(PathTemplate::compile("/a/{}").is_err());
        assert!(PathTemplate::compile("/a/{x}/{x}").is_err());
        assert!(PathTemplate::compile("/a/x{y}").is_err());
    }

    #[test]
    fn test_template_match_path() {
        let template = PathTemplate::compile("/param/{paramId}").unwrap();

        let params = template.match_path("/param/12345").unwrap();
        assert_eq!(params.get("paramId"), Some("12345"));

        assert!(template.match_path("/param").is_none());
        assert!(template.match_path("/param/1/2").is_none());
        assert!(template.match_path("/other/12345").is_none());
    }

    #[test]
    fn test_template_join() {
        let prefix = PathTemplate::compile("/template").unwrap();
        let sub = PathTemplate::compile("/path/{value}").unwrap();
        let joined = prefix.join(&sub).unwrap();
        assert_eq!(joined.raw(), "/template/path/{value}");
    }

    #[test]
    fn test_template_join_rejects_duplicate_params() {
        let prefix = PathTemplate::compile("/a/{id}").unwrap();
        let sub = PathTemplate::compile("/b/{id}").unwrap();
        assert!(prefix.join(&sub).is_err());
    }

    #[test]
    fn test_terminal_route_build() {
        let route = Route::get("/param/{paramId}")
            .produces("application/json")
            .param(ParamSpec::path("paramId"))
            .handler(noop_handler())
            .build()
            .unwrap();

        assert_eq!(route.name(), "/param/{paramId}");
        assert_eq!(route.http_method(), Some(&Method::GET));
        assert!(!route.is_locator());
        assert_eq!(route.produces().len(), 1);
    }

    #[test]
    fn test_terminal_route_requires_handler() {
        let err = Route::get("/direct").build().unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoute { .. }));
    }

    #[test]
    fn test_locator_route_build() {
        let sub = Route::get("/path/{value}")
            .handler(noop_handler())
            .build()
            .unwrap();

        let locator = Route::locator("/template").sub_route(sub).build().unwrap();
        assert!(locator.is_locator());
        assert_eq!(locator.sub_routes().len(), 1);
    }

    #[test]
    fn test_locator_rejects_handler() {
        let err = Route::locator("/template")
            .handler(noop_handler())
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoute { .. }));
    }

    #[test]
    fn test_locator_requires_target() {
        let err = Route::locator("/template").build().unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoute { .. }));
    }

    #[test]
    fn test_blocking_async_exclusive() {
        let err = Route::get("/x")
            .blocking()
            .asynchronous()
            .handler(noop_handler())
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoute { .. }));
    }

    #[test]
    fn test_path_param_must_exist_in_template() {
        let err = Route::get("/direct")
            .param(ParamSpec::path("missing"))
            .handler(noop_handler())
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoute { .. }));
    }

    #[test]
    fn test_with_prefix() {
        let route = Route::get("/path/{value}")
            .handler(noop_handler())
            .build()
            .unwrap();
        let prefix = PathTemplate::compile("/template").unwrap();

        let prefixed = route.with_prefix(&prefix).unwrap();
        assert_eq!(prefixed.template().raw(), "/template/path/{value}");
        assert_eq!(prefixed.name(), "/template/path/{value}");
    }
}
