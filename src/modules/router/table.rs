//! Immutable route table: build-time registration, pure lookup.

use super::error::{ResolveError, RouterError, RouterResult};
use super::media::{self, MediaType};
use super::route::{PathParams, Route, TemplateSegment};
use http::Method;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Successful resolution: the matched route and extracted path parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Matched terminal route.
    pub route: Arc<Route>,
    /// Path parameter values.
    pub params: PathParams,
}

/// One node of the resolution tree.
#[derive(Debug, Default)]
struct Node {
    /// Literal children, tried before the template child.
    literals: BTreeMap<String, Node>,
    /// At most one template child per position.
    param: Option<ParamChild>,
    /// Terminal routes ending at this node.
    leaves: Vec<Arc<Route>>,
}

#[derive(Debug)]
struct ParamChild {
    name: String,
    node: Box<Node>,
}

/// Immutable table resolving `(method, path, media types)` to a handler.
///
/// Built once at startup; lookups are pure reads over shared state and need
/// no locking. Literal segments take precedence over template segments at
/// every position, so `/param/static` can never be shadowed by
/// `/param/{paramId}`.
#[derive(Debug)]
pub struct RouteTable {
    root: Node,
    route_count: usize,
}

impl RouteTable {
    /// Start building a table.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Number of terminal routes after locator expansion.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    /// Resolve a request to a route.
    ///
    /// Pure lookup with no side effects. Distinguishes three failures:
    /// no structural match (`NotFound`), structural matches that all fail
    /// Accept negotiation (`NotAcceptable`), and structural matches that all
    /// reject the request body's media type (`UnsupportedMedia`).
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        accept: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<RouteMatch, ResolveError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let accept_list = accept.map(media::parse_accept).unwrap_or_default();
        let content = content_type.and_then(|ct| MediaType::parse(ct).ok());

        let mut state = WalkState {
            method,
            accept: &accept_list,
            content: content.as_ref(),
            not_acceptable: false,
            unsupported: false,
        };
        let mut params = PathParams::new();

        if let Some(found) = walk(&self.root, &segments, 0, &mut params, &mut state) {
            debug!(
                route = %found.route.template().raw(),
                method = %method,
                path = %path,
                "route matched"
            );
            return Ok(found);
        }

        if state.not_acceptable {
            Err(ResolveError::NotAcceptable {
                path: path.to_string(),
                accept: accept.unwrap_or("*/*").to_string(),
            })
        } else if state.unsupported {
            Err(ResolveError::UnsupportedMedia {
                path: path.to_string(),
                content_type: content_type.unwrap_or("").to_string(),
            })
        } else {
            Err(ResolveError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            })
        }
    }

    /// Templates of all registered terminal routes.
    #[must_use]
    pub fn route_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(&self.root, &mut names);
        names.sort();
        names
    }
}

struct WalkState<'a> {
    method: &'a Method,
    accept: &'a [MediaType],
    content: Option<&'a MediaType>,
    not_acceptable: bool,
    unsupported: bool,
}

fn walk(
    node: &Node,
    segments: &[&str],
    depth: usize,
    params: &mut PathParams,
    state: &mut WalkState<'_>,
) -> Option<RouteMatch> {
    if depth == segments.len() {
        for leaf in &node.leaves {
            if leaf.http_method() != Some(state.method) {
                continue;
            }

            if !media::intersects(state.accept, leaf.produces()) {
                state.not_acceptable = true;
                continue;
            }

            // A consumes declaration only constrains requests that carry a
            // body media type.
            if !leaf.consumes().is_empty() {
                if let Some(content) = state.content {
                    if !leaf.consumes().iter().any(|c| content.matches(c)) {
                        state.unsupported = true;
                        continue;
                    }
                }
            }

            return Some(RouteMatch {
                route: Arc::clone(leaf),
                params: params.clone(),
            });
        }
        return None;
    }

    let segment = segments[depth];

    // Literal-over-template precedence at every position.
    if let Some(child) = node.literals.get(segment) {
        if let Some(found) = walk(child, segments, depth + 1, params, state) {
            return Some(found);
        }
    }

    if let Some(param) = &node.param {
        params.insert(param.name.clone(), segment.to_string());
        if let Some(found) = walk(&param.node, segments, depth + 1, params, state) {
            return Some(found);
        }
        params.remove(&param.name);
    }

    None
}

fn collect_names(node: &Node, names: &mut Vec<String>) {
    for leaf in &node.leaves {
        names.push(leaf.template().raw().to_string());
    }
    for child in node.literals.values() {
        collect_names(child, names);
    }
    if let Some(param) = &node.param {
        collect_names(&param.node, names);
    }
}

/// Builder collecting routes and named route groups, producing one immutable
/// [`RouteTable`].
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    groups: HashMap<String, Vec<Route>>,
}

impl RouteTableBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Register a named route group as a locator delegation target.
    #[must_use]
    pub fn group(mut self, name: impl Into<String>, routes: Vec<Route>) -> Self {
        self.groups.insert(name.into(), routes);
        self
    }

    /// Expand locators and build the table.
    ///
    /// Locator delegation is resolved depth-first with a visited set;
    /// revisiting a group is a configuration error reported here, never at
    /// request time.
    pub fn build(self) -> RouterResult<RouteTable> {
        let mut terminals = Vec::new();
        for route in &self.routes {
            let mut visited = HashSet::new();
            expand(route, &self.groups, &mut visited, &mut terminals)?;
        }

        let mut root = Node::default();
        let mut registered: HashSet<(String, String)> = HashSet::new();

        for route in terminals {
            let method = route
                .http_method()
                .map(Method::to_string)
                .unwrap_or_default();
            let key = (method.clone(), route.template().raw().to_string());
            if !registered.insert(key) {
                return Err(RouterError::Conflict {
                    method,
                    template: route.template().raw().to_string(),
                });
            }

            insert(&mut root, route)?;
        }

        Ok(RouteTable {
            root,
            route_count: registered.len(),
        })
    }
}

fn expand(
    route: &Route,
    groups: &HashMap<String, Vec<Route>>,
    visited: &mut HashSet<String>,
    out: &mut Vec<Route>,
) -> RouterResult<()> {
    if !route.is_locator() {
        out.push(route.clone());
        return Ok(());
    }

    for sub in route.sub_routes() {
        let prefixed = sub.with_prefix(route.template())?;
        expand(&prefixed, groups, visited, out)?;
    }

    if let Some(group) = route.delegate() {
        if !visited.insert(group.to_string()) {
            return Err(RouterError::DelegationCycle(group.to_string()));
        }

        let targets = groups
            .get(group)
            .ok_or_else(|| RouterError::UnknownGroup(group.to_string()))?;
        for target in targets {
            let prefixed = target.with_prefix(route.template())?;
            expand(&prefixed, groups, visited, out)?;
        }

        visited.remove(group);
    }

    Ok(())
}

fn insert(root: &mut Node, route: Route) -> RouterResult<()> {
    let segments = route.template().segments().to_vec();
    let mut node = root;
    let mut position = String::new();

    for segment in segments {
        match segment {
            TemplateSegment::Literal(lit) => {
                position.push('/');
                position.push_str(&lit);
                node = node.literals.entry(lit).or_default();
            },
            TemplateSegment::Param(name) => {
                if let Some(child) = &node.param {
                    if child.name != name {
                        return Err(RouterError::ParamConflict {
                            position,
                            first: child.name.clone(),
                            second: name,
                        });
                    }
                }

                let child = node.param.get_or_insert_with(|| ParamChild {
                    name: name.clone(),
                    node: Box::default(),
                });
                position.push_str("/{");
                position.push_str(&child.name);
                position.push('}');
                node = &mut child.node;
            },
        }
    }

    node.leaves.push(Arc::new(route));
    Ok(())
}
