//! Flattened view of the resource tree: `(method, path) -> target`.

use std::collections::BTreeMap;

use super::integration::{Integration, MockIntegration};
use super::{HttpMethod, ResourceId, RestApi};
use crate::lambda::FunctionRef;

/// What a route ends up invoking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Function(FunctionRef),
    Mock(MockIntegration),
}

impl RouteTarget {
    pub fn function(&self) -> Option<&FunctionRef> {
        match self {
            RouteTarget::Function(function) => Some(function),
            RouteTarget::Mock(_) => None,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, RouteTarget::Mock(_))
    }
}

impl From<&Integration> for RouteTarget {
    fn from(integration: &Integration) -> Self {
        match integration {
            Integration::Lambda(function) => RouteTarget::Function(function.clone()),
            Integration::Mock(mock) => RouteTarget::Mock(mock.clone()),
        }
    }
}

/// A method on a resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    /// Path template, e.g. `/trips/{id}`.
    pub path: String,
    pub target: RouteTarget,
}

/// A route matched against a concrete request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    /// Values bound to `{name}` segments.
    pub path_parameters: BTreeMap<String, String>,
}

impl RestApi {
    /// Every method in the tree, ordered by path then method.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = (0..self.resources.len())
            .map(ResourceId)
            .flat_map(|id| {
                let path = self.path(id);
                self.resources[id.0]
                    .methods
                    .values()
                    .map(move |method| Route {
                        method: method.http_method,
                        path: path.clone(),
                        target: RouteTarget::from(&method.integration),
                    })
            })
            .collect();
        routes.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
        routes
    }

    /// Finds the route serving `method` on a concrete `path` like `/trips/42`.
    ///
    /// Literal segments win over path parameters; a greedy `{name+}`
    /// parameter swallows the rest of the path. `ANY` methods match every
    /// verb that has no explicit method on the resource.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<ResolvedRoute> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut path_parameters = BTreeMap::new();
        let resource = self.match_segments(self.root(), &segments, &mut path_parameters)?;

        let methods = &self.resources[resource.0].methods;
        let bound = methods
            .get(&method)
            .or_else(|| methods.get(&HttpMethod::Any))?;

        Some(ResolvedRoute {
            route: Route {
                method: bound.http_method,
                path: self.path(resource),
                target: RouteTarget::from(&bound.integration),
            },
            path_parameters,
        })
    }

    fn match_segments(
        &self,
        resource: ResourceId,
        segments: &[&str],
        parameters: &mut BTreeMap<String, String>,
    ) -> Option<ResourceId> {
        let Some((segment, rest)) = segments.split_first() else {
            return Some(resource);
        };
        let children = &self.resources[resource.0].children;
        let part = |child: &ResourceId| self.resources[child.0].path_part.as_deref();

        if let Some(child) = children.iter().find(|c| part(*c) == Some(*segment)) {
            if let Some(found) = self.match_segments(*child, rest, parameters) {
                return Some(found);
            }
        }

        for child in children {
            let Some(name) = part(child).and_then(parameter_name) else {
                continue;
            };
            if let Some(greedy) = name.strip_suffix('+') {
                parameters.insert(greedy.to_string(), segments.join("/"));
                return Some(*child);
            }
            let mut scoped = parameters.clone();
            scoped.insert(name.to_string(), segment.to_string());
            if let Some(found) = self.match_segments(*child, rest, &mut scoped) {
                *parameters = scoped;
                return Some(found);
            }
        }

        None
    }
}

fn parameter_name(path_part: &str) -> Option<&str> {
    path_part.strip_prefix('{')?.strip_suffix('}')
}
