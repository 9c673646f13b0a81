//! # nextpage Router
//!
//! A zero-dependency file-system-based URL pattern compiler with support for:
//! - Static routes (`simple` → `/simple/`)
//! - Typed single-segment captures (`[int:post-id]` → `/:post_id/`)
//! - Greedy remainder captures (`[[args]]` → `/*args/`)
//!
//! Directory paths under a pages root compile to URL patterns; the router
//! matches canonical request paths against them and extracts raw string
//! parameter values, validating each against its declared kind.
//!
//! Matching walks routes in the order they were appended; the first route
//! that matches wins. Compilation is pure and idempotent: structural
//! validation of pattern syntax is a separate startup pass that lives with
//! the framework crate, not here.
//!
//! ## Example
//!
//! ```
//! use nextpage_router::{Route, Router};
//!
//! let mut router = Router::new();
//! router.add_route(Route::from_url_path("simple", "simple/page.rs"));
//! router.add_route(Route::from_url_path("kwargs/[int:post-id]", "kwargs/[int:post-id]/page.rs"));
//!
//! let m = router.match_route("/kwargs/123/").unwrap();
//! assert_eq!(m.params.get("post_id"), Some(&"123".to_string()));
//! assert!(router.match_route("/kwargs/invalid/").is_none());
//! ```

use std::collections::HashMap;

pub mod path;
pub mod route;

pub use path::{is_canonical_path, normalize_path};
pub use route::parser::{parse_url_pattern, prepare_url_name};
pub use route::pattern::{classify_segment, normalize_param_name, ParamKind, ParamSpec, SegmentKind};

/// One compiled mapping from a URL pattern to a handler file.
///
/// Immutable once built: created during a scan pass and replaced wholesale
/// on reload, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Compiled pattern like `/kwargs/:post_id/` (trailing slash always present)
    pub pattern: String,
    /// Decoded parameter specs in segment order
    pub params: Vec<ParamSpec>,
    /// Pages-relative path of the handler file backing this route
    pub handler_file: String,
    /// Identifier for reverse lookup, derived from the source path
    pub url_name: String,
}

/// Result of matching a route against a request path.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Route,
    /// Extracted parameters, raw string values keyed by exposed name
    pub params: HashMap<String, String>,
}

impl Route {
    /// Compiles a route from a pages-relative URL path.
    ///
    /// # Examples
    ///
    /// ```
    /// use nextpage_router::Route;
    ///
    /// let route = Route::from_url_path("kwargs/[int:post-id]", "kwargs/[int:post-id]/page.rs");
    /// assert_eq!(route.pattern, "/kwargs/:post_id/");
    /// assert_eq!(route.url_name, "kwargs_int_post_id");
    /// ```
    pub fn from_url_path(url_path: &str, handler_file: impl Into<String>) -> Self {
        let (pattern, params) = parse_url_pattern(url_path);
        Route {
            pattern,
            params,
            handler_file: handler_file.into(),
            url_name: prepare_url_name(url_path),
        }
    }

    /// Matches this route against a canonical request path.
    ///
    /// Returns the captured parameters on success. Every captured value must
    /// pass its declared kind's validation; a failed validation means the
    /// route does not match at all (the request falls through to later
    /// routes or a 404, it is not an error).
    pub fn matches(&self, request_path: &str) -> Option<HashMap<String, String>> {
        let pattern_segments: Vec<&str> =
            self.pattern.split('/').filter(|s| !s.is_empty()).collect();
        let path_segments: Vec<&str> =
            request_path.split('/').filter(|s| !s.is_empty()).collect();

        let params = match_segments(&pattern_segments, &path_segments, 0, 0, HashMap::new())?;

        // Every capture must satisfy its declared kind.
        let all_valid = self.params.iter().all(|spec| {
            params
                .get(&spec.name)
                .map(|value| spec.kind.validate(value))
                .unwrap_or(true)
        });

        if all_valid {
            Some(params)
        } else {
            None
        }
    }

    /// Substitutes parameters into this route's pattern to build a URL.
    ///
    /// Returns `None` when a required parameter is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use nextpage_router::Route;
    /// use std::collections::HashMap;
    ///
    /// let route = Route::from_url_path("kwargs/[int:post-id]", "kwargs/[int:post-id]/page.rs");
    /// let mut params = HashMap::new();
    /// params.insert("post_id".to_string(), "42".to_string());
    /// assert_eq!(route.build_url(&params), Some("/kwargs/42/".to_string()));
    /// ```
    pub fn build_url(&self, params: &HashMap<String, String>) -> Option<String> {
        let segments: Option<Vec<String>> = self
            .pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.chars().next() {
                Some(':') => params.get(&segment[1..]).cloned(),
                Some('*') => params.get(&segment[1..]).cloned(),
                _ => Some(segment.to_string()),
            })
            .collect();

        segments.map(|segs| {
            if segs.is_empty() {
                "/".to_string()
            } else {
                format!("/{}/", segs.join("/"))
            }
        })
    }
}

/// Tail-recursive segment matcher.
///
/// Walks pattern and path segments simultaneously: `:name` consumes one
/// segment, `*name` consumes all remaining segments (at least one), static
/// segments must be equal.
fn match_segments(
    pattern_segments: &[&str],
    path_segments: &[&str],
    pattern_idx: usize,
    path_idx: usize,
    params: HashMap<String, String>,
) -> Option<HashMap<String, String>> {
    // Base case: consumed all pattern segments
    if pattern_idx >= pattern_segments.len() {
        return if path_idx == path_segments.len() {
            Some(params)
        } else {
            None
        };
    }

    let pattern_seg = pattern_segments[pattern_idx];

    match pattern_seg.chars().next() {
        // Remainder capture: *args — requires at least one remaining segment
        Some('*') => {
            let remaining = &path_segments[path_idx..];
            if remaining.is_empty() {
                return None;
            }
            let mut new_params = params;
            new_params.insert(pattern_seg[1..].to_string(), remaining.join("/"));
            Some(new_params)
        }
        // Single capture: :name
        Some(':') => {
            if path_idx >= path_segments.len() {
                return None;
            }
            let mut new_params = params;
            new_params.insert(
                pattern_seg[1..].to_string(),
                path_segments[path_idx].to_string(),
            );
            match_segments(
                pattern_segments,
                path_segments,
                pattern_idx + 1,
                path_idx + 1,
                new_params,
            )
        }
        // Static segment
        _ => {
            if path_idx >= path_segments.len() || pattern_seg != path_segments[path_idx] {
                return None;
            }
            match_segments(
                pattern_segments,
                path_segments,
                pattern_idx + 1,
                path_idx + 1,
                params,
            )
        }
    }
}

/// Route table matching canonical request paths in append order.
///
/// The first route whose pattern matches wins; callers control precedence
/// by the order they append routes.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a route to the table
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Matches a request path against the table, first match wins.
    ///
    /// The path is normalized to canonical form before matching, so
    /// `/about` and `/about/` resolve identically.
    pub fn match_route(&self, request_path: &str) -> Option<RouteMatch> {
        let canonical = normalize_path(request_path);
        self.routes.iter().find_map(|route| {
            route.matches(&canonical).map(|params| RouteMatch {
                route: route.clone(),
                params,
            })
        })
    }

    /// Looks up a route by its reverse-lookup name
    pub fn route_by_name(&self, url_name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.url_name == url_name)
    }

    /// All routes in append order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_matches_static() {
        let route = Route::from_url_path("about", "about/page.rs");
        assert!(route.matches("/about/").is_some());
        assert!(route.matches("/other/").is_none());
    }

    #[test]
    fn test_route_matches_typed_capture() {
        let route = Route::from_url_path("kwargs/[int:post-id]", "kwargs/[int:post-id]/page.rs");
        let params = route.matches("/kwargs/123/").unwrap();
        assert_eq!(params.get("post_id"), Some(&"123".to_string()));
        assert!(route.matches("/kwargs/invalid/").is_none());
    }

    #[test]
    fn test_route_matches_catch_all() {
        let route = Route::from_url_path("args/[[args]]", "args/[[args]]/page.rs");
        let params = route.matches("/args/a/b/").unwrap();
        assert_eq!(params.get("args"), Some(&"a/b".to_string()));
        // Remainder capture needs at least one segment
        assert!(route.matches("/args/").is_none());
    }

    #[test]
    fn test_router_first_match_wins() {
        let mut router = Router::new();
        router.add_route(Route::from_url_path("users/new", "users/new/page.rs"));
        router.add_route(Route::from_url_path("users/[id]", "users/[id]/page.rs"));

        let m = router.match_route("/users/new/").unwrap();
        assert_eq!(m.route.handler_file, "users/new/page.rs");

        let m = router.match_route("/users/42/").unwrap();
        assert_eq!(m.params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn test_router_normalizes_before_matching() {
        let mut router = Router::new();
        router.add_route(Route::from_url_path("about", "about/page.rs"));
        assert!(router.match_route("/about").is_some());
        assert!(router.match_route("/about/").is_some());
    }
}
