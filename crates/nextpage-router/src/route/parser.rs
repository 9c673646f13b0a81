/// Pattern compilation for file-system routes
///
/// Pure functional parsers that transform pages-relative paths into route
/// patterns. All functions are **pure**: same input → same output, no side
/// effects, so parsing the same path twice yields identical results.

use super::pattern::{classify_segment, ParamSpec, SegmentKind};

/// Internal state accumulator for functional fold-based parsing
///
/// All mutations are local to the fold accumulator; each builder method
/// consumes and returns Self, enabling functional chaining.
#[derive(Default)]
struct ParseState {
    pattern: String,
    params: Vec<ParamSpec>,
}

impl ParseState {
    /// Adds a static segment to the pattern
    fn with_static_segment(mut self, segment: &str) -> Self {
        self.pattern.push('/');
        self.pattern.push_str(segment);
        self
    }

    /// Adds a single-segment capture
    fn with_param(mut self, spec: ParamSpec) -> Self {
        self.pattern.push_str("/:");
        self.pattern.push_str(&spec.name);
        self.params.push(spec);
        self
    }

    /// Adds a greedy remainder capture
    fn with_catch_all(mut self, spec: ParamSpec) -> Self {
        self.pattern.push_str("/*");
        self.pattern.push_str(&spec.name);
        self.params.push(spec);
        self
    }

    /// Finalizes the pattern: a trailing slash is always present, and the
    /// empty path compiles to the root pattern `/`.
    fn finalize(mut self) -> Self {
        if self.pattern.is_empty() {
            self.pattern = "/".to_string();
        } else {
            self.pattern.push('/');
        }
        self
    }

    fn into_tuple(self) -> (String, Vec<ParamSpec>) {
        (self.pattern, self.params)
    }
}

/// Processes a single segment and returns the updated parse state
fn process_segment(state: ParseState, segment: &str) -> ParseState {
    match classify_segment(segment) {
        SegmentKind::Static(seg) => state.with_static_segment(&seg),
        SegmentKind::Param(spec) => state.with_param(spec),
        SegmentKind::CatchAll(spec) => state.with_catch_all(spec),
    }
}

/// Compiles a pages-relative path into a route pattern (pure function)
///
/// # Returns
///
/// Tuple of:
/// 1. `pattern` - URL pattern like `/kwargs/:post_id/`, trailing slash
///    always present; the empty path compiles to `/`
/// 2. `params` - decoded parameter specs in segment order
///
/// # Examples
///
/// ```
/// use nextpage_router::route::parser::parse_url_pattern;
/// use nextpage_router::ParamKind;
///
/// let (pattern, params) = parse_url_pattern("simple");
/// assert_eq!(pattern, "/simple/");
/// assert!(params.is_empty());
///
/// let (pattern, params) = parse_url_pattern("kwargs/[int:post-id]");
/// assert_eq!(pattern, "/kwargs/:post_id/");
/// assert_eq!(params[0].name, "post_id");
/// assert_eq!(params[0].kind, ParamKind::Int);
///
/// let (pattern, params) = parse_url_pattern("args/[[args]]");
/// assert_eq!(pattern, "/args/*args/");
/// assert_eq!(params[0].kind, ParamKind::Args);
/// ```
///
/// Parsing is best-effort and never fails; structural validation (malformed
/// brackets, duplicate names, misplaced catch-all) is a separate pass run at
/// startup, not here.
pub fn parse_url_pattern(path: &str) -> (String, Vec<ParamSpec>) {
    path.split('/')
        .filter(|s| !s.is_empty())
        .fold(ParseState::default(), process_segment)
        .finalize()
        .into_tuple()
}

/// Derives a safe identifier from a pages-relative path (pure function)
///
/// Used as the reverse-lookup name for a route. Replaces `/`, `[`, `]`,
/// `:`, and `-` with underscores, collapses runs, and trims the edges.
///
/// # Examples
///
/// ```
/// use nextpage_router::route::parser::prepare_url_name;
///
/// assert_eq!(prepare_url_name("simple"), "simple");
/// assert_eq!(prepare_url_name("kwargs/[int:post-id]"), "kwargs_int_post_id");
/// assert_eq!(prepare_url_name(""), "root");
/// ```
pub fn prepare_url_name(path: &str) -> String {
    let collapsed = path
        .chars()
        .map(|c| match c {
            '/' | '[' | ']' | ':' | '-' => '_',
            other => other,
        })
        .fold(String::new(), |mut acc, c| {
            if c != '_' || !acc.ends_with('_') {
                acc.push(c);
            }
            acc
        });

    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamKind;

    #[test]
    fn test_parse_static() {
        let (pattern, params) = parse_url_pattern("about");
        assert_eq!(pattern, "/about/");
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_empty_path_is_root() {
        let (pattern, params) = parse_url_pattern("");
        assert_eq!(pattern, "/");
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_untyped_capture() {
        let (pattern, params) = parse_url_pattern("users/[id]");
        assert_eq!(pattern, "/users/:id/");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[0].kind, ParamKind::Str);
    }

    #[test]
    fn test_parse_typed_capture() {
        let (pattern, params) = parse_url_pattern("kwargs/[int:post-id]");
        assert_eq!(pattern, "/kwargs/:post_id/");
        assert_eq!(params[0].kind, ParamKind::Int);
        assert_eq!(params[0].name, "post_id");
        assert_eq!(params[0].raw, "[int:post-id]");
    }

    #[test]
    fn test_parse_catch_all() {
        let (pattern, params) = parse_url_pattern("args/[[args]]");
        assert_eq!(pattern, "/args/*args/");
        assert_eq!(params[0].kind, ParamKind::Args);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_url_pattern("blog/[slug:slug]/comments/[int:id]");
        let second = parse_url_pattern("blog/[slug:slug]/comments/[int:id]");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_malformed_bracket_falls_through_as_static() {
        let (pattern, params) = parse_url_pattern("bad/[unclosed");
        assert_eq!(pattern, "/bad/[unclosed/");
        assert!(params.is_empty());
    }

    #[test]
    fn test_prepare_url_name() {
        assert_eq!(prepare_url_name("simple"), "simple");
        assert_eq!(prepare_url_name("kwargs/[int:post-id]"), "kwargs_int_post_id");
        assert_eq!(prepare_url_name("args/[[args]]"), "args_args");
        assert_eq!(prepare_url_name(""), "root");
    }
}
