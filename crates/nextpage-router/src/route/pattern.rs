/// Segment classification for file-system route patterns
///
/// Pure functional parsing of bracketed path segments into typed captures.
/// All functions are **pure**: same input → same output, no side effects.

/// URL parameter kinds, one per supported converter token.
///
/// The token set is closed: an unknown token parses best-effort to `Str`
/// (the checks pass flags it), never to a silent error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Any non-empty segment: `[name]` or `[str:name]`
    Str,
    /// Decimal digits only: `[int:name]`
    Int,
    /// Parseable floating point: `[float:name]`
    Float,
    /// `true`/`false`/`1`/`0`: `[bool:name]`
    Bool,
    /// Letters, digits, hyphens, underscores: `[slug:name]`
    Slug,
    /// Hyphenated hex UUID: `[uuid:name]`
    Uuid,
    /// Remaining path segments joined with `/`: `[[name]]`
    Args,
}

impl ParamKind {
    /// Parses a converter token into a kind.
    ///
    /// Returns `None` for unrecognized tokens; callers fall back to `Str`
    /// and keep the raw token for diagnostics.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token {
            "str" => Some(ParamKind::Str),
            "int" => Some(ParamKind::Int),
            "float" => Some(ParamKind::Float),
            "bool" => Some(ParamKind::Bool),
            "slug" => Some(ParamKind::Slug),
            "uuid" => Some(ParamKind::Uuid),
            _ => None,
        }
    }

    /// The canonical token for this kind.
    pub fn token(&self) -> &'static str {
        match self {
            ParamKind::Str => "str",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
            ParamKind::Slug => "slug",
            ParamKind::Uuid => "uuid",
            ParamKind::Args => "args",
        }
    }

    /// Validates a captured value against this kind.
    ///
    /// Used at match time: a route only matches when every captured value
    /// passes its kind check, so `/kwargs/invalid/` falls through to 404
    /// for an `[int:post-id]` capture.
    pub fn validate(&self, value: &str) -> bool {
        match self {
            ParamKind::Str => !value.is_empty(),
            ParamKind::Int => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            ParamKind::Float => value.parse::<f64>().is_ok(),
            ParamKind::Bool => matches!(value, "true" | "false" | "1" | "0"),
            ParamKind::Slug => {
                !value.is_empty()
                    && value
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            }
            ParamKind::Uuid => {
                value.len() == 36
                    && value.char_indices().all(|(i, c)| match i {
                        8 | 13 | 18 | 23 => c == '-',
                        _ => c.is_ascii_hexdigit(),
                    })
            }
            ParamKind::Args => !value.is_empty(),
        }
    }
}

/// One decoded URL parameter: exposed name, kind, and the original token.
///
/// Hyphens in the bracketed name become underscores in `name` (the exposed
/// name doubles as a callable-argument identifier); `raw` keeps the original
/// segment text for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub raw: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind, raw: impl Into<String>) -> Self {
        Self {
            name: normalize_param_name(&name.into()),
            kind,
            raw: raw.into(),
        }
    }
}

/// Rewrites hyphens to underscores so the name is a valid identifier.
pub fn normalize_param_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Result of classifying one path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Static text segment
    Static(String),
    /// Single-segment capture: `[name]` or `[type:name]`
    Param(ParamSpec),
    /// Greedy remainder capture: `[[name]]`
    CatchAll(ParamSpec),
}

/// Classifies a segment into a pattern type (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Catch-all**: `[[name]]` — captures all remaining segments
/// 2. **Typed capture**: `[type:name]` — type token before the name
/// 3. **Untyped capture**: `[name]` — defaults to `str`
/// 4. **Static**: any other text
///
/// Parsing is best-effort: malformed bracket syntax falls through as a
/// static segment and is reported by the checks pass, not here.
pub fn classify_segment(segment: &str) -> SegmentKind {
    if let Some(inner) = segment
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
    {
        return SegmentKind::CatchAll(ParamSpec::new(inner, ParamKind::Args, segment));
    }

    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => {
            let (kind, name) = split_typed_capture(inner);
            SegmentKind::Param(ParamSpec::new(name, kind, segment))
        }
        None => SegmentKind::Static(segment.to_string()),
    }
}

/// Splits `"type:name"` or `"name"` into (kind, name).
///
/// An unknown type token degrades to `Str`; the raw segment kept on the
/// `ParamSpec` lets the checks pass flag it later.
fn split_typed_capture(inner: &str) -> (ParamKind, &str) {
    inner
        .split_once(':')
        .map(|(token, name)| (ParamKind::parse_token(token).unwrap_or(ParamKind::Str), name))
        .unwrap_or((ParamKind::Str, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        let seg = classify_segment("about");
        assert_eq!(seg, SegmentKind::Static("about".to_string()));
    }

    #[test]
    fn test_classify_untyped_capture() {
        let seg = classify_segment("[id]");
        assert_eq!(
            seg,
            SegmentKind::Param(ParamSpec::new("id", ParamKind::Str, "[id]"))
        );
    }

    #[test]
    fn test_classify_typed_capture() {
        let seg = classify_segment("[int:id]");
        assert_eq!(
            seg,
            SegmentKind::Param(ParamSpec::new("id", ParamKind::Int, "[int:id]"))
        );
    }

    #[test]
    fn test_classify_hyphenated_name() {
        match classify_segment("[int:post-id]") {
            SegmentKind::Param(spec) => {
                assert_eq!(spec.name, "post_id");
                assert_eq!(spec.kind, ParamKind::Int);
                assert_eq!(spec.raw, "[int:post-id]");
            }
            other => panic!("expected Param, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_catch_all() {
        let seg = classify_segment("[[args]]");
        assert_eq!(
            seg,
            SegmentKind::CatchAll(ParamSpec::new("args", ParamKind::Args, "[[args]]"))
        );
    }

    #[test]
    fn test_unknown_token_degrades_to_str() {
        match classify_segment("[bogus:id]") {
            SegmentKind::Param(spec) => assert_eq!(spec.kind, ParamKind::Str),
            other => panic!("expected Param, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_int() {
        assert!(ParamKind::Int.validate("123"));
        assert!(!ParamKind::Int.validate("12a"));
        assert!(!ParamKind::Int.validate(""));
        assert!(!ParamKind::Int.validate("-1"));
    }

    #[test]
    fn test_validate_float() {
        assert!(ParamKind::Float.validate("3.25"));
        assert!(ParamKind::Float.validate("42"));
        assert!(!ParamKind::Float.validate("abc"));
    }

    #[test]
    fn test_validate_bool() {
        assert!(ParamKind::Bool.validate("true"));
        assert!(ParamKind::Bool.validate("0"));
        assert!(!ParamKind::Bool.validate("yes"));
    }

    #[test]
    fn test_validate_slug() {
        assert!(ParamKind::Slug.validate("hello-world_1"));
        assert!(!ParamKind::Slug.validate("hello world"));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(ParamKind::Uuid.validate("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!ParamKind::Uuid.validate("550e8400e29b41d4a716446655440000"));
        assert!(!ParamKind::Uuid.validate("not-a-uuid"));
    }
}
