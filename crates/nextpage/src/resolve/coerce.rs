// File: src/resolve/coerce.rs
// Purpose: Lenient coercion of URL-captured strings into typed values

use nextpage_router::ParamKind;

use crate::value::Value;

/// Coerces a raw URL-captured string into a typed value.
///
/// Lenient on purpose: a failed conversion returns the original string
/// unchanged rather than erring, so callers relying on typed values must
/// handle receiving an unconverted string.
///
/// # Examples
///
/// ```
/// use nextpage::resolve::coerce;
/// use nextpage::Value;
/// use nextpage_router::ParamKind;
///
/// assert_eq!(coerce("42", ParamKind::Int), Value::Int(42));
/// assert_eq!(coerce("3.5", ParamKind::Float), Value::Float(3.5));
/// assert_eq!(coerce("true", ParamKind::Bool), Value::Bool(true));
/// // Failed conversion degrades to the original string
/// assert_eq!(coerce("oops", ParamKind::Int), Value::Str("oops".into()));
/// ```
pub fn coerce(raw: &str, kind: ParamKind) -> Value {
    match kind {
        ParamKind::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
        ParamKind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
        ParamKind::Bool => match raw {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::Str(raw.to_string()),
        },
        ParamKind::Str | ParamKind::Slug | ParamKind::Uuid | ParamKind::Args => {
            Value::Str(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce("123", ParamKind::Int), Value::Int(123));
    }

    #[test]
    fn test_coerce_int_failure_returns_original() {
        assert_eq!(coerce("12x", ParamKind::Int), Value::Str("12x".into()));
        assert_eq!(coerce("", ParamKind::Int), Value::Str("".into()));
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce("2.5", ParamKind::Float), Value::Float(2.5));
        assert_eq!(coerce("x", ParamKind::Float), Value::Str("x".into()));
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce("true", ParamKind::Bool), Value::Bool(true));
        assert_eq!(coerce("0", ParamKind::Bool), Value::Bool(false));
        assert_eq!(coerce("yes", ParamKind::Bool), Value::Str("yes".into()));
    }

    #[test]
    fn test_coerce_string_kinds_pass_through() {
        assert_eq!(coerce("a/b", ParamKind::Args), Value::Str("a/b".into()));
        assert_eq!(coerce("slug-1", ParamKind::Slug), Value::Str("slug-1".into()));
    }
}
