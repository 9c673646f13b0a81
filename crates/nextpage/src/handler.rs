// File: src/handler.rs
// Purpose: Callable model — explicit parameter declarations plus the function body

use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;
use nextpage_router::ParamKind;

use crate::request_context::{FormData, RequestContext};
use crate::value::Value;

/// What satisfies one declared parameter.
///
/// This is the dispatch tag the provider chain matches on: every parameter
/// declares up front whether it wants the request object, a URL capture, the
/// active form, a dependency, or plain name matching against URL kwargs.
#[derive(Debug, Clone)]
pub enum ParamSource {
    /// The current request object
    Request,
    /// A URL-captured value under an explicit capture name
    Url { name: String },
    /// The active form instance
    Form,
    /// A registered or inline dependency
    Depends(DependsOn),
    /// Plain name matching against the URL keyword arguments
    Named,
}

/// How a `Depends` parameter is satisfied.
#[derive(Clone)]
pub enum DependsOn {
    /// Look up a dependency registered under this name (memoized per request)
    Name(String),
    /// Invoke this callable directly (not memoized)
    Callable(Arc<Callable>),
    /// Inject this constant
    Literal(Value),
    /// Use the parameter's own name as the registry lookup key
    ParamName,
}

impl std::fmt::Debug for DependsOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependsOn::Name(name) => f.debug_tuple("Name").field(name).finish(),
            DependsOn::Callable(_) => f.write_str("Callable(..)"),
            DependsOn::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            DependsOn::ParamName => f.write_str("ParamName"),
        }
    }
}

/// One declared parameter of a callable.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub source: ParamSource,
    /// Declared kind for URL-value coercion (int, float, bool, ...)
    pub kind: Option<ParamKind>,
    /// Fallback value when no provider can supply one
    pub default: Option<Value>,
}

impl Param {
    fn with_source(name: impl Into<String>, source: ParamSource) -> Self {
        Self {
            name: name.into(),
            source,
            kind: None,
            default: None,
        }
    }

    /// The request object
    pub fn request(name: impl Into<String>) -> Self {
        Self::with_source(name, ParamSource::Request)
    }

    /// A URL capture under an explicit name (may differ from the parameter name)
    pub fn url(name: impl Into<String>, capture: impl Into<String>) -> Self {
        Self::with_source(
            name,
            ParamSource::Url {
                name: capture.into(),
            },
        )
    }

    /// The active form instance
    pub fn form(name: impl Into<String>) -> Self {
        Self::with_source(name, ParamSource::Form)
    }

    /// A registered dependency looked up by the parameter's own name
    pub fn depends(name: impl Into<String>) -> Self {
        Self::with_source(name, ParamSource::Depends(DependsOn::ParamName))
    }

    /// A dependency with an explicit target
    pub fn depends_on(name: impl Into<String>, dep: DependsOn) -> Self {
        Self::with_source(name, ParamSource::Depends(dep))
    }

    /// Plain name matching against URL keyword arguments
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_source(name, ParamSource::Named)
    }

    /// Declares the coercion kind for URL-derived values
    pub fn of_kind(mut self, kind: ParamKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the fallback value used when nothing can supply this parameter
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A value injected for one parameter.
///
/// `None` is the explicit null sentinel: a declared-but-unresolvable
/// parameter is present in the output map as `Injected::None`, never
/// omitted, so callers can tell "declared but unresolvable" apart from
/// "not declared".
#[derive(Debug, Clone)]
pub enum Injected {
    Request(RequestContext),
    Form(FormData),
    Value(Value),
    None,
}

impl Injected {
    pub fn is_none(&self) -> bool {
        matches!(self, Injected::None)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Injected::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Resolved argument values keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct ResolvedArgs {
    values: HashMap<String, Injected>,
}

impl ResolvedArgs {
    pub fn new(values: HashMap<String, Injected>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Injected> {
        self.values.get(name)
    }

    /// True when the parameter resolved to the null sentinel
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Injected::None))
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Injected::as_value)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_int)
    }

    pub fn request(&self, name: &str) -> Option<&RequestContext> {
        match self.values.get(name) {
            Some(Injected::Request(rc)) => Some(rc),
            _ => None,
        }
    }

    pub fn form(&self, name: &str) -> Option<&FormData> {
        match self.values.get(name) {
            Some(Injected::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Injected)> {
        self.values.iter()
    }
}

/// Return value of a callable.
///
/// Context providers and dependencies return `Value`; views and form action
/// handlers return any of the response-shaped variants, normalized by the
/// dispatch layer (`None` → 204, `Body` → 200, `Redirect` → 303,
/// `Response` passed through).
pub enum CallOutcome {
    Value(Value),
    Body(String),
    Redirect(String),
    Response(Response),
    None,
}

impl std::fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallOutcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            CallOutcome::Body(s) => f.debug_tuple("Body").field(s).finish(),
            CallOutcome::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
            CallOutcome::Response(_) => f.write_str("Response(..)"),
            CallOutcome::None => f.write_str("None"),
        }
    }
}

type CallFn = Arc<dyn Fn(ResolvedArgs) -> CallOutcome + Send + Sync>;

/// A callable with an explicit parameter list.
///
/// The parameter declarations replace signature introspection: the resolver
/// walks `params` and dispatches each declaration through the provider
/// chain, then hands the resolved map to the function body.
///
/// # Examples
///
/// ```
/// use nextpage::handler::{Callable, CallOutcome, Param};
/// use nextpage::Value;
/// use nextpage_router::ParamKind;
///
/// let view = Callable::new(|args| {
///     let id = args.int_value("post_id").unwrap_or(0);
///     CallOutcome::Body(format!("post {}", id))
/// })
/// .with_param(Param::request("request"))
/// .with_param(Param::named("post_id").of_kind(ParamKind::Int));
/// ```
#[derive(Clone)]
pub struct Callable {
    params: Vec<Param>,
    func: CallFn,
}

impl Callable {
    pub fn new(func: impl Fn(ResolvedArgs) -> CallOutcome + Send + Sync + 'static) -> Self {
        Self {
            params: Vec::new(),
            func: Arc::new(func),
        }
    }

    /// Declares a parameter (functional builder)
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Invokes the function body with resolved arguments
    pub fn invoke(&self, args: ResolvedArgs) -> CallOutcome {
        (self.func)(args)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable")
            .field("params", &self.params)
            .finish()
    }
}
