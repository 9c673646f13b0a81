// File: src/resolve/mod.rs
// Purpose: Dependency resolution — per-request context, named dependencies,
// memoization, and cycle detection

pub mod coerce;
pub mod provider;

pub use coerce::coerce;
pub use provider::{default_providers, ParameterProvider};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::handler::{Callable, CallOutcome, Injected, Param, ResolvedArgs};
use crate::request_context::{FormData, RequestContext};
use crate::value::Value;

/// Per-resolution value bag.
///
/// Constructed fresh for every inbound request and threaded `&mut` through
/// nested resolutions. The memoization cache and the in-progress stack live
/// here, so sharing one context across several `resolve` calls while
/// handling a request reuses computed dependencies — and the context must
/// never be shared across concurrent requests.
#[derive(Debug, Default)]
pub struct DependencyContext {
    pub request: Option<RequestContext>,
    pub form: Option<FormData>,
    pub url_kwargs: HashMap<String, String>,
    cache: HashMap<String, CacheSlot>,
    stack: Vec<String>,
}

#[derive(Debug, Clone)]
enum CacheSlot {
    /// Computation for this name has started but not finished
    InProgress,
    Ready(Injected),
}

impl DependencyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_url_kwargs(mut self, kwargs: HashMap<String, String>) -> Self {
        self.url_kwargs = kwargs;
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_kwargs.insert(name.into(), value.into());
        self
    }

    /// Builds the cycle path for a name that is already being computed:
    /// the ordered names from the repeated name back to itself.
    fn cycle_from(&self, name: &str) -> CycleError {
        let path = match self.stack.iter().position(|n| n == name) {
            Some(pos) => {
                let mut path: Vec<String> = self.stack[pos..].to_vec();
                path.push(name.to_string());
                path
            }
            // In-progress cache slot without a stack frame: direct self-reference
            None => vec![name.to_string(), name.to_string()],
        };
        CycleError { path }
    }
}

/// A dependency-resolution path revisited a name already being computed.
///
/// Always fatal to the current request's handling; carries the full cycle
/// path, ordered from the repeated name back to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependency cycle: {}", self.path.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

/// Named dependency registry: name → callable.
///
/// An explicit, constructed object passed by reference into a resolver
/// rather than a process-wide singleton, so tests and concurrent
/// configurations do not interfere.
#[derive(Debug, Clone, Default)]
pub struct DependencyRegistry {
    deps: HashMap<String, Arc<Callable>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callable under a name (functional builder)
    pub fn with_dependency(mut self, name: impl Into<String>, callable: Callable) -> Self {
        self.deps.insert(name.into(), Arc::new(callable));
        self
    }

    pub fn register(&mut self, name: impl Into<String>, callable: Callable) {
        self.deps.insert(name.into(), Arc::new(callable));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Callable>> {
        self.deps.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }
}

/// Resolves a callable's declared parameters through an ordered provider
/// chain.
///
/// Providers are tried in registration order; the **first** provider whose
/// `can_handle` returns true supplies the value. A parameter no provider
/// claims resolves to its default, or to the explicit null sentinel — never
/// an error. The only resolution failure is a dependency cycle.
pub struct DependencyResolver {
    providers: Vec<Box<dyn ParameterProvider>>,
    registry: Arc<DependencyRegistry>,
}

impl DependencyResolver {
    /// Creates a resolver with the built-in provider chain
    pub fn new(registry: Arc<DependencyRegistry>) -> Self {
        Self {
            providers: default_providers(),
            registry,
        }
    }

    /// Creates an isolated resolver with an explicit provider chain
    /// (the escape hatch tests and extensions use)
    pub fn with_providers(
        registry: Arc<DependencyRegistry>,
        providers: Vec<Box<dyn ParameterProvider>>,
    ) -> Self {
        Self {
            providers,
            registry,
        }
    }

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Resolves every declared parameter of `callable`.
    ///
    /// The output map contains one entry per declared parameter; parameters
    /// nothing could supply are present as `Injected::None`.
    pub fn resolve(
        &self,
        callable: &Callable,
        cx: &mut DependencyContext,
    ) -> Result<ResolvedArgs, CycleError> {
        let mut values = HashMap::new();

        for param in callable.params() {
            let injected = match self.providers.iter().find(|p| p.can_handle(param, cx)) {
                Some(provider) => provider.resolve(param, self, cx)?,
                None => fallback(param),
            };
            values.insert(param.name.clone(), injected);
        }

        Ok(ResolvedArgs::new(values))
    }

    /// Resolves a named registered dependency, memoizing the result in the
    /// shared context cache for the life of the current resolution chain.
    pub(crate) fn resolve_named(
        &self,
        name: &str,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        match cx.cache.get(name) {
            Some(CacheSlot::Ready(value)) => return Ok(value.clone()),
            Some(CacheSlot::InProgress) => return Err(cx.cycle_from(name)),
            None => {}
        }
        if cx.stack.iter().any(|n| n == name) {
            return Err(cx.cycle_from(name));
        }

        let Some(dep) = self.registry.get(name) else {
            warn!(dependency = name, "named dependency is not registered");
            return Ok(Injected::None);
        };

        cx.stack.push(name.to_string());
        cx.cache.insert(name.to_string(), CacheSlot::InProgress);

        let result = self.invoke_dependency(&dep, cx);

        cx.stack.pop();
        match result {
            Ok(value) => {
                cx.cache
                    .insert(name.to_string(), CacheSlot::Ready(value.clone()));
                Ok(value)
            }
            Err(err) => {
                cx.cache.remove(name);
                Err(err)
            }
        }
    }

    /// Invokes a dependency callable with its own parameters resolved
    /// recursively. Used for both named and inline dependencies; inline
    /// invocations are not memoized.
    pub(crate) fn invoke_dependency(
        &self,
        dep: &Callable,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        let args = self.resolve(dep, cx)?;
        Ok(outcome_to_injected(dep.invoke(args)))
    }
}

/// Default / null-sentinel fallback when no provider claims a parameter.
pub(crate) fn fallback(param: &Param) -> Injected {
    match &param.default {
        Some(value) => Injected::Value(value.clone()),
        None => Injected::None,
    }
}

/// Maps a dependency callable's outcome into an injectable value.
fn outcome_to_injected(outcome: CallOutcome) -> Injected {
    match outcome {
        CallOutcome::Value(v) => Injected::Value(v),
        CallOutcome::Body(s) => Injected::Value(Value::Str(s)),
        CallOutcome::Redirect(_) | CallOutcome::Response(_) => {
            warn!("dependency returned a response; injecting null");
            Injected::None
        }
        CallOutcome::None => Injected::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{DependsOn, Param};

    fn resolver_with(registry: DependencyRegistry) -> DependencyResolver {
        DependencyResolver::new(Arc::new(registry))
    }

    #[test]
    fn test_resolve_no_params_is_empty() {
        let resolver = resolver_with(DependencyRegistry::new());
        let callable = Callable::new(|_| CallOutcome::None);
        let args = resolver
            .resolve(&callable, &mut DependencyContext::new())
            .unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_unresolvable_param_is_null_not_error() {
        let resolver = resolver_with(DependencyRegistry::new());
        let callable =
            Callable::new(|_| CallOutcome::None).with_param(Param::named("x").of_kind(nextpage_router::ParamKind::Int));

        let args = resolver
            .resolve(&callable, &mut DependencyContext::new())
            .unwrap();
        assert!(args.is_null("x"));
    }

    #[test]
    fn test_default_wins_over_null() {
        let resolver = resolver_with(DependencyRegistry::new());
        let callable = Callable::new(|_| CallOutcome::None)
            .with_param(Param::named("page").with_default(Value::Int(1)));

        let args = resolver
            .resolve(&callable, &mut DependencyContext::new())
            .unwrap();
        assert_eq!(args.int_value("page"), Some(1));
    }

    #[test]
    fn test_direct_self_cycle() {
        let registry = DependencyRegistry::new().with_dependency(
            "a",
            Callable::new(|_| CallOutcome::Value(Value::Null)).with_param(Param::depends("a")),
        );
        let resolver = resolver_with(registry);

        let consumer = Callable::new(|_| CallOutcome::None).with_param(Param::depends("a"));
        let err = resolver
            .resolve(&consumer, &mut DependencyContext::new())
            .unwrap_err();
        assert!(err.path.contains(&"a".to_string()));
        assert_eq!(err.path.first(), err.path.last());
    }

    #[test]
    fn test_indirect_cycle_carries_full_path() {
        let registry = DependencyRegistry::new()
            .with_dependency(
                "a",
                Callable::new(|_| CallOutcome::Value(Value::Null)).with_param(Param::depends("b")),
            )
            .with_dependency(
                "b",
                Callable::new(|_| CallOutcome::Value(Value::Null)).with_param(Param::depends("a")),
            );
        let resolver = resolver_with(registry);

        let consumer = Callable::new(|_| CallOutcome::None).with_param(Param::depends("a"));
        let err = resolver
            .resolve(&consumer, &mut DependencyContext::new())
            .unwrap_err();
        assert!(err.path.contains(&"a".to_string()));
        assert!(err.path.contains(&"b".to_string()));
    }

    #[test]
    fn test_unregistered_dependency_resolves_to_null() {
        let resolver = resolver_with(DependencyRegistry::new());
        let consumer = Callable::new(|_| CallOutcome::None).with_param(Param::depends("missing"));
        let args = resolver
            .resolve(&consumer, &mut DependencyContext::new())
            .unwrap();
        assert!(args.is_null("missing"));
    }

    #[test]
    fn test_literal_dependency() {
        let resolver = resolver_with(DependencyRegistry::new());
        let consumer = Callable::new(|_| CallOutcome::None).with_param(Param::depends_on(
            "limit",
            DependsOn::Literal(Value::Int(25)),
        ));
        let args = resolver
            .resolve(&consumer, &mut DependencyContext::new())
            .unwrap();
        assert_eq!(args.int_value("limit"), Some(25));
    }

    #[test]
    fn test_cycle_error_display() {
        let err = CycleError {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle: a -> b -> a");
    }
}
