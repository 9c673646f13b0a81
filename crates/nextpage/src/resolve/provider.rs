// File: src/resolve/provider.rs
// Purpose: Ordered parameter provider chain — first match wins

use nextpage_router::ParamKind;

use crate::handler::{DependsOn, Injected, Param, ParamSource};
use crate::resolve::{coerce, fallback, CycleError, DependencyContext, DependencyResolver};

/// A capability object that can supply a value for one declared parameter.
///
/// Providers are tried in a fixed registration order; the first provider
/// whose `can_handle` returns true wins for a given parameter — later
/// providers are not consulted. The built-in precedence is:
///
/// 1. request
/// 2. URL marker
/// 3. form
/// 4. declared dependency
/// 5. plain URL kwarg by name
///
/// That order is observable behavior, not an implementation detail.
pub trait ParameterProvider: Send + Sync {
    fn can_handle(&self, param: &Param, cx: &DependencyContext) -> bool;

    fn resolve(
        &self,
        param: &Param,
        resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError>;
}

/// Supplies the current request object.
pub struct RequestProvider;

impl ParameterProvider for RequestProvider {
    fn can_handle(&self, param: &Param, _cx: &DependencyContext) -> bool {
        matches!(param.source, ParamSource::Request)
    }

    fn resolve(
        &self,
        param: &Param,
        _resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        Ok(cx
            .request
            .clone()
            .map(Injected::Request)
            .unwrap_or_else(|| fallback(param)))
    }
}

/// Supplies a URL-captured value under an explicit capture name, coerced to
/// the parameter's declared kind.
pub struct UrlMarkerProvider;

impl ParameterProvider for UrlMarkerProvider {
    fn can_handle(&self, param: &Param, _cx: &DependencyContext) -> bool {
        matches!(param.source, ParamSource::Url { .. })
    }

    fn resolve(
        &self,
        param: &Param,
        _resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        let ParamSource::Url { name } = &param.source else {
            return Ok(fallback(param));
        };
        Ok(cx
            .url_kwargs
            .get(name)
            .map(|raw| Injected::Value(coerce(raw, param.kind.unwrap_or(ParamKind::Str))))
            .unwrap_or_else(|| fallback(param)))
    }
}

/// Supplies the active form instance, either for an explicit form
/// declaration or for a parameter named `form` when a form is present.
pub struct FormProvider;

impl ParameterProvider for FormProvider {
    fn can_handle(&self, param: &Param, cx: &DependencyContext) -> bool {
        match param.source {
            ParamSource::Form => true,
            ParamSource::Named => param.name == "form" && cx.form.is_some(),
            _ => false,
        }
    }

    fn resolve(
        &self,
        param: &Param,
        _resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        Ok(cx
            .form
            .clone()
            .map(Injected::Form)
            .unwrap_or_else(|| fallback(param)))
    }
}

/// Supplies declared dependencies: registered names (memoized), inline
/// callables (not memoized), literals, and name-defaulted lookups.
pub struct DependsProvider;

impl ParameterProvider for DependsProvider {
    fn can_handle(&self, param: &Param, _cx: &DependencyContext) -> bool {
        matches!(param.source, ParamSource::Depends(_))
    }

    fn resolve(
        &self,
        param: &Param,
        resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        let ParamSource::Depends(dep) = &param.source else {
            return Ok(fallback(param));
        };
        match dep {
            DependsOn::Name(name) => resolver.resolve_named(name, cx),
            DependsOn::ParamName => resolver.resolve_named(&param.name, cx),
            DependsOn::Callable(callable) => resolver.invoke_dependency(callable, cx),
            DependsOn::Literal(value) => Ok(Injected::Value(value.clone())),
        }
    }
}

/// Supplies a URL keyword argument matched by the parameter's own name,
/// coerced to the declared kind.
pub struct UrlKwargProvider;

impl ParameterProvider for UrlKwargProvider {
    fn can_handle(&self, param: &Param, cx: &DependencyContext) -> bool {
        matches!(param.source, ParamSource::Named) && cx.url_kwargs.contains_key(&param.name)
    }

    fn resolve(
        &self,
        param: &Param,
        _resolver: &DependencyResolver,
        cx: &mut DependencyContext,
    ) -> Result<Injected, CycleError> {
        Ok(cx
            .url_kwargs
            .get(&param.name)
            .map(|raw| Injected::Value(coerce(raw, param.kind.unwrap_or(ParamKind::Str))))
            .unwrap_or_else(|| fallback(param)))
    }
}

/// The built-in provider chain, in documented precedence order.
pub fn default_providers() -> Vec<Box<dyn ParameterProvider>> {
    vec![
        Box::new(RequestProvider),
        Box::new(UrlMarkerProvider),
        Box::new(FormProvider),
        Box::new(DependsProvider),
        Box::new(UrlKwargProvider),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{CallOutcome, Callable};
    use crate::request_context::FormData;
    use crate::resolve::DependencyRegistry;
    use crate::value::Value;
    use std::sync::Arc;

    fn resolver() -> DependencyResolver {
        DependencyResolver::new(Arc::new(DependencyRegistry::new()))
    }

    #[test]
    fn test_url_marker_coerces_by_declared_kind() {
        let mut cx = DependencyContext::new().with_kwarg("post_id", "42");
        let callable = Callable::new(|_| CallOutcome::None)
            .with_param(Param::url("id", "post_id").of_kind(ParamKind::Int));

        let args = resolver().resolve(&callable, &mut cx).unwrap();
        assert_eq!(args.value("id"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_form_matched_by_name_when_present() {
        let mut cx = DependencyContext::new().with_form(FormData::new());
        let callable = Callable::new(|_| CallOutcome::None).with_param(Param::named("form"));

        let args = resolver().resolve(&callable, &mut cx).unwrap();
        assert!(args.form("form").is_some());
    }

    #[test]
    fn test_form_by_name_without_form_falls_through() {
        // Without a form in context the name-based match must not claim the
        // parameter, leaving it to later providers (here: none match).
        let mut cx = DependencyContext::new();
        let callable = Callable::new(|_| CallOutcome::None).with_param(Param::named("form"));

        let args = resolver().resolve(&callable, &mut cx).unwrap();
        assert!(args.is_null("form"));
    }

    #[test]
    fn test_kwarg_by_name_with_coercion() {
        let mut cx = DependencyContext::new().with_kwarg("flag", "true");
        let callable = Callable::new(|_| CallOutcome::None)
            .with_param(Param::named("flag").of_kind(ParamKind::Bool));

        let args = resolver().resolve(&callable, &mut cx).unwrap();
        assert_eq!(args.value("flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_first_match_wins_over_kwarg() {
        // A parameter declared as a URL marker is claimed by the marker
        // provider even when a same-named kwarg exists for the kwarg provider.
        let mut cx = DependencyContext::new()
            .with_kwarg("id", "7")
            .with_kwarg("other", "99");
        let callable = Callable::new(|_| CallOutcome::None)
            .with_param(Param::url("id", "other").of_kind(ParamKind::Int));

        let args = resolver().resolve(&callable, &mut cx).unwrap();
        assert_eq!(args.int_value("id"), Some(99));
    }
}
