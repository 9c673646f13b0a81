// File: src/page.rs
// Purpose: Per-handler-file registries for templates, context providers, and
// views, plus the page rendering pipeline

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use tracing::warn;

use crate::backend::RouteEntry;
use crate::handler::{CallOutcome, Callable};
use crate::render::Renderer;
use crate::resolve::{CycleError, DependencyContext, DependencyResolver};
use crate::value::Value;

/// Everything registered for one handler file.
#[derive(Debug, Clone, Default)]
pub struct PageEntry {
    /// At most one template string; later registration overwrites
    pub template: Option<String>,
    /// Ordered context providers: a `None` key merges an object result
    /// directly into the context, a string key slots the value under it
    pub context: Vec<(Option<String>, Arc<Callable>)>,
    /// Module-level view callable, when the page renders itself
    pub view: Option<Arc<Callable>>,
}

/// Registry keyed by pages-relative handler path.
///
/// Registration is explicit, taking the file identity as an argument — no
/// call-stack inspection. An explicit, constructed object passed into the
/// dispatch layer, with `Default` as the pre-wired empty instance.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    entries: HashMap<String, PageEntry>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the template string for a handler file, overwriting any
    /// earlier registration for the same file.
    pub fn register_template(&mut self, file: impl Into<String>, template: impl Into<String>) {
        self.entries.entry(file.into()).or_default().template = Some(template.into());
    }

    /// Appends a context provider for a handler file.
    ///
    /// A `None` key means "merge the callable's object result directly into
    /// the context"; a string key places the result under that key.
    pub fn register_context(
        &mut self,
        file: impl Into<String>,
        key: Option<String>,
        callable: Callable,
    ) {
        self.entries
            .entry(file.into())
            .or_default()
            .context
            .push((key, Arc::new(callable)));
    }

    /// Registers the view callable for a handler file.
    pub fn register_view(&mut self, file: impl Into<String>, callable: Callable) {
        self.entries.entry(file.into()).or_default().view = Some(Arc::new(callable));
    }

    pub fn entry(&self, file: &str) -> Option<&PageEntry> {
        self.entries.get(file)
    }

    /// The template source for a route entry: a registered string wins,
    /// otherwise the template file beside the handler is read from disk
    /// (which is all a virtual view has).
    pub fn template_for(&self, entry: &RouteEntry) -> Option<String> {
        if let Some(page) = self.entries.get(&entry.handler_file) {
            if let Some(template) = &page.template {
                return Some(template.clone());
            }
        }
        fs::read_to_string(&entry.template_file).ok()
    }
}

/// Output of the page rendering pipeline.
#[derive(Debug)]
pub enum PageOutput {
    /// Rendered HTML body
    Html(String),
    /// The view returned a response-shaped outcome for the dispatch layer
    /// to normalize
    Outcome(CallOutcome),
    /// Neither a view nor any template source exists for the page
    NotFound,
}

/// Composes the final template context and renders a page.
pub struct PageRenderer<'a> {
    registry: &'a PageRegistry,
    resolver: &'a DependencyResolver,
}

impl<'a> PageRenderer<'a> {
    pub fn new(registry: &'a PageRegistry, resolver: &'a DependencyResolver) -> Self {
        Self { registry, resolver }
    }

    /// Renders one matched route.
    ///
    /// A registered view wins outright: its parameters are resolved and its
    /// outcome handed back for normalization. Otherwise the context is
    /// composed — `base` first, then each context provider in registration
    /// order, then `explicit` overlaid last (explicit values always win) —
    /// and the template is interpolated.
    pub fn render(
        &self,
        entry: &RouteEntry,
        cx: &mut DependencyContext,
        base: HashMap<String, Value>,
        explicit: HashMap<String, Value>,
    ) -> Result<PageOutput, CycleError> {
        let page = self.registry.entry(&entry.handler_file);

        if let Some(view) = page.and_then(|p| p.view.clone()) {
            let args = self.resolver.resolve(&view, cx)?;
            return Ok(PageOutput::Outcome(view.invoke(args)));
        }

        let Some(template) = self.registry.template_for(entry) else {
            return Ok(PageOutput::NotFound);
        };

        let mut context = base;
        if let Some(page) = page {
            for (key, callable) in &page.context {
                let args = self.resolver.resolve(callable, cx)?;
                let value = match callable.invoke(args) {
                    CallOutcome::Value(v) => v,
                    CallOutcome::Body(s) => Value::Str(s),
                    CallOutcome::None => Value::Null,
                    other => {
                        warn!(
                            handler = %entry.handler_file,
                            "context provider returned {:?}; using null",
                            other
                        );
                        Value::Null
                    }
                };
                match key {
                    Some(key) => {
                        context.insert(key.clone(), value);
                    }
                    None => match value {
                        Value::Object(map) => context.extend(map),
                        Value::Null => {}
                        other => {
                            warn!(
                                handler = %entry.handler_file,
                                "keyless context provider returned non-object {:?}",
                                other
                            );
                        }
                    },
                }
            }
        }

        // Explicit values always win over computed context
        context.extend(explicit);

        Ok(PageOutput::Html(Renderer::from_context(context).render(&template)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Param;
    use crate::resolve::DependencyRegistry;
    use nextpage_router::Route;
    use std::path::PathBuf;

    fn entry_for(handler_file: &str) -> RouteEntry {
        RouteEntry {
            route: Route::from_url_path("test", handler_file),
            handler_file: handler_file.to_string(),
            source_file: PathBuf::from(handler_file),
            template_file: PathBuf::from("/nonexistent/template.html"),
            url_path: "test".to_string(),
            app: None,
            virtual_view: false,
        }
    }

    fn resolver() -> DependencyResolver {
        DependencyResolver::new(Arc::new(DependencyRegistry::new()))
    }

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_template_registration_overwrites() {
        let mut registry = PageRegistry::new();
        registry.register_template("a/page.rs", "first");
        registry.register_template("a/page.rs", "second");
        assert_eq!(
            registry.entry("a/page.rs").unwrap().template.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_context_merge_order_and_keys() {
        let mut registry = PageRegistry::new();
        registry.register_template("p/page.rs", "{title}:{count}");
        registry.register_context(
            "p/page.rs",
            None,
            Callable::new(|_| CallOutcome::Value(object(&[("title", Value::from("merged"))]))),
        );
        registry.register_context(
            "p/page.rs",
            Some("count".to_string()),
            Callable::new(|_| CallOutcome::Value(Value::Int(3))),
        );

        let resolver = resolver();
        let renderer = PageRenderer::new(&registry, &resolver);
        let out = renderer
            .render(
                &entry_for("p/page.rs"),
                &mut DependencyContext::new(),
                HashMap::new(),
                HashMap::new(),
            )
            .unwrap();

        match out {
            PageOutput::Html(html) => assert_eq!(html, "merged:3"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_kwargs_always_win() {
        let mut registry = PageRegistry::new();
        registry.register_template("p/page.rs", "{title}");
        registry.register_context(
            "p/page.rs",
            Some("title".to_string()),
            Callable::new(|_| CallOutcome::Value(Value::from("computed"))),
        );

        let resolver = resolver();
        let renderer = PageRenderer::new(&registry, &resolver);
        let mut explicit = HashMap::new();
        explicit.insert("title".to_string(), Value::from("explicit"));

        let out = renderer
            .render(
                &entry_for("p/page.rs"),
                &mut DependencyContext::new(),
                HashMap::new(),
                explicit,
            )
            .unwrap();

        match out {
            PageOutput::Html(html) => assert_eq!(html, "explicit"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_context_provider_params_are_resolved() {
        let mut registry = PageRegistry::new();
        registry.register_template("p/page.rs", "id={post_id}");
        registry.register_context(
            "p/page.rs",
            Some("post_id".to_string()),
            Callable::new(|args| {
                CallOutcome::Value(Value::Int(args.int_value("post_id").unwrap_or(-1)))
            })
            .with_param(Param::named("post_id").of_kind(nextpage_router::ParamKind::Int)),
        );

        let resolver = resolver();
        let renderer = PageRenderer::new(&registry, &resolver);
        let mut cx = DependencyContext::new().with_kwarg("post_id", "123");

        let out = renderer
            .render(&entry_for("p/page.rs"), &mut cx, HashMap::new(), HashMap::new())
            .unwrap();

        match out {
            PageOutput::Html(html) => assert_eq!(html, "id=123"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_view_wins_over_template() {
        let mut registry = PageRegistry::new();
        registry.register_template("p/page.rs", "template body");
        registry.register_view(
            "p/page.rs",
            Callable::new(|_| CallOutcome::Body("view body".to_string())),
        );

        let resolver = resolver();
        let renderer = PageRenderer::new(&registry, &resolver);
        let out = renderer
            .render(
                &entry_for("p/page.rs"),
                &mut DependencyContext::new(),
                HashMap::new(),
                HashMap::new(),
            )
            .unwrap();

        match out {
            PageOutput::Outcome(CallOutcome::Body(s)) => assert_eq!(s, "view body"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_unregistered_page_without_template_is_not_found() {
        let registry = PageRegistry::new();
        let resolver = resolver();
        let renderer = PageRenderer::new(&registry, &resolver);
        let out = renderer
            .render(
                &entry_for("missing/page.rs"),
                &mut DependencyContext::new(),
                HashMap::new(),
                HashMap::new(),
            )
            .unwrap();
        assert!(matches!(out, PageOutput::NotFound));
    }
}
