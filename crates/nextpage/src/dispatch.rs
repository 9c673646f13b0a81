// File: src/dispatch.rs
// Purpose: axum glue — request-context assembly, route-table dispatch, and
// the shared form action endpoint

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path as AxumPath, Query as AxumQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use axum::routing::any;
use axum::Router as AxumRouter;
use nextpage_router::normalize_path;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use crate::backend::{RouteEntry, RouterFactory, RouterManager};
use crate::checks::{self, Diagnostic};
use crate::config::Config;
use crate::forms::{form_value, FormActionRegistry};
use crate::handler::Injected;
use crate::page::{PageOutput, PageRegistry, PageRenderer};
use crate::request_context::{FormData, QueryParams, RequestContext};
use crate::resolve::{coerce, CycleError, DependencyContext, DependencyRegistry, DependencyResolver};
use crate::response;
use crate::scan::PageDirectoryScanner;
use crate::value::Value;

/// URL prefix of the shared form dispatch endpoint
pub const FORM_ENDPOINT_PREFIX: &str = "/_next/form/";

/// Everything an application assembles before serving: configuration plus
/// the page, form, and dependency registries.
///
/// Registries are plain owned objects mutated during setup; `App::new`
/// freezes them behind an `Arc` for request handling.
pub struct Platform {
    pub config: Config,
    pub pages: PageRegistry,
    pub forms: FormActionRegistry,
    pub deps: DependencyRegistry,
    pub factory: RouterFactory,
}

impl Platform {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pages: PageRegistry::new(),
            forms: FormActionRegistry::new(),
            deps: DependencyRegistry::new(),
            factory: RouterFactory::default(),
        }
    }
}

struct AppInner {
    config: Config,
    pages: PageRegistry,
    forms: FormActionRegistry,
    resolver: DependencyResolver,
    manager: RouterManager,
    scanner: PageDirectoryScanner,
    context_processors: Vec<String>,
    /// The current route table. Reload builds a fresh table and swaps it
    /// in; in-flight requests keep reading the one they started with.
    table: RwLock<Vec<RouteEntry>>,
}

/// The assembled application: route table, registries, and dispatch.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    pub fn new(platform: Platform) -> Self {
        let manager = RouterManager::with_factory(
            platform.config.router_sources(),
            platform.config.routing.clone(),
            platform.factory,
        );
        let table = manager.routes();

        let context_processors = platform
            .config
            .router_sources()
            .iter()
            .flat_map(|source| source.options.context_processors.clone())
            .collect();

        let scanner = PageDirectoryScanner::with_file_names(
            platform.config.routing.page_file.clone(),
            platform.config.routing.template_file.clone(),
        );

        Self {
            inner: Arc::new(AppInner {
                config: platform.config,
                pages: platform.pages,
                forms: platform.forms,
                resolver: DependencyResolver::new(Arc::new(platform.deps)),
                manager,
                scanner,
                context_processors,
                table: RwLock::new(table),
            }),
        }
    }

    /// Builds the axum router: `/` plus a wildcard route feeding one
    /// dispatch function that consults our own route table.
    pub fn axum_router(&self) -> AxumRouter {
        AxumRouter::new()
            .route("/", any(root_handler))
            .route("/*path", any(page_handler))
            .with_state(self.clone())
    }

    /// Rebuilds the route table from the backends and swaps it in.
    pub async fn reload(&self) {
        self.inner.manager.reload();
        let table = self.inner.manager.routes();
        *self.inner.table.write().await = table;
    }

    /// Snapshot of the current route table
    pub async fn route_entries(&self) -> Vec<RouteEntry> {
        self.inner.table.read().await.clone()
    }

    /// Pages roots implied by the configuration, for checks and watching
    pub fn pages_roots(&self) -> Vec<PathBuf> {
        let routing = &self.inner.config.routing;
        let mut roots = Vec::new();
        for source in self.inner.config.router_sources() {
            if source.app_dirs {
                for app in &routing.apps {
                    roots.push(PathBuf::from(app).join(&routing.pages_dir_name));
                }
            }
            if !source.options.dirs.is_empty() {
                roots.extend(source.options.dirs.iter().map(PathBuf::from));
            } else {
                roots.push(PathBuf::from(
                    source
                        .options
                        .root
                        .clone()
                        .unwrap_or_else(|| routing.pages_dir_name.clone()),
                ));
            }
        }
        roots.sort();
        roots.dedup();
        roots
    }

    /// Runs the startup diagnostics against the current table.
    pub async fn run_checks(&self) -> Vec<Diagnostic> {
        let table = self.inner.table.read().await;
        checks::run_all(&self.pages_roots(), &table, &self.inner.scanner)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

async fn root_handler(
    State(app): State<App>,
    method: Method,
    headers: HeaderMap,
    query: AxumQuery<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let ctx = create_request_context(method, "/".to_string(), query.0, headers, body);
    dispatch(&app, "/", ctx).await
}

async fn page_handler(
    State(app): State<App>,
    AxumPath(path): AxumPath<String>,
    method: Method,
    headers: HeaderMap,
    query: AxumQuery<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let route = format!("/{}", path);
    let ctx = create_request_context(method, route.clone(), query.0, headers, body);
    dispatch(&app, &route, ctx).await
}

/// Builds the request context from raw axum parts, parsing urlencoded and
/// JSON bodies into form data.
fn create_request_context(
    method: Method,
    path: String,
    query_params: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
) -> RequestContext {
    let query = QueryParams::new(query_params);

    let form = if method == Method::POST || method == Method::PUT || method == Method::DELETE {
        let content_type = headers
            .get("content-type")
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("");

        if content_type.contains("application/json") {
            serde_json::from_slice::<JsonValue>(&body)
                .map(FormData::from_json)
                .unwrap_or_else(|_| FormData::new())
        } else if content_type.contains("application/x-www-form-urlencoded") {
            let form_str = String::from_utf8_lossy(&body);
            let fields = form_str
                .split('&')
                .filter_map(|pair| {
                    pair.split_once('=').map(|(k, v)| {
                        (
                            urlencoding::decode(k).unwrap_or_default().to_string(),
                            urlencoding::decode(v).unwrap_or_default().to_string(),
                        )
                    })
                })
                .collect();
            FormData::from_fields(fields)
        } else {
            FormData::new()
        }
    } else {
        FormData::new()
    };

    RequestContext::new(method, path, query, form, headers)
}

/// Dispatches one request: the form endpoint first, then the route table
/// in append order, then 404.
async fn dispatch(app: &App, path: &str, ctx: RequestContext) -> Response {
    let canonical = normalize_path(path).into_owned();

    if let Some(rest) = canonical.strip_prefix(FORM_ENDPOINT_PREFIX) {
        let id = rest.trim_end_matches('/');
        return form_dispatch(app, id, ctx).await;
    }

    let matched = {
        let table = app.inner.table.read().await;
        table
            .iter()
            .find_map(|entry| entry.route.matches(&canonical).map(|p| (entry.clone(), p)))
    };

    match matched {
        Some((entry, params)) => render_route(app, &entry, params, ctx),
        None => response::not_found(&format!("Route '{}' not found", canonical)),
    }
}

/// Renders a matched route: builds the per-request resolution context,
/// seeds the base template context with coerced URL captures and the
/// configured context processors, then runs the page pipeline.
fn render_route(
    app: &App,
    entry: &RouteEntry,
    raw_params: HashMap<String, String>,
    ctx: RequestContext,
) -> Response {
    let mut cx = DependencyContext::new()
        .with_request(ctx)
        .with_url_kwargs(raw_params.clone());

    let mut base: HashMap<String, Value> = HashMap::new();
    for spec in &entry.route.params {
        if let Some(raw) = raw_params.get(&spec.name) {
            base.insert(spec.name.clone(), coerce(raw, spec.kind));
        }
    }

    for name in &app.inner.context_processors {
        match app.inner.resolver.resolve_named(name, &mut cx) {
            Ok(Injected::Value(Value::Object(map))) => base.extend(map),
            Ok(Injected::Value(value)) => {
                base.insert(name.clone(), value);
            }
            Ok(_) => {}
            Err(cycle) => return cycle_response(&cycle),
        }
    }

    let renderer = PageRenderer::new(&app.inner.pages, &app.inner.resolver);
    match renderer.render(entry, &mut cx, base, HashMap::new()) {
        Ok(PageOutput::Html(html)) => response::html(StatusCode::OK, html),
        Ok(PageOutput::Outcome(outcome)) => response::normalize_outcome(outcome),
        Ok(PageOutput::NotFound) => response::not_found(&format!(
            "No view or template for route '{}'",
            entry.route.pattern
        )),
        Err(cycle) => cycle_response(&cycle),
    }
}

/// Serves the shared form endpoint: POST only, id must be registered.
/// Validation failure re-renders the declaring page with the bound form
/// and a 200; success invokes the handler with the validated form.
async fn form_dispatch(app: &App, id: &str, ctx: RequestContext) -> Response {
    if ctx.method != Method::POST {
        return response::method_not_allowed();
    }

    let Some(action) = app.inner.forms.get(id).cloned() else {
        return response::not_found(&format!("Unknown form action '{}'", id));
    };

    let Some(spec) = &action.form else {
        // No form class registered: the raw handler gets just the request
        let mut cx = DependencyContext::new().with_request(ctx);
        return match app.inner.resolver.resolve(&action.handler, &mut cx) {
            Ok(args) => response::normalize_outcome(action.handler.invoke(args)),
            Err(cycle) => cycle_response(&cycle),
        };
    };

    let mut form = ctx.form.clone();
    let errors = spec.validate(&form);

    if errors.is_empty() {
        let mut cx = DependencyContext::new().with_request(ctx).with_form(form);
        return match app.inner.resolver.resolve(&action.handler, &mut cx) {
            Ok(args) => response::normalize_outcome(action.handler.invoke(args)),
            Err(cycle) => cycle_response(&cycle),
        };
    }

    form.set_validation_errors(errors);

    let entry = {
        let table = app.inner.table.read().await;
        table
            .iter()
            .find(|e| e.handler_file == action.handler_file)
            .cloned()
    };
    let Some(entry) = entry else {
        return response::not_found(&format!(
            "No route for form action page '{}'",
            action.handler_file
        ));
    };

    let mut cx = DependencyContext::new()
        .with_request(ctx)
        .with_form(form.clone());
    let mut explicit = HashMap::new();
    explicit.insert("form".to_string(), form_value(&form, &action.initial));

    let renderer = PageRenderer::new(&app.inner.pages, &app.inner.resolver);
    match renderer.render(&entry, &mut cx, HashMap::new(), explicit) {
        Ok(PageOutput::Html(html)) => response::html(StatusCode::OK, html),
        Ok(PageOutput::Outcome(outcome)) => response::normalize_outcome(outcome),
        Ok(PageOutput::NotFound) => response::not_found(&format!(
            "No view or template for form action page '{}'",
            action.handler_file
        )),
        Err(cycle) => cycle_response(&cycle),
    }
}

fn cycle_response(err: &CycleError) -> Response {
    response::error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Dependency Cycle",
        &err.to_string(),
    )
}
