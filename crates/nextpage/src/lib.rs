// nextpage — file-system routing and dependency injection for axum
// Directory structure under a pages root maps to URL patterns; page files
// register templates, context providers, views, and form actions; a
// resolver injects request-derived values into those callables.

pub mod backend;
pub mod checks;
pub mod config;
pub mod dispatch;
pub mod forms;
pub mod handler;
pub mod page;
pub mod reload;
pub mod render;
pub mod request_context;
pub mod resolve;
pub mod response;
pub mod scan;
pub mod value;

// Re-export the pattern compiler crate
pub use nextpage_router as router;

// Re-export framework types
pub use backend::{FileRouterBackend, RouteEntry, RouterBackend, RouterFactory, RouterManager};
pub use checks::Diagnostic;
pub use config::Config;
pub use dispatch::{App, Platform, FORM_ENDPOINT_PREFIX};
pub use forms::{action_id, FieldKind, FieldSpec, FormAction, FormActionRegistry, FormSpec};
pub use handler::{CallOutcome, Callable, DependsOn, Injected, Param, ParamSource, ResolvedArgs};
pub use page::{PageEntry, PageOutput, PageRegistry, PageRenderer};
pub use reload::{create_watcher, spawn_reload_task, ReloadWatcher};
pub use render::Renderer;
pub use request_context::{FormData, QueryParams, RequestContext};
pub use resolve::{
    coerce, CycleError, DependencyContext, DependencyRegistry, DependencyResolver,
    ParameterProvider,
};
pub use scan::{PageDirectoryScanner, ScannedPage};
pub use value::Value;

// Re-export commonly used types from dependencies
pub use axum;
pub use axum::http::StatusCode;
