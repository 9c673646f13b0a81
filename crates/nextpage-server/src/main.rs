use anyhow::Result;
use nextpage::router::ParamKind;
use nextpage::{
    create_watcher, spawn_reload_task, App, CallOutcome, Callable, Config, FieldSpec, FormSpec,
    Param, Platform, Value,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load_default().unwrap_or_else(|e| {
        warn!("failed to load config: {}, using defaults", e);
        Config::default()
    });

    info!(
        port = config.server.port,
        pages = %config.routing.pages_dir_name,
        "nextpage starting"
    );

    let hot_reload = config.dev.hot_reload;
    let mut platform = Platform::new(config);
    register_demo_pages(&mut platform);

    let app = App::new(platform);

    for entry in app.route_entries().await {
        info!(pattern = %entry.route.pattern, handler = %entry.handler_file, "route");
    }

    for diagnostic in app.run_checks().await {
        warn!("{}", diagnostic);
    }

    if hot_reload {
        match create_watcher(&app) {
            Ok(watcher) => spawn_reload_task(app.clone(), watcher),
            Err(e) => warn!("failed to create file watcher: {}", e),
        }
    }

    let config = app.config();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("server running at http://{}", addr);
    axum::serve(listener, app.axum_router()).await?;

    Ok(())
}

/// Registers the handlers for the demo pages tree shipped with the repo.
fn register_demo_pages(platform: &mut Platform) {
    // pages/page.rs — the landing page, rendered from a context provider
    platform.pages.register_template(
        "page.rs",
        "<h1>{title}</h1><p>File-system routing for axum.</p>",
    );
    platform.pages.register_context(
        "page.rs",
        Some("title".to_string()),
        Callable::new(|_| CallOutcome::Value(Value::from("nextpage"))),
    );

    // pages/posts/[int:post-id]/page.rs — a typed capture injected into a view
    platform.pages.register_view(
        "posts/[int:post-id]/page.rs",
        Callable::new(|args| {
            let id = args.int_value("post_id").unwrap_or(0);
            CallOutcome::Body(format!("<h1>Post {}</h1>", id))
        })
        .with_param(Param::request("request"))
        .with_param(Param::named("post_id").of_kind(ParamKind::Int)),
    );

    // pages/contact/page.rs — a form action with validation
    platform.pages.register_template(
        "contact/page.rs",
        "<form method=\"post\"><input name=\"email\" value=\"{form.fields.email}\">\
         <span>{form.errors.email}</span></form>",
    );
    let spec = FormSpec::new().with_field(FieldSpec::email("email").required());
    let id = platform.forms.register(
        "contact/page.rs",
        "subscribe",
        Some(spec),
        Callable::new(|_| CallOutcome::Redirect("/".to_string())).with_param(Param::form("form")),
    );
    info!(action = %id, "registered contact form action");
}
