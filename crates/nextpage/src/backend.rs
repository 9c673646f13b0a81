// File: src/backend.rs
// Purpose: Router backends, the backend factory, and the route-table manager

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use nextpage_router::Route;
use tracing::{error, info};

use crate::config::{Config, RouterSourceConfig, RoutingConfig};
use crate::scan::PageDirectoryScanner;

/// One compiled route plus everything the dispatch layer needs to serve it.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Compiled pattern and parameter specs
    pub route: Route,
    /// Pages-relative handler path, the key page registries are keyed by
    pub handler_file: String,
    /// On-disk handler path (does not exist for virtual views)
    pub source_file: PathBuf,
    /// On-disk template path (may or may not exist)
    pub template_file: PathBuf,
    /// URL path relative to the pages root this entry was scanned from
    pub url_path: String,
    /// Application directory this entry came from, if app-scoped
    pub app: Option<String>,
    /// True when the page is backed only by a template file
    pub virtual_view: bool,
}

/// Produces route entries from some source.
///
/// Backends cache internally; `reload` drops the caches so the next
/// `routes` call recomputes.
pub trait RouterBackend: Send + Sync + std::fmt::Debug {
    fn routes(&self) -> Vec<RouteEntry>;

    fn reload(&self);
}

/// Scans pages directories on the file system.
///
/// When `app_dirs` is enabled, every configured application's pages
/// subdirectory is scanned first; root-level directories from the options
/// (the explicit list, or the single fallback root) follow. Application
/// pages therefore shadow root pages on pattern conflicts, mirroring the
/// static-file search convention. Per-source route lists are cached once
/// computed; callers needing fresh results go through `reload`.
#[derive(Debug)]
pub struct FileRouterBackend {
    app_dirs: bool,
    pages_dir_name: String,
    apps: Vec<PathBuf>,
    root_dirs: Vec<PathBuf>,
    scanner: PageDirectoryScanner,
    cache: RwLock<HashMap<String, Vec<RouteEntry>>>,
}

impl FileRouterBackend {
    pub fn new(source: &RouterSourceConfig, routing: &RoutingConfig) -> Self {
        let root_dirs = if !source.options.dirs.is_empty() {
            source.options.dirs.iter().map(PathBuf::from).collect()
        } else {
            vec![PathBuf::from(
                source
                    .options
                    .root
                    .clone()
                    .unwrap_or_else(|| routing.pages_dir_name.clone()),
            )]
        };

        Self {
            app_dirs: source.app_dirs,
            pages_dir_name: routing.pages_dir_name.clone(),
            apps: routing.apps.iter().map(PathBuf::from).collect(),
            root_dirs,
            scanner: PageDirectoryScanner::with_file_names(
                routing.page_file.clone(),
                routing.template_file.clone(),
            ),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Directories this backend scans, in precedence order.
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if self.app_dirs {
            for app in &self.apps {
                roots.push(app.join(&self.pages_dir_name));
            }
        }
        roots.extend(self.root_dirs.iter().cloned());
        roots
    }

    fn cached_scan(&self, key: &str, root: &Path, app: Option<&str>) -> Vec<RouteEntry> {
        if let Some(entries) = self.cache.read().expect("route cache poisoned").get(key) {
            return entries.clone();
        }

        let entries = self.scan_root(root, app);
        self.cache
            .write()
            .expect("route cache poisoned")
            .insert(key.to_string(), entries.clone());
        entries
    }

    fn scan_root(&self, root: &Path, app: Option<&str>) -> Vec<RouteEntry> {
        let entries: Vec<RouteEntry> = self
            .scanner
            .scan(root)
            .into_iter()
            .map(|page| {
                let handler_file = if page.url_path.is_empty() {
                    self.scanner.page_file().to_string()
                } else {
                    format!("{}/{}", page.url_path, self.scanner.page_file())
                };
                RouteEntry {
                    route: Route::from_url_path(&page.url_path, handler_file.clone()),
                    handler_file,
                    source_file: page.handler_file,
                    template_file: page.template_file,
                    url_path: page.url_path,
                    app: app.map(|a| a.to_string()),
                    virtual_view: page.virtual_view,
                }
            })
            .collect();

        info!(root = %root.display(), routes = entries.len(), "scanned pages root");
        entries
    }
}

impl RouterBackend for FileRouterBackend {
    fn routes(&self) -> Vec<RouteEntry> {
        let mut entries = Vec::new();

        if self.app_dirs {
            for app in &self.apps {
                let app_name = app.display().to_string();
                let key = format!("app:{}", app_name);
                let root = app.join(&self.pages_dir_name);
                entries.extend(self.cached_scan(&key, &root, Some(app_name.as_str())));
            }
        }

        for root in &self.root_dirs {
            let key = format!("root:{}", root.display());
            entries.extend(self.cached_scan(&key, root, None));
        }

        entries
    }

    fn reload(&self) {
        self.cache.write().expect("route cache poisoned").clear();
    }
}

type BackendCtor = fn(&RouterSourceConfig, &RoutingConfig) -> Result<Box<dyn RouterBackend>>;

/// Maps backend identifier strings to constructors.
///
/// The default factory knows `"filesystem"`; plugins register additional
/// identifiers at runtime. An unknown identifier is a configuration error,
/// raised when the backend record is first built.
pub struct RouterFactory {
    ctors: HashMap<String, BackendCtor>,
}

impl Default for RouterFactory {
    fn default() -> Self {
        let mut factory = Self {
            ctors: HashMap::new(),
        };
        factory.register("filesystem", |source, routing| {
            Ok(Box::new(FileRouterBackend::new(source, routing)))
        });
        factory
    }
}

impl RouterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend constructor under an identifier (plugin point)
    pub fn register(&mut self, identifier: impl Into<String>, ctor: BackendCtor) {
        self.ctors.insert(identifier.into(), ctor);
    }

    pub fn create(
        &self,
        source: &RouterSourceConfig,
        routing: &RoutingConfig,
    ) -> Result<Box<dyn RouterBackend>> {
        let ctor = self
            .ctors
            .get(&source.backend)
            .ok_or_else(|| anyhow!("unknown router backend identifier: {:?}", source.backend))?;
        ctor(source, routing)
    }
}

/// Assembles configured backends into the application's full route table.
///
/// Backends are built lazily on first iteration and cached; a backend whose
/// construction fails is logged and skipped, so one bad record never takes
/// down the rest of the table. `reload` drops built backends and their
/// caches; the next `routes` call rebuilds everything.
pub struct RouterManager {
    sources: Vec<RouterSourceConfig>,
    routing: RoutingConfig,
    factory: RouterFactory,
    backends: RwLock<Option<Vec<Box<dyn RouterBackend>>>>,
}

impl RouterManager {
    pub fn new(sources: Vec<RouterSourceConfig>, routing: RoutingConfig) -> Self {
        Self::with_factory(sources, routing, RouterFactory::default())
    }

    pub fn with_factory(
        sources: Vec<RouterSourceConfig>,
        routing: RoutingConfig,
        factory: RouterFactory,
    ) -> Self {
        Self {
            sources,
            routing,
            factory,
            backends: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.router_sources(), config.routing.clone())
    }

    /// Every route from every backend, in backend-declaration order.
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.ensure_built();
        let backends = self.backends.read().expect("backend list poisoned");
        backends
            .as_ref()
            .map(|backends| backends.iter().flat_map(|b| b.routes()).collect())
            .unwrap_or_default()
    }

    /// Drops built backends so the next `routes` call rebuilds from scratch.
    pub fn reload(&self) {
        *self.backends.write().expect("backend list poisoned") = None;
    }

    fn ensure_built(&self) {
        let mut guard = self.backends.write().expect("backend list poisoned");
        if guard.is_some() {
            return;
        }

        let mut built = Vec::new();
        for source in &self.sources {
            match self.factory.create(source, &self.routing) {
                Ok(backend) => built.push(backend),
                Err(err) => {
                    error!(backend = %source.backend, error = %err, "skipping router backend");
                }
            }
        }
        *guard = Some(built);
    }
}
