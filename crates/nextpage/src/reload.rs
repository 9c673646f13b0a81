// File: src/reload.rs
// Purpose: Watches the pages roots and rebuilds the route table on change

use anyhow::Result;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::dispatch::App;

/// Which kind of page file changed
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeType {
    Handler,
    Template,
}

/// Represents a file change event
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub change_type: ChangeType,
}

/// Watcher over the pages roots.
///
/// Only handler and template files matter: a created or removed `page.rs`
/// changes the route table, a `template.html` change affects what a
/// virtual view serves.
pub struct ReloadWatcher {
    tx: broadcast::Sender<FileChange>,
    _watcher: notify::RecommendedWatcher,
}

impl ReloadWatcher {
    pub fn new(
        watch_paths: Vec<PathBuf>,
        page_file: String,
        template_file: String,
    ) -> Result<Self> {
        let (tx, _) = broadcast::channel(100);
        let tx_clone = tx.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            let file_name = path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or_default();

                            let change_type = if file_name == page_file {
                                ChangeType::Handler
                            } else if file_name == template_file {
                                ChangeType::Template
                            } else {
                                continue;
                            };

                            info!(path = %path.display(), "page file changed");
                            let _ = tx_clone.send(FileChange { path, change_type });
                        }
                    }
                }
                Err(e) => error!("watch error: {:?}", e),
            }
        })?;

        for path in watch_paths {
            if path.exists() {
                watcher.watch(&path, RecursiveMode::Recursive)?;
                info!(path = %path.display(), "watching pages root");
            } else {
                warn!(path = %path.display(), "pages root does not exist");
            }
        }

        Ok(Self {
            tx,
            _watcher: watcher,
        })
    }

    /// Subscribe to file change events
    pub fn subscribe(&self) -> broadcast::Receiver<FileChange> {
        self.tx.subscribe()
    }
}

/// Creates a watcher over an application's pages roots.
pub fn create_watcher(app: &App) -> Result<ReloadWatcher> {
    let routing = &app.config().routing;
    ReloadWatcher::new(
        app.pages_roots(),
        routing.page_file.clone(),
        routing.template_file.clone(),
    )
}

/// Spawns the task that rebuilds and swaps the route table on every change.
pub fn spawn_reload_task(app: App, watcher: ReloadWatcher) {
    let mut rx = watcher.subscribe();
    tokio::spawn(async move {
        let _watcher = watcher;
        while let Ok(change) = rx.recv().await {
            info!(path = %change.path.display(), "rebuilding route table");
            app.reload().await;
        }
    });
}
