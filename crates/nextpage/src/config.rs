// File: src/config.rs
// Purpose: Configuration parsing from nextpage.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub dev: DevConfig,

    /// Ordered router backend records; an empty list gets the default
    /// filesystem backend with application scanning enabled.
    #[serde(default, rename = "router")]
    pub router_sources: Vec<RouterSourceConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Name of the pages subdirectory inside each application (default: "pages")
    #[serde(default = "default_pages_dir_name")]
    pub pages_dir_name: String,

    /// Installed application directories scanned when a backend has
    /// `app_dirs` enabled
    #[serde(default)]
    pub apps: Vec<String>,

    /// Handler file name inside a page directory (default: "page.rs")
    #[serde(default = "default_page_file")]
    pub page_file: String,

    /// Template file name inside a page directory (default: "template.html")
    #[serde(default = "default_template_file")]
    pub template_file: String,
}

/// Development configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    #[serde(default = "default_true")]
    pub hot_reload: bool,
}

/// One router backend record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSourceConfig {
    /// Backend identifier resolved through the router factory
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Scan the configured applications' pages subdirectories
    #[serde(default)]
    pub app_dirs: bool,

    #[serde(default)]
    pub options: RouterSourceOptions,
}

impl Default for RouterSourceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            app_dirs: true,
            options: RouterSourceOptions::default(),
        }
    }
}

/// Free-form backend options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterSourceOptions {
    /// Single root directory fallback
    #[serde(default)]
    pub root: Option<String>,

    /// Explicit list of root directories; overrides `root` when non-empty
    #[serde(default)]
    pub dirs: Vec<String>,

    /// Names of registered dependencies merged into every template context
    #[serde(default)]
    pub context_processors: Vec<String>,
}

// Default values
fn default_name() -> String {
    "nextpage-app".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_pages_dir_name() -> String {
    "pages".to_string()
}

fn default_page_file() -> String {
    "page.rs".to_string()
}

fn default_template_file() -> String {
    "template.html".to_string()
}

fn default_backend() -> String {
    "filesystem".to_string()
}

fn default_true() -> bool {
    true
}

// Default implementations
impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pages_dir_name: default_pages_dir_name(),
            apps: Vec::new(),
            page_file: default_page_file(),
            template_file: default_template_file(),
        }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self { hot_reload: true }
    }
}

impl Config {
    /// Load configuration from a nextpage.toml file.
    ///
    /// A missing or empty file yields the default configuration; a present
    /// but malformed file is a fatal configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from the default path (./nextpage.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("nextpage.toml")
    }

    /// The effective router source records: configured ones, or the single
    /// default filesystem record when none are configured.
    pub fn router_sources(&self) -> Vec<RouterSourceConfig> {
        if self.router_sources.is_empty() {
            vec![RouterSourceConfig::default()]
        } else {
            self.router_sources.clone()
        }
    }
}
