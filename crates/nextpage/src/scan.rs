// File: src/scan.rs
// Purpose: Walks a pages root, yielding one page per directory

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Conventional handler file name inside a page directory
pub const PAGE_FILE: &str = "page.rs";

/// Conventional template file name inside a page directory
pub const TEMPLATE_FILE: &str = "template.html";

/// One discovered page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedPage {
    /// URL path relative to the pages root (directory names joined by `/`,
    /// empty for the root directory itself)
    pub url_path: String,
    /// On-disk path of the handler file. For virtual views this is the
    /// synthesized conventional path and does not exist.
    pub handler_file: PathBuf,
    /// On-disk path of the template file (may or may not exist)
    pub template_file: PathBuf,
    /// True when the directory has a template but no handler file
    pub virtual_view: bool,
}

/// Walks a pages root depth-first, yielding `(url_path, handler_file)`
/// pairs.
///
/// For each directory the scanner recurses into subdirectories first
/// (sorted, so conflict detection sees a stable order), then yields the
/// directory's own page. A directory yields when it contains the handler
/// file, or — the virtual-view case — only the template file, in which
/// case the conventional handler path is synthesized anyway and the
/// downstream loader renders the template without any page logic.
///
/// Unreadable directories are logged and skipped; one bad subtree never
/// aborts the scan.
#[derive(Debug, Clone)]
pub struct PageDirectoryScanner {
    page_file: String,
    template_file: String,
}

impl Default for PageDirectoryScanner {
    fn default() -> Self {
        Self {
            page_file: PAGE_FILE.to_string(),
            template_file: TEMPLATE_FILE.to_string(),
        }
    }
}

impl PageDirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the conventional file names
    pub fn with_file_names(
        page_file: impl Into<String>,
        template_file: impl Into<String>,
    ) -> Self {
        Self {
            page_file: page_file.into(),
            template_file: template_file.into(),
        }
    }

    pub fn page_file(&self) -> &str {
        &self.page_file
    }

    pub fn template_file(&self) -> &str {
        &self.template_file
    }

    /// Scans a pages root. A missing root yields no pages.
    pub fn scan(&self, root: &Path) -> Vec<ScannedPage> {
        let mut pages = Vec::new();
        if root.is_dir() {
            self.scan_directory(root, "", &mut pages);
        }
        pages
    }

    fn scan_directory(&self, dir: &Path, url_path: &str, out: &mut Vec<ScannedPage>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(directory = %dir.display(), error = %err, "skipping unreadable directory");
                return;
            }
        };

        let mut subdirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_dir() {
                        subdirs.push(path);
                    }
                }
                Err(err) => {
                    warn!(directory = %dir.display(), error = %err, "skipping unreadable entry");
                }
            }
        }
        subdirs.sort();

        // Subdirectories first, then this directory's own page
        for sub in subdirs {
            let name = sub
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let child_url = if url_path.is_empty() {
                name
            } else {
                format!("{}/{}", url_path, name)
            };
            self.scan_directory(&sub, &child_url, out);
        }

        let handler_file = dir.join(&self.page_file);
        let template_file = dir.join(&self.template_file);

        if handler_file.is_file() {
            out.push(ScannedPage {
                url_path: url_path.to_string(),
                handler_file,
                template_file,
                virtual_view: false,
            });
        } else if template_file.is_file() {
            out.push(ScannedPage {
                url_path: url_path.to_string(),
                handler_file,
                template_file,
                virtual_view: true,
            });
        }
    }
}
