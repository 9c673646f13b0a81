// File: src/checks.rs
// Purpose: Startup diagnostics for page trees and route tables
//
// The pattern parser is deliberately lenient; these checks are the strict
// pass. They run at startup, collect diagnostics, and never raise during
// routing or dispatch.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use nextpage_router::{classify_segment, normalize_param_name, ParamKind, SegmentKind};

use crate::backend::RouteEntry;
use crate::scan::PageDirectoryScanner;

/// One startup diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable check identifier, e.g. `nextpage.E001`
    pub code: &'static str,
    pub message: String,
    /// URL path or directory the diagnostic refers to
    pub path: String,
}

impl Diagnostic {
    fn new(code: &'static str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.code, self.message, self.path)
    }
}

/// Validates the bracket syntax and parameter structure of one scanned URL
/// path.
pub fn check_url_path(url_path: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let segments: Vec<&str> = url_path.split('/').filter(|s| !s.is_empty()).collect();
    let last_index = segments.len().saturating_sub(1);
    let mut seen_names: HashSet<String> = HashSet::new();

    for (index, segment) in segments.iter().enumerate() {
        match classify_segment(segment) {
            SegmentKind::Static(text) => {
                if text.contains('[') || text.contains(']') {
                    diagnostics.push(Diagnostic::new(
                        "nextpage.E001",
                        format!("malformed bracket syntax in segment {:?}", segment),
                        url_path,
                    ));
                }
            }
            SegmentKind::Param(spec) => {
                check_capture(&mut diagnostics, url_path, segment, &spec.name);
                check_type_token(&mut diagnostics, url_path, segment);
                check_duplicate_name(&mut diagnostics, url_path, &mut seen_names, &spec.name);
            }
            SegmentKind::CatchAll(spec) => {
                check_capture(&mut diagnostics, url_path, segment, &spec.name);
                check_duplicate_name(&mut diagnostics, url_path, &mut seen_names, &spec.name);
                if index != last_index {
                    diagnostics.push(Diagnostic::new(
                        "nextpage.E004",
                        format!(
                            "catch-all segment {:?} must be the final segment",
                            segment
                        ),
                        url_path,
                    ));
                }
            }
        }
    }

    diagnostics
}

/// A capture name must be a plain identifier after normalization; anything
/// else (stray colons, nested brackets) is malformed syntax.
fn check_capture(diagnostics: &mut Vec<Diagnostic>, url_path: &str, segment: &str, name: &str) {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !valid {
        diagnostics.push(Diagnostic::new(
            "nextpage.E002",
            format!("invalid parameter name in segment {:?}", segment),
            url_path,
        ));
    }
}

/// Flags unrecognized type tokens, which the parser silently degrades to
/// `str` at runtime.
fn check_type_token(diagnostics: &mut Vec<Diagnostic>, url_path: &str, segment: &str) {
    let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return;
    };
    if let Some((token, _)) = inner.split_once(':') {
        if ParamKind::parse_token(token).is_none() {
            diagnostics.push(Diagnostic::new(
                "nextpage.E003",
                format!("unknown parameter type token {:?}", token),
                url_path,
            ));
        }
    }
}

fn check_duplicate_name(
    diagnostics: &mut Vec<Diagnostic>,
    url_path: &str,
    seen: &mut HashSet<String>,
    name: &str,
) {
    let normalized = normalize_param_name(name);
    if !seen.insert(normalized.clone()) {
        diagnostics.push(Diagnostic::new(
            "nextpage.E005",
            format!("duplicate parameter name {:?}", normalized),
            url_path,
        ));
    }
}

/// Flags route patterns registered by more than one source.
pub fn check_duplicate_routes(entries: &[RouteEntry]) -> Vec<Diagnostic> {
    let mut by_pattern: HashMap<&str, Vec<&RouteEntry>> = HashMap::new();
    for entry in entries {
        by_pattern
            .entry(entry.route.pattern.as_str())
            .or_default()
            .push(entry);
    }

    let mut diagnostics: Vec<Diagnostic> = by_pattern
        .into_iter()
        .filter(|(_, entries)| entries.len() > 1)
        .map(|(pattern, entries)| {
            let sources: Vec<String> = entries
                .iter()
                .map(|e| e.source_file.display().to_string())
                .collect();
            Diagnostic::new(
                "nextpage.E006",
                format!(
                    "route pattern {:?} registered by multiple sources: {}",
                    pattern,
                    sources.join(", ")
                ),
                pattern,
            )
        })
        .collect();
    diagnostics.sort_by(|a, b| a.path.cmp(&b.path));
    diagnostics
}

/// Flags parameter directories that contribute nothing: a directory named
/// by a capture segment with no handler file, no template file, and no
/// subdirectories never yields a route, which is almost always a missing
/// page file.
pub fn check_pages_root(root: &Path, scanner: &PageDirectoryScanner) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if root.is_dir() {
        walk_for_dead_param_dirs(root, "", scanner, &mut diagnostics);
    }
    diagnostics
}

fn walk_for_dead_param_dirs(
    dir: &Path,
    url_path: &str,
    scanner: &PageDirectoryScanner,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut subdirs: Vec<std::path::PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();

    for sub in subdirs {
        let name = sub
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let child_url = if url_path.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", url_path, name)
        };

        let is_param_dir = !matches!(classify_segment(&name), SegmentKind::Static(_));
        if is_param_dir {
            let has_page = sub.join(scanner.page_file()).is_file();
            let has_template = sub.join(scanner.template_file()).is_file();
            let has_subdirs = fs::read_dir(&sub)
                .map(|entries| entries.flatten().any(|e| e.path().is_dir()))
                .unwrap_or(false);
            if !has_page && !has_template && !has_subdirs {
                diagnostics.push(Diagnostic::new(
                    "nextpage.E007",
                    format!("parameter directory {:?} has no page file", name),
                    child_url.clone(),
                ));
            }
        }

        walk_for_dead_param_dirs(&sub, &child_url, scanner, diagnostics);
    }
}

/// Runs every check: URL syntax per entry, duplicate patterns across the
/// table, and dead parameter directories per pages root.
pub fn run_all(
    roots: &[std::path::PathBuf],
    entries: &[RouteEntry],
    scanner: &PageDirectoryScanner,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut checked_paths: HashSet<&str> = HashSet::new();
    for entry in entries {
        if checked_paths.insert(entry.url_path.as_str()) {
            diagnostics.extend(check_url_path(&entry.url_path));
        }
    }

    diagnostics.extend(check_duplicate_routes(entries));

    for root in roots {
        diagnostics.extend(check_pages_root(root, scanner));
    }

    diagnostics
}
