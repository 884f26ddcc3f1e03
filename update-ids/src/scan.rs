//! Content tree scan: classify every markdown file as marked or pending an ID

use crate::error::{IdsError, Result};
use crate::marker;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A markdown file found during the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// First line carries `<!-- ID: id -->`
    Marked { id: String, rel_path: String },
    /// No marker; queued for identifier assignment
    Unmarked { path: PathBuf, rel_path: String },
}

/// A file waiting for a freshly generated identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub rel_path: String,
}

/// Everything one pass over the tree produced
#[derive(Debug, Default)]
pub struct ScanResult {
    /// ID -> relative path for every marked file
    pub found: BTreeMap<String, String>,
    /// Unmarked files, in traversal order
    pub queue: Vec<PendingFile>,
}

/// Lazily walk `root`, yielding one entry per `.md` file.
///
/// Traversal order is whatever the filesystem enumerates; callers must not depend on it.
pub fn scan_tree(root: &Path) -> impl Iterator<Item = Result<ScanEntry>> + '_ {
    WalkDir::new(root)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let path = entry.path();
                if !is_markdown(path) || !path.is_file() {
                    return None;
                }
                Some(classify(root, path))
            }
            Err(e) => Some(Err(IdsError::from(e))),
        })
}

/// Drain a scan into the found table and the assignment queue
pub fn collect_scan<I>(entries: I) -> Result<ScanResult>
where
    I: IntoIterator<Item = Result<ScanEntry>>,
{
    let mut result = ScanResult::default();

    for entry in entries {
        match entry? {
            ScanEntry::Marked { id, rel_path } => {
                if let Some(previous) = result.found.get(&id) {
                    log::warn!(
                        "[IDS] ID {} appears in both {} and {}; keeping {}",
                        id,
                        previous,
                        rel_path,
                        rel_path
                    );
                }
                result.found.insert(id, rel_path);
            }
            ScanEntry::Unmarked { path, rel_path } => {
                result.queue.push(PendingFile { path, rel_path });
            }
        }
    }

    Ok(result)
}

fn classify(root: &Path, path: &Path) -> Result<ScanEntry> {
    let rel_path = relative_path(root, path);
    Ok(match marker::read_identifier(path)? {
        Some(id) => ScanEntry::Marked { id, rel_path },
        None => ScanEntry::Unmarked {
            path: path.to_path_buf(),
            rel_path,
        },
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map(|e| e == "md").unwrap_or(false)
}

/// Path of `file_path` relative to `root`, `/`-separated
pub fn relative_path(root: &Path, file_path: &Path) -> String {
    let rel = file_path.strip_prefix(root).unwrap_or(file_path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
