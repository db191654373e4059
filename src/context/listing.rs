use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ExtractionLimits;
use crate::error::Result;

/// Result of walking a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    /// Relative, forward-slash separated paths in depth-first order
    pub paths: Vec<String>,
    /// Files seen by the walk, listed or not
    pub total_files: usize,
    /// True when the walk stopped at the scan ceiling with files still unvisited
    pub scan_truncated: bool,
}

impl FileListing {
    /// Number of files seen but not kept in `paths`
    pub fn omitted(&self) -> usize {
        self.total_files.saturating_sub(self.paths.len())
    }
}

/// Files before directories, then by name, so root manifests are listed first.
fn walk_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walks `root` depth-first and collects up to `max_listed_files` paths.
///
/// Ignored directories are pruned before they are entered. Symbolic links are
/// listed but never followed. Once the listing is full the walk keeps counting
/// files without storing them, and stops for good at `max_scanned_entries`.
///
/// Only a failure on the root itself is an error; unreadable entries further
/// down are logged and skipped.
pub fn list_files(root: &Path, limits: &ExtractionLimits) -> Result<FileListing> {
    let metadata = fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", root.display()),
        )
        .into());
    }

    let mut listing = FileListing::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(walk_order)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && limits.is_ignored_dir(&e.file_name().to_string_lossy()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unknown path".to_string());
                warn!("Skipping (walk error): {} - {}", path_str, e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        if listing.total_files >= limits.max_scanned_entries {
            listing.scan_truncated = true;
            break;
        }
        listing.total_files += 1;

        if listing.paths.len() < limits.max_listed_files {
            listing.paths.push(relative_path(root, entry.path()));
        }
    }

    debug!(
        "Listed {} of {} files under {}{}",
        listing.paths.len(),
        listing.total_files,
        root.display(),
        if listing.scan_truncated { " (scan ceiling reached)" } else { "" }
    );

    Ok(listing)
}
