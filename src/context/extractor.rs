use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::listing::{list_files, FileListing};
use super::ExtractedContext;
use crate::config::ExtractionLimits;
use crate::error::Result;

/// Appended when no key file could be read, so "no context" is detectable downstream.
pub const NO_KEY_FILES_NOTE: &str = "\n(no key files could be read)\n";

const LISTING_HEADER: &str = "Repository file structure";

/// Append-only text buffer that refuses writes past its limit.
///
/// Space held by [`ContextBuffer::reserve`] is not available to `push` until
/// it is released.
struct ContextBuffer {
    text: String,
    limit: usize,
    reserved: usize,
}

impl ContextBuffer {
    fn new(limit: usize) -> Self {
        Self {
            text: String::with_capacity(limit.min(64 * 1024)),
            limit,
            reserved: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.limit
            .saturating_sub(self.text.len())
            .saturating_sub(self.reserved)
    }

    fn reserve(&mut self, len: usize) {
        self.reserved = len;
    }

    fn release(&mut self) {
        self.reserved = 0;
    }

    /// Appends `chunk` only if the whole chunk fits.
    fn push(&mut self, chunk: &str) -> bool {
        if chunk.len() > self.remaining() {
            return false;
        }
        self.text.push_str(chunk);
        true
    }
}

fn wrap_file(path: &str, body: &str) -> String {
    format!("\n--- File: {} ---\n{}\n--- End of {} ---\n", path, body, path)
}

fn wrapper_len(path: &str) -> usize {
    wrap_file(path, "").len()
}

/// Returns the longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub fn truncate_to_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Picks, for each key name in order, the first listed path ending with it
/// (case-insensitive). A path is selected at most once.
pub fn select_key_files(paths: &[String], key_files: &[String]) -> Vec<String> {
    let lowered: Vec<String> = paths.iter().map(|p| p.to_lowercase()).collect();
    let mut selected: Vec<String> = Vec::new();

    for name in key_files {
        let needle = name.to_lowercase();
        let hit = lowered
            .iter()
            .zip(paths)
            .find(|(lower, original)| lower.ends_with(&needle) && !selected.contains(*original));
        if let Some((_, original)) = hit {
            selected.push(original.clone());
        }
    }

    selected
}

fn listing_header(shown: usize) -> String {
    format!("{} ({} files listed):\n", LISTING_HEADER, shown)
}

/// Renders the header and as many path lines as fit. The header counts only
/// the lines that were actually written.
fn render_listing(buffer: &mut ContextBuffer, listing: &FileListing) -> bool {
    let mut room = buffer
        .remaining()
        .saturating_sub(listing_header(listing.paths.len()).len());
    let mut lines = String::new();
    let mut shown = 0;
    let mut truncated = false;

    for path in &listing.paths {
        let line = format!("{}\n", path);
        if line.len() <= room {
            room -= line.len();
            lines.push_str(&line);
            shown += 1;
        } else {
            truncated = true;
        }
    }

    if !buffer.push(&listing_header(shown)) {
        truncated = true;
    }
    buffer.push(&lines);

    let omitted = listing.omitted();
    if omitted > 0 {
        let note = if listing.scan_truncated {
            format!("... and more than {} other files (scan stopped early)\n", omitted)
        } else {
            format!("... and {} more files\n", omitted)
        };
        if !buffer.push(&note) {
            truncated = true;
        }
    }

    truncated
}

/// Builds the bounded context for the repository checked out at `root`.
///
/// Fails only when the walk of `root` fails. Running out of budget truncates;
/// oversized, non-regular or unreadable key files are skipped.
pub fn extract(root: &Path, limits: &ExtractionLimits) -> Result<ExtractedContext> {
    let listing = list_files(root, limits)?;
    let mut buffer = ContextBuffer::new(limits.max_context_chars);

    // Whatever the listing leaves, the placeholder must still fit.
    buffer.reserve(NO_KEY_FILES_NOTE.len());
    let mut truncated = render_listing(&mut buffer, &listing);
    buffer.release();

    let mut key_files_read = Vec::new();

    for rel in select_key_files(&listing.paths, &limits.key_files) {
        if key_files_read.len() >= limits.max_key_files {
            break;
        }

        let overhead = wrapper_len(&rel);
        if buffer.remaining() <= overhead {
            debug!("Context budget exhausted before {}", rel);
            truncated = true;
            break;
        }

        let full_path = root.join(&rel);
        let metadata = match fs::symlink_metadata(&full_path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping key file {}: {}", rel, e);
                continue;
            }
        };
        if !metadata.is_file() {
            debug!("Skipping key file {}: not a regular file", rel);
            continue;
        }
        if metadata.len() > limits.max_file_bytes {
            info!(
                "Skipping key file {}: {} bytes exceeds the {} byte limit",
                rel,
                metadata.len(),
                limits.max_file_bytes
            );
            continue;
        }

        let content = match fs::read_to_string(&full_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping key file {}: {}", rel, e);
                continue;
            }
        };

        let slice = truncate_to_char_boundary(&content, buffer.remaining() - overhead);
        if slice.is_empty() && !content.is_empty() {
            debug!("Context budget exhausted inside {}", rel);
            truncated = true;
            break;
        }
        if slice.len() < content.len() {
            truncated = true;
        }
        if buffer.push(&wrap_file(&rel, slice)) {
            key_files_read.push(rel);
        }
    }

    if key_files_read.is_empty() && !buffer.push(NO_KEY_FILES_NOTE) {
        truncated = true;
    }

    Ok(ExtractedContext {
        text: buffer.text,
        omitted_files: listing.omitted(),
        total_files: listing.total_files,
        listed_files: listing.paths,
        key_files_read,
        truncated,
    })
}
