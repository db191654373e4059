//! Context extraction
//!
//! Turns a freshly cloned repository into a bounded blob of text for the model:
//! a depth-first file listing followed by the contents of a few priority key
//! files, never longer than [`ExtractionLimits::max_context_chars`].

use std::fmt;

mod extractor;
mod listing;

pub use crate::config::ExtractionLimits;
pub use extractor::{extract, select_key_files, truncate_to_char_boundary, NO_KEY_FILES_NOTE};
pub use listing::{list_files, FileListing};

/// The text handed to the prompt builder, plus what went into it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContext {
    /// Assembled context text; `text.len()` never exceeds the configured budget
    pub text: String,
    /// Paths in the file listing, relative to the repository root
    pub listed_files: Vec<String>,
    /// Number of files seen by the walk, including those past the listing cap
    pub total_files: usize,
    /// Files seen but left out of the listing
    pub omitted_files: usize,
    /// Key files whose contents were included, in priority order
    pub key_files_read: Vec<String>,
    /// True when anything was cut to stay under the budget
    pub truncated: bool,
}

impl ExtractedContext {
    /// Context text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the context text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True when the context text is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when at least one key file made it into the context
    pub fn has_key_files(&self) -> bool {
        !self.key_files_read.is_empty()
    }
}

impl fmt::Display for ExtractedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
