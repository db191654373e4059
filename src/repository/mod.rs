//! Repository acquisition: URL validation, the per-request working
//! directory and the shallow clone.

use url::Url;

use crate::error::{ReadmeError, Result};

/// Shallow clone through the `git` CLI
pub mod clone;
/// Per-request scratch directory
pub mod workspace;

pub use clone::{GitCloner, RepoCloner};
pub use workspace::Workspace;

/// Validates user input as a public repository URL.
///
/// Surrounding whitespace is ignored. Only `http` and `https` URLs with a host
/// and without embedded credentials are accepted.
pub fn validate_repo_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReadmeError::Validation("repoUrl must not be empty".into()));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        ReadmeError::Validation(format!("'{}' is not a valid URL: {}", trimmed, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ReadmeError::Validation(format!(
                "unsupported URL scheme '{}'; use http or https",
                other
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ReadmeError::Validation(format!("'{}' has no host", trimmed)));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(ReadmeError::Validation(
            "URLs with embedded credentials are not supported; only public repositories can be cloned"
                .into(),
        ));
    }

    Ok(url)
}
