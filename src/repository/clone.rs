use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;

use crate::config::Config;
use crate::error::{ReadmeError, Result};

/// Shallow-clones a repository into an existing, empty directory.
#[async_trait]
pub trait RepoCloner: Send + Sync {
    /// Clones the latest snapshot of `url` into `dest`.
    ///
    /// Any failure (bad URL, network, private or missing repository, timeout)
    /// is a [`ReadmeError::Clone`].
    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Runs `git clone --depth 1` as a child process
#[derive(Debug, Clone)]
pub struct GitCloner {
    git_binary: String,
    timeout: Duration,
}

impl GitCloner {
    /// Creates a cloner using `git_binary` with the given timeout
    pub fn new(git_binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            git_binary: git_binary.into(),
            timeout,
        }
    }

    /// Creates a cloner from the `[clone]` config section
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.clone.git_binary.clone(), config.clone_timeout())
    }
}

#[async_trait]
impl RepoCloner for GitCloner {
    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Running {} clone --depth 1 {}", self.git_binary, url);

        let child = Command::new(&self.git_binary)
            .args(["clone", "--depth", "1", "--quiet", "--", url])
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReadmeError::Clone(format!("failed to run {}: {}", self.git_binary, e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| ReadmeError::Clone(format!("failed to wait for git: {}", e)))?,
            Err(_) => {
                warn!("git clone of {} timed out after {:?}", url, self.timeout);
                return Err(ReadmeError::Clone(format!(
                    "git clone timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReadmeError::Clone(format!(
                "git clone exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
