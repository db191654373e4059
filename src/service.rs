//! Per-request README pipeline: validate → clone → extract → prompt → generate.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::config::{env_manager, Config};
use crate::context::{extract, ExtractedContext};
use crate::error::{ReadmeError, Result};
use crate::generator::{GeminiClient, ReadmeGenerator, TextGenerator};
use crate::repository::{validate_repo_url, GitCloner, RepoCloner, Workspace};

/// Runs the README pipeline. Holds no per-request state, so one instance is
/// shared by every request.
#[derive(Clone)]
pub struct ReadmeService {
    config: Arc<Config>,
    cloner: Arc<dyn RepoCloner>,
    generator: Option<ReadmeGenerator>,
}

impl ReadmeService {
    /// Creates a service from explicit collaborators.
    ///
    /// `generator` is `None` when no model credential is configured; every
    /// generation request then fails with [`ReadmeError::Config`].
    pub fn new(
        config: Config,
        cloner: Arc<dyn RepoCloner>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cloner,
            generator: generator.map(ReadmeGenerator::new),
        }
    }

    /// Wires `git` and the Gemini client from `config`.
    ///
    /// A missing API key is not an error here; it is reported per request.
    pub fn from_config(config: Config) -> Result<Self> {
        let cloner: Arc<dyn RepoCloner> = Arc::new(GitCloner::from_config(&config));
        let generator: Option<Arc<dyn TextGenerator>> = if config.api_keys.has_gemini_key() {
            Some(Arc::new(GeminiClient::from_config(&config)?))
        } else {
            None
        };
        Ok(Self::new(config, cloner, generator))
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// True when a text generator is available
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    fn generator(&self) -> Result<&ReadmeGenerator> {
        self.generator.as_ref().ok_or_else(|| {
            ReadmeError::Config(format!(
                "{} is not set; README generation is unavailable",
                env_manager::GEMINI_API_KEY_VAR
            ))
        })
    }

    /// Generates a README for the repository at `repo_url`.
    ///
    /// Configuration and input are checked before anything touches the
    /// filesystem. The working directory is removed on every exit path.
    pub async fn generate(&self, repo_url: &str) -> Result<String> {
        let generator = self.generator()?;
        let url = validate_repo_url(repo_url)?;

        let workspace = self.create_workspace().await?;
        let result = async {
            let context = self.clone_and_extract(url.as_str(), workspace.path()).await?;
            generator.generate_readme(url.as_str(), &context).await
        }
        .await;
        release_workspace(workspace).await;

        result
    }

    /// Clones and extracts without calling the model.
    pub async fn context_for(&self, repo_url: &str) -> Result<ExtractedContext> {
        let url = validate_repo_url(repo_url)?;

        let workspace = self.create_workspace().await?;
        let result = self.clone_and_extract(url.as_str(), workspace.path()).await;
        release_workspace(workspace).await;

        result
    }

    async fn create_workspace(&self) -> Result<Workspace> {
        let parent = self.config.temp_root();
        tokio::task::spawn_blocking(move || Workspace::create(&parent))
            .await
            .map_err(|e| ReadmeError::Internal(format!("workspace setup task failed: {}", e)))?
    }

    async fn clone_and_extract(&self, url: &str, checkout: &Path) -> Result<ExtractedContext> {
        info!("Cloning {} into {}", url, checkout.display());
        self.cloner.clone_shallow(url, checkout).await?;

        let context = self.extract_context(checkout).await?;
        info!(
            "Extracted {} bytes of context from {} ({} listed, {} omitted, key files: [{}])",
            context.len(),
            url,
            context.listed_files.len(),
            context.omitted_files,
            context.key_files_read.join(", ")
        );
        Ok(context)
    }

    /// Runs the blocking extractor on tokio's blocking pool and waits for it.
    pub async fn extract_context(&self, root: &Path) -> Result<ExtractedContext> {
        let limits = self.config.extraction.clone();
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || extract(&root, &limits))
            .await
            .map_err(|e| ReadmeError::Internal(format!("context extraction task failed: {}", e)))?
    }
}

/// Removes the working directory on the blocking pool. Failures are logged only.
async fn release_workspace(workspace: Workspace) {
    if let Err(e) = tokio::task::spawn_blocking(move || workspace.close()).await {
        warn!("Working directory cleanup task failed: {}", e);
    }
}
