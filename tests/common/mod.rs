#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use readmesmith::{
    api::{self, AppState},
    error::{ReadmeError, Result},
    generator::{Candidate, Content, GenerationRequest, GenerationResponse, Part, TextGenerator},
    Config, ReadmeService, RepoCloner,
};
use tempfile::TempDir;

pub mod test_helpers {
    use super::*;

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    /// Config whose working directories live under `temp_root`
    pub fn create_test_config(temp_root: &Path) -> Config {
        let mut config = Config::default();
        config.clone.temp_root = Some(temp_root.to_path_buf());
        config
    }

    pub fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    pub fn text_response(text: &str) -> GenerationResponse {
        GenerationResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: Some(text.to_string()),
                    }],
                    role: Some("model".to_string()),
                }),
                finish_reason: Some("STOP".to_string()),
                safety_ratings: Vec::new(),
            }],
            prompt_feedback: None,
        }
    }
}

/// Writes a fixed set of files instead of cloning, optionally failing afterwards
pub struct StubCloner {
    files: Vec<(String, String)>,
    fail_with: Option<String>,
    calls: AtomicUsize,
    seen_dest: Mutex<Option<PathBuf>>,
}

impl StubCloner {
    pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            fail_with: None,
            calls: AtomicUsize::new(0),
            seen_dest: Mutex::new(None),
        })
    }

    /// Leaves a partial checkout behind, then fails
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            files: vec![(".git/HEAD".to_string(), "ref: refs/heads/main\n".to_string())],
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
            seen_dest: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_dest(&self) -> Option<PathBuf> {
        self.seen_dest.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoCloner for StubCloner {
    async fn clone_shallow(&self, _url: &str, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_dest.lock().unwrap() = Some(dest.to_path_buf());
        for (path, content) in &self.files {
            let full = dest.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }
        match &self.fail_with {
            Some(message) => Err(ReadmeError::Clone(message.clone())),
            None => Ok(()),
        }
    }
}

/// Returns a canned response and records every prompt
pub struct StubGenerator {
    response: GenerationResponse,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new(response: GenerationResponse) -> Arc<Self> {
        Arc::new(Self {
            response,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Everything a test needs to drive the router and inspect side effects
pub struct TestApp {
    pub router: axum::Router,
    pub cloner: Arc<StubCloner>,
    pub generator: Option<Arc<StubGenerator>>,
    pub temp_root: TempDir,
}

pub fn build_app(cloner: Arc<StubCloner>, generator: Option<Arc<StubGenerator>>) -> TestApp {
    test_helpers::setup_test_logger();
    let temp_root = TempDir::new().unwrap();
    let config = test_helpers::create_test_config(temp_root.path());
    let service = ReadmeService::new(
        config,
        cloner.clone(),
        generator.clone().map(|g| g as Arc<dyn TextGenerator>),
    );
    TestApp {
        router: api::router(AppState::new(service)),
        cloner,
        generator,
        temp_root,
    }
}
