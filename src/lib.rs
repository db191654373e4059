#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// HTTP surface: router, handlers and error mapping
pub mod api;
/// Configuration module for the application
pub mod config;
/// Bounded repository summaries for the prompt
pub mod context;
/// Error handling types and utilities
pub mod error;
/// Prompt construction and the text-generation backends
pub mod generator;
/// Logging configuration and utilities
pub mod logging;
/// URL validation, working directories and cloning
pub mod repository;
/// The per-request README pipeline
pub mod service;

pub use config::Config;
pub use context::ExtractedContext;
pub use error::{ReadmeError, Result};
pub use generator::{GeminiClient, ReadmeGenerator, TextGenerator};
pub use repository::{validate_repo_url, GitCloner, RepoCloner, Workspace};
pub use service::ReadmeService;
