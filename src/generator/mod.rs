//! Prompt/response adapter
//!
//! Wraps extracted repository context in the README prompt, submits it to a
//! [`TextGenerator`] and turns the answer into plain text or an error that
//! carries the provider's feedback.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::context::ExtractedContext;
use crate::error::{ReadmeError, Result};

/// Google Gemini `generateContent` client
pub mod gemini;
/// README prompt template
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::build_readme_prompt;

/// Harm categories the generation request filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment content
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech content
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
}

/// Blocking threshold for a harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    /// Block when the probability is medium or high
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
}

/// One safety filter sent with the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Category the threshold applies to
    pub category: HarmCategory,
    /// Threshold at which content is blocked
    pub threshold: HarmBlockThreshold,
}

/// Moderate filtering: medium-and-above harassment and hate speech are blocked.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    vec![
        SafetySetting {
            category: HarmCategory::Harassment,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        },
        SafetySetting {
            category: HarmCategory::HateSpeech,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        },
    ]
}

/// A single prompt submission
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Safety filters applied by the provider
    pub safety_settings: Vec<SafetySetting>,
}

/// Provider answer: zero or more candidates plus optional prompt feedback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Generated candidates, best first
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback on the prompt itself, present when it was blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One generated candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when the candidate was filtered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Why generation stopped, e.g. `STOP` or `SAFETY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Per-category safety ratings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

/// Candidate content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content parts; only text parts are used
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Author role, `model` for generated content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// One content part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Text of the part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Safety rating reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyRating {
    /// Harm category, as reported
    pub category: String,
    /// Probability bucket, as reported
    pub probability: String,
    /// Whether this rating caused the block
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

/// Feedback on a blocked prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    /// Per-category safety ratings for the prompt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

impl Candidate {
    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Text generation capability: send a prompt, get candidates or feedback back.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submits one request. Transport failures are errors; a blocked or empty
    /// answer is a normal response.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockedFeedback<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_ratings: Option<&'a [SafetyRating]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_feedback: Option<&'a PromptFeedback>,
    candidate_count: usize,
}

/// Extracts the README text from a provider response.
///
/// The first candidate's text is returned unmodified when it is non-empty.
/// Otherwise the finish reason and safety feedback are serialized verbatim
/// into a [`ReadmeError::GenerationBlocked`].
pub fn unwrap_response(response: &GenerationResponse) -> Result<String> {
    let first = response.candidates.first();

    if let Some(candidate) = first {
        let text = candidate.text();
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let feedback = BlockedFeedback {
        finish_reason: first.and_then(|c| c.finish_reason.as_deref()),
        safety_ratings: first
            .map(|c| c.safety_ratings.as_slice())
            .filter(|r| !r.is_empty()),
        prompt_feedback: response.prompt_feedback.as_ref(),
        candidate_count: response.candidates.len(),
    };
    let feedback = serde_json::to_string(&feedback)?;
    warn!("Model returned no usable text: {}", feedback);
    Err(ReadmeError::GenerationBlocked(feedback))
}

/// Generates README text for a repository from its extracted context
#[derive(Clone)]
pub struct ReadmeGenerator {
    backend: Arc<dyn TextGenerator>,
    safety_settings: Vec<SafetySetting>,
}

impl ReadmeGenerator {
    /// Creates a generator using the default safety settings
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend,
            safety_settings: default_safety_settings(),
        }
    }

    /// Builds the prompt, makes a single generation call and unwraps the answer.
    ///
    /// Never retries.
    pub async fn generate_readme(&self, repo_url: &str, context: &ExtractedContext) -> Result<String> {
        let request = GenerationRequest {
            prompt: build_readme_prompt(repo_url, context.as_str()),
            safety_settings: self.safety_settings.clone(),
        };
        debug!(
            "Submitting {} byte prompt to {}",
            request.prompt.len(),
            self.backend.name()
        );

        let response = self.backend.generate(&request).await?;
        let readme = unwrap_response(&response)?;
        info!("Generated {} bytes of README text for {}", readme.len(), repo_url);
        Ok(readme)
    }
}
