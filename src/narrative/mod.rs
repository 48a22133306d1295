//! Narrative generation
//!
//! Free-form text about an analysis comes from an external generator. The
//! engine only prepares its input; this module owns the capability trait,
//! an HTTP implementation, and the fallback used when generation fails.

pub mod http;

pub use http::HttpNarrator;

use crate::analysis::{AnalysisResult, NarrativeInput};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Text in, text out
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}

/// Narrative text and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub text: String,
    /// False when the text is the local fallback
    pub generated: bool,
}

/// Generate a narrative for `result`, falling back to its written insights
///
/// Generator failures are logged and never returned.
pub async fn narrate_or_fallback(
    generator: &dyn NarrativeGenerator,
    input: &NarrativeInput,
    result: &AnalysisResult,
) -> Narrative {
    generate_or(generator, &input.to_prompt(), || fallback_narrative(result)).await
}

/// Run `generator` on `prompt`, using `fallback` on any failure
pub async fn generate_or<F>(
    generator: &dyn NarrativeGenerator,
    prompt: &str,
    fallback: F,
) -> Narrative
where
    F: FnOnce() -> String,
{
    match generator.generate(prompt).await {
        Ok(text) => Narrative { text, generated: true },
        Err(e) => {
            tracing::warn!(error = %e, "Narrative generation failed, using fallback text");
            Narrative {
                text: fallback(),
                generated: false,
            }
        }
    }
}

/// Plain-text narrative assembled from an analysis' insights
pub fn fallback_narrative(result: &AnalysisResult) -> String {
    let mut text = format!(
        "{} was reported on {} of {} journaled days between {} and {}.",
        result.symptom,
        result.symptom_days_count,
        result.symptom_days_count + result.symptom_free_days_count,
        result.range.start,
        result.range.end
    );

    for insight in &result.insights {
        text.push(' ');
        text.push_str(&insight.description);
    }

    text
}

/// Errors from a narrative generator
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Narrative service unavailable")]
    Unavailable,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}
