//! Application analysis: one structured model call per CV / job-description pair.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::prompts::APPLICATION_ANALYSIS_SYSTEM;
use crate::llm_client::{LlmClient, LlmError, DEFAULT_TEMPERATURE};

/// Models the assistant may be asked to use. The first one is the default.
pub const ALLOWED_MODELS: &[&str] = &[
    "openai/gpt-4.1-mini",
    "openai/gpt-4.1",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-sonnet",
];

pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

/// Validates a requested model identifier, falling back to the default when absent.
pub fn resolve_model(requested: Option<&str>) -> Result<&'static str, AppError> {
    match requested {
        None => Ok(DEFAULT_MODEL),
        Some(model) => ALLOWED_MODELS
            .iter()
            .find(|m| **m == model)
            .copied()
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unsupported model '{model}'. Choose one of: {}",
                    ALLOWED_MODELS.join(", ")
                ))
            }),
    }
}

/// The texts sent to the model. Built once per request and dropped after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
    pub cv: String,
    pub job_description: String,
    pub skills: String,
}

impl ApplicationInput {
    /// Picks pasted text over extracted file text, and rejects a missing CV or job description.
    pub fn resolve(
        cv_file_text: Option<String>,
        cv_manual: Option<&str>,
        jd_file_text: Option<String>,
        jd_manual: Option<&str>,
        skills: Option<&str>,
    ) -> Result<Self, AppError> {
        let cv = pick_text(cv_manual, cv_file_text)
            .ok_or_else(|| AppError::Validation("Please upload a CV or paste your CV text.".into()))?;
        let job_description = pick_text(jd_manual, jd_file_text).ok_or_else(|| {
            AppError::Validation("Please upload a job description or paste it.".into())
        })?;

        Ok(ApplicationInput {
            cv,
            job_description,
            skills: skills.unwrap_or_default().trim().to_string(),
        })
    }

    pub fn to_payload(&self) -> Value {
        json!({
            "cv": self.cv,
            "job_description": self.job_description,
            "skills": self.skills,
        })
    }
}

fn pick_text(manual: Option<&str>, from_file: Option<String>) -> Option<String> {
    manual
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| from_file.filter(|s| !s.trim().is_empty()))
}

/// Decoded analysis. Every field is optional on the wire and defaults when missing
/// or `null`; a present field of the wrong type is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationAnalysis {
    #[serde(deserialize_with = "score")]
    pub ats_score: Option<u32>,
    #[serde(deserialize_with = "string_or_lines")]
    pub ats_feedback: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skill_gaps: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub improved_cv: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_letter: String,
}

impl ApplicationAnalysis {
    pub fn from_value(value: Value) -> Result<Self, LlmError> {
        let raw = value.to_string();
        serde_json::from_value(value).map_err(|_| LlmError::MalformedResponse { raw })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number, rounded and clamped to 0..=100.
fn score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u32))
}

/// Accepts either a string or a list of strings (joined one per line).
fn string_or_lines<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Feedback {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match Option::<Feedback>::deserialize(deserializer)? {
        Some(Feedback::Text(text)) => text,
        Some(Feedback::Lines(lines)) => lines.join("\n"),
        None => String::new(),
    })
}

/// Sends the application to the model and decodes the result.
pub async fn analyze_application(
    llm: &LlmClient,
    input: &ApplicationInput,
    model: &str,
) -> Result<ApplicationAnalysis, AppError> {
    info!(
        "Analyzing application with {} (cv={} chars, jd={} chars)",
        model,
        input.cv.len(),
        input.job_description.len()
    );

    let value = llm
        .call_json(
            APPLICATION_ANALYSIS_SYSTEM,
            &input.to_payload(),
            model,
            Some(DEFAULT_TEMPERATURE),
        )
        .await?;

    let analysis = ApplicationAnalysis::from_value(value)?;
    info!(
        "Analysis complete: ats_score={:?}, skill_gaps={}",
        analysis.ats_score,
        analysis.skill_gaps.len()
    );
    Ok(analysis)
}
