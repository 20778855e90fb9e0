//! Damage detection: classifies a body-damage photo as a dent or a scratch.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::fenced::parse_fenced_json;
use crate::llm_client::LlmClient;
use crate::models::shop::DamageCategory;
use crate::vehicle::heuristics::{classify_damage_reply, heuristic_damage};
use crate::vehicle::prompts::DAMAGE_PROMPT;
use crate::vehicle::AnalysisSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    #[serde(rename = "type")]
    pub damage_type: DamageCategory,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub description: String,
    pub source: AnalysisSource,
}

impl DamageReport {
    /// Reads a model reply defensively. `None` when the damage type is missing or unknown.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let damage_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<DamageCategory>().ok())?;

        Some(DamageReport {
            damage_type,
            confidence: value
                .get("confidence")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            description: value
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            source: AnalysisSource::Model,
        })
    }
}

/// Runs damage detection. Never fails: no key, an upstream error, or an
/// unreadable reply all degrade to a heuristic report.
pub async fn analyze_damage<R: Rng + Send>(
    llm: &LlmClient,
    image_data_uri: &str,
    model: &str,
    rng: &mut R,
) -> DamageReport {
    if !llm.has_credential() {
        info!("No API key configured; using heuristic damage detection");
        return heuristic_damage(rng);
    }

    let reply = match llm.call_vision(DAMAGE_PROMPT, image_data_uri, model).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Damage analysis call failed, falling back to heuristic: {e}");
            return heuristic_damage(rng);
        }
    };

    match parse_fenced_json(&reply) {
        Ok(value) => DamageReport::from_model_value(&value).unwrap_or_else(|| {
            warn!("Damage reply lacks a usable type; classifying by keywords");
            classify_damage_reply(&reply)
        }),
        Err(e) => {
            warn!("Damage reply was not JSON ({e}); classifying by keywords");
            classify_damage_reply(&reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_replying(content: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_from_model_value_reads_fields() {
        let report = DamageReport::from_model_value(&json!({
            "type": "Scratch",
            "confidence": 0.92,
            "description": "Long scratch on rear door"
        }))
        .unwrap();
        assert_eq!(report.damage_type, DamageCategory::Scratch);
        assert!((report.confidence - 0.92).abs() < 1e-9);
        assert_eq!(report.source, AnalysisSource::Model);
    }

    #[test]
    fn test_from_model_value_unknown_type_is_none() {
        assert!(DamageReport::from_model_value(&json!({"type": "rust"})).is_none());
        assert!(DamageReport::from_model_value(&json!({"confidence": 0.5})).is_none());
    }

    #[tokio::test]
    async fn test_fenced_model_reply_is_used() {
        let server =
            server_replying("```json\n{\"type\": \"dent\", \"confidence\": 0.8, \"description\": \"d\"}\n```")
                .await;
        let llm = LlmClient::new(Some("k".into()), server.uri());
        let mut rng = StdRng::seed_from_u64(1);
        let report = analyze_damage(&llm, "data:image/png;base64,AA==", "m", &mut rng).await;
        assert_eq!(report.damage_type, DamageCategory::Dent);
        assert_eq!(report.source, AnalysisSource::Model);
    }

    #[tokio::test]
    async fn test_prose_reply_is_keyword_classified() {
        let server = server_replying("I can see a deep Scratch near the handle.").await;
        let llm = LlmClient::new(Some("k".into()), server.uri());
        let mut rng = StdRng::seed_from_u64(1);
        let report = analyze_damage(&llm, "data:image/png;base64,AA==", "m", &mut rng).await;
        assert_eq!(report.damage_type, DamageCategory::Scratch);
        assert!((report.confidence - 0.7).abs() < 1e-9);
        assert_eq!(report.description, "I can see a deep Scratch near the handle.");
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back_to_heuristic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let llm = LlmClient::new(Some("k".into()), server.uri());
        let mut rng = StdRng::seed_from_u64(7);
        let report = analyze_damage(&llm, "data:image/png;base64,AA==", "m", &mut rng).await;
        assert_eq!(report.source, AnalysisSource::Heuristic);
        assert!((report.confidence - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_key_uses_heuristic() {
        let llm = LlmClient::new(None, "http://localhost:1");
        let mut rng = StdRng::seed_from_u64(3);
        let report = analyze_damage(&llm, "data:image/png;base64,AA==", "m", &mut rng).await;
        assert_eq!(report.source, AnalysisSource::Heuristic);
    }
}
