//! Tire analysis: condition tier, tread depth, remaining life and safe distance.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::fenced::parse_fenced_json;
use crate::llm_client::LlmClient;
use crate::vehicle::heuristics::heuristic_tire;
use crate::vehicle::prompts::TIRE_PROMPT;
use crate::vehicle::AnalysisSource;

/// Remaining-life threshold (percent) below which replacement is recommended.
pub const REPLACEMENT_LIFE_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TireCondition {
    Good,
    Fair,
    Poor,
}

impl TireCondition {
    pub const ALL: [TireCondition; 3] = [TireCondition::Good, TireCondition::Fair, TireCondition::Poor];

    pub fn as_str(self) -> &'static str {
        match self {
            TireCondition::Good => "good",
            TireCondition::Fair => "fair",
            TireCondition::Poor => "poor",
        }
    }
}

impl FromStr for TireCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(TireCondition::Good),
            "fair" => Ok(TireCondition::Fair),
            "poor" => Ok(TireCondition::Poor),
            _ => Err(()),
        }
    }
}

/// Replacement rule: the worst tier, or remaining life under the threshold.
pub fn replacement_recommended(condition: TireCondition, remaining_life_percent: f64) -> bool {
    condition == TireCondition::Poor || remaining_life_percent < REPLACEMENT_LIFE_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireReport {
    pub condition: TireCondition,
    pub tread_depth_mm: f64,
    pub remaining_life_percent: f64,
    pub estimated_distance_km: f64,
    pub change_recommended: bool,
    pub description: String,
    pub source: AnalysisSource,
}

impl TireReport {
    /// Reads a model reply defensively. `None` when the condition is missing or unknown.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let condition = value
            .get("condition")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<TireCondition>().ok())?;
        let reported = |key: &str| value.get(key).and_then(|v| v.as_f64());
        let number = |key: &str| reported(key).unwrap_or(0.0);

        let remaining_life = reported("remaining_life_percent").map(|p| p.clamp(0.0, 100.0));
        let change_recommended = value
            .get("change_recommended")
            .and_then(|v| v.as_bool())
            .unwrap_or_else(|| match remaining_life {
                Some(percent) => replacement_recommended(condition, percent),
                None => condition == TireCondition::Poor,
            });
        let remaining_life_percent = remaining_life.unwrap_or(0.0);

        Some(TireReport {
            condition,
            tread_depth_mm: number("tread_depth_mm"),
            remaining_life_percent,
            estimated_distance_km: number("estimated_distance_km"),
            change_recommended,
            description: value
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            source: AnalysisSource::Model,
        })
    }

    /// Fixed maintenance advice shown alongside the report.
    pub fn advice(&self) -> &'static [&'static str] {
        if self.change_recommended {
            &[
                "Your tire condition is poor or below safe threshold",
                "Replace immediately for safety",
                "Estimated cost: $80 - $200 per tire",
            ]
        } else if self.condition == TireCondition::Fair {
            &[
                "Tire is in fair condition",
                "Plan for replacement within next 5,000-10,000 km",
                "Regular inspections recommended",
            ]
        } else {
            &[
                "Continue regular maintenance",
                "Check tire pressure monthly",
                "Rotate tires every 10,000 km",
            ]
        }
    }
}

/// Runs tire analysis; any failure degrades to the heuristic generator.
pub async fn analyze_tire<R: Rng + Send>(
    llm: &LlmClient,
    image_data_uri: &str,
    model: &str,
    rng: &mut R,
) -> TireReport {
    if !llm.has_credential() {
        info!("No API key configured; using heuristic tire analysis");
        return heuristic_tire(rng);
    }

    let reply = match llm.call_vision(TIRE_PROMPT, image_data_uri, model).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Tire analysis call failed, falling back to heuristic: {e}");
            return heuristic_tire(rng);
        }
    };

    match parse_fenced_json(&reply) {
        Ok(value) => TireReport::from_model_value(&value).unwrap_or_else(|| {
            warn!("Tire reply lacks a usable condition; using heuristic");
            heuristic_tire(rng)
        }),
        Err(e) => {
            warn!("Tire reply was not JSON ({e}); using heuristic");
            heuristic_tire(rng)
        }
    }
}
