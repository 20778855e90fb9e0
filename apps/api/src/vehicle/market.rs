//! Market price estimation from a photo plus brand, model year and mileage.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::fenced::parse_fenced_json;
use crate::llm_client::LlmClient;
use crate::vehicle::heuristics::heuristic_price;
use crate::vehicle::prompts::market_prompt;
use crate::vehicle::AnalysisSource;

pub const MIN_MODEL_YEAR: i32 = 1990;
pub const MAX_MILEAGE_KM: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl VehicleCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleCondition::Excellent => "excellent",
            VehicleCondition::Good => "good",
            VehicleCondition::Fair => "fair",
            VehicleCondition::Poor => "poor",
        }
    }
}

impl FromStr for VehicleCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(VehicleCondition::Excellent),
            "good" => Ok(VehicleCondition::Good),
            "fair" => Ok(VehicleCondition::Fair),
            "poor" => Ok(VehicleCondition::Poor),
            _ => Err(()),
        }
    }
}

/// What the owner told us about the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleContext {
    pub brand: String,
    pub model_year: Option<i32>,
    pub mileage: Option<u32>,
}

impl VehicleContext {
    /// Checks the form values against the accepted ranges.
    pub fn validated(
        brand: Option<&str>,
        model_year: Option<i32>,
        mileage: Option<u32>,
        current_year: i32,
    ) -> Result<Self, AppError> {
        let brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AppError::Validation("Please select a vehicle brand.".into()))?;

        if let Some(year) = model_year {
            if !(MIN_MODEL_YEAR..=current_year).contains(&year) {
                return Err(AppError::Validation(format!(
                    "Model year must be between {MIN_MODEL_YEAR} and {current_year}."
                )));
            }
        }
        if let Some(km) = mileage {
            if km > MAX_MILEAGE_KM {
                return Err(AppError::Validation(format!(
                    "Mileage must be between 0 and {MAX_MILEAGE_KM} km."
                )));
            }
        }

        Ok(VehicleContext {
            brand: brand.to_string(),
            model_year,
            mileage,
        })
    }

    /// "Brand: Toyota, Model Year: 2018, Mileage: 42000 km", omitting unknown parts.
    pub fn context_line(&self) -> String {
        let mut line = format!("Brand: {}", self.brand);
        if let Some(year) = self.model_year {
            line.push_str(&format!(", Model Year: {year}"));
        }
        if let Some(km) = self.mileage {
            line.push_str(&format!(", Mileage: {km} km"));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub estimated_price: f64,
    pub price_range_min: f64,
    pub price_range_max: f64,
    pub condition: VehicleCondition,
    pub factors: Vec<String>,
    pub description: String,
    pub source: AnalysisSource,
}

impl PriceEstimate {
    /// `None` when the reply has no usable price or condition.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let estimated_price = value.get("estimated_price").and_then(|v| v.as_f64())?;
        let condition = value
            .get("condition")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<VehicleCondition>().ok())?;

        let price_range_min = value
            .get("price_range_min")
            .and_then(|v| v.as_f64())
            .unwrap_or(estimated_price);
        let price_range_max = value
            .get("price_range_max")
            .and_then(|v| v.as_f64())
            .unwrap_or(estimated_price);

        Some(PriceEstimate {
            estimated_price,
            price_range_min,
            price_range_max,
            condition,
            factors: value
                .get("factors")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|f| f.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
            description: value
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            source: AnalysisSource::Model,
        })
    }

    pub fn advice(&self) -> &'static [&'static str] {
        match self.condition {
            VehicleCondition::Excellent => &[
                "Consider getting a professional inspection for maximum value",
                "Maintain service records to justify premium pricing",
                "Market timing is favorable for selling",
            ],
            VehicleCondition::Good => &[
                "Minor improvements could increase value by 5-10%",
                "Clean and detail the vehicle before selling",
                "Consider getting a pre-sale inspection",
            ],
            VehicleCondition::Fair | VehicleCondition::Poor => &[
                "Consider repairs if cost is less than value increase",
                "Be transparent about condition when selling",
                "Price competitively based on condition",
            ],
        }
    }
}

pub async fn estimate_price<R: Rng + Send>(
    llm: &LlmClient,
    image_data_uri: &str,
    vehicle: &VehicleContext,
    model: &str,
    current_year: i32,
    rng: &mut R,
) -> PriceEstimate {
    if !llm.has_credential() {
        info!("No API key configured; using heuristic price for {}", vehicle.brand);
        return heuristic_price(rng, vehicle, current_year);
    }

    let prompt = market_prompt(&vehicle.context_line());
    let reply = match llm.call_vision(&prompt, image_data_uri, model).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Price estimation call failed, falling back to heuristic: {e}");
            return heuristic_price(rng, vehicle, current_year);
        }
    };

    match parse_fenced_json(&reply) {
        Ok(value) => PriceEstimate::from_model_value(&value).unwrap_or_else(|| {
            warn!("Price reply lacks price or condition; using heuristic");
            heuristic_price(rng, vehicle, current_year)
        }),
        Err(e) => {
            warn!("Price reply was not JSON ({e}); using heuristic");
            heuristic_price(rng, vehicle, current_year)
        }
    }
}
