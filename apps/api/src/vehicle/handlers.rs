//! Axum route handlers for the vehicle inspection pages.

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{Datelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::shop::ShopRecommendation;
use crate::state::AppState;
use crate::uploads::{FormFields, Upload};
use crate::vehicle::damage::{analyze_damage, DamageReport};
use crate::vehicle::images::to_png_data_uri;
use crate::vehicle::market::{estimate_price, PriceEstimate, VehicleContext};
use crate::vehicle::tire::{analyze_tire, TireReport};

const IMAGE_FIELD: &str = "image";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DamageResponse {
    #[serde(flatten)]
    pub report: DamageReport,
    pub recommended_shops: Vec<ShopRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct TireResponse {
    #[serde(flatten)]
    pub report: TireReport,
    pub advice: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    #[serde(flatten)]
    pub estimate: PriceEstimate,
    pub advice: &'static [&'static str],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/vehicle/damage
///
/// Multipart field: `image`. Returns the damage report and the best-rated
/// shops repairing that kind of damage.
pub async fn handle_damage(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DamageResponse>, AppError> {
    let form = FormFields::read(multipart).await?;
    let data_uri = encode_image(form.file(IMAGE_FIELD)).await?;

    let mut rng = StdRng::from_entropy();
    let report = analyze_damage(&state.llm, &data_uri, &state.config.vision_model, &mut rng).await;

    let recommended_shops = state
        .registry
        .recommend(report.damage_type)
        .await
        .iter()
        .map(|shop| ShopRecommendation::from_record(shop, report.damage_type))
        .collect::<Vec<_>>();

    info!(
        "Damage analysis: {} ({:?}), {} shops recommended",
        report.damage_type,
        report.source,
        recommended_shops.len()
    );
    Ok(Json(DamageResponse {
        report,
        recommended_shops,
    }))
}

/// POST /api/v1/vehicle/tire
pub async fn handle_tire(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TireResponse>, AppError> {
    let form = FormFields::read(multipart).await?;
    let data_uri = encode_image(form.file(IMAGE_FIELD)).await?;

    let mut rng = StdRng::from_entropy();
    let report = analyze_tire(&state.llm, &data_uri, &state.config.vision_model, &mut rng).await;

    info!(
        "Tire analysis: {} ({:?}), change_recommended={}",
        report.condition.as_str(),
        report.source,
        report.change_recommended
    );
    let advice = report.advice();
    Ok(Json(TireResponse { report, advice }))
}

/// POST /api/v1/vehicle/price
///
/// Multipart fields: `image`, `brand`, `model_year?`, `mileage?`.
/// The form is validated before the image is decoded.
pub async fn handle_price(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PriceResponse>, AppError> {
    let form = FormFields::read(multipart).await?;
    let current_year = Utc::now().year();

    let vehicle = VehicleContext::validated(
        form.text("brand"),
        form.number::<i32>("model_year")?,
        form.number::<u32>("mileage")?,
        current_year,
    )?;
    let data_uri = encode_image(form.file(IMAGE_FIELD)).await?;

    let mut rng = StdRng::from_entropy();
    let estimate = estimate_price(
        &state.llm,
        &data_uri,
        &vehicle,
        &state.config.vision_model,
        current_year,
        &mut rng,
    )
    .await;

    info!(
        "Price estimate for {}: {} ({:?})",
        vehicle.context_line(),
        estimate.estimated_price,
        estimate.source
    );
    let advice = estimate.advice();
    Ok(Json(PriceResponse { estimate, advice }))
}

/// Decoding and re-encoding is CPU-bound; keep it off the async workers.
async fn encode_image(upload: Option<&Upload>) -> Result<String, AppError> {
    let upload = upload
        .cloned()
        .ok_or_else(|| AppError::Validation("Please upload an image (PNG, JPG or JPEG).".into()))?;
    let uri = tokio::task::spawn_blocking(move || to_png_data_uri(&upload))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(uri)
}
