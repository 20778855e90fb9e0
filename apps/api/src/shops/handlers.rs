//! Axum route handlers for the shop owner pages and recommendations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::shop::{DamageCategory, ShopRecommendation, ShopRecord};
use crate::shops::NewShop;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    pub dent_price: f64,
    pub scratch_price: f64,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterRequest {
    /// Form checks, applied before the registry is touched.
    pub fn validate(self) -> Result<NewShop, AppError> {
        let required = [&self.name, &self.email, &self.phone, &self.location, &self.password];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation("Please fill all required fields".into()));
        }
        if self.password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match".into()));
        }
        validate_prices(self.dent_price, self.scratch_price)?;

        Ok(NewShop {
            name: self.name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            dent_price: self.dent_price,
            scratch_price: self.scratch_price,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePricesRequest {
    pub password: String,
    pub dent_price: f64,
    pub scratch_price: f64,
}

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub message: &'static str,
    pub shop: ShopRecord,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub category: DamageCategory,
    pub shops: Vec<ShopRecommendation>,
}

fn validate_prices(dent_price: f64, scratch_price: f64) -> Result<(), AppError> {
    let valid = |p: f64| p.is_finite() && p >= 0.0;
    if valid(dent_price) && valid(scratch_price) {
        Ok(())
    } else {
        Err(AppError::Validation("Prices must be zero or more".into()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/shops/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ShopResponse>), AppError> {
    let new_shop = request.validate()?;
    let shop = state.registry.register(new_shop).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShopResponse {
            message: "Account created successfully!",
            shop,
        }),
    ))
}

/// POST /api/v1/shops/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ShopResponse>, AppError> {
    let shop = state
        .registry
        .login(&request.email, &request.password)
        .await
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(ShopResponse {
        message: "Login successful!",
        shop,
    }))
}

/// GET /api/v1/shops/:email
pub async fn handle_get_shop(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ShopRecord>, AppError> {
    state
        .registry
        .lookup(&email)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Shop not found".into()))
}

/// PATCH /api/v1/shops/:email/prices
pub async fn handle_update_prices(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdatePricesRequest>,
) -> Result<Json<ShopResponse>, AppError> {
    validate_prices(request.dent_price, request.scratch_price)?;
    let shop = state
        .registry
        .update_prices(&email, &request.password, request.dent_price, request.scratch_price)
        .await?;
    Ok(Json(ShopResponse {
        message: "Prices updated successfully!",
        shop,
    }))
}

/// GET /api/v1/shops/recommend/:category
pub async fn handle_recommend(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<RecommendResponse>, AppError> {
    let category = category
        .parse::<DamageCategory>()
        .map_err(AppError::Validation)?;
    let shops = state
        .registry
        .recommend(category)
        .await
        .iter()
        .map(|shop| ShopRecommendation::from_record(shop, category))
        .collect();
    Ok(Json(RecommendResponse { category, shops }))
}
