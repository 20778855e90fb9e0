use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::shop::{DamageCategory, ShopRecord};
use crate::shops::password::{hash_password, verify_password};
use crate::shops::seed::builtin_shops;
use crate::shops::{normalize_email, RegistryError};

pub const MAX_RECOMMENDATIONS: usize = 5;

const DEFAULT_RATING: f64 = 4.5;
const DEFAULT_LATITUDE: f64 = 6.9271;
const DEFAULT_LONGITUDE: f64 = 79.8612;
const NEW_SHOP_SOCIAL_RATING: &str = "New Shop";

/// A validated registration.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub dent_price: f64,
    pub scratch_price: f64,
    pub password: String,
}

/// Shops in insertion order (built-ins first). Records are never removed.
#[derive(Debug, Default)]
pub struct ShopRegistry {
    shops: RwLock<Vec<ShopRecord>>,
}

impl ShopRegistry {
    pub fn new(shops: Vec<ShopRecord>) -> Self {
        ShopRegistry {
            shops: RwLock::new(shops),
        }
    }

    pub fn with_builtin_shops() -> Self {
        Self::new(builtin_shops())
    }

    pub async fn count(&self) -> usize {
        self.shops.read().await.len()
    }

    /// Adds a shop. The duplicate check and the insert happen under one write lock.
    pub async fn register(&self, new: NewShop) -> Result<ShopRecord, RegistryError> {
        let email = normalize_email(&new.email);

        // Skip the expensive hash for an obvious duplicate.
        if self.find(&email).await.is_some() {
            return Err(RegistryError::EmailTaken);
        }

        let password = new.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| RegistryError::PasswordHash(e.to_string()))??;

        let record = ShopRecord {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            email: email.clone(),
            phone: new.phone.trim().to_string(),
            address: new.location.trim().to_string(),
            location: new.location.trim().to_string(),
            dent_price: new.dent_price,
            scratch_price: new.scratch_price,
            rating: DEFAULT_RATING,
            services: [DamageCategory::Dent, DamageCategory::Scratch]
                .into_iter()
                .collect(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            social_rating: NEW_SHOP_SOCIAL_RATING.to_string(),
            review_count: 0,
            registered_at: Utc::now(),
            password_hash: Some(password_hash),
        };

        let mut shops = self.shops.write().await;
        if shops.iter().any(|s| s.email == email) {
            return Err(RegistryError::EmailTaken);
        }
        shops.push(record.clone());
        info!("Registered shop '{}' <{}> ({} shops total)", record.name, email, shops.len());
        Ok(record)
    }

    /// `None` for an unknown email, a wrong password, or a shop without a password.
    pub async fn login(&self, email: &str, password: &str) -> Option<ShopRecord> {
        let shop = self.find(&normalize_email(email)).await?;
        let stored = shop.password_hash.clone()?;

        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .unwrap_or_else(|e| {
                error!("Password verification task failed: {e}");
                false
            });

        matches.then_some(shop)
    }

    pub async fn lookup(&self, email: &str) -> Option<ShopRecord> {
        self.find(&normalize_email(email)).await
    }

    /// Up to five shops offering `category`, highest rating first. Ties keep
    /// insertion order.
    pub async fn recommend(&self, category: DamageCategory) -> Vec<ShopRecord> {
        let shops = self.shops.read().await;
        let mut matching: Vec<ShopRecord> = shops
            .iter()
            .filter(|s| s.offers(category))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        matching.truncate(MAX_RECOMMENDATIONS);
        matching
    }

    /// Owner-only price change. Credentials are checked exactly as for login.
    pub async fn update_prices(
        &self,
        email: &str,
        password: &str,
        dent_price: f64,
        scratch_price: f64,
    ) -> Result<ShopRecord, RegistryError> {
        let shop = self
            .login(email, password)
            .await
            .ok_or(RegistryError::InvalidCredentials)?;

        let mut shops = self.shops.write().await;
        let record = shops
            .iter_mut()
            .find(|s| s.id == shop.id)
            .ok_or(RegistryError::InvalidCredentials)?;
        record.dent_price = dent_price;
        record.scratch_price = scratch_price;
        info!(
            "Updated prices for <{}>: dent={dent_price}, scratch={scratch_price}",
            record.email
        );
        Ok(record.clone())
    }

    async fn find(&self, normalized_email: &str) -> Option<ShopRecord> {
        self.shops
            .read()
            .await
            .iter()
            .find(|s| s.email == normalized_email)
            .cloned()
    }
}

/// Shared handle stored in application state.
pub type SharedRegistry = Arc<ShopRegistry>;
