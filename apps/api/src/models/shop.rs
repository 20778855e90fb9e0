use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of body damage a shop can repair and a photo can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageCategory {
    Dent,
    Scratch,
}

impl DamageCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DamageCategory::Dent => "dent",
            DamageCategory::Scratch => "scratch",
        }
    }
}

impl fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dent" => Ok(DamageCategory::Dent),
            "scratch" => Ok(DamageCategory::Scratch),
            other => Err(format!("Unknown damage category '{other}'. Use 'dent' or 'scratch'.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub address: String,
    pub dent_price: f64,
    pub scratch_price: f64,
    pub rating: f64,
    pub services: BTreeSet<DamageCategory>,
    pub latitude: f64,
    pub longitude: f64,
    pub social_rating: String,
    pub review_count: u32,
    pub registered_at: DateTime<Utc>,
    /// Argon2 PHC string. Built-in shops have none and cannot log in.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
}

impl ShopRecord {
    pub fn price_for(&self, category: DamageCategory) -> f64 {
        match category {
            DamageCategory::Dent => self.dent_price,
            DamageCategory::Scratch => self.scratch_price,
        }
    }

    pub fn offers(&self, category: DamageCategory) -> bool {
        self.services.contains(&category)
    }
}

/// A shop as shown next to a damage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopRecommendation {
    pub name: String,
    pub rating: f64,
    pub location: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub category: DamageCategory,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub social_rating: String,
    pub directions_url: String,
}

impl ShopRecommendation {
    pub fn from_record(shop: &ShopRecord, category: DamageCategory) -> Self {
        ShopRecommendation {
            name: shop.name.clone(),
            rating: shop.rating,
            location: shop.location.clone(),
            address: shop.address.clone(),
            phone: shop.phone.clone(),
            email: shop.email.clone(),
            category,
            price: shop.price_for(category),
            latitude: shop.latitude,
            longitude: shop.longitude,
            social_rating: shop.social_rating.clone(),
            directions_url: format!(
                "https://www.google.com/maps/dir/?api=1&destination={},{}",
                shop.latitude, shop.longitude
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopRecord {
        ShopRecord {
            id: Uuid::new_v4(),
            name: "Test Garage".into(),
            email: "garage@test.com".into(),
            phone: "+94 11 000 0000".into(),
            location: "Colombo".into(),
            address: "Colombo".into(),
            dent_price: 9000.0,
            scratch_price: 5000.0,
            rating: 4.5,
            services: [DamageCategory::Dent].into_iter().collect(),
            latitude: 6.9271,
            longitude: 79.8612,
            social_rating: "New Shop".into(),
            review_count: 0,
            registered_at: Utc::now(),
            password_hash: Some("$argon2id$secret".into()),
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Dent".parse::<DamageCategory>().unwrap(), DamageCategory::Dent);
        assert_eq!(" scratch ".parse::<DamageCategory>().unwrap(), DamageCategory::Scratch);
        assert!("rust".parse::<DamageCategory>().is_err());
        assert_eq!(DamageCategory::Scratch.to_string(), "scratch");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let value = serde_json::to_value(shop()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["services"], serde_json::json!(["dent"]));
    }

    #[test]
    fn test_recommendation_view() {
        let rec = ShopRecommendation::from_record(&shop(), DamageCategory::Scratch);
        assert_eq!(rec.price, 5000.0);
        assert_eq!(
            rec.directions_url,
            "https://www.google.com/maps/dir/?api=1&destination=6.9271,79.8612"
        );
        assert!(!shop().offers(DamageCategory::Scratch));
    }
}
