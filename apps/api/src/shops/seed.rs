//! The repair shops every registry starts with.

use chrono::Utc;
use uuid::Uuid;

use crate::models::shop::{DamageCategory, ShopRecord};

struct Seed {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    location: &'static str,
    address: &'static str,
    dent_price: f64,
    scratch_price: f64,
    rating: f64,
    latitude: f64,
    longitude: f64,
    social_rating: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "AutoCare Colombo",
        email: "autocare@example.com",
        phone: "+94 11 234 5678",
        location: "Colombo 05, Sri Lanka",
        address: "123 Galle Road, Colombo 05",
        dent_price: 12_000.0,
        scratch_price: 8_000.0,
        rating: 4.8,
        latitude: 6.9271,
        longitude: 79.8612,
        social_rating: "4.8/5.0 (Facebook)",
    },
    Seed {
        name: "Premium Auto Repair Kandy",
        email: "premium@example.com",
        phone: "+94 81 234 5678",
        location: "Kandy, Sri Lanka",
        address: "456 Peradeniya Road, Kandy",
        dent_price: 11_000.0,
        scratch_price: 7_500.0,
        rating: 4.7,
        latitude: 7.2906,
        longitude: 80.6337,
        social_rating: "4.7/5.0 (Google Reviews)",
    },
    Seed {
        name: "Expert Auto Services Galle",
        email: "expert@example.com",
        phone: "+94 91 234 5678",
        location: "Galle, Sri Lanka",
        address: "789 Church Street, Galle",
        dent_price: 10_000.0,
        scratch_price: 7_000.0,
        rating: 4.6,
        latitude: 6.0329,
        longitude: 80.2170,
        social_rating: "4.6/5.0 (Instagram)",
    },
    Seed {
        name: "QuickFix Auto Negombo",
        email: "quickfix@example.com",
        phone: "+94 31 234 5678",
        location: "Negombo, Sri Lanka",
        address: "321 Main Street, Negombo",
        dent_price: 9_500.0,
        scratch_price: 6_500.0,
        rating: 4.5,
        latitude: 7.2083,
        longitude: 79.8358,
        social_rating: "4.5/5.0 (Facebook)",
    },
    Seed {
        name: "Pro Auto Solutions Jaffna",
        email: "proauto@example.com",
        phone: "+94 21 234 5678",
        location: "Jaffna, Sri Lanka",
        address: "654 Temple Road, Jaffna",
        dent_price: 10_500.0,
        scratch_price: 7_200.0,
        rating: 4.4,
        latitude: 9.6615,
        longitude: 80.0255,
        social_rating: "4.4/5.0 (Google Reviews)",
    },
];

/// Built-in shops carry no password hash, so nobody can log in as them.
pub fn builtin_shops() -> Vec<ShopRecord> {
    let now = Utc::now();
    SEEDS
        .iter()
        .map(|s| ShopRecord {
            id: Uuid::new_v4(),
            name: s.name.to_string(),
            email: s.email.to_string(),
            phone: s.phone.to_string(),
            location: s.location.to_string(),
            address: s.address.to_string(),
            dent_price: s.dent_price,
            scratch_price: s.scratch_price,
            rating: s.rating,
            services: [DamageCategory::Dent, DamageCategory::Scratch].into_iter().collect(),
            latitude: s.latitude,
            longitude: s.longitude,
            social_rating: s.social_rating.to_string(),
            review_count: 0,
            registered_at: now,
            password_hash: None,
        })
        .collect()
}
