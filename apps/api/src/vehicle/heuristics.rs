//! Heuristic stand-ins for the vision model.
//!
//! Used when no API key is configured, the model call fails, or its reply
//! cannot be read. Output has the same shape as a model answer with
//! randomized values; the random source is passed in so a seeded `StdRng`
//! reproduces a result exactly.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::shop::DamageCategory;
use crate::vehicle::damage::DamageReport;
use crate::vehicle::market::{PriceEstimate, VehicleCondition, VehicleContext};
use crate::vehicle::tire::{replacement_recommended, TireCondition, TireReport};
use crate::vehicle::AnalysisSource;

const HEURISTIC_DAMAGE_CONFIDENCE: f64 = 0.75;
const KEYWORD_DAMAGE_CONFIDENCE: f64 = 0.7;

// ────────────────────────────────────────────────────────────────────────────
// Damage
// ────────────────────────────────────────────────────────────────────────────

pub fn heuristic_damage<R: Rng>(rng: &mut R) -> DamageReport {
    let damage_type = if rng.gen_bool(0.5) {
        DamageCategory::Dent
    } else {
        DamageCategory::Scratch
    };
    DamageReport {
        damage_type,
        confidence: HEURISTIC_DAMAGE_CONFIDENCE,
        description: format!(
            "Detected {damage_type} on vehicle surface. Professional inspection recommended."
        ),
        source: AnalysisSource::Heuristic,
    }
}

/// The model answered in prose instead of JSON: keep its words, guess the category.
pub fn classify_damage_reply(reply: &str) -> DamageReport {
    let damage_type = if reply.to_lowercase().contains("scratch") {
        DamageCategory::Scratch
    } else {
        DamageCategory::Dent
    };
    DamageReport {
        damage_type,
        confidence: KEYWORD_DAMAGE_CONFIDENCE,
        description: reply.to_string(),
        source: AnalysisSource::Model,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tire
// ────────────────────────────────────────────────────────────────────────────

/// Half-open sampling ranges for one condition tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireBounds {
    pub tread_mm: (f64, f64),
    pub life_percent: (f64, f64),
    pub distance_km: (f64, f64),
}

impl TireCondition {
    pub fn bounds(self) -> TireBounds {
        match self {
            TireCondition::Good => TireBounds {
                tread_mm: (6.0, 8.0),
                life_percent: (70.0, 90.0),
                distance_km: (15_000.0, 25_000.0),
            },
            TireCondition::Fair => TireBounds {
                tread_mm: (3.0, 6.0),
                life_percent: (40.0, 70.0),
                distance_km: (5_000.0, 15_000.0),
            },
            TireCondition::Poor => TireBounds {
                tread_mm: (1.0, 3.0),
                life_percent: (10.0, 40.0),
                distance_km: (0.0, 5_000.0),
            },
        }
    }
}

fn round_to_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn heuristic_tire<R: Rng>(rng: &mut R) -> TireReport {
    let condition = *TireCondition::ALL
        .choose(rng)
        .unwrap_or(&TireCondition::Fair);
    let bounds = condition.bounds();

    let tread_depth_mm = round_to_tenth(rng.gen_range(bounds.tread_mm.0..bounds.tread_mm.1));
    let remaining_life_percent =
        round_to_tenth(rng.gen_range(bounds.life_percent.0..bounds.life_percent.1));
    let estimated_distance_km = rng
        .gen_range(bounds.distance_km.0..bounds.distance_km.1)
        .round();

    TireReport {
        condition,
        tread_depth_mm,
        remaining_life_percent,
        estimated_distance_km,
        change_recommended: replacement_recommended(condition, remaining_life_percent),
        description: format!(
            "Tire condition is {}. Tread depth approximately {tread_depth_mm:.1}mm.",
            condition.as_str()
        ),
        source: AnalysisSource::Heuristic,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Market price
// ────────────────────────────────────────────────────────────────────────────

const DEPRECIATION_PER_YEAR: f64 = 0.1;
const AGE_FLOOR: f64 = 0.3;
const MILEAGE_SCALE_KM: f64 = 200_000.0;
const MILEAGE_MAX_DEPRECIATION: f64 = 0.3;
const MILEAGE_FLOOR: f64 = 0.5;

/// Reference price in USD for a brand; unknown brands get a generic value.
pub fn brand_base_price(brand: &str) -> f64 {
    match brand.trim().to_ascii_lowercase().as_str() {
        "toyota" => 15_000.0,
        "mitsubishi" => 12_000.0,
        "suzuki" => 8_000.0,
        _ => 10_000.0,
    }
}

/// Value before random jitter. Non-increasing in both age and mileage.
pub fn depreciated_value(
    brand: &str,
    model_year: Option<i32>,
    mileage: Option<u32>,
    current_year: i32,
) -> f64 {
    let base = brand_base_price(brand);
    let mut value = base;

    if let Some(year) = model_year {
        let age = f64::from((current_year - year).max(0));
        value = (base - base * DEPRECIATION_PER_YEAR * age).max(base * AGE_FLOOR);
    }

    if let Some(km) = mileage {
        let loss = value * (f64::from(km) / MILEAGE_SCALE_KM) * MILEAGE_MAX_DEPRECIATION;
        value = (value - loss).max(value * MILEAGE_FLOOR);
    }

    value
}

pub fn heuristic_price<R: Rng>(
    rng: &mut R,
    vehicle: &VehicleContext,
    current_year: i32,
) -> PriceEstimate {
    let base = brand_base_price(&vehicle.brand);
    let value = depreciated_value(
        &vehicle.brand,
        vehicle.model_year,
        vehicle.mileage,
        current_year,
    );
    let price = value * rng.gen_range(0.9..1.1);

    let pool: &[VehicleCondition] = if price > base * 0.9 {
        &[VehicleCondition::Excellent, VehicleCondition::Good]
    } else {
        &[VehicleCondition::Fair, VehicleCondition::Poor]
    };
    let condition = *pool.choose(rng).unwrap_or(&VehicleCondition::Fair);

    let model_year = vehicle
        .model_year
        .map_or_else(|| "Unknown".to_string(), |y| y.to_string());
    let mileage = vehicle
        .mileage
        .map_or_else(|| "Unknown".to_string(), |m| m.to_string());

    PriceEstimate {
        estimated_price: price.round(),
        price_range_min: (price * 0.85).round(),
        price_range_max: (price * 1.15).round(),
        condition,
        factors: vec![
            format!("Brand: {}", vehicle.brand),
            format!("Model Year: {model_year}"),
            format!("Mileage: {mileage} km"),
            format!("Condition: {}", condition.as_str()),
        ],
        description: format!(
            "Estimated market value for {} vehicle based on provided information.",
            vehicle.brand
        ),
        source: AnalysisSource::Heuristic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn toyota(model_year: Option<i32>, mileage: Option<u32>) -> VehicleContext {
        VehicleContext {
            brand: "Toyota".into(),
            model_year,
            mileage,
        }
    }

    #[test]
    fn test_heuristic_damage_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let report = heuristic_damage(&mut rng);
            assert_eq!(report.confidence, 0.75);
            assert_eq!(report.source, AnalysisSource::Heuristic);
            assert_eq!(
                report.description,
                format!(
                    "Detected {} on vehicle surface. Professional inspection recommended.",
                    report.damage_type
                )
            );
        }
    }

    #[test]
    fn test_heuristic_damage_covers_both_categories() {
        let mut rng = StdRng::seed_from_u64(5);
        let kinds: Vec<_> = (0..50).map(|_| heuristic_damage(&mut rng).damage_type).collect();
        assert!(kinds.contains(&DamageCategory::Dent));
        assert!(kinds.contains(&DamageCategory::Scratch));
    }

    #[test]
    fn test_classify_damage_reply_keywords() {
        let scratch = classify_damage_reply("Visible SCRATCHES along the bumper");
        assert_eq!(scratch.damage_type, DamageCategory::Scratch);
        assert_eq!(scratch.confidence, 0.7);
        assert_eq!(scratch.description, "Visible SCRATCHES along the bumper");

        let dent = classify_damage_reply("Hard to tell from this angle.");
        assert_eq!(dent.damage_type, DamageCategory::Dent);
    }

    #[test]
    fn test_heuristic_tire_values_within_tier_bounds() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let report = heuristic_tire(&mut rng);
            let b = report.condition.bounds();
            // Rounding to 0.1 can land exactly on the upper bound.
            assert!(report.tread_depth_mm >= b.tread_mm.0 && report.tread_depth_mm <= b.tread_mm.1);
            assert!(
                report.remaining_life_percent >= b.life_percent.0
                    && report.remaining_life_percent <= b.life_percent.1
            );
            assert!(
                report.estimated_distance_km >= b.distance_km.0
                    && report.estimated_distance_km <= b.distance_km.1
            );
        }
    }

    #[test]
    fn test_heuristic_tire_change_flag_rule() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let report = heuristic_tire(&mut rng);
            let expected = report.condition == TireCondition::Poor
                || report.remaining_life_percent < 30.0;
            assert_eq!(report.change_recommended, expected);
            if report.condition == TireCondition::Good {
                assert!(!report.change_recommended);
            }
        }
    }

    #[test]
    fn test_heuristic_tire_description() {
        let mut rng = StdRng::seed_from_u64(8);
        let report = heuristic_tire(&mut rng);
        assert_eq!(
            report.description,
            format!(
                "Tire condition is {}. Tread depth approximately {:.1}mm.",
                report.condition.as_str(),
                report.tread_depth_mm
            )
        );
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let vehicle = toyota(Some(2018), Some(60_000));
        let mut a = StdRng::seed_from_u64(1234);
        let mut b = StdRng::seed_from_u64(1234);
        assert_eq!(heuristic_damage(&mut a), heuristic_damage(&mut b));
        assert_eq!(heuristic_tire(&mut a), heuristic_tire(&mut b));
        assert_eq!(
            heuristic_price(&mut a, &vehicle, 2024),
            heuristic_price(&mut b, &vehicle, 2024)
        );
    }

    #[test]
    fn test_brand_base_prices() {
        assert_eq!(brand_base_price("Toyota"), 15_000.0);
        assert_eq!(brand_base_price("Mitsubishi"), 12_000.0);
        assert_eq!(brand_base_price("Suzuki"), 8_000.0);
        assert_eq!(brand_base_price("Lada"), 10_000.0);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
    }

    #[test]
    fn test_depreciated_value_known_points() {
        assert_close(depreciated_value("Toyota", None, None, 2024), 15_000.0);
        // Two years: 15000 - 3000.
        assert_close(depreciated_value("Toyota", Some(2022), None, 2024), 12_000.0);
        // Floors at 30% of base.
        assert_close(depreciated_value("Toyota", Some(1995), None, 2024), 4_500.0);
        // 100000 km on 10000: 10000 - 10000 * 0.5 * 0.3.
        assert_close(depreciated_value("Lada", None, Some(100_000), 2024), 8_500.0);
        // Future model year counts as age zero.
        assert_close(depreciated_value("Suzuki", Some(2030), None, 2024), 8_000.0);
    }

    #[test]
    fn test_depreciated_value_non_increasing_in_age() {
        let mut last = f64::INFINITY;
        for year in (1990..=2024).rev() {
            let v = depreciated_value("Mitsubishi", Some(year), Some(50_000), 2024);
            assert!(v <= last, "value rose at model year {year}");
            last = v;
        }
    }

    #[test]
    fn test_depreciated_value_non_increasing_in_mileage() {
        let mut last = f64::INFINITY;
        for km in (0..=500_000).step_by(10_000) {
            let v = depreciated_value("Toyota", Some(2019), Some(km), 2024);
            assert!(v <= last, "value rose at {km} km");
            last = v;
        }
    }

    #[test]
    fn test_heuristic_price_range_and_factors() {
        let mut rng = StdRng::seed_from_u64(77);
        let vehicle = toyota(Some(2020), None);
        let value = depreciated_value("Toyota", Some(2020), None, 2024);
        for _ in 0..100 {
            let est = heuristic_price(&mut rng, &vehicle, 2024);
            assert!(est.estimated_price >= (value * 0.9).floor());
            assert!(est.estimated_price <= (value * 1.1).ceil());
            assert!(est.price_range_min <= est.estimated_price);
            assert!(est.price_range_max >= est.estimated_price);
            assert_eq!(est.factors[0], "Brand: Toyota");
            assert_eq!(est.factors[1], "Model Year: 2020");
            assert_eq!(est.factors[2], "Mileage: Unknown km");
            assert_eq!(est.factors[3], format!("Condition: {}", est.condition.as_str()));
        }
    }

    #[test]
    fn test_heuristic_price_condition_tracks_brand_base() {
        let mut rng = StdRng::seed_from_u64(3);
        // Fresh and low-mileage: price stays near base, so the top conditions.
        let new_car = toyota(Some(2024), Some(0));
        // Old car sits at the 30% floor, always below 0.9 of base.
        let old_car = toyota(Some(1995), Some(300_000));
        for _ in 0..50 {
            let fresh = heuristic_price(&mut rng, &new_car, 2024);
            let old = heuristic_price(&mut rng, &old_car, 2024);
            assert!(matches!(
                old.condition,
                VehicleCondition::Fair | VehicleCondition::Poor
            ));
            if fresh.estimated_price > 15_000.0 * 0.9 + 1.0 {
                assert!(matches!(
                    fresh.condition,
                    VehicleCondition::Excellent | VehicleCondition::Good
                ));
            }
        }
    }
}
