// Vision prompts. Each asks for a single JSON object; replies are read through
// the fenced-JSON extractor because vision models tend to wrap them in ```json.

pub const DAMAGE_PROMPT: &str = "Analyze this vehicle damage image. Identify if it's a dent or scratch. \
Respond in JSON format: {\"type\": \"dent\" or \"scratch\", \"confidence\": 0.0-1.0, \
\"description\": \"brief description\"}";

pub const TIRE_PROMPT: &str = r#"Analyze this tire image. Assess the tire condition, tread depth, and wear patterns.
Respond in JSON format: {
    "condition": "good/fair/poor",
    "tread_depth_mm": estimated number,
    "remaining_life_percent": 0-100,
    "estimated_distance_km": remaining safe distance,
    "change_recommended": true/false,
    "description": "detailed analysis"
}"#;

const MARKET_PROMPT_TEMPLATE: &str = r#"Analyze this vehicle image and estimate its market value.
Context: {context}
Consider the vehicle's condition, age, brand, and market factors.
Respond in JSON format: {
    "estimated_price": number in USD,
    "price_range_min": minimum estimate,
    "price_range_max": maximum estimate,
    "condition": "excellent/good/fair/poor",
    "factors": ["list of factors affecting price"],
    "description": "detailed analysis"
}"#;

/// Fills the market prompt with a "Brand: …, Model Year: …, Mileage: … km" line.
pub fn market_prompt(context: &str) -> String {
    MARKET_PROMPT_TEMPLATE.replace("{context}", context)
}
