pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::shops::handlers as shops;
use crate::state::AppState;
use crate::vehicle::handlers as vehicle;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Job application assistant
        .route("/api/v1/jobs/models", get(jobs::handle_list_models))
        .route("/api/v1/jobs/analyze", post(jobs::handle_analyze))
        .route("/api/v1/jobs/export/docx", post(jobs::handle_export_docx))
        .route("/api/v1/jobs/export/pdf", post(jobs::handle_export_pdf))
        // Vehicle inspection
        .route("/api/v1/vehicle/damage", post(vehicle::handle_damage))
        .route("/api/v1/vehicle/tire", post(vehicle::handle_tire))
        .route("/api/v1/vehicle/price", post(vehicle::handle_price))
        // Repair shops
        .route(
            "/api/v1/shops/recommend/:category",
            get(shops::handle_recommend),
        )
        .route("/api/v1/shops/register", post(shops::handle_register))
        .route("/api/v1/shops/login", post(shops::handle_login))
        .route("/api/v1/shops/:email", get(shops::handle_get_shop))
        .route(
            "/api/v1/shops/:email/prices",
            patch(shops::handle_update_prices),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::vehicle::images::sample_png;

    const BOUNDARY: &str = "assist-test-boundary";

    fn test_state() -> AppState {
        AppState::new(Config {
            openrouter_api_key: None,
            openrouter_base_url: "http://127.0.0.1:9".into(),
            secrets_file: PathBuf::from("does-not-exist.toml"),
            vision_model: "test/vision".into(),
            max_upload_bytes: 2 * 1024 * 1024,
            port: 0,
            rust_log: "info".into(),
        })
    }

    /// (field name, optional file name, content)
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_missing_credential() {
        let app = build_router(test_state());
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["credential_configured"], false);
    }

    #[tokio::test]
    async fn test_models_endpoint() {
        let app = build_router(test_state());
        let body = json_body(app.oneshot(get("/api/v1/jobs/models")).await.unwrap()).await;
        assert_eq!(body["default"], "openai/gpt-4.1-mini");
        assert_eq!(body["models"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_analyze_without_key_is_service_unavailable() {
        let app = build_router(test_state());
        let request = multipart_request(
            "/api/v1/jobs/analyze",
            &[
                ("cv_text", None, "Jane Doe, Rust engineer".as_bytes()),
                ("jd_text", None, "Senior Rust engineer".as_bytes()),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_analyze_without_cv_is_bad_request() {
        let app = build_router(test_state());
        let request = multipart_request("/api/v1/jobs/analyze", &[("jd_text", None, "jd".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Please upload a CV or paste your CV text.");
    }

    #[tokio::test]
    async fn test_export_pdf() {
        let app = build_router(test_state());
        let request = json_request(
            Method::POST,
            "/api/v1/jobs/export/pdf",
            json!({"text": "Dear Hiring Manager,\n\nHello.", "title": "Cover Letter"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cover_letter.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_damage_without_key_uses_heuristic_and_recommends_shops() {
        let app = build_router(test_state());
        let png = sample_png();
        let request =
            multipart_request("/api/v1/vehicle/damage", &[("image", Some("car.png"), png.as_slice())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["source"], "heuristic");
        assert_eq!(body["confidence"], 0.75);
        let shops = body["recommended_shops"].as_array().unwrap();
        assert_eq!(shops.len(), 5);
        assert_eq!(shops[0]["name"], "AutoCare Colombo");
        assert_eq!(shops[0]["category"], body["type"]);
    }

    #[tokio::test]
    async fn test_damage_without_image_is_bad_request() {
        let app = build_router(test_state());
        let request = multipart_request("/api/v1/vehicle/damage", &[("note", None, "x".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tire_returns_report_and_advice() {
        let app = build_router(test_state());
        let png = sample_png();
        let request = multipart_request("/api/v1/vehicle/tire", &[("image", Some("tire.jpg"), png.as_slice())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(["good", "fair", "poor"].contains(&body["condition"].as_str().unwrap()));
        assert_eq!(body["advice"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_price_validates_model_year() {
        let app = build_router(test_state());
        let png = sample_png();
        let request = multipart_request(
            "/api/v1/vehicle/price",
            &[
                ("image", Some("car.png"), png.as_slice()),
                ("brand", None, "Toyota".as_bytes()),
                ("model_year", None, "1980".as_bytes()),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_price_heuristic_factors() {
        let app = build_router(test_state());
        let png = sample_png();
        let request = multipart_request(
            "/api/v1/vehicle/price",
            &[
                ("image", Some("car.png"), png.as_slice()),
                ("brand", None, "Suzuki".as_bytes()),
                ("mileage", None, "42000".as_bytes()),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["source"], "heuristic");
        assert_eq!(body["factors"][1], "Model Year: Unknown");
        assert_eq!(body["factors"][2], "Mileage: 42000 km");
    }

    #[tokio::test]
    async fn test_shop_registration_flow() {
        let app = build_router(test_state());
        let registration = json!({
            "name": "Test Garage",
            "email": "shop@test.com",
            "phone": "+94 77 000 0000",
            "location": "Matara, Sri Lanka",
            "dent_price": 150.0,
            "scratch_price": 100.0,
            "password": "hunter22",
            "confirm_password": "hunter22"
        });

        let first = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/shops/register", registration.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let body = json_body(first).await;
        assert_eq!(body["message"], "Account created successfully!");
        assert!(body["shop"].get("password_hash").is_none());

        let second = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/shops/register", registration))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(second).await["error"]["message"], "Email already registered");

        let login = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/shops/login",
                json!({"email": "shop@test.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);

        let bad_login = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/shops/login",
                json!({"email": "shop@test.com", "password": "hunter23"}),
            ))
            .await
            .unwrap();
        assert_eq!(bad_login.status(), StatusCode::UNAUTHORIZED);

        let prices = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                "/api/v1/shops/shop@test.com/prices",
                json!({"password": "hunter22", "dent_price": 200.0, "scratch_price": 120.0}),
            ))
            .await
            .unwrap();
        assert_eq!(prices.status(), StatusCode::OK);

        let lookup = app
            .clone()
            .oneshot(get("/api/v1/shops/shop@test.com"))
            .await
            .unwrap();
        assert_eq!(lookup.status(), StatusCode::OK);
        assert_eq!(json_body(lookup).await["dent_price"], 200.0);

        let missing = app.oneshot(get("/api/v1/shops/nobody@test.com")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registration_validation_message() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/shops/register",
                json!({
                    "name": "Test Garage",
                    "email": "shop@test.com",
                    "phone": "+94 77 000 0000",
                    "location": "Matara",
                    "dent_price": 150.0,
                    "scratch_price": 100.0,
                    "password": "a",
                    "confirm_password": "b"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["message"], "Passwords do not match");
    }

    #[tokio::test]
    async fn test_recommend_route() {
        let app = build_router(test_state());
        let response = app
            .clone()
            .oneshot(get("/api/v1/shops/recommend/Scratch"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["category"], "scratch");
        assert_eq!(body["shops"][0]["price"], 8000.0);
        assert_eq!(body["shops"][4]["name"], "Pro Auto Solutions Jaffna");

        let bad = app.oneshot(get("/api/v1/shops/recommend/rust")).await.unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }
}
