//! Job application assistant and AutoXpert vehicle inspection API.
//!
//! The `assist-api` binary serves [`routes::build_router`]; `verify-setup`
//! reuses the codecs and credential lookup to report on an installation.

pub mod config;
pub mod documents;
pub mod errors;
pub mod jobs;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod shops;
pub mod state;
pub mod uploads;
pub mod vehicle;
