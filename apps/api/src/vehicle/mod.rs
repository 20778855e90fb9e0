//! AutoXpert vehicle inspection: damage detection, tire analysis and market
//! price estimation from a single uploaded photo.
//!
//! Every analysis first tries the vision model and falls back to
//! [`heuristics`] when no key is configured, the call fails, or the reply
//! cannot be read. Results carry an [`AnalysisSource`] so callers can tell
//! the two apart.

pub mod damage;
pub mod handlers;
pub mod heuristics;
pub mod images;
pub mod market;
pub mod prompts;
pub mod tire;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Heuristic,
}
