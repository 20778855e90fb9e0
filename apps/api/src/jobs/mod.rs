//! Job application assistant: CV + job description → ATS score, skill gaps,
//! improved CV and cover letter, with DOCX/PDF export of the generated texts.
//! All LLM calls go through llm_client.

pub mod analysis;
pub mod export;
pub mod handlers;
pub mod prompts;
