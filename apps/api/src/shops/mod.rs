//! Repair-shop registry: built-in shops plus owner registrations, shared by
//! every request for the lifetime of the process.

pub mod handlers;
pub mod password;
pub mod registry;
pub mod seed;

use thiserror::Error;

pub use registry::{NewShop, ShopRegistry};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Emails are matched case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
