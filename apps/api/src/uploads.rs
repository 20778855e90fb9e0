//! Multipart form collection shared by the upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

/// All fields of a multipart form: parts with a filename are files, the rest text.
/// Empty file parts (a browser's "no file chosen") are skipped.
#[derive(Debug, Default)]
pub struct FormFields {
    files: HashMap<String, Upload>,
    texts: HashMap<String, String>,
}

impl FormFields {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormFields::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    debug!("Received file field '{}' ({}, {} bytes)", name, file_name, data.len());
                    if !data.is_empty() {
                        form.files.insert(name, Upload { file_name, data });
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }

    /// Text field value, trimmed; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Parses an optional numeric text field.
    pub fn number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::Validation(format!("{name} must be a number")))
            })
            .transpose()
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.texts.insert(name.to_string(), value.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.files.insert(
            name.to_string(),
            Upload {
                file_name: file_name.to_string(),
                data: Bytes::copy_from_slice(data),
            },
        );
        self
    }
}
