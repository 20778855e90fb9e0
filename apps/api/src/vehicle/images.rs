//! Image encoding: uploaded PNG/JPEG → base64 PNG `data:` URI for vision requests.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use thiserror::Error;
use tracing::debug;

use crate::uploads::Upload;

pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image type '{0}'. Supported formats: PNG, JPG, JPEG")]
    UnsupportedType(String),

    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Could not encode image as PNG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Rejects anything that is not .png/.jpg/.jpeg by file name.
pub fn check_extension(file_name: &str) -> Result<(), ImageError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ImageError::UnsupportedType(file_name.to_string()))
    }
}

/// Decodes the upload and re-encodes it as PNG inside a `data:image/png;base64,` URI.
pub fn to_png_data_uri(upload: &Upload) -> Result<String, ImageError> {
    check_extension(&upload.file_name)?;

    let img = image::load_from_memory(&upload.data).map_err(ImageError::Decode)?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(ImageError::Encode)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded '{}' ({}x{}) → {} bytes base64",
        upload.file_name,
        img.width(),
        img.height(),
        b64.len()
    );
    Ok(format!("data:image/png;base64,{b64}"))
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    use image::{DynamicImage, Rgba, RgbaImage};
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([200, 30, 30, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode sample png");
    buf
}
