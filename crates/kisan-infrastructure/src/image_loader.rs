//! Loads crop photos from disk as query attachments.

use std::path::Path;

use kisan_core::query::ImageAttachment;
use kisan_core::{KisanError, Result};
use tokio::fs;

/// Largest photo accepted as an attachment (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Infers the MIME type from the file extension.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads an image file into an `ImageAttachment`.
///
/// # Errors
///
/// - `KisanError::Validation` if the file is not an image, is empty or too large
/// - `KisanError::Io` if the file cannot be read
pub async fn load_image(path: &Path) -> Result<ImageAttachment> {
    let mime_type = infer_mime_type(path);
    if !mime_type.starts_with("image/") {
        return Err(KisanError::validation(format!(
            "{} is not an image ({})",
            path.display(),
            mime_type
        )));
    }

    let metadata = fs::metadata(path).await?;
    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(KisanError::validation(format!(
            "{} is too large ({} bytes, limit {} bytes)",
            path.display(),
            metadata.len(),
            MAX_IMAGE_BYTES
        )));
    }

    let bytes = fs::read(path).await?;
    if bytes.is_empty() {
        return Err(KisanError::validation(format!("{} is empty", path.display())));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    tracing::debug!("[Image] Loaded {} ({}, {} bytes)", file_name, mime_type, bytes.len());
    Ok(ImageAttachment::new(file_name, mime_type, bytes))
}
