//! Query domain models.

use serde::{Deserialize, Serialize};

use crate::error::{KisanError, Result};

/// Approximate coordinates attached to a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An image selected by the user, held in memory for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Original file name, used for the multipart part name
    pub file_name: String,
    /// MIME type (e.g. `image/jpeg`)
    pub mime_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Context data sent alongside each query.
///
/// Serialized as the `context` field of the backend request: `{"location": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryContextSnapshot {
    pub location: Option<GeoLocation>,
}

/// A validated query ready to be handed to a fetcher.
///
/// Construction fails when both the text and the image are absent, so a
/// fetcher never sees an empty request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    query: String,
    language: String,
    image: Option<ImageAttachment>,
    context: QueryContextSnapshot,
}

impl QueryRequest {
    /// Builds a request, trimming the query text.
    ///
    /// # Errors
    ///
    /// Returns `KisanError::Validation` if the trimmed query is empty and no image is attached.
    pub fn new(
        query: impl Into<String>,
        language: impl Into<String>,
        image: Option<ImageAttachment>,
        context: QueryContextSnapshot,
    ) -> Result<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() && image.is_none() {
            return Err(KisanError::validation(
                "Please type a question or attach an image",
            ));
        }

        Ok(Self {
            query,
            language: language.into(),
            image,
            context,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn context(&self) -> &QueryContextSnapshot {
        &self.context
    }

    pub fn location(&self) -> Option<GeoLocation> {
        self.context.location
    }
}
