//! Custom Axum extractors.
//!
//! - [`ScanImage`]: the raw bytes of an image submitted for scanning, sent
//!   either as a multipart upload or as base64 inside a JSON body
//!
//! # Examples
//!
//! ```ignore
//! use ticketgate_web::extractors::ScanImage;
//!
//! async fn scan(
//!     State(service): State<Arc<TicketService>>,
//!     ScanImage(image): ScanImage,
//! ) -> Result<Json<ScanResponse>, AppError> {
//!     let scanned = service.redeem_from_image(image).await?;
//!     Ok(Json(scanned.into()))
//! }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Preferred multipart field name for the uploaded image.
pub const FILE_FIELD: &str = "file";

/// Image bytes submitted for scanning.
///
/// Accepted encodings:
///
/// - `multipart/form-data`: the `file` field, or else the first field that
///   carries a file name
/// - `application/json`: `{"image": "<base64>"}`, optionally as a data URL
///   (`data:image/png;base64,...`)
///
/// Anything else is rejected with 400 before the service is called.
#[derive(Debug, Clone)]
pub struct ScanImage(pub Vec<u8>);

/// JSON form of a scan request.
#[derive(Debug, Deserialize)]
struct ImagePayload {
    image: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for ScanImage
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            read_multipart(multipart).await.map(Self)
        } else if content_type.starts_with("application/json") {
            let Json(payload) = Json::<ImagePayload>::from_request(req, state).await?;
            let image = payload
                .image
                .ok_or_else(|| AppError::bad_request("Missing `image` field"))?;
            decode_base64_image(&image).map(Self)
        } else {
            Err(AppError::bad_request(
                "Expected a multipart upload with a `file` field or a JSON body with an `image` field",
            ))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        let is_file_field = field.name() == Some(FILE_FIELD);
        let has_file_name = field.file_name().is_some();
        if !is_file_field && (!has_file_name || fallback.is_some()) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        if is_file_field {
            return non_empty(bytes.to_vec());
        }
        fallback = Some(bytes.to_vec());
    }

    fallback
        .map_or_else(|| Err(AppError::bad_request("No file uploaded")), non_empty)
}

/// Decode a base64 image, stripping a `data:<mime>;base64,` prefix if present.
///
/// # Errors
///
/// Returns a 400 error if the payload is empty or not valid base64.
pub fn decode_base64_image(encoded: &str) -> Result<Vec<u8>, AppError> {
    let encoded = encoded.trim();
    let data = if encoded.starts_with("data:") {
        encoded
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::bad_request("Malformed data URL"))?
    } else {
        encoded
    };

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::bad_request(format!("Invalid base64 image: {e}")))?;
    non_empty(bytes)
}

fn non_empty(bytes: Vec<u8>) -> Result<Vec<u8>, AppError> {
    if bytes.is_empty() {
        Err(AppError::bad_request("Uploaded image is empty"))
    } else {
        Ok(bytes)
    }
}
