//! Scanning API endpoints.
//!
//! Both endpoints accept a multipart upload (`file` field) or a JSON body
//! `{"image": "<base64>"}`.
//!
//! - POST /scan - Decode the QR code and redeem the ticket it carries
//! - POST /decode - Decode the QR code only

use super::RedemptionResponse;
use crate::server::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use ticketgate_web::{error::AppError, ScanImage};

/// Decoded QR content.
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    /// Text of the first QR code found in the image
    pub ticket_id: String,
}

/// Redeem the ticket shown in an image.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5000/scan -F "file=@ticket.png"
/// # {"status":"valid","message":"Ticket confirmed!","ticket_id":"3f9d..."}
/// ```
///
/// # Errors
///
/// - 400 if no image was sent or it is not a readable image
/// - 422 if the image contains no QR code
/// - 500 if a valid redemption cannot be saved
pub async fn scan(
    State(state): State<AppState>,
    ScanImage(image): ScanImage,
) -> Result<Json<RedemptionResponse>, AppError> {
    let scanned = state.service.redeem_from_image(image).await?;

    Ok(Json(RedemptionResponse::new(scanned.ticket_id, scanned.redemption)))
}

/// Decode the QR code in an image without redeeming anything.
///
/// # Errors
///
/// - 400 if no image was sent or it is not a readable image
/// - 422 if the image contains no QR code
pub async fn decode(
    State(state): State<AppState>,
    ScanImage(image): ScanImage,
) -> Result<Json<DecodeResponse>, AppError> {
    let ticket_id = state.service.decode(image).await?;

    Ok(Json(DecodeResponse { ticket_id }))
}
