//! Ticket API endpoints.
//!
//! - POST /generate - Issue a ticket and render its QR code
//! - GET /download/:id - Fetch the rendered QR code
//! - POST /check, POST /verify - Redeem a ticket by id
//! - GET /tickets/:id - Current state of a ticket

use super::RedemptionResponse;
use crate::server::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use ticketgate_core::{TicketError, TicketId, TicketState};
use ticketgate_web::error::AppError;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response after issuing a ticket.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The new ticket id
    pub ticket_id: TicketId,
    /// Where the QR code can be downloaded
    pub qr_code_url: String,
}

/// Request to redeem a ticket by id.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Ticket id as printed or typed at the gate
    pub ticket_id: Option<String>,
}

/// Ticket state response.
#[derive(Debug, Serialize)]
pub struct TicketStatusResponse {
    /// Ticket id
    pub ticket_id: TicketId,
    /// `unused` or `used`
    pub state: TicketState,
}

// ============================================================================
// Handlers
// ============================================================================

/// Issue a new ticket.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5000/generate
/// # {"ticket_id":"3f9d...","qr_code_url":"/download/3f9d..."}
/// ```
///
/// # Errors
///
/// Returns 500 if the QR code or the ledger cannot be written.
pub async fn generate(State(state): State<AppState>) -> Result<Json<GenerateResponse>, AppError> {
    let issued = state.service.generate().await?;

    Ok(Json(GenerateResponse {
        ticket_id: issued.id,
        qr_code_url: issued.reference,
    }))
}

/// Download a ticket's QR code as PNG.
///
/// # Errors
///
/// Returns 404 if no QR code exists for the id, including ids that are not
/// UUIDs.
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = TicketId::parse(&id).ok_or_else(|| TicketError::not_found(&id))?;
    let png = state.service.retrieve(id).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Redeem a ticket by id.
///
/// Serves both `/check` and `/verify`.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5000/check \
///   -H "Content-Type: application/json" \
///   -d '{"ticket_id": "3f9d0c57-36a4-4c8e-8a8d-8d3d3e7f6a10"}'
/// # {"status":"valid","message":"Ticket confirmed!","ticket_id":"3f9d..."}
/// ```
///
/// # Errors
///
/// - 400 if the body is not JSON or has no `ticket_id`
/// - 500 if a valid redemption cannot be saved
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<RedemptionResponse>, AppError> {
    let Json(request) = payload?;
    let ticket_id = request
        .ticket_id
        .ok_or_else(|| TicketError::malformed("Missing `ticket_id` field"))?;

    let redemption = state.service.redeem_code(&ticket_id).await?;

    Ok(Json(RedemptionResponse::new(ticket_id, redemption)))
}

/// Look up a ticket's state without changing it.
///
/// # Errors
///
/// Returns 404 if the ticket was never issued.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TicketStatusResponse>, AppError> {
    let ticket_id = TicketId::parse(&id).ok_or_else(|| TicketError::not_found(&id))?;
    let state = state.service.status(ticket_id).await?;

    Ok(Json(TicketStatusResponse { ticket_id, state }))
}
