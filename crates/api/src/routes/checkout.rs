//! Checkout endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use checkout::{ConfirmationOutcome, CreatedCheckout, PaymentStatusView};
use domain::OrderSummary;
use serde::Deserialize;

use crate::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::extract::{Json, Path};

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub session_id: String,
}

/// GET /api/checkout/summary — price the caller's cart.
pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<OrderSummary>, ApiError> {
    let summary = state.checkout_service.order_summary(identity.user_id).await?;
    Ok(Json(summary))
}

/// POST /api/checkout — validate the cart and open a payment session.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<(StatusCode, Json<CreatedCheckout>), ApiError> {
    let created = state
        .checkout_service
        .create_session(identity.user_id, identity.email)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/checkout/confirm — reconcile stock for a paid session.
pub async fn confirm(
    State(state): State<AppState>,
    _identity: Identity,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let outcome = state.checkout_service.confirm_payment(&req.session_id).await?;
    Ok(Json(outcome))
}

/// GET /api/checkout/status/{session_id} — gateway status passthrough.
pub async fn status(
    State(state): State<AppState>,
    _identity: Identity,
    Path(session_id): Path<String>,
) -> Result<Json<PaymentStatusView>, ApiError> {
    let view = state.checkout_service.payment_status(&session_id).await?;
    Ok(Json(view))
}
