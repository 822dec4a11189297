//! Cart endpoints.

use axum::extract::State;
use common::{LineId, ProductId};
use domain::CartView;
use serde::Deserialize;

use crate::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::extract::{Json, Path};

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub colour: Option<String>,
    pub size: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// POST /api/cart — add an item to the caller's cart.
pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let view = state
        .cart_service
        .add_item(
            identity.user_id,
            req.product_id,
            req.quantity,
            req.colour,
            req.size,
        )
        .await?;
    Ok(Json(view))
}

/// GET /api/cart — the caller's cart with totals.
pub async fn get(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CartView>, ApiError> {
    let view = state.cart_service.get_cart(identity.user_id).await?;
    Ok(Json(view))
}

/// PUT /api/cart/{line_id} — set a line's absolute quantity.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(line_id): Path<LineId>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    let view = state
        .cart_service
        .update_item(identity.user_id, line_id, req.quantity)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/cart/{line_id} — remove one line.
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(line_id): Path<LineId>,
) -> Result<Json<CartView>, ApiError> {
    let view = state
        .cart_service
        .remove_item(identity.user_id, line_id)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/cart — clear the caller's cart.
pub async fn clear(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CartView>, ApiError> {
    let view = state.cart_service.clear_cart(identity.user_id).await?;
    Ok(Json(view))
}
