//! # Request Handlers
//!
//! Axum request handlers for the cart API.
//! Every handler performs at most one engine mutation under the store lock.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cart_core::{
    AddOutcome, Cart, CartError, CartResult, CartSummary, CheckoutOrder, LineItem, PaymentMethod, PricingConfig,
    ProductId, ShippingInfo, SummaryDisplay, VariantKey,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Identifies a row for update or removal
#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub id: ProductId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl VariantQuery {
    /// Blank size/color mean "no size/color"
    pub fn into_key(self) -> VariantKey {
        VariantKey {
            id: self.id,
            size: self.size,
            color: self.color,
        }
        .normalized()
    }
}

/// Set-quantity request
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    #[serde(flatten)]
    pub variant: VariantQuery,
    /// New absolute quantity; below 1 removes the row
    pub quantity: i64,
}

/// Checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub shipping_info: ShippingInfo,
}

/// Create cart response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCartResponse {
    pub cart_id: Uuid,
}

/// Full cart view: rows plus presentation-rounded summary
#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart_id: Uuid,
    pub items: Vec<LineItem>,
    /// Number of distinct rows
    pub rows: usize,
    pub summary: CartSummary,
}

impl CartResponse {
    fn from_cart(cart_id: Uuid, cart: &Cart, pricing: &PricingConfig) -> CartResult<Self> {
        Ok(Self {
            cart_id,
            items: cart.items().to_vec(),
            rows: cart.len(),
            summary: cart.summary(pricing)?.rounded(),
        })
    }
}

/// Result of an add
#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemResponse {
    /// "inserted" or "merged"
    pub outcome: String,
    /// Row quantity after the add
    pub quantity: u32,
    pub cart: CartResponse,
}

/// Result of a set-quantity or remove; `matched` is false for a no-op
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub matched: bool,
    pub cart: CartResponse,
}

/// Summary with display strings
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub cart_id: Uuid,
    pub summary: CartSummary,
    pub display: SummaryDisplay,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: CheckoutOrder,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    if err.is_client_error() {
        warn!("Rejected cart request: {}", err);
    } else {
        error!("Cart operation failed: {}", err);
    }
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "marketcart",
        "version": env!("CARGO_PKG_VERSION"),
        "carts": state.carts.len().await
    }))
}

/// Active pricing configuration
pub async fn get_pricing(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pricing.as_ref().clone())
}

/// Create an empty cart
#[instrument(skip(state))]
pub async fn create_cart(State(state): State<AppState>) -> (StatusCode, Json<CreateCartResponse>) {
    let cart_id = state.carts.create().await;
    info!("Created cart {}", cart_id);
    (StatusCode::CREATED, Json(CreateCartResponse { cart_id }))
}

/// Get a cart's rows and summary
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> ApiResult<Json<CartResponse>> {
    let pricing = state.pricing.clone();
    state
        .carts
        .read(cart_id, |cart| CartResponse::from_cart(cart_id, cart, &pricing))
        .await
        .and_then(|response| response)
        .map(Json)
        .map_err(cart_error_to_response)
}

/// Get a cart's summary with display strings
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = state
        .carts
        .read(cart_id, |cart| cart.summary(&state.pricing))
        .await
        .and_then(|summary| summary)
        .map_err(cart_error_to_response)?;

    Ok(Json(SummaryResponse {
        cart_id,
        display: summary.display(),
        summary: summary.rounded(),
    }))
}

/// Add an item, merging with an existing row of the same variant
#[instrument(skip(state, item), fields(product_id = %item.id, quantity = item.quantity))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(item): Json<LineItem>,
) -> ApiResult<Json<AddItemResponse>> {
    let key = item.variant_key();
    let pricing = state.pricing.clone();

    let response = state
        .carts
        .update(cart_id, |cart| {
            let outcome = cart.add_or_merge(item)?;
            let (label, quantity) = match outcome {
                AddOutcome::Inserted => ("inserted", cart.get(&key).map(|i| i.quantity).unwrap_or(0)),
                AddOutcome::Merged { quantity } => ("merged", quantity),
            };
            Ok(AddItemResponse {
                outcome: label.to_string(),
                quantity,
                cart: CartResponse::from_cart(cart_id, cart, &pricing)?,
            })
        })
        .await
        .map_err(cart_error_to_response)?;

    info!("Cart {}: {} {} (qty {})", cart_id, response.outcome, key, response.quantity);
    Ok(Json(response))
}

/// Set a row's quantity; below 1 removes it, unknown rows are a no-op
#[instrument(skip(state, request), fields(quantity = request.quantity))]
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(request): Json<SetQuantityRequest>,
) -> ApiResult<Json<UpdateResponse>> {
    let key = request.variant.into_key();
    let quantity = request.quantity;
    let pricing = state.pricing.clone();

    state
        .carts
        .update(cart_id, |cart| {
            let matched = cart.set_quantity(&key, quantity)?;
            Ok(UpdateResponse {
                matched,
                cart: CartResponse::from_cart(cart_id, cart, &pricing)?,
            })
        })
        .await
        .map(Json)
        .map_err(cart_error_to_response)
}

/// Remove a row; unknown rows are a no-op
#[instrument(skip(state, query))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Query(query): Query<VariantQuery>,
) -> ApiResult<Json<UpdateResponse>> {
    let key = query.into_key();
    let pricing = state.pricing.clone();

    state
        .carts
        .update(cart_id, |cart| {
            let matched = cart.remove(&key);
            Ok(UpdateResponse {
                matched,
                cart: CartResponse::from_cart(cart_id, cart, &pricing)?,
            })
        })
        .await
        .map(Json)
        .map_err(cart_error_to_response)
}

/// Empty a cart
#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> ApiResult<Json<CartResponse>> {
    let pricing = state.pricing.clone();
    state
        .carts
        .update(cart_id, |cart| {
            cart.clear();
            CartResponse::from_cart(cart_id, cart, &pricing)
        })
        .await
        .map(Json)
        .map_err(cart_error_to_response)
}

/// Snapshot the cart into an order and empty it
#[instrument(skip(state, request), fields(payment_method = ?request.payment_method))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let pricing = state.pricing.clone();

    let order = state
        .carts
        .update(cart_id, |cart| {
            let order =
                CheckoutOrder::from_cart(cart, &pricing, request.shipping_info, request.payment_method)?;
            cart.clear();
            Ok(order)
        })
        .await
        .map_err(cart_error_to_response)?;

    info!("Cart {} checked out as {}", cart_id, order.order_number);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Order created successfully".to_string(),
            order,
        }),
    ))
}
