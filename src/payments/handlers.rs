use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument};

use crate::auth::extractor::CurrentUser;
use crate::error::ApiError;
use crate::payments::dto::{
    CreatePaymentRequest, PaymentCreatedResponse, PaymentResponse, PaymentUpdatedResponse,
    UpdatePaymentRequest,
};
use crate::payments::repo::Payment;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment", post(create_payment))
        .route("/payment/:id", get(get_payment).put(update_payment))
        .route("/payments", get(list_payments))
}

#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentCreatedResponse>), ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidInput)?;

    let amount = payload.amount.ok_or(ApiError::InvalidInput)?;
    let currency = payload
        .currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::InvalidInput)?;

    let payment = Payment::create(&state.db, user.id, amount, currency).await?;

    info!(payment_id = payment.id, user_id = user.id, "payment initiated");
    Ok((
        StatusCode::CREATED,
        Json(PaymentCreatedResponse {
            message: "Payment initiated successfully!",
            payment_id: payment.id,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(payment_id): Path<i64>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = Payment::find_for_user(&state.db, user.id, payment_id)
        .await?
        .ok_or(ApiError::PaymentNotFound)?;
    Ok(Json(payment.into()))
}

#[instrument(skip(state))]
pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = Payment::list_for_user(&state.db, user.id).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(payment_id): Path<i64>,
    payload: Result<Json<UpdatePaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentUpdatedResponse>, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidInput)?;

    let status = payload
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::InvalidInput)?;

    let payment = Payment::update_status(&state.db, user.id, payment_id, status)
        .await?
        .ok_or(ApiError::PaymentNotFound)?;

    info!(payment_id, user_id = user.id, status, "payment status updated");
    Ok(Json(PaymentUpdatedResponse {
        message: "Payment status updated successfully!",
        payment: payment.into(),
    }))
}
