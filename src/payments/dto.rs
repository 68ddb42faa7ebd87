use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::payments::repo::Payment;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<String>,
}

/// Payment fields as returned to the client.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: i64,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            payment_id: p.id,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentCreatedResponse {
    pub message: &'static str,
    pub payment_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentUpdatedResponse {
    pub message: &'static str,
    pub payment: PaymentResponse,
}
