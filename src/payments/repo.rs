use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Payment record in the database. Owned by exactly one user for its
/// entire lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Payment {
    /// Insert a new payment for a user. Status starts as "Pending" and both
    /// timestamps come from the same now().
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        amount: f64,
        currency: &str,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (amount, currency, status, user_id)
            VALUES ($1, $2, 'Pending', $3)
            RETURNING id, amount, currency, status, user_id, created_at, updated_at
            "#,
        )
        .bind(amount)
        .bind(currency)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// Fetch a payment by id, scoped to its owner. A payment owned by a
    /// different user is indistinguishable from a missing one.
    pub async fn find_for_user(
        db: &PgPool,
        user_id: i64,
        payment_id: i64,
    ) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, amount, currency, status, user_id, created_at, updated_at
            FROM payments
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(payment_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// All payments owned by a user, newest first.
    pub async fn list_for_user(db: &PgPool, user_id: i64) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, amount, currency, status, user_id, created_at, updated_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Set a payment's status, refreshing updated_at, under the same owner
    /// scoping as `find_for_user`.
    pub async fn update_status(
        db: &PgPool,
        user_id: i64,
        payment_id: i64,
        status: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, amount, currency, status, user_id, created_at, updated_at
            "#,
        )
        .bind(payment_id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(db)
        .await
    }
}
