use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tracing::warn;

use crate::auth::jwt::{JwtKeys, TokenError};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_HEADER: &str = "x-access-token";

/// Extracts the `x-access-token` header, validates it and resolves the
/// subject to a full user record. Handlers behind this extractor never run
/// for unauthenticated requests.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(TokenError::Missing)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            e
        })?;

        // A token whose subject no longer exists is treated as invalid
        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.sub, "token subject not found");
                ApiError::TokenInvalid
            })?;

        Ok(CurrentUser(user))
    }
}
