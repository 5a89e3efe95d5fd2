use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use crate::{error::AppError, state::AppState, users::User};

/// Single ownership predicate shared by every self-or-admin endpoint.
pub fn is_self_or_admin(actor: &User, owner_id: i64) -> bool {
    actor.is_admin() || actor.id == owner_id
}

/// Authenticated, active user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.0.is_admin() {
            warn!(user_id = self.0.id, "admin role required");
            return Err(AppError::Forbidden(
                "Administrator permissions required".into(),
            ));
        }
        Ok(())
    }

    pub fn require_self_or_admin(&self, owner_id: i64) -> Result<(), AppError> {
        if !is_self_or_admin(&self.0, owner_id) {
            warn!(user_id = self.0.id, owner_id, "ownership check failed");
            return Err(AppError::Forbidden(
                "Not allowed to access another user's resources".into(),
            ));
        }
        Ok(())
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = state.keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            AppError::invalid_credentials()
        })?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(email = %claims.sub, "token subject no longer exists");
                AppError::invalid_credentials()
            })?;

        // The email may have been released and taken by another account.
        if user.id != claims.uid {
            warn!(
                token_uid = claims.uid,
                user_id = user.id,
                "token subject belongs to another account"
            );
            return Err(AppError::invalid_credentials());
        }

        // Suspended accounts get 403 even with a live token.
        if !user.active {
            warn!(user_id = user.id, "inactive user rejected");
            return Err(AppError::Forbidden("Inactive user".into()));
        }

        debug!(user_id = user.id, role = %user.role, "request authenticated");
        Ok(CurrentUser(user))
    }
}
