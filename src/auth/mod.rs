use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod guard;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use guard::{is_self_or_admin, CurrentUser};
pub use jwt::{Claims, JwtKeys, TokenError};
pub use password::PasswordHasher;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
