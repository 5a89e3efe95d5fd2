use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use repo_types::{NewUser, Role, User};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
