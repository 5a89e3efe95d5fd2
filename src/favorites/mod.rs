use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use repo_types::Favorite;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::favorite_routes())
        .merge(handlers::user_favorite_routes())
}
