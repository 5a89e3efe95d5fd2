use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use repo_types::Song;

pub fn router() -> Router<AppState> {
    handlers::song_routes()
}
