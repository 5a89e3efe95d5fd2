use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{songs::Song, users::dto::UserRead};

#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    pub user_id: i64,
    pub song_id: i64,
}

/// Favorite with its user and song expanded.
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteDetails {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub marked_at: OffsetDateTime,
    pub user: UserRead,
    pub song: Song,
}
