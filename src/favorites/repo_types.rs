use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// A user's mark on a song; `(user_id, song_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub song_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub marked_at: OffsetDateTime,
}
