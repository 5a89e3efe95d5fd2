use sqlx::{Executor, Sqlite};
use time::OffsetDateTime;

use super::repo_types::Favorite;
use crate::songs::Song;

impl Favorite {
    pub async fn list<'e, E>(db: E) -> sqlx::Result<Vec<Favorite>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, song_id, marked_at
            FROM favorites
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_by_user<'e, E>(db: E, user_id: i64) -> sqlx::Result<Vec<Favorite>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, song_id, marked_at
            FROM favorites
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id<'e, E>(db: E, id: i64) -> sqlx::Result<Option<Favorite>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, song_id, marked_at
            FROM favorites
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_pair<'e, E>(db: E, user_id: i64, song_id: i64) -> sqlx::Result<Option<Favorite>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, song_id, marked_at
            FROM favorites
            WHERE user_id = ? AND song_id = ?
            "#,
        )
        .bind(user_id)
        .bind(song_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create<'e, E>(db: E, user_id: i64, song_id: i64) -> sqlx::Result<Favorite>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, song_id, marked_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, song_id, marked_at
            "#,
        )
        .bind(user_id)
        .bind(song_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e, E>(db: E, id: i64) -> sqlx::Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let res = sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_by_user<'e, E>(db: E, user_id: i64) -> sqlx::Result<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let res = sqlx::query("DELETE FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete_by_song<'e, E>(db: E, song_id: i64) -> sqlx::Result<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let res = sqlx::query("DELETE FROM favorites WHERE song_id = ?")
            .bind(song_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }

    /// Songs a user has marked, in the order they were marked.
    pub async fn songs_for_user<'e, E>(db: E, user_id: i64) -> sqlx::Result<Vec<Song>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Song>(
            r#"
            SELECT s.id, s.title, s.artist, s.album, s.duration, s.year, s.genre, s.created_at
              FROM songs s
              JOIN favorites f ON f.song_id = s.id
             WHERE f.user_id = ?
             ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
