use sqlx::{Executor, QueryBuilder, Sqlite};
use time::OffsetDateTime;

use super::{
    dto::{CreateSongRequest, SearchQuery},
    repo_types::Song,
};

impl Song {
    pub async fn list<'e, E>(db: E) -> sqlx::Result<Vec<Song>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, artist, album, duration, year, genre, created_at
            FROM songs
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id<'e, E>(db: E, id: i64) -> sqlx::Result<Option<Song>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, artist, album, duration, year, genre, created_at
            FROM songs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create<'e, E>(db: E, new: &CreateSongRequest) -> sqlx::Result<Song>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (title, artist, album, duration, year, genre, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, artist, album, duration, year, genre, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.artist)
        .bind(&new.album)
        .bind(new.duration)
        .bind(new.year)
        .bind(&new.genre)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
    }

    pub async fn save<'e, E>(&self, db: E) -> sqlx::Result<Song>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Song>(
            r#"
            UPDATE songs
               SET title = ?, artist = ?, album = ?, duration = ?, year = ?, genre = ?
             WHERE id = ?
            RETURNING id, title, artist, album, duration, year, genre, created_at
            "#,
        )
        .bind(&self.title)
        .bind(&self.artist)
        .bind(&self.album)
        .bind(self.duration)
        .bind(self.year)
        .bind(&self.genre)
        .bind(self.id)
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e, E>(db: E, id: i64) -> sqlx::Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let res = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Title and artist match as case-insensitive substrings, genre as a
    /// case-insensitive exact value. Filters are AND-combined.
    pub async fn search<'e, E>(db: E, q: &SearchQuery) -> sqlx::Result<Vec<Song>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, artist, album, duration, year, genre, created_at FROM songs WHERE 1 = 1",
        );
        if let Some(title) = q.title() {
            qb.push(" AND instr(lower(title), lower(")
                .push_bind(title.to_string())
                .push(")) > 0");
        }
        if let Some(artist) = q.artist() {
            qb.push(" AND instr(lower(artist), lower(")
                .push_bind(artist.to_string())
                .push(")) > 0");
        }
        if let Some(genre) = q.genre() {
            qb.push(" AND lower(genre) = lower(")
                .push_bind(genre.to_string())
                .push(")");
        }
        qb.push(" ORDER BY id");

        qb.build_query_as::<Song>().fetch_all(db).await
    }
}
