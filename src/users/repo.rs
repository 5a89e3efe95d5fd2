use sqlx::{Executor, Sqlite};
use time::OffsetDateTime;

use super::repo_types::{NewUser, User};

impl User {
    pub async fn find_by_id<'e, E>(db: E, id: i64) -> sqlx::Result<Option<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, registered_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Exact, case-sensitive match.
    pub async fn find_by_email<'e, E>(db: E, email: &str) -> sqlx::Result<Option<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, registered_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn list<'e, E>(db: E) -> sqlx::Result<Vec<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, registered_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await
    }

    /// New accounts start active.
    pub async fn create<'e, E>(db: E, new: NewUser<'_>) -> sqlx::Result<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, active, registered_at)
            VALUES (?, ?, ?, ?, 1, ?)
            RETURNING id, name, email, password_hash, role, active, registered_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
    }

    /// Writes every mutable column from `self`.
    pub async fn save<'e, E>(&self, db: E) -> sqlx::Result<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = ?, email = ?, password_hash = ?, role = ?, active = ?
             WHERE id = ?
            RETURNING id, name, email, password_hash, role, active, registered_at
            "#,
        )
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(self.role)
        .bind(self.active)
        .bind(self.id)
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e, E>(db: E, id: i64) -> sqlx::Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
