use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    auth::{JwtKeys, PasswordHasher},
    config::AppConfig,
    db,
    users::{NewUser, Role, User},
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    /// Connects, applies the schema and creates the bootstrap admin if one
    /// is configured.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config).await?;
        db::migrate(&db).await?;
        let state = Self::from_parts(db, Arc::new(config))?;
        state.ensure_admin().await?;
        Ok(state)
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt);
        let hasher = PasswordHasher::new(&config.hashing)?;
        Ok(Self {
            db,
            config,
            keys,
            hasher,
        })
    }

    /// Fresh in-memory store with test settings.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::for_tests()).await
    }

    async fn ensure_admin(&self) -> anyhow::Result<()> {
        let Some(admin) = self.config.admin.as_ref() else {
            return Ok(());
        };
        if User::find_by_email(&self.db, &admin.email).await?.is_some() {
            return Ok(());
        }
        let hash = self.hasher.hash(&admin.password)?;
        let user = User::create(
            &self.db,
            NewUser {
                name: &admin.name,
                email: &admin.email,
                password_hash: &hash,
                role: Role::Admin,
            },
        )
        .await?;
        info!(user_id = user.id, email = %user.email, "bootstrap admin created");
        Ok(())
    }
}
