use crate::auth::{
    jwt::TokenService,
    password::PasswordHasher,
    repo::{PgUserStore, UserStore},
};
use crate::config::AppConfig;
use crate::db;
use crate::university::repo::{PgUniversityStore, UniversityStore};
use std::sync::Arc;

/// Shared, read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub university: Arc<dyn UniversityStore>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, sqlx::PgPool)> {
        let pool = db::connect(&config).await?;

        let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let university =
            Arc::new(PgUniversityStore::new(pool.clone())) as Arc<dyn UniversityStore>;

        let state = Self::from_parts(Arc::new(config), users, university)?;
        Ok((state, pool))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        university: Arc<dyn UniversityStore>,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        let hasher = Arc::new(PasswordHasher::new(config.password)?);
        Ok(Self {
            config,
            users,
            university,
            tokens,
            hasher,
        })
    }
}
