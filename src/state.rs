use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::service::AuthService;
use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::content::ContentService;
use crate::repository::content::SqliteContentRepository;
use crate::repository::users::SqliteUserRepository;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub tokens: Arc<TokenKeys>,
    pub auth: Arc<AuthService>,
    pub content: Arc<ContentService>,
}

impl AppState {
    /// Wire repositories and services around an already-migrated pool.
    pub fn new(db: DbPool, config: Config) -> Self {
        let tokens = Arc::new(TokenKeys::from_config(&config.auth));
        let users = Arc::new(SqliteUserRepository::new(db.clone()));
        let content_repo = Arc::new(SqliteContentRepository::new(db.clone()));

        let auth = Arc::new(AuthService::new(
            users,
            content_repo.clone(),
            tokens.clone(),
            config.auth.bcrypt_cost,
        ));
        let content = Arc::new(ContentService::new(content_repo));

        Self {
            db,
            config,
            tokens,
            auth,
            content,
        }
    }
}
