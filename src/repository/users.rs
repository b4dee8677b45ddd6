use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

use super::{is_unique_violation, RepositoryError};
use crate::db::models::User;
use crate::state::DbPool;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email is reported as `Conflict`.
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

pub type DynUserRepository = Arc<dyn UserRepository>;

pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.created_at
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict("Email already registered".into())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;

        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;

        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;

        Ok(user)
    }
}
