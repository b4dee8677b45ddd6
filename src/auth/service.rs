use std::sync::{Arc, OnceLock};

use super::password::{hash_password, verify_password};
use super::token::TokenKeys;
use super::validation::{validate_email, validate_name, validate_password};
use crate::content::{user_relations, PublicUser, UserWithRelations};
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::repository::content::DynContentRepository;
use crate::repository::now_timestamp;
use crate::repository::users::DynUserRepository;

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SigninOutcome {
    pub user: UserWithRelations,
    pub token: String,
}

pub struct AuthService {
    users: DynUserRepository,
    content: DynContentRepository,
    tokens: Arc<TokenKeys>,
    bcrypt_cost: u32,
    /// Hash checked when the email is unknown, so both failure paths pay
    /// the same bcrypt cost.
    dummy_hash: OnceLock<String>,
}

impl AuthService {
    pub fn new(
        users: DynUserRepository,
        content: DynContentRepository,
        tokens: Arc<TokenKeys>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            content,
            tokens,
            bcrypt_cost,
            dummy_hash: OnceLock::new(),
        }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AppResult<SignupOutcome> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        validate_password(password)?;

        let user = User {
            id: uuid::Uuid::now_v7().to_string(),
            name,
            email,
            password_hash: hash_password(password, self.bcrypt_cost)?,
            created_at: now_timestamp(),
        };
        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "User signed up");

        let token = self.tokens.issue(&user.id)?;
        Ok(SignupOutcome {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn signin(&self, email: &str, password: &str) -> AppResult<SigninOutcome> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are required".into(),
            ));
        }
        let email = validate_email(email)?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            Some(_) => return Err(AppError::NotFound("User not found".into())),
            None => {
                verify_password(password, self.dummy_hash());
                return Err(AppError::NotFound("User not found".into()));
            }
        };

        let token = self.tokens.issue(&user.id)?;
        let relations = user_relations(self.content.as_ref(), &user).await?;
        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SigninOutcome {
            user: relations,
            token,
        })
    }

    fn dummy_hash(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            hash_password("skillswap-dummy-password", self.bcrypt_cost).unwrap_or_else(|e| {
                tracing::error!("Failed to build dummy password hash: {}", e);
                String::new()
            })
        })
    }

    pub async fn me(&self, user_id: &str) -> AppResult<UserWithRelations> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user_relations(self.content.as_ref(), &user).await
    }

    /// Resolve a bearer token to a live user. Tokens for users that no longer
    /// exist are rejected.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.tokens.verify(token)?;
        self.users
            .find_by_id(&claims.id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
