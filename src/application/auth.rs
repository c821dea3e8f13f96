//! Session authentication: login, logout, bearer-cookie resolution.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, SessionsRepo, UsersRepo};
use crate::domain::entities::{SessionRecord, UserRecord};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct SessionIssued {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<dyn SessionsRepo>) -> Self {
        Self { users, sessions }
    }

    /// Verify credentials and issue an opaque session token. Only the
    /// sha-256 of the token is stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionIssued, AuthError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed =
            PasswordHash::new(&user.password_hash).map_err(|_| AuthError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let token = generate_token();
        self.sessions
            .insert_session(SessionRecord {
                token_hash: hash_token(&token),
                user_id: user.id,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;

        Ok(SessionIssued { token, user })
    }

    /// Resolve a bearer token back to its user, if the session exists.
    pub async fn authenticate(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        self.sessions
            .find_user_by_token_hash(&hash_token(token))
            .await
    }

    pub async fn logout(&self, token: &str) -> Result<(), RepoError> {
        self.sessions.delete_session(&hash_token(token)).await
    }
}

/// Hash a plain password for storage. Used by the `create-user` command.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
