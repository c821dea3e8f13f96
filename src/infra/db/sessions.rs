use async_trait::async_trait;

use crate::application::repos::{RepoError, SessionsRepo};
use crate::domain::entities::{SessionRecord, UserRecord};

use super::PostgresRepositories;
use super::users::UserRow;
use super::util::map_sqlx_error;

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(&session.token_hash)
            .bind(session.user_id)
            .bind(session.created_at)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.display_name, u.password_hash, \
             u.created_at, u.updated_at \
             FROM sessions s \
             INNER JOIN users u ON u.id = s.user_id \
             WHERE s.token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
