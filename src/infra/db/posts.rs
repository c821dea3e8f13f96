use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, FeedScope, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{PostFeedRecord, PostRecord};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const FEED_SELECT: &str = "SELECT p.id, p.body, p.author_id, u.username AS author_username, \
     p.group_id, g.slug AS group_slug, g.title AS group_title, \
     p.created_at, p.updated_at \
     FROM posts p \
     INNER JOIN users u ON u.id = p.author_id \
     LEFT JOIN groups g ON g.id = p.group_id";

#[derive(Debug, FromRow)]
struct PostFeedRow {
    id: Uuid,
    body: String,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_slug: Option<String>,
    group_title: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostFeedRow> for PostFeedRecord {
    fn from(row: PostFeedRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
            author_username: row.author_username,
            group_id: row.group_id,
            group_slug: row.group_slug,
            group_title: row.group_title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    body: String,
    author_id: Uuid,
    group_id: Option<Uuid>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
            group_id: row.group_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_feed(&self, scope: FeedScope) -> Result<Vec<PostFeedRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(FEED_SELECT);
        qb.push(" WHERE 1=1 ");

        match scope {
            FeedScope::All => {}
            FeedScope::Group(group_id) => {
                qb.push(" AND p.group_id = ");
                qb.push_bind(group_id);
            }
            FeedScope::Author(author_id) => {
                qb.push(" AND p.author_id = ");
                qb.push_bind(author_id);
            }
        }

        qb.push(" ORDER BY p.created_at DESC, p.id DESC ");

        let rows = qb
            .build_query_as::<PostFeedRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostFeedRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostFeedRecord>, RepoError> {
        let sql = format!("{FEED_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostFeedRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostFeedRecord::from))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (body, author_id, group_id) \
             VALUES ($1, $2, $3) \
             RETURNING id, body, author_id, group_id, created_at, updated_at",
        )
        .bind(&params.body)
        .bind(params.author_id)
        .bind(params.group_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            "UPDATE posts \
             SET body = $2, group_id = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, body, author_id, group_id, created_at, updated_at",
        )
        .bind(params.id)
        .bind(&params.body)
        .bind(params.group_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
