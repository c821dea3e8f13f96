//! Listing and detail contexts for the public feed surfaces.

use std::sync::Arc;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use uuid::Uuid;

use crate::application::pagination::Paginator;
use crate::application::repos::{FeedScope, GroupsRepo, PostsRepo, RepoError, UsersRepo};
use crate::domain::entities::{PostFeedRecord, UserRecord};
use crate::presentation::views::{
    AuthorView, FeedPageContext, GroupBadge, GroupPageContext, GroupView, PageObjView, PostCard,
    PostDetailContext, ProfilePageContext,
};

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unknown group")]
    UnknownGroup,
    #[error("unknown author")]
    UnknownAuthor,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
        }
    }

    /// Global feed: every post, newest first.
    pub async fn index_page(&self, page: Option<&str>) -> Result<FeedPageContext, FeedError> {
        let records = self.posts.list_feed(FeedScope::All).await?;
        let page_obj = build_page_obj(records, page, "/");

        Ok(FeedPageContext { page_obj })
    }

    /// Posts assigned to the group behind `slug`.
    pub async fn group_page(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<GroupPageContext, FeedError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or(FeedError::UnknownGroup)?;

        let records = self.posts.list_feed(FeedScope::Group(group.id)).await?;
        let page_obj = build_page_obj(records, page, &format!("/group/{}", group.slug));

        Ok(GroupPageContext {
            group: GroupView {
                slug: group.slug,
                title: group.title,
                description: group.description,
            },
            page_obj,
        })
    }

    /// Posts written by the author behind `username`, plus their totals.
    pub async fn profile_page(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<ProfilePageContext, FeedError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FeedError::UnknownAuthor)?;

        let records = self.posts.list_feed(FeedScope::Author(author.id)).await?;
        let post_count = records.len();
        let page_obj = build_page_obj(records, page, &format!("/profile/{}", author.username));

        Ok(ProfilePageContext {
            author: author_view(&author, post_count),
            page_obj,
        })
    }

    /// One post and its author's total post count. `None` when the id does
    /// not resolve; the handler turns that into a uniform 404.
    pub async fn post_detail(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostDetailContext>, FeedError> {
        let Some(record) = self.posts.find_by_id(id).await? else {
            return Ok(None);
        };

        let post_count = self.posts.count_by_author(record.author_id).await? as usize;
        let can_edit = viewer.is_some_and(|viewer| viewer == record.author_id);

        Ok(Some(PostDetailContext {
            post: post_card(record),
            post_count,
            can_edit,
        }))
    }
}

fn author_view(author: &UserRecord, post_count: usize) -> AuthorView {
    AuthorView {
        username: author.username.clone(),
        display_name: author.display_name.clone(),
        post_count,
    }
}

fn build_page_obj(
    records: Vec<PostFeedRecord>,
    page: Option<&str>,
    base_path: &str,
) -> PageObjView {
    let page = Paginator::new(records).get_page(page);
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let next_page_number = page.next_page_number().unwrap_or(page.number);
    let previous_page_number = page.previous_page_number().unwrap_or(page.number);

    PageObjView {
        number: page.number,
        count: page.count,
        num_pages: page.num_pages,
        has_next,
        has_previous,
        next_page_number,
        previous_page_number,
        base_path: base_path.to_string(),
        posts: page.items.into_iter().map(post_card).collect(),
    }
}

pub(crate) fn post_card(record: PostFeedRecord) -> PostCard {
    PostCard {
        id: record.id.to_string(),
        body: record.body,
        author_username: record.author_username,
        group: match (record.group_slug, record.group_title) {
            (Some(slug), Some(title)) => Some(GroupBadge { slug, title }),
            _ => None,
        },
        published: format_published(record.created_at),
        iso_date: record
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.created_at.to_string()),
    }
}

fn format_published(when: OffsetDateTime) -> String {
    let format = format_description!("[day padding:none] [month repr:short] [year]");
    when.format(format)
        .unwrap_or_else(|_| when.date().to_string())
}
