//! Create/edit workflow for posts: field validation, authorship gate,
//! persistence commands.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, GroupsRepo, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{PostFeedRecord, PostRecord};
use crate::presentation::views::GroupOptionView;

/// Raw submitted field values, exactly as the form posted them.
#[derive(Debug, Clone, Default)]
pub struct PostFormData {
    pub text: String,
    /// Group id as submitted; empty string means "no group".
    pub group: String,
}

/// Per-field messages surfaced on a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormErrors {
    pub text: Option<&'static str>,
    pub group: Option<&'static str>,
}

impl PostFormErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none()
    }
}

#[derive(Debug, Clone)]
struct ValidatedPost {
    body: String,
    group_id: Option<Uuid>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(PostRecord),
    Rejected(PostFormErrors),
}

#[derive(Debug)]
pub enum EditOutcome {
    Updated(PostRecord),
    Rejected(PostFormErrors),
    /// Requester is not the author. The caller redirects to the read-only
    /// detail view without surfacing an error.
    Forbidden,
    NotFound,
}

#[derive(Debug)]
pub enum EditFormOutcome {
    Editable(PostFeedRecord),
    Forbidden,
    NotFound,
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct ComposeService {
    posts: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
}

impl ComposeService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
    ) -> Self {
        Self {
            posts,
            writer,
            groups,
        }
    }

    /// Persist a new post attributed to `author_id`. The author always comes
    /// from the authenticated identity, never from the submitted form.
    pub async fn create(
        &self,
        author_id: Uuid,
        data: &PostFormData,
    ) -> Result<CreateOutcome, ComposeError> {
        match self.validate(data).await? {
            Err(errors) => Ok(CreateOutcome::Rejected(errors)),
            Ok(valid) => {
                let post = self
                    .writer
                    .create_post(CreatePostParams {
                        body: valid.body,
                        author_id,
                        group_id: valid.group_id,
                    })
                    .await?;
                Ok(CreateOutcome::Created(post))
            }
        }
    }

    /// Resolve a post for the edit form. The authorship gate applies before
    /// anything else.
    pub async fn load_for_edit(
        &self,
        editor_id: Uuid,
        post_id: Uuid,
    ) -> Result<EditFormOutcome, ComposeError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            return Ok(EditFormOutcome::NotFound);
        };
        if post.author_id != editor_id {
            return Ok(EditFormOutcome::Forbidden);
        }
        Ok(EditFormOutcome::Editable(post))
    }

    /// Apply an edit in place. Authorship is checked before validation; a
    /// non-author never observes validation results.
    pub async fn edit(
        &self,
        editor_id: Uuid,
        post_id: Uuid,
        data: &PostFormData,
    ) -> Result<EditOutcome, ComposeError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            return Ok(EditOutcome::NotFound);
        };
        if post.author_id != editor_id {
            return Ok(EditOutcome::Forbidden);
        }

        match self.validate(data).await? {
            Err(errors) => Ok(EditOutcome::Rejected(errors)),
            Ok(valid) => {
                let updated = self
                    .writer
                    .update_post(UpdatePostParams {
                        id: post.id,
                        body: valid.body,
                        group_id: valid.group_id,
                    })
                    .await?;
                Ok(EditOutcome::Updated(updated))
            }
        }
    }

    /// Group `<select>` options for the form, with the submitted choice
    /// marked selected.
    pub async fn group_options(
        &self,
        selected: &str,
    ) -> Result<Vec<GroupOptionView>, ComposeError> {
        let groups = self.groups.list_all().await?;
        Ok(groups
            .into_iter()
            .map(|group| {
                let id = group.id.to_string();
                let selected = id == selected;
                GroupOptionView {
                    id,
                    title: group.title,
                    selected,
                }
            })
            .collect())
    }

    /// Run the per-field validators in order and collect field messages.
    async fn validate(
        &self,
        data: &PostFormData,
    ) -> Result<Result<ValidatedPost, PostFormErrors>, RepoError> {
        let mut errors = PostFormErrors::default();

        let body = match validate_text(&data.text) {
            Ok(body) => Some(body),
            Err(message) => {
                errors.text = Some(message);
                None
            }
        };

        let group_id = match self.validate_group(&data.group).await? {
            Ok(group_id) => group_id,
            Err(message) => {
                errors.group = Some(message);
                None
            }
        };

        if errors.is_empty() {
            let body = body.expect("text validated when no field errors");
            Ok(Ok(ValidatedPost { body, group_id }))
        } else {
            Ok(Err(errors))
        }
    }

    async fn validate_group(
        &self,
        raw: &str,
    ) -> Result<Result<Option<Uuid>, &'static str>, RepoError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Ok(None));
        }

        let Ok(id) = raw.parse::<Uuid>() else {
            return Ok(Err(GROUP_INVALID));
        };

        match self.groups.find_by_id(id).await? {
            Some(group) => Ok(Ok(Some(group.id))),
            None => Ok(Err(GROUP_INVALID)),
        }
    }
}

const TEXT_REQUIRED: &str = "This field is required.";
const GROUP_INVALID: &str = "Select a valid group.";

fn validate_text(raw: &str) -> Result<String, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TEXT_REQUIRED);
    }
    Ok(trimmed.to_string())
}
