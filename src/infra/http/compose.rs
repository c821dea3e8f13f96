//! Create and edit form handlers.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::compose::{
        ComposeError, CreateOutcome, EditFormOutcome, EditOutcome, PostFormData, PostFormErrors,
    },
    domain::entities::UserRecord,
    presentation::views::{
        GroupOptionView, LayoutChrome, LayoutContext, PostFormContext, PostFormTemplate,
        render_not_found_response, render_template_response,
    },
};

use super::auth::AuthSession;
use super::public::HttpState;
use super::repo_error_to_http;

const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Deserialize)]
pub(super) struct PostFormBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    group: String,
}

impl PostFormBody {
    fn into_data(self) -> PostFormData {
        PostFormData {
            text: self.text,
            group: self.group,
        }
    }
}

pub(super) async fn create_form(State(state): State<HttpState>, session: AuthSession) -> Response {
    let Some(user) = session.user else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let chrome = state.chrome(Some(&user));

    let groups = match state.compose.group_options("").await {
        Ok(groups) => groups,
        Err(err) => return compose_error_to_response("infra::http::compose::create_form", err),
    };

    let content = blank_form(groups);
    render_form(chrome, content, StatusCode::OK)
}

pub(super) async fn create(
    State(state): State<HttpState>,
    session: AuthSession,
    Form(form): Form<PostFormBody>,
) -> Response {
    let Some(user) = session.user else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let data = form.into_data();
    match state.compose.create(user.id, &data).await {
        Ok(CreateOutcome::Created(post)) => {
            tracing::info!(
                target = "bacheca::compose",
                post_id = %post.id,
                author = %user.username,
                "post created"
            );
            Redirect::to(&format!("/profile/{}", user.username)).into_response()
        }
        Ok(CreateOutcome::Rejected(errors)) => {
            rerender_with_errors(&state, &user, None, &data, errors).await
        }
        Err(err) => compose_error_to_response("infra::http::compose::create", err),
    }
}

pub(super) async fn edit_form(
    State(state): State<HttpState>,
    session: AuthSession,
    Path(post_id): Path<String>,
) -> Response {
    let Some(user) = session.user else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let chrome = state.chrome(Some(&user));

    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(chrome);
    };

    match state.compose.load_for_edit(user.id, post_id).await {
        Ok(EditFormOutcome::Editable(post)) => {
            let selected = post
                .group_id
                .map(|id| id.to_string())
                .unwrap_or_default();
            let groups = match state.compose.group_options(&selected).await {
                Ok(groups) => groups,
                Err(err) => {
                    return compose_error_to_response("infra::http::compose::edit_form", err);
                }
            };

            let content = PostFormContext {
                action: format!("/posts/{post_id}/edit"),
                is_edit: true,
                text_value: post.body,
                groups,
                text_error: None,
                group_error: None,
            };
            render_form(chrome, content, StatusCode::OK)
        }
        Ok(EditFormOutcome::Forbidden) => detail_redirect(post_id),
        Ok(EditFormOutcome::NotFound) => render_not_found_response(chrome),
        Err(err) => compose_error_to_response("infra::http::compose::edit_form", err),
    }
}

pub(super) async fn edit(
    State(state): State<HttpState>,
    session: AuthSession,
    Path(post_id): Path<String>,
    Form(form): Form<PostFormBody>,
) -> Response {
    let Some(user) = session.user else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(state.chrome(Some(&user)));
    };

    let data = form.into_data();
    match state.compose.edit(user.id, post_id, &data).await {
        Ok(EditOutcome::Updated(post)) => detail_redirect(post.id),
        // Authorship gate: non-authors land on the read-only detail view
        // with no error surfaced.
        Ok(EditOutcome::Forbidden) => detail_redirect(post_id),
        Ok(EditOutcome::NotFound) => render_not_found_response(state.chrome(Some(&user))),
        Ok(EditOutcome::Rejected(errors)) => {
            rerender_with_errors(&state, &user, Some(post_id), &data, errors).await
        }
        Err(err) => compose_error_to_response("infra::http::compose::edit", err),
    }
}

fn detail_redirect(post_id: Uuid) -> Response {
    Redirect::to(&format!("/posts/{post_id}")).into_response()
}

fn blank_form(groups: Vec<GroupOptionView>) -> PostFormContext {
    PostFormContext {
        action: "/create".to_string(),
        is_edit: false,
        text_value: String::new(),
        groups,
        text_error: None,
        group_error: None,
    }
}

async fn rerender_with_errors(
    state: &HttpState,
    user: &UserRecord,
    edit_target: Option<Uuid>,
    data: &PostFormData,
    errors: PostFormErrors,
) -> Response {
    let groups = match state.compose.group_options(&data.group).await {
        Ok(groups) => groups,
        Err(err) => {
            return compose_error_to_response("infra::http::compose::rerender_with_errors", err);
        }
    };

    let content = PostFormContext {
        action: edit_target
            .map(|id| format!("/posts/{id}/edit"))
            .unwrap_or_else(|| "/create".to_string()),
        is_edit: edit_target.is_some(),
        text_value: data.text.clone(),
        groups,
        text_error: errors.text.map(str::to_string),
        group_error: errors.group.map(str::to_string),
    };

    render_form(state.chrome(Some(user)), content, StatusCode::OK)
}

fn render_form(chrome: LayoutChrome, content: PostFormContext, status: StatusCode) -> Response {
    let view = LayoutContext::new(chrome, content);
    render_template_response(PostFormTemplate { view }, status)
}

fn compose_error_to_response(source: &'static str, err: ComposeError) -> Response {
    match err {
        ComposeError::Repo(err) => repo_error_to_http(source, err).into_response(),
    }
}
