use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        auth::AuthService,
        compose::ComposeService,
        error::ErrorReport,
        feed::{FeedError, FeedService},
    },
    domain::entities::UserRecord,
    presentation::views::{
        BrandView, GroupTemplate, IndexTemplate, LayoutChrome, LayoutContext, PostDetailTemplate,
        ProfileTemplate, UserNavView, render_not_found_response, render_template_response,
    },
};

use super::auth::AuthSession;
use super::middleware::{log_responses, set_request_context};
use super::{auth, compose, repo_error_to_http};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub compose: Arc<ComposeService>,
    pub auth: Arc<AuthService>,
    pub brand_title: String,
    pub session_cookie: String,
}

impl HttpState {
    pub fn chrome(&self, user: Option<&UserRecord>) -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: self.brand_title.clone(),
            },
            current_user: user.map(|user| UserNavView {
                username: user.username.clone(),
                display_name: user.display_name.clone(),
            }),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}", get(group_list))
        .route("/profile/{username}", get(profile))
        .route("/posts/{post_id}", get(post_detail))
        .route("/create", get(compose::create_form).post(compose::create))
        .route(
            "/posts/{post_id}/edit",
            get(compose::edit_form).post(compose::edit),
        )
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

async fn index(
    State(state): State<HttpState>,
    session: AuthSession,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(session.user.as_ref());

    match state.feed.index_page(query.page.as_deref()).await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::index", err, chrome),
    }
}

async fn group_list(
    State(state): State<HttpState>,
    session: AuthSession,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(session.user.as_ref());

    match state.feed.group_page(&slug, query.page.as_deref()).await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(GroupTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::group_list", err, chrome),
    }
}

async fn profile(
    State(state): State<HttpState>,
    session: AuthSession,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(session.user.as_ref());

    match state
        .feed
        .profile_page(&username, query.page.as_deref())
        .await
    {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(ProfileTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::profile", err, chrome),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    session: AuthSession,
    Path(post_id): Path<String>,
) -> Response {
    let chrome = state.chrome(session.user.as_ref());

    // Unknown and malformed ids both resolve to the same 404 page.
    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(chrome);
    };

    let viewer = session.user.as_ref().map(|user| user.id);
    match state.feed.post_detail(post_id, viewer).await {
        Ok(Some(content)) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(PostDetailTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => feed_error_to_response("infra::http::public::post_detail", err, chrome),
    }
}

fn feed_error_to_response(
    source: &'static str,
    err: FeedError,
    chrome: LayoutChrome,
) -> Response {
    match err {
        FeedError::UnknownGroup => {
            let mut response = render_not_found_response(chrome);
            ErrorReport::from_message(source, StatusCode::NOT_FOUND, "Unknown group").attach(&mut response);
            response
        }
        FeedError::UnknownAuthor => {
            let mut response = render_not_found_response(chrome);
            ErrorReport::from_message(source, StatusCode::NOT_FOUND, "Unknown author").attach(&mut response);
            response
        }
        FeedError::Repo(err) => repo_error_to_http(source, err).into_response(),
    }
}
