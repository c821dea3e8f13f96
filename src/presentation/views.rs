use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
}

/// Navigation identity shown in the layout header.
#[derive(Clone)]
pub struct UserNavView {
    pub username: String,
    pub display_name: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub current_user: Option<UserNavView>,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub current_user: Option<UserNavView>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            current_user: chrome.current_user,
            content,
        }
    }
}

#[derive(Clone)]
pub struct GroupBadge {
    pub slug: String,
    pub title: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub id: String,
    pub body: String,
    pub author_username: String,
    pub group: Option<GroupBadge>,
    pub published: String,
    pub iso_date: String,
}

/// One page of post cards plus the navigation metadata the templates need.
#[derive(Clone)]
pub struct PageObjView {
    pub posts: Vec<PostCard>,
    pub number: usize,
    pub count: usize,
    pub num_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: usize,
    pub previous_page_number: usize,
    pub base_path: String,
}

pub struct FeedPageContext {
    pub page_obj: PageObjView,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<FeedPageContext>,
}

#[derive(Clone)]
pub struct GroupView {
    pub slug: String,
    pub title: String,
    pub description: String,
}

pub struct GroupPageContext {
    pub group: GroupView,
    pub page_obj: PageObjView,
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate {
    pub view: LayoutContext<GroupPageContext>,
}

#[derive(Clone)]
pub struct AuthorView {
    pub username: String,
    pub display_name: String,
    pub post_count: usize,
}

pub struct ProfilePageContext {
    pub author: AuthorView,
    pub page_obj: PageObjView,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfilePageContext>,
}

pub struct PostDetailContext {
    pub post: PostCard,
    pub post_count: usize,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

#[derive(Clone)]
pub struct GroupOptionView {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

/// Create/edit form state, re-rendered with field errors on rejection.
pub struct PostFormContext {
    pub action: String,
    pub is_edit: bool,
    pub text_value: String,
    pub groups: Vec<GroupOptionView>,
    pub text_error: Option<String>,
    pub group_error: Option<String>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub view: LayoutContext<PostFormContext>,
}

pub struct LoginContext {
    pub username_value: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the feed to continue reading.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
