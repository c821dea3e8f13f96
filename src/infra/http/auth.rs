//! Session cookie plumbing: the `AuthSession` extractor and the login and
//! logout handlers.

use axum::{
    extract::{Form, FromRef, FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::convert::Infallible;
use tracing::warn;

use crate::{
    application::auth::AuthError,
    domain::entities::UserRecord,
    presentation::views::{LayoutContext, LoginContext, LoginTemplate, render_template_response},
};

use super::public::HttpState;
use super::repo_error_to_http;

/// The requester's identity, resolved from the session cookie and handed to
/// each handler explicitly.
#[derive(Clone)]
pub struct AuthSession {
    pub user: Option<UserRecord>,
    pub token: Option<String>,
}

impl<S> FromRequestParts<S> for AuthSession
where
    HttpState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = HttpState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(token) = jar
            .get(&state.session_cookie)
            .map(|cookie| cookie.value().to_string())
        else {
            return Ok(Self {
                user: None,
                token: None,
            });
        };

        let user = match state.auth.authenticate(&token).await {
            Ok(user) => user,
            Err(err) => {
                // A failed lookup downgrades to an anonymous request; the
                // page itself still renders.
                warn!(
                    target = "bacheca::http::auth",
                    error = %err,
                    "session lookup failed"
                );
                None
            }
        };

        Ok(Self {
            user,
            token: Some(token),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginFormBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub(super) async fn login_form(State(state): State<HttpState>, session: AuthSession) -> Response {
    if session.user.is_some() {
        return Redirect::to("/").into_response();
    }

    let chrome = state.chrome(None);
    let content = LoginContext {
        username_value: String::new(),
        error: None,
    };
    render_template_response(
        LoginTemplate {
            view: LayoutContext::new(chrome, content),
        },
        StatusCode::OK,
    )
}

pub(super) async fn login(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<LoginFormBody>,
) -> Response {
    match state.auth.login(&form.username, &form.password).await {
        Ok(issued) => {
            let cookie = session_cookie(&state.session_cookie, issued.token);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            let chrome = state.chrome(None);
            let content = LoginContext {
                username_value: form.username,
                error: Some("Invalid username or password.".to_string()),
            };
            render_template_response(
                LoginTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(AuthError::Repo(err)) => {
            repo_error_to_http("infra::http::auth::login", err).into_response()
        }
        Err(err @ AuthError::Hashing(_)) => crate::application::error::HttpError::from_error(
            "infra::http::auth::login",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Login failed",
            &err,
        )
        .into_response(),
    }
}

pub(super) async fn logout(
    State(state): State<HttpState>,
    session: AuthSession,
    jar: CookieJar,
) -> Response {
    if let Some(token) = session.token.as_deref() {
        if let Err(err) = state.auth.logout(token).await {
            warn!(
                target = "bacheca::http::auth",
                error = %err,
                "failed to delete session"
            );
        }
    }

    let removal = Cookie::build((state.session_cookie.clone(), "")).path("/");
    (jar.remove(removal.build()), Redirect::to("/")).into_response()
}

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
