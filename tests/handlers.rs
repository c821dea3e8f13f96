//! Handler tests driving the full router with simulated HTTP requests
//! against in-memory repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use bacheca::application::auth::{AuthService, hash_password};
use bacheca::application::compose::ComposeService;
use bacheca::application::feed::FeedService;
use bacheca::application::repos::{
    CreatePostParams, CreateUserParams, FeedScope, GroupsRepo, PostsRepo, PostsWriteRepo,
    RepoError, SessionsRepo, UpdatePostParams, UsersRepo,
};
use bacheca::domain::entities::{
    GroupRecord, PostFeedRecord, PostRecord, SessionRecord, UserRecord,
};
use bacheca::infra::http::{HttpState, build_router};

const SESSION_COOKIE: &str = "bacheca_session";
const PASSWORD: &str = "letmein-sesame";

#[derive(Debug, Clone)]
struct StoredPost {
    record: PostRecord,
    seq: u64,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<StoredPost>,
    sessions: Vec<SessionRecord>,
    next_seq: u64,
}

/// All repository traits over one mutex-guarded store, standing in for the
/// Postgres implementations.
#[derive(Default)]
struct MemoryRepos {
    state: Mutex<MemoryState>,
}

impl MemoryRepos {
    async fn seed_user(&self, username: &str, password_hash: &str) -> UserRecord {
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.users.push(user.clone());
        user
    }

    async fn seed_group(&self, slug: &str, title: &str) -> GroupRecord {
        let now = OffsetDateTime::now_utc();
        let group = GroupRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: format!("About {title}"),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.groups.push(group.clone());
        group
    }

    async fn seed_post(
        &self,
        author: &UserRecord,
        group: Option<&GroupRecord>,
        body: &str,
    ) -> PostRecord {
        let now = OffsetDateTime::now_utc();
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        let record = PostRecord {
            id: Uuid::new_v4(),
            body: body.to_string(),
            author_id: author.id,
            group_id: group.map(|group| group.id),
            created_at: now,
            updated_at: now,
        };
        state.posts.push(StoredPost {
            record: record.clone(),
            seq,
        });
        record
    }

    async fn post_count(&self) -> usize {
        self.state.lock().await.posts.len()
    }

    async fn post_body(&self, id: Uuid) -> Option<String> {
        self.state
            .lock()
            .await
            .posts
            .iter()
            .find(|stored| stored.record.id == id)
            .map(|stored| stored.record.body.clone())
    }

    fn feed_record(state: &MemoryState, stored: &StoredPost) -> PostFeedRecord {
        let author = state
            .users
            .iter()
            .find(|user| user.id == stored.record.author_id)
            .expect("post author must exist");
        let group = stored
            .record
            .group_id
            .and_then(|id| state.groups.iter().find(|group| group.id == id));

        PostFeedRecord {
            id: stored.record.id,
            body: stored.record.body.clone(),
            author_id: author.id,
            author_username: author.username.clone(),
            group_id: stored.record.group_id,
            group_slug: group.map(|group| group.slug.clone()),
            group_title: group.map(|group| group.title.clone()),
            created_at: stored.record.created_at,
            updated_at: stored.record.updated_at,
        }
    }
}

#[async_trait]
impl PostsRepo for MemoryRepos {
    async fn list_feed(&self, scope: FeedScope) -> Result<Vec<PostFeedRecord>, RepoError> {
        let state = self.state.lock().await;
        let mut matching: Vec<&StoredPost> = state
            .posts
            .iter()
            .filter(|stored| match scope {
                FeedScope::All => true,
                FeedScope::Group(group_id) => stored.record.group_id == Some(group_id),
                FeedScope::Author(author_id) => stored.record.author_id == author_id,
            })
            .collect();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(matching
            .into_iter()
            .map(|stored| Self::feed_record(&state, stored))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostFeedRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .find(|stored| stored.record.id == id)
            .map(|stored| Self::feed_record(&state, stored)))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .filter(|stored| stored.record.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepos {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        let record = PostRecord {
            id: Uuid::new_v4(),
            body: params.body,
            author_id: params.author_id,
            group_id: params.group_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(StoredPost {
            record: record.clone(),
            seq,
        });
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        let stored = state
            .posts
            .iter_mut()
            .find(|stored| stored.record.id == params.id)
            .ok_or(RepoError::NotFound)?;
        stored.record.body = params.body;
        stored.record.group_id = params.group_id;
        stored.record.updated_at = OffsetDateTime::now_utc();
        Ok(stored.record.clone())
    }
}

#[async_trait]
impl GroupsRepo for MemoryRepos {
    async fn list_all(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let mut groups = self.state.lock().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .groups
            .iter()
            .find(|group| group.id == id)
            .cloned())
    }
}

#[async_trait]
impl UsersRepo for MemoryRepos {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|user| user.username == params.username)
        {
            return Err(RepoError::Duplicate {
                constraint: "users_username_key".to_string(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            display_name: params.display_name,
            password_hash: params.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl SessionsRepo for MemoryRepos {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        self.state.lock().await.sessions.push(session);
        Ok(())
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .find(|session| session.token_hash == token_hash)
            .and_then(|session| {
                state
                    .users
                    .iter()
                    .find(|user| user.id == session.user_id)
                    .cloned()
            }))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError> {
        self.state
            .lock()
            .await
            .sessions
            .retain(|session| session.token_hash != token_hash);
        Ok(())
    }
}

struct TestApp {
    router: Router,
    repos: Arc<MemoryRepos>,
}

fn test_app() -> TestApp {
    let repos = Arc::new(MemoryRepos::default());

    let posts: Arc<dyn PostsRepo> = repos.clone();
    let posts_write: Arc<dyn PostsWriteRepo> = repos.clone();
    let groups: Arc<dyn GroupsRepo> = repos.clone();
    let users: Arc<dyn UsersRepo> = repos.clone();
    let sessions: Arc<dyn SessionsRepo> = repos.clone();

    let state = HttpState {
        feed: Arc::new(FeedService::new(
            posts.clone(),
            groups.clone(),
            users.clone(),
        )),
        compose: Arc::new(ComposeService::new(posts, posts_write, groups)),
        auth: Arc::new(AuthService::new(users, sessions)),
        brand_title: "Bacheca".to_string(),
        session_cookie: SESSION_COOKIE.to_string(),
    };

    TestApp {
        router: build_router(state),
        repos,
    }
}

impl TestApp {
    async fn seed_author(&self, username: &str) -> UserRecord {
        // Placeholder hash: never parses, so the account cannot log in.
        self.repos.seed_user(username, "!seed-only").await
    }

    async fn seed_login_user(&self, username: &str) -> UserRecord {
        let hash = hash_password(PASSWORD).expect("hash password");
        self.repos.seed_user(username, &hash).await
    }

    async fn login(&self, username: &str) -> String {
        let body = format!("username={username}&password={PASSWORD}");
        let response = self.post_form("/auth/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login must succeed");

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a session cookie")
            .to_str()
            .expect("cookie is ascii");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    async fn get(&self, path: &str) -> Response<Body> {
        self.get_with_cookie(path, None).await
    }

    async fn get_with_cookie(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    async fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

fn card_count(body: &str) -> usize {
    body.matches("<article class=\"post-card\">").count()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect carries a location")
        .to_str()
        .expect("location is ascii")
}

// ============ Listings and pagination ============

#[tokio::test]
async fn listings_hold_ten_of_thirteen_on_page_one() {
    let app = test_app();
    let author = app.seed_author("auth").await;
    let group = app.repos.seed_group("test-slug", "Test group").await;
    for n in 0..13 {
        app.repos
            .seed_post(&author, Some(&group), &format!("entry-{n}"))
            .await;
    }

    for path in ["/", "/group/test-slug", "/profile/auth"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_text(response).await;
        assert_eq!(card_count(&body), 10, "{path} page 1");
        assert!(body.contains("Page 1 of 2"), "{path}");
    }

    for path in ["/?page=2", "/group/test-slug?page=2", "/profile/auth?page=2"] {
        let body = body_text(app.get(path).await).await;
        assert_eq!(card_count(&body), 3, "{path}");
    }
}

#[tokio::test]
async fn listings_are_newest_first() {
    let app = test_app();
    let author = app.seed_author("auth").await;
    let group = app.repos.seed_group("g", "G").await;
    app.repos.seed_post(&author, Some(&group), "older-entry").await;
    app.repos.seed_post(&author, Some(&group), "newer-entry").await;

    for path in ["/", "/group/g", "/profile/auth"] {
        let body = body_text(app.get(path).await).await;
        let newer = body.find("newer-entry").expect("newer entry rendered");
        let older = body.find("older-entry").expect("older entry rendered");
        assert!(newer < older, "{path} must list newest first");
    }
}

#[tokio::test]
async fn out_of_range_and_junk_page_numbers_never_fail() {
    let app = test_app();
    let author = app.seed_author("auth").await;
    for n in 0..13 {
        app.repos.seed_post(&author, None, &format!("entry-{n}")).await;
    }

    let body = body_text(app.get("/?page=99").await).await;
    assert_eq!(card_count(&body), 3, "clamped to the last page");

    let body = body_text(app.get("/?page=abc").await).await;
    assert_eq!(card_count(&body), 10, "non-numeric falls back to page 1");

    let body = body_text(app.get("/?page=0").await).await;
    assert_eq!(card_count(&body), 10, "zero resolves to a valid page");
}

#[tokio::test]
async fn group_listing_shows_only_that_groups_posts() {
    let app = test_app();
    let author = app.seed_author("auth").await;
    let group_a = app.repos.seed_group("group-a", "Group A").await;
    app.repos.seed_group("group-b", "Group B").await;
    app.repos
        .seed_post(&author, Some(&group_a), "post-in-group-a")
        .await;

    let response = app.get("/group/group-b").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(
        !body.contains("post-in-group-a"),
        "group B must not leak group A posts"
    );
    assert!(body.contains("data-count=\"0\""));
    assert!(body.contains("No posts yet."));

    let body = body_text(app.get("/group/group-a").await).await;
    assert!(body.contains("post-in-group-a"));
    assert!(body.contains("data-count=\"1\""));
}

#[tokio::test]
async fn unknown_slug_and_username_are_404() {
    let app = test_app();

    let response = app.get("/group/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Page Not Found"));

    let response = app.get("/profile/nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============ Post detail ============

#[tokio::test]
async fn detail_shows_post_and_author_total() {
    let app = test_app();
    let author = app.seed_author("auth").await;
    app.repos.seed_post(&author, None, "first").await;
    app.repos.seed_post(&author, None, "second").await;
    let post = app.repos.seed_post(&author, None, "third").await;

    let response = app.get(&format!("/posts/{}", post.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("third"));
    assert!(body.contains("(3 posts)"));
}

#[tokio::test]
async fn detail_unknown_id_is_404() {
    let app = test_app();
    app.seed_author("auth").await;

    let response = app.get(&format!("/posts/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed ids resolve to the same page rather than a parse error.
    let response = app.get("/posts/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============ Create workflow ============

#[tokio::test]
async fn create_requires_a_session() {
    let app = test_app();

    let response = app.get("/create").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let response = app.post_form("/create", "text=hello", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
    assert_eq!(app.repos.post_count().await, 0);
}

#[tokio::test]
async fn created_post_lands_on_top_of_every_listing() {
    let app = test_app();
    let user = app.seed_login_user("poster").await;
    let group = app.repos.seed_group("announcements", "Announcements").await;
    app.repos
        .seed_post(&user, Some(&group), "previous-entry")
        .await;

    let cookie = app.login("poster").await;
    let body = format!("text=fresh-entry&group={}", group.id);
    let response = app.post_form("/create", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/poster");

    for path in ["/", "/group/announcements", "/profile/poster"] {
        let body = body_text(app.get(path).await).await;
        let fresh = body.find("fresh-entry").expect("new post rendered");
        let previous = body.find("previous-entry").expect("old post rendered");
        assert!(fresh < previous, "{path} must lead with the new post");
    }
}

#[tokio::test]
async fn create_with_empty_text_rerenders_with_field_error() {
    let app = test_app();
    app.seed_login_user("poster").await;
    let cookie = app.login("poster").await;

    let response = app.post_form("/create", "text=", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert_eq!(app.repos.post_count().await, 0, "nothing may be persisted");

    // Whitespace-only text is rejected the same way.
    let response = app
        .post_form("/create", "text=+++&group=", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.repos.post_count().await, 0);
}

#[tokio::test]
async fn create_with_unknown_group_rerenders_with_field_error() {
    let app = test_app();
    app.seed_login_user("poster").await;
    let cookie = app.login("poster").await;

    let body = format!("text=hello&group={}", Uuid::new_v4());
    let response = app.post_form("/create", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Select a valid group."));
    assert!(page.contains("hello"), "submitted text is preserved");
    assert_eq!(app.repos.post_count().await, 0);

    let response = app
        .post_form("/create", "text=hello&group=not-a-uuid", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.repos.post_count().await, 0);
}

#[tokio::test]
async fn create_form_lists_groups() {
    let app = test_app();
    app.seed_login_user("poster").await;
    app.repos.seed_group("alpha", "Alpha").await;
    app.repos.seed_group("beta", "Beta").await;
    let cookie = app.login("poster").await;

    let response = app.get_with_cookie("/create", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("New post"));
    assert!(body.contains("Alpha"));
    assert!(body.contains("Beta"));
    assert!(!body.contains("Edit post"));
}

// ============ Edit workflow ============

#[tokio::test]
async fn author_can_edit_in_place() {
    let app = test_app();
    let author = app.seed_login_user("author").await;
    let group = app.repos.seed_group("g", "G").await;
    let post = app
        .repos
        .seed_post(&author, Some(&group), "original-text")
        .await;
    let cookie = app.login("author").await;

    let response = app
        .get_with_cookie(&format!("/posts/{}/edit", post.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Edit post"), "edit flag adjusts the heading");
    assert!(body.contains("original-text"), "form is pre-filled");
    assert!(body.contains("selected"), "current group is pre-selected");

    let response = app
        .post_form(
            &format!("/posts/{}/edit", post.id),
            "text=revised-text&group=",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}", post.id));

    assert_eq!(
        app.repos.post_body(post.id).await.as_deref(),
        Some("revised-text"),
        "same identifier, new body"
    );
    assert_eq!(app.repos.post_count().await, 1);
}

#[tokio::test]
async fn edit_validation_failure_rerenders_with_edit_flag() {
    let app = test_app();
    let author = app.seed_login_user("author").await;
    let post = app.repos.seed_post(&author, None, "original-text").await;
    let cookie = app.login("author").await;

    let response = app
        .post_form(
            &format!("/posts/{}/edit", post.id),
            "text=&group=",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Edit post"));
    assert_eq!(
        app.repos.post_body(post.id).await.as_deref(),
        Some("original-text"),
        "rejected edit must not mutate"
    );
}

#[tokio::test]
async fn non_author_edit_is_a_silent_redirect() {
    let app = test_app();
    let author = app.seed_login_user("author").await;
    app.seed_login_user("mallory").await;
    let post = app.repos.seed_post(&author, None, "original-text").await;
    let cookie = app.login("mallory").await;

    let response = app
        .get_with_cookie(&format!("/posts/{}/edit", post.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}", post.id));

    let response = app
        .post_form(
            &format!("/posts/{}/edit", post.id),
            "text=hijacked",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}", post.id));

    assert_eq!(
        app.repos.post_body(post.id).await.as_deref(),
        Some("original-text"),
        "text must be unchanged"
    );
}

#[tokio::test]
async fn edit_unknown_post_is_404() {
    let app = test_app();
    app.seed_login_user("author").await;
    let cookie = app.login("author").await;

    let response = app
        .get_with_cookie(&format!("/posts/{}/edit", Uuid::new_v4()), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============ Sessions ============

#[tokio::test]
async fn login_logout_round_trip() {
    let app = test_app();
    app.seed_login_user("walker").await;

    let cookie = app.login("walker").await;
    let body = body_text(app.get_with_cookie("/", Some(&cookie)).await).await;
    assert!(body.contains("Log out"));
    assert!(body.contains("walker"));

    let response = app.post_form("/auth/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The server-side session is gone; the old cookie no longer signs in.
    let body = body_text(app.get_with_cookie("/", Some(&cookie)).await).await;
    assert!(body.contains("Log in"));
}

#[tokio::test]
async fn bad_credentials_rerender_the_login_form() {
    let app = test_app();
    app.seed_login_user("walker").await;

    let response = app
        .post_form("/auth/login", "username=walker&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Invalid username or password."));

    let response = app
        .post_form("/auth/login", "username=ghost&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
