use std::{process, sync::Arc};

use bacheca::{
    application::{
        auth::{AuthService, hash_password},
        compose::ComposeService,
        error::AppError,
        feed::FeedService,
        repos::{
            CreateUserParams, GroupsRepo, PostsRepo, PostsWriteRepo, RepoError, SessionsRepo,
            UsersRepo,
        },
    },
    config,
    domain::error::DomainError,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{HttpState, build_router},
        telemetry,
    },
};
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::CreateUser(args) => run_create_user(settings, args).await,
    }
}

async fn connect(settings: &config::Settings) -> Result<PostgresRepositories, AppError> {
    let pool = PostgresRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| InfraError::database(err.to_string()))?;

    Ok(PostgresRepositories::new(pool))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repos = connect(&settings).await?;
    PostgresRepositories::run_migrations(repos.pool())
        .await
        .map_err(|err| InfraError::database(format!("migrations failed: {err}")))?;

    let repos = Arc::new(repos);
    let posts: Arc<dyn PostsRepo> = repos.clone();
    let posts_write: Arc<dyn PostsWriteRepo> = repos.clone();
    let groups: Arc<dyn GroupsRepo> = repos.clone();
    let users: Arc<dyn UsersRepo> = repos.clone();
    let sessions: Arc<dyn SessionsRepo> = repos.clone();

    let feed = Arc::new(FeedService::new(
        posts.clone(),
        groups.clone(),
        users.clone(),
    ));
    let compose = Arc::new(ComposeService::new(posts, posts_write, groups));
    let auth = Arc::new(AuthService::new(users, sessions));

    let state = HttpState {
        feed,
        compose,
        auth,
        brand_title: settings.site.brand_title.clone(),
        session_cookie: settings.site.session_cookie.clone(),
    };
    let router = build_router(state);

    let listener = TcpListener::bind((settings.server.host.as_str(), settings.server.port))
        .await
        .map_err(InfraError::from)?;
    let local_addr = listener.local_addr().map_err(InfraError::from)?;
    info!(
        target = "bacheca::server",
        addr = %local_addr,
        "listening"
    );

    let drain_timeout = settings.server.graceful_shutdown;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(drain_timeout))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let repos = connect(&settings).await?;
    PostgresRepositories::run_migrations(repos.pool())
        .await
        .map_err(|err| InfraError::database(format!("migrations failed: {err}")))?;

    info!(target = "bacheca::migrate", "migrations applied");
    Ok(())
}

async fn run_create_user(
    settings: config::Settings,
    args: config::CreateUserArgs,
) -> Result<(), AppError> {
    let repos = connect(&settings).await?;
    PostgresRepositories::run_migrations(repos.pool())
        .await
        .map_err(|err| InfraError::database(format!("migrations failed: {err}")))?;

    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").map_err(InfraError::from)?,
    };
    if password.trim().is_empty() {
        return Err(DomainError::validation("password must not be empty").into());
    }
    if args.username.trim().is_empty() {
        return Err(DomainError::validation("username must not be empty").into());
    }

    let password_hash =
        hash_password(&password).map_err(|err| AppError::unexpected(err.to_string()))?;

    let repos = Arc::new(repos);
    let users: Arc<dyn UsersRepo> = repos;
    let user = users
        .create_user(CreateUserParams {
            username: args.username.trim().to_string(),
            display_name: args
                .display_name
                .unwrap_or_else(|| args.username.trim().to_string()),
            password_hash,
        })
        .await
        .map_err(|err| match err {
            RepoError::Duplicate { .. } => {
                DomainError::validation("username is already taken").into()
            }
            other => AppError::unexpected(other.to_string()),
        })?;

    info!(
        target = "bacheca::create_user",
        username = %user.username,
        "user created"
    );
    Ok(())
}

async fn shutdown_signal(drain_timeout: std::time::Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(
        target = "bacheca::server",
        timeout_secs = drain_timeout.as_secs(),
        "shutdown requested, draining connections"
    );

    // Force exit if connections refuse to drain within the window.
    tokio::spawn(async move {
        tokio::time::sleep(drain_timeout).await;
        error!(
            target = "bacheca::server",
            "drain window elapsed, exiting"
        );
        process::exit(1);
    });
}
