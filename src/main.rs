use std::{process, sync::Arc};

use postdesk::{
    application::{
        admin::{
            posts::AdminPostService, stats::StatsOverviewService, tags::AdminPostTagsService,
        },
        error::AppError,
        repos::{CategoriesRepo, PostsRepo, PostsWriteRepo, TagsRepo, TagsWriteRepo},
        resource::PostResource,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, IdentityHeaders},
        telemetry,
        uploads::MediaStorage,
    },
};
use sqlx::PgPool;
use tokio::time::timeout;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn connect(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!(target = "postdesk::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let admin_state = build_admin_state(repositories, &settings)?;
    serve_http(&settings, admin_state).await
}

fn build_admin_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<AdminState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let tags_repo: Arc<dyn TagsRepo> = repositories.clone();
    let tags_write_repo: Arc<dyn TagsWriteRepo> = repositories.clone();

    let media = Arc::new(
        MediaStorage::new(settings.uploads.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let resource = Arc::new(PostResource::new(settings.admin.badge_threshold));
    let posts = Arc::new(AdminPostService::new(
        resource,
        posts_repo.clone(),
        posts_write_repo,
        categories_repo,
    ));
    let tags = Arc::new(AdminPostTagsService::new(
        posts_repo.clone(),
        tags_repo,
        tags_write_repo,
    ));
    let stats = Arc::new(StatsOverviewService::new(posts_repo));

    Ok(AdminState {
        db: repositories,
        posts,
        tags,
        stats,
        media,
        upload_limit_bytes: settings.uploads.max_request_bytes.get(),
        per_page: settings.admin.per_page.get(),
        identity: IdentityHeaders {
            user: settings.admin.user_header.clone(),
            roles: settings.admin.roles_header.clone(),
        },
    })
}

async fn serve_http(settings: &config::Settings, admin_state: AdminState) -> Result<(), AppError> {
    let router = http::build_admin_router(admin_state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "postdesk::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = drain_tx.send(());
        },
    );

    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        _ = drain_rx => {}
    }

    match timeout(grace, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target = "postdesk::serve",
                seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "postdesk::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target = "postdesk::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "postdesk::serve", "Shutdown signal received");
}
