use std::{future::IntoFuture, process, sync::Arc};

use marquee::{
    application::{
        error::AppError,
        loader,
        movies::MovieService,
        posters::PosterService,
        repos::{HealthRepo, MoviesRepo, MoviesWriteRepo, PostersRepo, ReviewsRepo},
        reviews::ReviewService,
        trailers::TrailerService,
    },
    cache::{CacheBackend, CacheConfig, build_listing_cache, flush_listings},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, BodyLimits},
        storage::ObjectStorage,
        telemetry,
    },
};
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
    let chain = error.chain();
    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Load(args) => run_load(settings, args).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn build_movie_service(
    repositories: &Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<MovieService, AppError> {
    let reader: Arc<dyn MoviesRepo> = repositories.clone();
    let writer: Arc<dyn MoviesWriteRepo> = repositories.clone();
    let service = MovieService::new(reader, writer);

    let cache_config = CacheConfig::from(&settings.cache);
    Ok(match build_listing_cache(&cache_config).await? {
        Some(cache) => service.with_cache(cache, cache_config.ttl, cache_config.key_prefix),
        None => service,
    })
}

fn build_review_service(repositories: &Arc<PostgresRepositories>) -> ReviewService {
    let repo: Arc<dyn ReviewsRepo> = repositories.clone();
    ReviewService::new(repo)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let movies = Arc::new(build_movie_service(&repositories, &settings).await?);
    let reviews = Arc::new(build_review_service(&repositories));
    let posters_repo: Arc<dyn PostersRepo> = repositories.clone();
    let posters = Arc::new(PosterService::new(posters_repo));

    let storage = Arc::new(
        ObjectStorage::new(
            settings.trailers.directory.clone(),
            settings.trailers.public_base_url.clone(),
        )
        .map_err(InfraError::from)?,
    );
    let trailers = Arc::new(TrailerService::new(movies.clone(), storage.clone()));
    let health: Arc<dyn HealthRepo> = repositories.clone();

    let state = ApiState {
        movies,
        reviews,
        posters,
        trailers,
        storage,
        health,
    };

    // Limits were checked against usize when settings were loaded.
    let limits = BodyLimits {
        poster_bytes: settings.uploads.max_request_bytes.get() as usize,
        trailer_bytes: settings.trailers.max_request_bytes.get() as usize,
    };

    serve_http(&settings, http::build_router(state, limits)).await
}

async fn serve_http(settings: &config::Settings, router: axum::Router) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target: "marquee::server",
        addr = %settings.server.addr,
        "listening"
    );

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::pin!(server);

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = &mut server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target: "marquee::server",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target: "marquee::server", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target: "marquee::server",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
}

async fn run_load(settings: config::Settings, args: config::LoadArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    // Listings are not served here, so the importer runs without a cache.
    let reader: Arc<dyn MoviesRepo> = repositories.clone();
    let writer: Arc<dyn MoviesWriteRepo> = repositories.clone();
    let movies = MovieService::new(reader, writer);
    let reviews = build_review_service(&repositories);

    loader::load_catalog(&movies, &reviews, &args.file).await?;
    flush_shared_listings(&settings).await;
    Ok(())
}

/// A Redis listing cache may be shared with running servers; flush it once
/// so imported movies show up before the TTL runs out.
async fn flush_shared_listings(settings: &config::Settings) {
    let cache_config = CacheConfig::from(&settings.cache);
    if cache_config.backend != CacheBackend::Redis {
        return;
    }

    match build_listing_cache(&cache_config).await {
        Ok(Some(cache)) => {
            flush_listings(cache.as_ref(), &cache_config.key_prefix).await;
        }
        Ok(None) => {}
        Err(err) => {
            warn!(
                target: "marquee::loader",
                error = %err,
                "listing cache unavailable; cached listings expire after their TTL"
            );
        }
    }
}
