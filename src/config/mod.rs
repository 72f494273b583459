//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::cache::{
    CacheBackend, DEFAULT_KEY_PREFIX, DEFAULT_MEMORY_CAPACITY, DEFAULT_TTL_SECS, MAX_TTL_SECS,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "marquee";
const ENV_PREFIX: &str = "MARQUEE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_UPLOAD_REQUEST_LIMIT_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_TRAILER_DIR: &str = "media";
const DEFAULT_TRAILER_BASE_URL: &str = "http://127.0.0.1:8080/media";
const DEFAULT_TRAILER_REQUEST_LIMIT_BYTES: u64 = 200 * 1024 * 1024;

/// Command-line arguments for the Marquee binary.
#[derive(Debug, Parser)]
#[command(name = "marquee", version, about = "Marquee movie catalog service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MARQUEE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Import movies and reviews from a JSON catalog file.
    Load(LoadArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// JSON array of movies, each optionally carrying a `reviews` array.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Toggle the listing cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the listing cache backend (memory|redis).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the Redis connection URL used by the redis cache backend.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,

    /// Override how long cached listing pages live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the maximum poster upload request size in bytes.
    #[arg(long = "uploads-max-request-bytes", value_name = "BYTES")]
    pub uploads_max_request_bytes: Option<u64>,

    /// Override the trailer storage directory.
    #[arg(long = "trailers-directory", value_name = "PATH")]
    pub trailers_directory: Option<PathBuf>,

    /// Override the base URL stored trailers are published under.
    #[arg(long = "trailers-public-base-url", value_name = "URL")]
    pub trailers_public_base_url: Option<String>,

    /// Override the maximum trailer upload request size in bytes.
    #[arg(long = "trailers-max-request-bytes", value_name = "BYTES")]
    pub trailers_max_request_bytes: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub uploads: UploadSettings,
    pub trailers: TrailerSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    pub ttl: Duration,
    pub key_prefix: String,
    pub memory_capacity: NonZeroUsize,
}

/// Poster uploads are buffered in memory up to this size.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_request_bytes: NonZeroU64,
}

#[derive(Debug, Clone)]
pub struct TrailerSettings {
    pub directory: PathBuf,
    pub public_base_url: Url,
    pub max_request_bytes: NonZeroU64,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Load(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    uploads: RawUploadSettings,
    trailers: RawTrailerSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(backend) = overrides.cache_backend.as_ref() {
            self.cache.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(limit) = overrides.uploads_max_request_bytes {
            self.uploads.max_request_bytes = Some(limit);
        }
        if let Some(directory) = overrides.trailers_directory.as_ref() {
            self.trailers.directory = Some(directory.clone());
        }
        if let Some(url) = overrides.trailers_public_base_url.as_ref() {
            self.trailers.public_base_url = Some(url.clone());
        }
        if let Some(limit) = overrides.trailers_max_request_bytes {
            self.trailers.max_request_bytes = Some(limit);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            uploads,
            trailers,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            uploads: build_upload_settings(uploads)?,
            trailers: build_trailer_settings(trailers)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let backend = match cache.backend.as_deref() {
        Some(value) => CacheBackend::parse(value).ok_or_else(|| {
            LoadError::invalid(
                "cache.backend",
                format!("unknown backend `{value}`; expected `memory` or `redis`"),
            )
        })?,
        None => CacheBackend::default(),
    };

    let enabled = cache.enabled.unwrap_or(false);
    let redis_url = non_blank(cache.redis_url);
    if enabled && backend == CacheBackend::Redis && redis_url.is_none() {
        return Err(LoadError::invalid(
            "cache.redis_url",
            "required when the redis backend is enabled",
        ));
    }

    let ttl_secs = cache.ttl_seconds.unwrap_or(DEFAULT_TTL_SECS);
    if ttl_secs == 0 || ttl_secs > MAX_TTL_SECS {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            format!("must be between 1 and {MAX_TTL_SECS}"),
        ));
    }

    let key_prefix = non_blank(cache.key_prefix).unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());

    let memory_capacity = match cache.memory_capacity {
        Some(capacity) => usize::try_from(capacity).ok(),
        None => Some(DEFAULT_MEMORY_CAPACITY),
    }
    .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid(
                "cache.memory_capacity",
                "must be greater than zero and fit in usize",
            )
        })?;

    Ok(CacheSettings {
        enabled,
        backend,
        redis_url,
        ttl: Duration::from_secs(ttl_secs),
        key_prefix,
        memory_capacity,
    })
}

fn build_upload_settings(uploads: RawUploadSettings) -> Result<UploadSettings, LoadError> {
    let max_request_bytes = request_limit(
        uploads
            .max_request_bytes
            .unwrap_or(DEFAULT_UPLOAD_REQUEST_LIMIT_BYTES),
        "uploads.max_request_bytes",
    )?;

    Ok(UploadSettings { max_request_bytes })
}

fn build_trailer_settings(trailers: RawTrailerSettings) -> Result<TrailerSettings, LoadError> {
    let directory = trailers
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAILER_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "trailers.directory",
            "path must not be empty",
        ));
    }

    let raw_url = non_blank(trailers.public_base_url)
        .unwrap_or_else(|| DEFAULT_TRAILER_BASE_URL.to_string());
    let public_base_url = Url::parse(&raw_url).map_err(|err| {
        LoadError::invalid(
            "trailers.public_base_url",
            format!("invalid url `{raw_url}`: {err}"),
        )
    })?;
    if !matches!(public_base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "trailers.public_base_url",
            "scheme must be http or https",
        ));
    }

    let max_request_bytes = request_limit(
        trailers
            .max_request_bytes
            .unwrap_or(DEFAULT_TRAILER_REQUEST_LIMIT_BYTES),
        "trailers.max_request_bytes",
    )?;

    Ok(TrailerSettings {
        directory,
        public_base_url,
        max_request_bytes,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    backend: Option<String>,
    redis_url: Option<String>,
    ttl_seconds: Option<u64>,
    key_prefix: Option<String>,
    memory_capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUploadSettings {
    max_request_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTrailerSettings {
    directory: Option<PathBuf>,
    public_base_url: Option<String>,
    max_request_bytes: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn request_limit(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    let limit =
        NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))?;
    usize::try_from(value)
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    Ok(limit)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
