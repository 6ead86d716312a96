//! Transline - locale-aware text service.
//!
//! HTTP front for the text resolution pipeline:
//!
//! - Paths without a valid locale prefix are redirected to one
//! - `GET /<locale>/t/<key>?name=value` renders one text
//! - Any other path returns the loaded table as JSON
//! - Missing keys are registered after the response in the local environment

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Json, Router};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transline::cache::{CacheRegistry, MemoryTextCache, TextCache};
use transline::config::{Config, TextsConfig};
use transline::database::{
    Database, MemoryTextStore, MongoTextStore, TextEntry, TextRepository, TextStore,
};
use transline::{TextError, TextResult, TextService, Translator};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Query parameters that are not placeholder replacements.
const RESERVED_PARAMS: [&str; 2] = ["scope", "count"];

#[derive(Debug, Serialize)]
struct TablePayload {
    locale: String,
    scope: String,
    texts: Vec<TextEntry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("transline=info,mongodb=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Transline...");

    let config = Config::from_env();
    let texts = Arc::new(config.load_texts_config()?);
    info!("Environment: {:?}", config.app_env);
    info!(
        "Locales: {:?} (default {})",
        texts.locale_codes().collect::<Vec<_>>(),
        texts.default_locale
    );

    let store = open_store(&config, &texts).await?;
    let cache = open_cache(&texts)?;
    let repository = Arc::new(TextRepository::new(store, cache, &texts));
    let service = TextService::new(texts, repository, config.app_env);

    let app = Router::new()
        .fallback(handle)
        .with_state(Arc::new(service));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Transline stopped");
    Ok(())
}

async fn open_store(config: &Config, texts: &TextsConfig) -> TextResult<Arc<dyn TextStore>> {
    let Some(uri) = &config.mongodb_uri else {
        warn!("MONGODB_URI not set, texts are kept in memory");
        return Ok(Arc::new(MemoryTextStore::new()));
    };

    info!("Connecting to MongoDB...");
    let db = Database::connect(uri, config.database_name(texts)).await?;
    let store = MongoTextStore::open(&db, &texts.db.texts_table).await?;
    info!("Text store ready: {}", texts.db.texts_table);
    Ok(Arc::new(store))
}

fn open_cache(texts: &TextsConfig) -> TextResult<Option<Arc<dyn TextCache>>> {
    if !texts.cache.enabled {
        info!("Text cache disabled");
        return Ok(None);
    }

    match texts.cache.store.as_str() {
        "memory" | "moka" => {
            info!("Text cache: memory, lifetime {} min", texts.cache.lifetime);
            let cache: Arc<dyn TextCache> = Arc::new(MemoryTextCache::new(&CacheRegistry::new()));
            Ok(Some(cache))
        }
        other => Err(TextError::config(format!("unsupported cache store '{}'", other))),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn handle(
    State(service): State<Arc<TextService>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path();

    let target = service.router().redirect_url(path, uri.query());
    if !target.is_empty() {
        return Redirect::temporary(&format!("/{}", target)).into_response();
    }

    let mut translator = service.translator_for_path(path);
    let response = match respond(&mut translator, path, &params).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    };

    if translator.autosave_allowed()
        && let Err(e) = translator.save_texts().await
    {
        warn!("Failed to register missing keys: {}", e);
    }

    response
}

async fn respond(
    translator: &mut Translator,
    path: &str,
    params: &HashMap<String, String>,
) -> TextResult<Response> {
    if let Some(scope) = params.get("scope") {
        translator.set_scope(scope)?;
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_, "t", key @ ..] if !key.is_empty() => {
            let key = decode_key(key)?;
            let replacements: Vec<(&str, &str)> = params
                .iter()
                .filter(|(name, _)| !RESERVED_PARAMS.contains(&name.as_str()))
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();

            let count = params.get("count").and_then(|c| c.parse::<i64>().ok());
            let text = match count {
                Some(count) => translator.choice(&key, count, &replacements).await?,
                None => translator.get(&key, &replacements).await?,
            };
            Ok(text.into_response())
        }
        _ => {
            let table = translator.load_texts(None, None).await?;
            let payload = TablePayload {
                locale: table.locale().to_string(),
                scope: table.scope().to_string(),
                texts: table.entries(),
            };
            Ok(Json(payload).into_response())
        }
    }
}

/// Text key from the path segments after `/t/`, percent-decoded.
fn decode_key(segments: &[&str]) -> TextResult<String> {
    let decoded = segments
        .iter()
        .map(|segment| percent_decode_str(segment).decode_utf8())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TextError::invalid_argument(format!("key is not valid UTF-8: {}", e)))?;
    Ok(decoded.join("/"))
}

fn status_for(err: &TextError) -> StatusCode {
    match err {
        TextError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        TextError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        TextError::ConfigurationInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: TextError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, err.to_string()).into_response()
}
