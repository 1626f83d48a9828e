pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    handlers::stream,
    middleware::{auth, logging},
    routes::{chat, file, health, knowledge, settings, style, tweet},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Everything under /api requires a session
    let api_routes = Router::new()
        // Chat
        .route("/chat/chat", post(stream::send_message_stream))
        .route("/chat/get_message_history", get(chat::get_message_history))
        .route("/chat/history", get(chat::history))
        .route("/chat/enhance_prompt", post(chat::enhance_prompt))
        // Files
        .route("/file/upload", post(file::upload))
        .route("/file/upload_tweet_media", post(file::upload_tweet_media))
        .route("/file/upload_media_to_twitter", post(file::upload_media_to_twitter))
        .route(
            "/file/promote_to_knowledge_document",
            post(file::promote_to_knowledge_document),
        )
        // Tweets
        .route("/tweet/post", post(tweet::post))
        // Knowledge
        .route("/knowledge/get_document", get(knowledge::get_document))
        .route("/knowledge/list", get(knowledge::list))
        .route("/knowledge/delete", post(knowledge::delete))
        .route("/knowledge/import_url", post(knowledge::import_url))
        // Settings
        .route("/settings/limit", get(settings::limit))
        .route("/settings/delete_account", post(settings::delete_account))
        .route("/settings/list_accounts", get(settings::list_accounts))
        .route("/settings/connect", post(settings::connect))
        .route("/settings/active_account", get(settings::active_account))
        .route("/settings/switch_account", post(settings::switch_account))
        .route("/settings/refresh_profile_data", post(settings::refresh_profile_data))
        // Style
        .route("/style/get", get(style::get))
        .route("/style/import", post(style::import))
        .route("/style/delete", post(style::delete))
        .route("/style/save", post(style::save))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.graph.timeout_secs + 30,
        )))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    if config.cors.origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any).allow_headers(Any);
    }

    // Session cookies need credentials, which rule out wildcards
    let origins: Vec<HeaderValue> = config
        .cors
        .origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
