use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod chat_types;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy_service;

pub use config::AppConfig;
pub use error::ProxyError;
pub use proxy_service::{GrokClient, UpstreamClient, UpstreamError};

/// 构建路由，上游客户端由调用方注入
///
/// 返回的 Router 需要以 `into_make_service_with_connect_info::<SocketAddr>()` 方式运行。
pub fn app(upstream: Arc<dyn UpstreamClient>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .layer(Extension(upstream))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors_layer())
                .layer(DefaultBodyLimit::max(config::MAX_BODY_BYTES)),
        )
}
