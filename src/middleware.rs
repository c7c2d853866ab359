use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// 允许任意来源的 CORS 配置，不支持携带凭证
///
/// `OPTIONS` 预检请求由该层直接应答，不会进入路由。
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE])
}
