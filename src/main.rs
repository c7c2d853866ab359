use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::path::Path;

use grok_proxy::{app, AppConfig, GrokClient, UpstreamClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "grok_proxy=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. 加载配置（.env 可选）
    let env_path = Path::new(".env");
    if env_path.exists() {
        match dotenvy::from_path(env_path) {
            Ok(_) => tracing::info!("Loaded .env file successfully"),
            Err(e) => tracing::error!("Failed to load .env file: {}", e),
        }
    } else {
        tracing::debug!(".env file not found in current directory, using process environment");
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        upstream = %config.upstream_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        "Configuration loaded successfully"
    );

    // 3. 上游客户端
    let upstream: Arc<dyn UpstreamClient> = Arc::new(GrokClient::new(&config)?);

    // 4. 构建路由
    let router = app(upstream);

    // 5. 启动服务器
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Grok API Proxy Server running on http://{}", addr);
    tracing::info!("CORS enabled for all origins");

    axum::Server::bind(&addr)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
