use std::any::Any;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Build the full application: `/api` routes plus CORS, the body limit for
/// JSON extractors, tracing and the panic fallback.
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let verbose = server.environment.is_development();

    Router::new()
        .nest("/api", api::router(state))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(
                    move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, verbose),
                ))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(server.body_limit_bytes)),
        )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Last-resort handler for anything that panicked inside a request
fn panic_response(panic: Box<dyn Any + Send + 'static>, verbose: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("Global error: {}", detail);

    let message = if verbose {
        detail
    } else {
        "Something went wrong".to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "message": message })),
    )
        .into_response()
}

pub async fn run(server: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_app(state, server);
    let addr = format!("{}:{}", server.host, server.port);

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&server.tls_cert_path, &server.tls_key_path) {
        return serve_tls(app, &addr, cert, key).await;
    }
    #[cfg(not(feature = "tls"))]
    if server.tls_cert_path.is_some() {
        warn!("TLS paths configured but the tls feature is disabled, serving plain HTTP");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Web server failed")?;

    info!("Web server stopped");
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: &str, cert: &str, key: &str) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let socket: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid bind address {addr}"))?;
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate or key")?;

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        }
    });

    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(socket, tls)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Web server failed")?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
