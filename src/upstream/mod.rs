//! Upstream client adapters
//!
//! Every third-party API sits behind a small async trait so the services can be
//! exercised with deterministic fakes. The reqwest-backed implementations share
//! one HTTP client carrying the configured timeout and user agent.

pub mod groq;
pub mod ip_geo;
pub mod nominatim;
pub mod open_meteo;

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::{ClimateError, Result};

pub use groq::{CompletionProvider, CompletionRequest, GroqProvider};
pub use ip_geo::{IpApiCom, IpGeoProvider, IpapiCo, IpinfoIo, default_ip_providers};
pub use nominatim::{Geocoder, NominatimClient};
pub use open_meteo::{OpenMeteoClient, WeatherSource};

/// Build the HTTP client shared by all adapters
///
/// # Errors
///
/// Returns a configuration error if the client cannot be constructed
pub fn build_client(config: &UpstreamConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ClimateError::config(format!("Failed to create HTTP client: {e}")))
}

/// Send a request and decode a JSON body.
///
/// Send failures and timeouts become transport errors, non-success statuses
/// become status errors and undecodable bodies become shape errors.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T> {
    let start_time = Instant::now();
    let response = request
        .send()
        .await
        .map_err(|e| ClimateError::transport(provider, e))?;

    let status = response.status();
    debug!(
        "{} responded {} in {:.3}s",
        provider,
        status,
        start_time.elapsed().as_secs_f64()
    );

    if !status.is_success() {
        warn!("{} returned non-success status {}", provider, status);
        return Err(ClimateError::status(provider, status.as_u16()));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ClimateError::shape(provider, e.to_string())
        } else {
            ClimateError::transport(provider, e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Reading {
        value: f64,
    }

    /// Serves one route per failure mode on an ephemeral port
    async fn serve() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { Json(json!({ "value": 1.5 })) }))
            .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/html", get(|| async { "<html>maintenance</html>" }))
            .route("/wrong", get(|| async { Json(json!({ "other": 1 })) }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({ "value": 0.0 }))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn client() -> Client {
        let config = UpstreamConfig {
            timeout_seconds: 1,
            ..crate::AppConfig::default().upstream
        };
        build_client(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_success() {
        let base = serve().await;
        let reading: Reading = fetch_json("local", client().get(format!("{base}/ok")))
            .await
            .unwrap();
        assert_eq!(reading.value, 1.5);
    }

    #[tokio::test]
    async fn test_fetch_json_non_success_is_status_error() {
        let base = serve().await;
        let result: Result<Reading> =
            fetch_json("local", client().get(format!("{base}/unavailable"))).await;
        assert!(matches!(
            result,
            Err(ClimateError::UpstreamStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_undecodable_body_is_shape_error() {
        let base = serve().await;
        for path in ["html", "wrong"] {
            let result: Result<Reading> =
                fetch_json("local", client().get(format!("{base}/{path}"))).await;
            assert!(
                matches!(result, Err(ClimateError::UpstreamShape { .. })),
                "{path}: {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_json_timeout_is_transport_error() {
        let base = serve().await;
        let result: Result<Reading> =
            fetch_json("local", client().get(format!("{base}/slow"))).await;
        assert!(matches!(
            result,
            Err(ClimateError::UpstreamTransport { .. })
        ));
    }
}
