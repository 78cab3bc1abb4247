//! Tracing subscriber setup
//!
//! Console output in the configured format, filtered by `RUST_LOG` (or the
//! configured level), plus optional OTLP span export.

use std::env;

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

const SERVICE_NAME: &str = "climatewise";

/// Keeps the OTLP pipeline alive; call [`Telemetry::shutdown`] before exit
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Flush pending spans and stop the exporter
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!("Failed to shut down tracer provider: {}", e);
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let base = env::var("RUST_LOG").map_or_else(|_| EnvFilter::new(level), EnvFilter::new);

    ["hyper=warn", "hyper_util=warn", "reqwest=warn", "tower_http=info"]
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(base, EnvFilter::add_directive)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when the OTLP exporter cannot be built or a global subscriber is
/// already installed
pub fn init(config: &LoggingConfig) -> anyhow::Result<Telemetry> {
    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    let tracer_provider = config
        .otlp_endpoint
        .as_deref()
        .map(tracer_provider)
        .transpose()?;

    let otel_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    });

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Telemetry { tracer_provider })
}

fn tracer_provider(endpoint: &str) -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
