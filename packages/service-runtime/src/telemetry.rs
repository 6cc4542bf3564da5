//! Tracing and OpenTelemetry Setup
//!
//! Console logging is always on. OTLP span export is opt-in.
//!
//! # Environment Variables
//!
//! - `OTEL_ENABLED`: Set to "true" to export spans (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: Service name for traces (default: the binary's name)
//! - `RUST_LOG`: Extra filter directives

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::env_lookup;

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Shuts down the tracer provider when dropped.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shutdown OpenTelemetry tracer provider: {e}");
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Whether spans are exported over OTLP.
    pub enabled: bool,
    /// OTLP exporter endpoint.
    pub otlp_endpoint: String,
    /// Service name for traces.
    pub service_name: String,
    /// Filter directives applied on top of `RUST_LOG`.
    pub directives: Vec<String>,
}

impl TelemetryConfig {
    /// Export-disabled configuration for `service_name`.
    #[must_use]
    pub fn new(service_name: &str) -> Self {
        Self {
            enabled: false,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: service_name.to_string(),
            directives: Vec::new(),
        }
    }

    /// Add a default filter directive such as `order_service=info`.
    #[must_use]
    pub fn with_directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Apply the `OTEL_*` environment variables.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.from_lookup(env_lookup())
    }

    /// Apply the `OTEL_*` variables from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: lookup("OTEL_ENABLED").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(self.otlp_endpoint),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(self.service_name),
            directives: self.directives,
        }
    }

    /// Install the global subscriber.
    ///
    /// Keep the returned guard alive for the lifetime of the process.
    pub fn init(self) -> Result<TelemetryGuard, TelemetryError> {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        if !self.enabled {
            tracing_subscriber::registry()
                .with(self.env_filter())
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

            return Ok(TelemetryGuard {
                tracer_provider: None,
            });
        }

        let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.otlp_endpoint)
            .build()
            .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(otlp_exporter)
            .with_resource(
                opentelemetry_sdk::Resource::builder()
                    .with_service_name(self.service_name.clone())
                    .build(),
            )
            .build();

        let tracer = tracer_provider.tracer(self.service_name.clone());
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()
            .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

        Ok(TelemetryGuard {
            tracer_provider: Some(tracer_provider),
        })
    }

    fn env_filter(&self) -> EnvFilter {
        self.directives
            .iter()
            .filter_map(|directive| directive.parse().ok())
            .fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
    }
}

/// Telemetry initialization error.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// OTLP exporter could not be built.
    #[error("failed to create OTLP exporter: {0}")]
    Exporter(String),
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}
