//! Tracing setup for the payment service.

use service_runtime::{TelemetryConfig, TelemetryError, TelemetryGuard};

const SERVICE_NAME: &str = "payment-service";
const DEFAULT_DIRECTIVES: [&str; 3] = ["payment_service=info", "payment_messaging=info", "hyper=warn"];

/// Telemetry defaults for this service, before `OTEL_*` overrides.
#[must_use]
pub fn telemetry_config() -> TelemetryConfig {
    DEFAULT_DIRECTIVES
        .iter()
        .fold(TelemetryConfig::new(SERVICE_NAME), |config, directive| {
            config.with_directive(directive)
        })
}

/// Install the global subscriber from the environment.
pub fn init() -> Result<TelemetryGuard, TelemetryError> {
    telemetry_config().from_env().init()
}
