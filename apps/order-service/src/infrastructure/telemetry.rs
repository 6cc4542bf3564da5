//! Tracing setup for the order service.

use service_runtime::{TelemetryConfig, TelemetryError, TelemetryGuard};

const SERVICE_NAME: &str = "order-service";
const DEFAULT_DIRECTIVES: [&str; 3] = ["order_service=info", "payment_messaging=info", "sqlx=warn"];

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_chatter_is_quieted() {
        let config = telemetry_config().from_lookup(|_| None);
        assert_eq!(config.service_name, "order-service");
        assert!(config.directives.iter().any(|d| d == "sqlx=warn"));
    }
}
