use tracing_subscriber::EnvFilter;

/// Env var that overrides the configured log filter.
pub const LOG_ENV: &str = "RINGDHT_LOG";

/// Installs the global fmt subscriber. `RINGDHT_LOG` wins over `default_filter`.
///
/// Returns false when a subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| default_filter.to_string());
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn second_init_is_reported_not_fatal() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("debug"));
    }
}
