use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    prelude::*,
    EnvFilter,
};

use crate::config::ConformanceConfig;

/// Initialize console logging for a conformance run
pub fn init_logging(config: &ConformanceConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(&config.log_filter)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;

    tracing::debug!(filter = %config.log_filter, "Logging initialized");
    Ok(())
}

/// Initialize simple console-only logging for tests
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("strparse_core=trace,debug")),
        )
        .with_test_writer()
        .try_init();
}
