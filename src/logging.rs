//! Tracing subscriber setup

use crate::config::LoggingConfig;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(config: &LoggingConfig) -> String {
    format!("symptom_lens={},tower_http=info", config.level)
}

/// Install the global subscriber, writing to stdout
///
/// `RUST_LOG` wins over the configured level. `format = "json"` selects
/// structured output, anything else the human-readable formatter. Calling
/// this twice is harmless; the second call is ignored.
pub fn init(config: &LoggingConfig) {
    install(config, std::io::stdout);
}

/// Same as [`init`], but logs go to stderr so stdout stays parseable
pub fn init_stderr(config: &LoggingConfig) {
    install(config, std::io::stderr);
}

fn install<W>(config: &LoggingConfig, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into());

    let result = if config.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
