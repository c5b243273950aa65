//! Tracing initialization.
//!
//! Logs go to stderr so `synth --stdout` keeps stdout a clean template.
//! The level is controlled via `RUST_LOG` and defaults to `tripstack=info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::OutputFormat;

const DEFAULT_FILTER: &str = "tripstack=info,tripstack_core=info";

/// Initialize tracing; `--format json` switches to JSON log lines.
pub fn init_tracing(format: OutputFormat, quiet: bool) {
    let default = if quiet { "warn" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        OutputFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        OutputFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}
