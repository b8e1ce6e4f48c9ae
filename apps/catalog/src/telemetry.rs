use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset: catalog events at info, driver
/// chatter at warn.
const DEFAULT_FILTER: &str = "info,catalog=info,actix_web=info,sqlx=warn,sea_orm=warn";

/// Install the process-wide JSON subscriber. Call once from `main`.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_target(false)
                .with_ansi(false),
        )
        .init();
}
