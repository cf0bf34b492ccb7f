/// Tracing subscriber setup
///
/// `RUST_LOG` overrides the default filter. With `logging.json = true` log
/// lines are emitted as JSON objects.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub const DEFAULT_FILTER: &str = "blogforge_api=debug,blogforge_shared=info,tower_http=info";

pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
