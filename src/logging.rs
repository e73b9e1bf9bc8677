//! Tracing setup: pretty output in dev, JSON lines in prod.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

pub fn init_logging(env: &Environment) {
    let default_filter = match env {
        Environment::Dev => "advogado_virtual_backend=debug,tower_http=debug,info",
        Environment::Staging => "advogado_virtual_backend=debug,tower_http=info,info",
        Environment::Prod => "advogado_virtual_backend=info,tower_http=info,warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    if env.is_prod() {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt.pretty()).init();
    }

    tracing::info!(?env, "Logging initialized");
}
