use std::sync::Arc;

use cqm_server::{AppConfig, MeasureRegistry, ServerBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = AppConfig::from_env();

    let registry = Arc::new(MeasureRegistry::new());
    if let Some(dir) = &cfg.measures_dir {
        match registry.load_dir(dir) {
            Ok(count) => {
                tracing::info!(dir = %dir.display(), count, "measures preloaded");
            }
            Err(e) => {
                eprintln!("Measure preload failed: {e}");
                std::process::exit(2);
            }
        }
    }

    let server = ServerBuilder::new()
        .with_config(&cfg)
        .with_registry(registry)
        .build();

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}
