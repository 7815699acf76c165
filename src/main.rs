use anyhow::Context;
use lithocolor::{logging, server, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Settings::default_path();
    let (settings, load_error) = Settings::load_or_default(path.as_deref());
    logging::init_tracing(settings.debug_logging);

    match (load_error, path.filter(|p| p.exists())) {
        (Some(e), _) => tracing::warn!(error = %e, "ignoring unreadable settings, using defaults"),
        (None, Some(path)) => tracing::info!("loaded settings from {}", path.display()),
        (None, None) => {}
    }

    server::serve(settings)
        .await
        .context("lithocolor server stopped with an error")
}
