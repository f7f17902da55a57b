mod app;
mod auth;
mod emotes;
mod error;
mod models;
mod server;
mod utils;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "emote-relay.log".into());
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    let settings = app::config::load()?;
    let _guard = init_logging(settings.log_file.as_deref());

    tracing::info!(
        api_base_url = %settings.api_base_url,
        token_url = %settings.token_url,
        "Configuration loaded"
    );

    server::run(settings).await
}
