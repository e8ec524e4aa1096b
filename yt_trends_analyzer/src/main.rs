use std::net::SocketAddr;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_trends_analyzer::routers::create_routes;
use yt_trends_analyzer::{load_config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yt_trends_analyzer=info,warn"));

    let (file_layer, _guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "yt_trends_analyzer.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true))
        .with(file_layer)
        .init();

    if config.youtube_api_key.is_empty() {
        tracing::warn!("YOUTUBE_API_KEY is not set, only the search feed will be used");
    }

    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = AppState::new(config)?;
    let app = create_routes(state);

    tracing::info!(%addr, "server started");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
