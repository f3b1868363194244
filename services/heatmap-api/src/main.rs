//! Carbon and pollution mapping API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use heatmap_api::config::ServiceConfig;
use heatmap_api::pipeline;
use heatmap_api::state::AppState;
use weather_client::WeatherConfig;

#[derive(Parser, Debug)]
#[command(name = "heatmap-api")]
#[command(about = "Carbon estimate, pollution heatmap and weather pass-through server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:10000", env = "HEATMAP_LISTEN_ADDR")]
    listen: String,

    /// Port override for hosted environments; replaces the listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Region asset root (one directory per region)
    #[arg(long, default_value = "assets/regions", env = "HEATMAP_ASSETS_DIR")]
    assets_dir: PathBuf,

    /// OpenWeatherMap API key
    #[arg(long, default_value = "", env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    openweather_api_key: String,

    /// Map area width of rendered heatmaps, in pixels
    #[arg(long, default_value_t = 1200, env = "HEATMAP_CANVAS_WIDTH")]
    canvas_width: u32,

    /// Largest accepted grid resolution
    #[arg(long, default_value_t = 1000, env = "HEATMAP_MAX_RESOLUTION")]
    max_resolution: usize,

    /// Lifetime of a session's map upload, in seconds
    #[arg(long, default_value_t = 86400, env = "UPLOAD_SESSION_TTL_SECS")]
    upload_ttl_secs: u64,

    /// Maximum number of sessions holding a map upload
    #[arg(long, default_value_t = 1024, env = "UPLOAD_MAX_SESSIONS")]
    upload_max_sessions: usize,

    /// Maximum request body size, in MiB
    #[arg(long, default_value_t = 32, env = "HEATMAP_BODY_LIMIT_MB")]
    body_limit_mb: usize,

    /// Interval between weather cache stats log lines, in seconds (0 disables)
    #[arg(long, default_value_t = 300, env = "HEATMAP_CACHE_STATS_INTERVAL_SECS")]
    cache_stats_interval_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "HEATMAP_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            assets_dir: self.assets_dir.clone(),
            canvas_width: self.canvas_width,
            max_resolution: self.max_resolution,
            upload_ttl: Duration::from_secs(self.upload_ttl_secs),
            upload_max_sessions: self.upload_max_sessions,
            body_limit_bytes: self.body_limit_mb * 1024 * 1024,
            weather: WeatherConfig {
                api_key: self.openweather_api_key.clone(),
                ..WeatherConfig::default()
            },
        }
    }

    fn listen_addr(&self) -> Result<SocketAddr> {
        let mut addr: SocketAddr = self
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", self.listen))?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(addr)
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build().context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    pipeline::describe_metrics();

    info!("Starting heatmap API server");

    let config = args.service_config();
    if config.weather.api_key.is_empty() {
        tracing::warn!("OPENWEATHER_API_KEY is not set; weather routes will fail upstream");
    }
    info!(
        assets_dir = %config.assets_dir.display(),
        canvas_width = config.canvas_width,
        max_resolution = config.max_resolution,
        "Loaded configuration"
    );

    let state = Arc::new(AppState::new(config).context("Failed to initialize application state")?);
    let weather = state.weather.clone();

    if args.cache_stats_interval_secs > 0 {
        let weather = weather.clone();
        let period = Duration::from_secs(args.cache_stats_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                weather.log_cache_stats();
            }
        });
    }

    let app = heatmap_api::app(state, prometheus_handle);

    let addr = args.listen_addr()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    weather.log_cache_stats();
    info!("Heatmap API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
}
