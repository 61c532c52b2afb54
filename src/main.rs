use catmatch_api::RestApi;
use catmatch_embedding::{EmbeddingConfig, ProviderKind};
use catmatch_predictor::{CategoryPredictor, PredictorConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 sentence embeddings
    Minilm,
    /// Offline feature hashing, no model download
    Hashing,
}

impl From<EmbeddingBackend> for ProviderKind {
    fn from(backend: EmbeddingBackend) -> Self {
        match backend {
            EmbeddingBackend::Minilm => ProviderKind::MiniLm,
            EmbeddingBackend::Hashing => ProviderKind::Hashing,
        }
    }
}

/// Match product descriptions to catalog categories
#[derive(Parser, Debug)]
#[command(name = "catmatch")]
#[command(about = "Semantic product category matcher", long_about = None)]
struct Args {
    /// CSV catalog with `category_id` and `name` columns
    #[arg(long, env = "CATMATCH_CATALOG", default_value = catmatch_predictor::DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// HTTP API port
    #[arg(long, env = "CATMATCH_HTTP_PORT", default_value_t = 5000)]
    http_port: u16,

    /// Embedding backend
    #[arg(long, env = "CATMATCH_EMBEDDING_PROVIDER", value_enum, default_value_t = EmbeddingBackend::Minilm)]
    embedding_provider: EmbeddingBackend,

    /// Bucket count for the hashing backend
    #[arg(long, env = "CATMATCH_HASHING_DIM", default_value_t = catmatch_embedding::DEFAULT_HASHING_DIM)]
    hashing_dim: usize,

    /// Directory for downloaded model files
    #[arg(long, env = "CATMATCH_MODEL_CACHE_DIR")]
    model_cache_dir: Option<PathBuf>,

    /// Upper bound for a single model call, in milliseconds
    #[arg(long, env = "CATMATCH_ENCODE_TIMEOUT_MS", default_value_t = 10_000)]
    encode_timeout_ms: u64,

    /// Model calls allowed to run at once
    #[arg(long, env = "CATMATCH_MAX_CONCURRENT_ENCODES", default_value_t = catmatch_predictor::DEFAULT_MAX_CONCURRENT_ENCODES)]
    max_concurrent_encodes: usize,

    /// Log level
    #[arg(long, env = "CATMATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "CATMATCH_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            catalog_path: self.catalog.clone(),
            embedding: EmbeddingConfig {
                provider: self.embedding_provider.into(),
                hashing_dim: self.hashing_dim,
                cache_dir: self.model_cache_dir.clone(),
                show_download_progress: true,
            },
            encode_timeout_ms: self.encode_timeout_ms,
            max_concurrent_encodes: self.max_concurrent_encodes,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> anyhow::Result<()> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    info!("Starting catmatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("Embedding provider: {:?}", args.embedding_provider);
    info!("HTTP API port: {}", args.http_port);

    let config = args.predictor_config();
    let predictor = tokio::task::spawn_blocking(move || CategoryPredictor::from_config(&config))
        .await??;
    let predictor = Arc::new(predictor);
    info!(
        categories = predictor.catalog().len(),
        model = predictor.model_name(),
        "Predictor initialized"
    );

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(predictor, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("catmatch started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
