//! Archive Gateway CLI
//!
//! Runs the HTTP gateway and a few offline helpers around it.

use std::path::PathBuf;
use std::sync::Arc;

use archive_gateway::{
    api::{self, AppState},
    backend::{ElasticBackend, MemoryBackend, SearchBackend},
    config,
    error::{AppError, Result},
    models::Catalog,
    query::{QueryBuilder, QueryLimits},
    utils::fixtures,
};
use clap::{Parser, Subcommand, ValueEnum};

/// Archive Gateway - read-only search API over archived articles
#[derive(Parser, Debug)]
#[command(
    name = "archive-gateway",
    version,
    about = "Read-only search gateway over archived web articles"
)]
struct Cli {
    /// Path to the configuration file (default: $CONFIG or config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        /// Listen address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,

        /// Serve from a fixture file instead of the search cluster
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,

    /// Print the engine query body for a request
    Query {
        #[arg(value_enum)]
        shape: QueryShape,

        /// Free-text query
        q: String,

        /// Term field (terms only)
        #[arg(long, default_value = "title")]
        field: String,

        /// Aggregation kind (terms only)
        #[arg(long, default_value = "top")]
        aggr: String,

        /// Resume token (result only)
        #[arg(long)]
        resume: Option<String>,
    },

    /// Generate a fixture file of sample articles
    Fixtures {
        /// Index name to store the articles under
        #[arg(long, default_value = "articles")]
        index: String,

        /// Number of articles
        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Output file
        #[arg(short, long, default_value = "fixtures.json")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QueryShape {
    Overview,
    Result,
    Terms,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.as_deref());
    let mut settings = config::load_config(&config_path);
    config::apply_env(&mut settings, |key| std::env::var(key).ok())?;
    init_logging(cli.verbose, &settings.logging.level);

    log::info!("Archive gateway starting...");
    log::info!("Configuration: {}", config_path.display());

    match cli.command {
        Command::Serve { bind, fixtures } => {
            let catalog = Catalog::from_config(&settings)?;
            let backend: Arc<dyn SearchBackend> = match fixtures {
                Some(path) => {
                    log::info!("Serving fixtures from {}", path.display());
                    Arc::new(MemoryBackend::from_file(&path).await?)
                }
                None => {
                    log::info!("Search hosts: {}", settings.search.hosts.join(", "));
                    Arc::new(ElasticBackend::new(&settings.search)?)
                }
            };

            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            let state = Arc::new(AppState::new(settings, catalog, backend));
            let app = api::router(state);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            log::info!("Listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let catalog = match Catalog::from_config(&settings) {
                Ok(catalog) => catalog,
                Err(e) => {
                    log::error!("Config validation failed: {}", e);
                    return Err(e);
                }
            };
            for collection in catalog.collections() {
                log::info!("✓ Collection {} -> index {}", collection.name(), collection.index());
            }
            log::info!(
                "✓ Term fields: {}",
                catalog
                    .term_fields()
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            log::info!(
                "✓ Aggregations: {}",
                catalog
                    .aggregations()
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            log::info!("All validations passed!");
        }

        Command::Query {
            shape,
            q,
            field,
            aggr,
            resume,
        } => {
            let catalog = Catalog::from_config(&settings)?;
            let builder = QueryBuilder::new(QueryLimits::from_config(&settings));
            let body = match shape {
                QueryShape::Overview => builder.overview(&q),
                QueryShape::Result => builder.page(&q, resume.as_deref())?,
                QueryShape::Terms => {
                    let field = catalog.term_field(&field)?;
                    let kind = catalog.aggregation(&aggr)?;
                    builder.terms(&q, field, kind)
                }
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Command::Fixtures {
            index,
            count,
            output,
        } => {
            if count == 0 {
                return Err(AppError::config("--count must be > 0"));
            }
            fixtures::write_fixture_file(&output, &index, fixtures::sample_articles(count)).await?;
            log::info!(
                "Wrote {} sample articles for index '{}' to {}",
                count,
                index,
                output.display()
            );
        }
    }

    log::info!("Done!");

    Ok(())
}
