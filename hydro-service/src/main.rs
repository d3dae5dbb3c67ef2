use axum::Router;
use hydro_service::{
    axum::telemetry::{TelemetryBuildError, TelemetryManager},
    declaration::{
        declaration_router, AppState, DeclarationStoreError, LinkBuilder, LinkError, MemoryDeclarationStore,
        SharedDeclarationStore,
    },
    service::{AppConfig, CoreConfig, APP_NAME},
    utils::id_encoders::IdEncoderError,
};
use config::ConfigError;
use std::{env, error::Error as StdError, process::ExitCode, sync::Arc};
use thiserror::Error as ThisError;
use tokio::{net::TcpListener, signal};

pub const STAGE_ENV: &str = "HYDRO_STAGE";
pub const DEFAULT_STAGE: &str = "dev";

#[derive(Debug, ThisError)]
enum StartupError {
    #[error("Configuration error")]
    Config(#[from] ConfigError),
    #[error("Telemetry setup failed")]
    Telemetry(#[from] TelemetryBuildError),
    #[error("Id encoder could not be created")]
    IdEncoder(#[from] IdEncoderError),
    #[error("Link builder could not be created")]
    Link(#[from] LinkError),
    #[error("Declaration store could not be created")]
    Store(#[from] DeclarationStoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
    }
    log::info!("Shutting down...");
}

async fn run(stage: &str) -> Result<(), StartupError> {
    let core_config = CoreConfig::new(stage)?;
    let config = AppConfig::new(&core_config)?;
    let telemetry = TelemetryManager::new(&config.tracing)?;

    // loaded before the logger existed, report once it is installed
    log::info!("pre-init configuration: {:#?}", core_config);
    log::info!("configuration: {:#?}", config);

    // the secret is checked before anything is served
    let encoder = config.id_encoder.create_encoder()?;
    let links = LinkBuilder::new(config.service.public_url.clone(), encoder)?;

    let store: SharedDeclarationStore = match &config.service.seed_file {
        Some(seed_file) => Arc::new(MemoryDeclarationStore::from_seed_file(seed_file).await?),
        None => Arc::new(MemoryDeclarationStore::default()),
    };

    let state = AppState::new(links, store, config.service.problem_config());
    let app = Router::new()
        .merge(declaration_router())
        .nest("/tracing", telemetry.into_router())
        .with_state(state);

    let listener = TcpListener::bind(("0.0.0.0", config.service.port)).await?;
    log::info!("{APP_NAME} ({}) listening on {}", config.stage, listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let stage = env::args()
        .nth(1)
        .or_else(|| env::var(STAGE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_STAGE.to_owned());

    match run(&stage).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = format!("{APP_NAME} failed to start: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
