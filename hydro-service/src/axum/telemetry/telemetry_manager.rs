use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::{EnvFilter, ParseError},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload::{self, Handle},
    util::{SubscriberInitExt, TryInitError},
    Layer,
};

#[derive(Debug, ThisError)]
pub enum TelemetryBuildError {
    #[error(transparent)]
    SetGlobalTracing(#[from] TryInitError),
    #[error("Default log format could not be parsed")]
    DefaultLogError(#[from] ParseError),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default)]
    pub allow_reconfigure: bool,
    #[serde(default)]
    pub enable_console_log: bool,
    pub default_level: Option<String>,
}

trait DynHandle: Send + Sync {
    fn reconfigure(&self, config: String) -> Result<(), String>;
}

impl<L, S> DynHandle for Handle<L, S>
where
    L: 'static + Layer<S> + From<EnvFilter> + Send + Sync,
    S: Subscriber,
{
    fn reconfigure(&self, mut new_config: String) -> Result<(), String> {
        new_config.retain(|c| !c.is_whitespace());
        let new_filter = new_config.parse::<EnvFilter>().map_err(|e| format!("{}", e))?;
        self.reload(new_filter).map_err(|e| format!("{}", e))
    }
}

#[derive(Debug, ThisError)]
#[error("Failed to update trace: {0}")]
pub struct TraceReconfigureError(String);

#[derive(Debug, Serialize, Deserialize)]
pub struct TraceConfigRequest {
    filter: String,
}

async fn reconfigure(State(manager): State<Arc<TelemetryManager>>, Json(request): Json<TraceConfigRequest>) -> Response {
    log::trace!("config: {:#?}", request);
    if manager.reload_handle.is_none() {
        return (StatusCode::BAD_REQUEST, "Trace configure is disabled").into_response();
    }
    match manager.reconfigure(request.filter) {
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        Ok(_) => StatusCode::OK.into_response(),
    }
}

/// Owns the global tracing subscriber: console output and a (reloadable) level filter.
/// Records of the `log` facade are forwarded to the subscriber.
#[derive(Clone)]
pub struct TelemetryManager {
    reload_handle: Option<Arc<dyn DynHandle>>,
}

impl TelemetryManager {
    /// Create a manager and initialize the global tracing logger
    pub fn new(config: &TracingConfig) -> Result<Self, TelemetryBuildError> {
        let mut manager = TelemetryManager { reload_handle: None };
        manager.install_logger(config, tracing_subscriber::registry())?;
        Ok(manager)
    }

    fn install_filter<T>(&mut self, config: &TracingConfig, pipeline: T) -> Result<(), TelemetryBuildError>
    where
        T: 'static + for<'a> LookupSpan<'a> + Subscriber + Send + Sync,
    {
        let env_filter = if let Some(default_level) = &config.default_level {
            EnvFilter::builder().parse(default_level)?
        } else {
            EnvFilter::from_default_env()
        };

        if config.allow_reconfigure {
            // enable filtering with reconfiguration capabilities
            let (reload_env_filter, reload_handle) = reload::Layer::new(env_filter);
            let pipeline = pipeline.with(reload_env_filter);
            self.reload_handle = Some(Arc::new(reload_handle));
            pipeline.try_init()?;
        } else {
            pipeline.with(env_filter).try_init()?;
        }

        Ok(())
    }

    fn install_logger<T>(&mut self, config: &TracingConfig, pipeline: T) -> Result<(), TelemetryBuildError>
    where
        T: 'static + for<'a> LookupSpan<'a> + Subscriber + Send + Sync,
    {
        if config.enable_console_log {
            let console_layer = tracing_subscriber::fmt::Layer::new().pretty();
            let pipeline = pipeline.with(console_layer);
            self.install_filter(config, pipeline)
        } else {
            self.install_filter(config, pipeline)
        }
    }

    pub fn reconfigure(&self, filter: String) -> Result<(), TraceReconfigureError> {
        if let Some(reload_handle) = &self.reload_handle {
            reload_handle.reconfigure(filter).map_err(TraceReconfigureError)?
        }
        Ok(())
    }

    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route("/config", put(reconfigure))
            .with_state(Arc::new(self))
    }
}
