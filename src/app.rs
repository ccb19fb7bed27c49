//! Application assembly and serving. Grounded on the teacher's `app.rs`
//! `Application::build`/`serve` split, trimmed to this gateway's simpler
//! lifecycle: the model and identity registries are loaded once at startup
//! and never reloaded, so there is no config watcher, SIGHUP handler, or
//! PID file to manage.

use crate::cli::RunArgs;
use gateway_core::lifecycle::signal::SignalHandler;
use gateway_core::registry::ModelRegistry;
use gateway_provider::AdapterRegistry;
use gateway_server::auth::{AuthHandler, apikey::ApiKeyAuthHandler, jwt::JwtAuthHandler, none::NoneAuthHandler};
use gateway_server::identity_store::{DisabledIdentityStore, IdentityStore, JsonIdentityStore};
use gateway_server::logging_sink::{HttpLoggingSink, LoggingSink, NoneLoggingSink};
use gateway_server::observability_sink::{HttpObservabilitySink, NoneObservabilitySink, ObservabilitySink};
use gateway_server::settings::Settings;
use gateway_server::{AppState, build_router};
use std::path::Path;
use std::sync::Arc;

pub struct Application {
    app_router: axum::Router,
    host: String,
    port: u16,
    logging_sink: Arc<dyn LoggingSink>,
    observability_sink: Arc<dyn ObservabilitySink>,
}

impl Application {
    /// Build the application from CLI args: load the model and identity
    /// registries, assemble the configured auth/logging/observability
    /// variants, and wire the router.
    pub fn build(args: &RunArgs) -> anyhow::Result<Self> {
        let settings = Arc::new(Settings::from_env());

        let model_registry = Arc::new(ModelRegistry::load(Path::new(&args.models_file))?);
        let adapters = Arc::new(AdapterRegistry::new());

        let identity_store: Arc<dyn IdentityStore> = match settings.identity_store.as_str() {
            "json" => Arc::new(JsonIdentityStore::load(Path::new(&args.identities_file))?),
            "none" => Arc::new(DisabledIdentityStore),
            other => anyhow::bail!("unknown identity_store '{other}'"),
        };

        let auth_handler: Arc<dyn AuthHandler> = match settings.auth_method.as_str() {
            "none" => Arc::new(NoneAuthHandler),
            "apikey" => Arc::new(ApiKeyAuthHandler::new(
                settings.auth_method_apikey_header_name.clone(),
                identity_store.clone(),
            )),
            "jwt" => Arc::new(JwtAuthHandler::new(
                settings.auth_method_jwt_header_name.clone(),
                settings.auth_method_jwt_id_key.clone(),
                settings.auth_method_jwt_verify_signature,
                settings.auth_method_jwt_jwks_uri.clone(),
                settings.auth_method_jwt_issuer.clone(),
                settings.auth_method_jwt_audience.clone(),
                identity_store.clone(),
            )),
            other => anyhow::bail!("unknown auth_method '{other}'"),
        };

        let logging_sink: Arc<dyn LoggingSink> = match settings.logging_client.as_str() {
            "none" => Arc::new(NoneLoggingSink),
            "http" => {
                let url = settings
                    .logging_client_http_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("logging_client=http requires LOGGING_CLIENT_HTTP_URL"))?;
                Arc::new(HttpLoggingSink::new(url))
            }
            other => anyhow::bail!("unknown logging_client '{other}'"),
        };

        let observability_sink: Arc<dyn ObservabilitySink> = match settings.observability_client.as_str() {
            "none" => Arc::new(NoneObservabilitySink),
            "http" => {
                let url = settings
                    .observability_client_http_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("observability_client=http requires OBSERVABILITY_CLIENT_HTTP_URL"))?;
                Arc::new(HttpObservabilitySink::new(url))
            }
            other => anyhow::bail!("unknown observability_client '{other}'"),
        };

        tracing::info!(
            models = model_registry.all().count(),
            auth_method = %settings.auth_method,
            identity_store = %settings.identity_store,
            "gateway configured",
        );

        let state = Arc::new(AppState {
            settings,
            model_registry,
            adapters,
            identity_store,
            auth_handler,
            logging_sink: logging_sink.clone(),
            observability_sink: observability_sink.clone(),
            http_client: reqwest::Client::new(),
        });
        let app_router = build_router(state);

        Ok(Self {
            app_router,
            host: args.host.clone(),
            port: args.port,
            logging_sink,
            observability_sink,
        })
    }

    /// Bind and serve until a shutdown signal arrives, then flush both sinks.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self {
            app_router,
            host,
            port,
            logging_sink,
            observability_sink,
        } = self;

        let (signal_handler, mut shutdown_rx) = SignalHandler::new();
        tokio::spawn(signal_handler.run());

        let addr = format!("{host}:{port}");
        tracing::info!("Starting HTTP server on {addr}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        let shutdown = async move {
            let _ = shutdown_rx.wait_for(|v| *v).await;
        };

        axum::serve(listener, app_router).with_graceful_shutdown(shutdown).await?;

        logging_sink.shutdown().await;
        observability_sink.shutdown().await;
        tracing::info!("Server shut down.");
        Ok(())
    }
}
