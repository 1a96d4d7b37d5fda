// File: services/barberbot_backend/src/main.rs
use barberbot_backend::{app, AppState};
use barberbot_common::features::enabled_integrations;
use barberbot_common::{config_error, logging, BarberbotError};
use barberbot_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(err) = run().await {
        error!("Server stopped: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BarberbotError> {
    let config = Arc::new(load_config().map_err(config_error)?);
    info!(
        "Loaded configuration for '{}' (integrations: {:?})",
        config.business.name,
        enabled_integrations(&config)
    );

    let state = AppState::new(config.clone()).await?;

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = app(state);

    #[cfg(feature = "openapi")]
    {
        use barberbot_backend::doc::BarberbotApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", BarberbotApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
