use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use grpc_auth::{AccessPolicy, AuthLayer, TokenVerifier};
use tracing::info;
use tracing_subscriber::prelude::*;

use http_gateway::config::Config;
use http_gateway::error::{ErrorTranslator, FieldKey};
use http_gateway::middleware::cors;
use http_gateway::{configure, GatewayState, ServiceClients};

#[actix_web::main]
async fn main() -> Result<()> {
    // Structured JSON logs for log aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,http_gateway=debug,grpc_auth=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting HTTP Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let verifier = TokenVerifier::new(
        config.jwt.algorithm_family,
        config.jwt.signing_key.as_bytes(),
        config.jwt.leeway_seconds,
    )
    .context("Failed to initialize token verifier - check JWT_SIGNING_KEY")?;

    let policy = AccessPolicy::with_public(config.access.public_operations.iter().cloned());

    info!(
        algorithm_family = %config.jwt.algorithm_family,
        leeway_seconds = config.jwt.leeway_seconds,
        public_operations = ?policy.public_operations(),
        "Outbound authentication configured"
    );

    let auth = AuthLayer::new(Arc::new(policy), Arc::new(verifier));
    let clients = ServiceClients::connect_lazy(&config.services, auth)
        .context("Failed to initialize service clients")?;

    let translator = ErrorTranslator::new(FieldKey::from_legacy_flag(config.errors.legacy_field_key));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(workers = config.server.workers, "HTTP Gateway starting on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::new(GatewayState::new(
                clients.clone(),
                translator.clone(),
            )))
            .configure(configure)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    info!("HTTP Gateway stopped");
    Ok(())
}
