use crate::{
    axum_http::{default_routers, routers},
    config::config_model::{BackendServer, DotEnvyConfig},
    usecases::payments::{CheckoutSettings, PaymentGateway, PaymentUseCase},
};
use anyhow::{Context, Result};
use axum::{
    Router, ServiceExt,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
use crates::{
    domain::repositories::{
        customers::CustomerRepository, items::ItemRepository, payments::PaymentRepository,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            customers::CustomerPostgres, items::ItemPostgres, payments::PaymentPostgres,
        },
    },
    payments::stripe_client::StripeClient,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    normalize_path::NormalizePath,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let stripe_client = StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.api_version.clone(),
        Duration::from_secs(config.stripe.timeout),
    )?;

    let payment_usecase = PaymentUseCase::new(
        Arc::new(CustomerPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ItemPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        Arc::new(stripe_client),
        CheckoutSettings {
            currency: config.stripe.currency.clone(),
            publishable_key: config.stripe.publishable_key.clone(),
        },
    );

    let app = build_app(Arc::new(payment_usecase), &config.backend_server)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        stage = %config.stage,
        currency = %config.stripe.currency,
        "Server is running on port {}",
        config.backend_server.port
    );
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Trailing slashes are trimmed before routing, so `/api/v1/payments/` reaches the nested `/` route.
pub fn build_app<C, I, P, G>(
    payment_usecase: Arc<PaymentUseCase<C, I, P, G>>,
    server: &BackendServer,
) -> Result<NormalizePath<Router>>
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let router = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/payments", routers::payments::routes(payment_usecase))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(server.timeout)))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes(
            server.body_limit,
        )?))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(NormalizePath::trim_trailing_slash(router))
}

fn body_limit_bytes(limit_mib: u64) -> Result<usize> {
    let bytes = limit_mib
        .checked_mul(1024 * 1024)
        .with_context(|| format!("SERVER_BODY_LIMIT is too large ({limit_mib} MiB)"))?;
    usize::try_from(bytes).with_context(|| format!("SERVER_BODY_LIMIT is too large ({limit_mib} MiB)"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
