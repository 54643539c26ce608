use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use storefront::app_system::{setup_tracing, StoreSystem};
use storefront::catalog::{CatalogSource, SanityCatalog};
use storefront::config::Config;
use storefront::geo::{Geocoder, GoogleMapsGeocoder};
use storefront::http::{build_router, AppState};
use storefront::notifications::{LogMailer, Mailer, ResendMailer};
use storefront::payments::{PaymentService, PaymentSettings, PaystackGateway};

fn build_state(config: &Config, system: &StoreSystem) -> Result<AppState, Box<dyn Error>> {
    let gateway = Arc::new(PaystackGateway::new(
        config.paystack_base_url.clone(),
        config.paystack_secret_key.clone(),
    )?);

    let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone(), config.resend_from_email.clone())?),
        None => {
            warn!("RESEND_API_KEY not set, confirmation emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let geocoder: Option<Arc<dyn Geocoder>> = match &config.google_maps_api_key {
        Some(key) => Some(Arc::new(GoogleMapsGeocoder::new(key.clone())?)),
        None => {
            warn!("GOOGLE_MAPS_API_KEY not set, address lookup disabled");
            None
        }
    };

    let catalog: Option<Arc<dyn CatalogSource>> = match &config.sanity {
        Some(sanity) => Some(Arc::new(SanityCatalog::new(sanity)?)),
        None => None,
    };

    let payments = PaymentService::new(
        gateway,
        mailer,
        system.order_client.clone(),
        system.profile_client.clone(),
        PaymentSettings {
            secret_key: config.paystack_secret_key.clone(),
            app_url: config.app_url.clone(),
            shipping_cost: config.shipping_flat_rate,
        },
    );

    Ok(AppState {
        payments,
        orders: system.order_client.clone(),
        profiles: system.profile_client.clone(),
        geocoder,
        catalog,
        admin_token: config.admin_api_token.clone(),
        production: config.is_production(),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load()?;
    info!(port = config.port, env = ?config.app_env, "Starting storefront");

    let system = StoreSystem::with_data_dir(&config.data_dir).await?;
    let app = build_router(build_state(&config, &system)?);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
