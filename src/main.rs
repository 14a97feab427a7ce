use admission_gateway::{AdmissionController, build_router, config::Args, state::AppState};
use clap::Parser; // for cli
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("admission_gateway=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // parse cli arguments
    let args = Args::parse();

    let admission = match AdmissionController::new(args.admission_config()) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "Invalid admission configuration");
            std::process::exit(1);
        }
    };

    let app = build_router(AppState::new(admission.clone()));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(port = args.port, "Gateway running on http://localhost:{}", args.port);
    info!(
        "Rate limit: {} requests per {} seconds, sweeping every {} seconds",
        args.rate_limit, args.rate_window, args.sweep_interval
    );

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    admission.shutdown();

    if let Err(e) = served {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
