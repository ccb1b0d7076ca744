use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use secondop_api::config::ApiConfig;
use secondop_api::infra::classifier::HttpClassifier;
use secondop_api::infra::email::SmtpMailer;
use secondop_api::router::build_router;
use secondop_api::state::AppState;
use secondop_api::usecase::cleanup::CleanupScheduler;
use secondop_core::config::Config;
use secondop_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    let mailer = SmtpMailer::from_config(&config).expect("failed to build mailer");
    let classifier =
        HttpClassifier::new(&config.classifier_url).expect("failed to build classifier client");

    let state = AppState {
        db,
        mailer,
        classifier,
        jwt_secret: config.jwt_secret,
        token_ttl_minutes: config.access_token_expire_minutes,
        otp_ttl_minutes: config.otp_expire_minutes,
    };

    let sweep_state = state.clone();
    let scheduler = CleanupScheduler::spawn(
        move || {
            let ledger = sweep_state.otp_ledger();
            async move { ledger.sweep().await }
        },
        Duration::from_secs(config.otp_cleanup_interval_secs),
    );

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // let an in-flight sweep finish before the process exits
    scheduler.shutdown().await;
    info!("api service stopped");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
}
