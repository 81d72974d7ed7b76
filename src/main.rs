//! VIP Gate service entry point.
//!
//! Wires the file-backed stores, the payment gateway, and the messaging
//! client into the webhook server, and spawns the timer-driven jobs. On
//! ctrl-c the server drains and the jobs finish their in-flight pass
//! before the process exits.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vip_gate::adapters::http::webhook::{webhook_routes, WebhookAppState};
use vip_gate::adapters::mercadopago::MercadoPagoGateway;
use vip_gate::adapters::storage::{
    FileCooldownMap, FileSubscriptionStore, InMemoryProcessedPayments,
};
use vip_gate::adapters::telegram::TelegramClient;
use vip_gate::application::handlers::subscription::ProcessPaymentEventHandler;
use vip_gate::application::jobs::{ExpirationSweeper, RenewalNudger};
use vip_gate::config::AppConfig;
use vip_gate::domain::foundation::SystemClock;
use vip_gate::domain::subscription::PixWebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock = Arc::new(SystemClock);
    let store = Arc::new(FileSubscriptionStore::open(config.storage.subscriptions_path()).await?);
    let cooldowns = Arc::new(
        FileCooldownMap::open(config.storage.cooldowns_path(), config.jobs.min_push_gap()).await?,
    );
    let processed = Arc::new(InMemoryProcessedPayments::new());

    let gateway = Arc::new(
        MercadoPagoGateway::new(
            config.payment.access_token.clone(),
            config.payment.payer_email.clone(),
        )?
        .with_base_url(config.payment.base_url.clone()),
    );
    let telegram = Arc::new(
        TelegramClient::new(config.telegram.bot_token.clone())?
            .with_base_url(config.telegram.base_url.clone()),
    );

    let verifier = Arc::new(PixWebhookVerifier::new(
        config.payment.webhook_secret.expose_secret().clone(),
    ));
    let processor = Arc::new(ProcessPaymentEventHandler::new(
        store.clone(),
        processed,
        gateway,
        telegram.clone(),
        clock.clone(),
        config.telegram.vip_invite_link.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = Arc::new(ExpirationSweeper::new(
        store.clone(),
        telegram.clone(),
        telegram.clone(),
        clock.clone(),
        config.telegram.channel(),
        config.jobs.send_delay(),
    ));
    let sweeper_task = tokio::spawn(sweeper.run(config.jobs.sweep_interval(), shutdown_rx.clone()));

    let nudger = Arc::new(RenewalNudger::new(
        store,
        telegram,
        cooldowns,
        clock,
        config.jobs.send_delay(),
    ));
    let nudger_task = tokio::spawn(nudger.run(config.jobs.nudge_interval(), shutdown_rx));

    let state = WebhookAppState { verifier, processor };
    let app = webhook_routes()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "webhook server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    // Let the in-flight job iterations finish before exiting.
    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(sweeper_task, nudger_task);

    Ok(())
}
