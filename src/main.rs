use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carbank_desk::adapters::clock::{RandomTokenGenerator, SystemClock};
use carbank_desk::adapters::drafts::InMemoryDraftStore;
use carbank_desk::adapters::reference::{FileReferenceData, ReferenceBootstrap};
use carbank_desk::adapters::telegram::{BotApiClient, BotApiConfig, UpdatePoller};
use carbank_desk::application::{
    DeskDependencies, DeskPolicy, Dispatcher, IdleSweeper, IdleSweeperConfig,
};
use carbank_desk::config::{AppConfig, LogFormat, RuntimeConfig};
use carbank_desk::ports::Clock;

fn init_tracing(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(runtime.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match runtime.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.runtime);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let client = Arc::new(BotApiClient::new(
        BotApiConfig::new(config.bot.token.expose_secret().as_str())
            .with_base_url(config.bot.api_base_url.as_str())
            .with_request_timeout(config.bot.request_timeout())
            .with_poll_timeout(config.bot.poll_timeout()),
    )?);

    let bootstrap = ReferenceBootstrap {
        owner_id: config.moderation.owner(),
        admin_ids: config.moderation.admin_id_list()?,
        target_channel_id: config.moderation.target_channel(),
    };
    let reference = Arc::new(
        FileReferenceData::open(&config.storage.data_dir, &bootstrap, clock.clone()).await?,
    );
    let drafts = Arc::new(InMemoryDraftStore::new(
        clock.clone(),
        Arc::new(RandomTokenGenerator),
    ));

    let dispatcher = Arc::new(Dispatcher::new(DeskDependencies {
        transport: client.clone(),
        reference,
        drafts: drafts.clone(),
        clock,
        policy: DeskPolicy {
            price_review_categories: config.moderation.review_categories(),
            fallback_channel: config.moderation.target_channel(),
            public_contact: config.moderation.public_contact(),
        },
    }));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = config.runtime.draft_ttl().map(|ttl| {
        let sweeper = IdleSweeper::new(
            drafts,
            dispatcher.photo_sessions(),
            dispatcher.intents(),
            IdleSweeperConfig::new(ttl).with_interval(config.runtime.sweep_interval()),
        );
        let rx = shutdown_rx.clone();
        tokio::spawn(async move { sweeper.run(rx).await })
    });

    let poller = UpdatePoller::new(client, dispatcher);
    let polling = tokio::spawn(async move { poller.run(shutdown_rx).await });

    info!(
        environment = ?config.runtime.environment,
        data_dir = %config.storage.data_dir.display(),
        draft_ttl_secs = ?config.runtime.draft_ttl_secs,
        "carbank desk running"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    let _ = shutdown_tx.send(true);

    if let Err(e) = polling.await {
        warn!(error = %e, "poller task failed");
    }
    if let Some(sweeper) = sweeper {
        if let Err(e) = sweeper.await {
            warn!(error = %e, "sweeper task failed");
        }
    }
    Ok(())
}
