//! `storefront-sync`: start a session against the configured backend and
//! run the launch-time synchronisation.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};

use storefront::domain::ports::{FixtureCardCipher, FixtureImageUploader};
use storefront::outbound::{FileLocalStore, HttpNetworkProbe, HttpRemoteStore};
use storefront::telemetry::{self, LogFormat};
use storefront::{SessionPorts, StorefrontSession, SyncSettings};

fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = SyncSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    telemetry::init(LogFormat::from(settings.log_json));

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(settings))
}

async fn run(settings: SyncSettings) -> Result<()> {
    let cache_dir = settings.cache_dir();
    let local = FileLocalStore::open(&cache_dir)
        .wrap_err_with(|| format!("open cache directory {}", cache_dir.display()))?;
    let remote = HttpRemoteStore::new(settings.remote_url()?, settings.request_timeout())?;
    let probe = HttpNetworkProbe::new(settings.probe_url()?, settings.probe_timeout())
        .wrap_err("build connectivity probe")?;

    let ports = SessionPorts {
        local: Arc::new(local),
        remote: Arc::new(remote),
        cipher: Arc::new(FixtureCardCipher),
        uploader: Arc::new(FixtureImageUploader::default()),
        clock: Arc::new(DefaultClock),
    };
    let session =
        StorefrontSession::start(ports, &probe, settings.user_id()?, settings.force_offline).await;

    let snapshot = session
        .initial_sync()
        .await
        .wrap_err("initial catalog sync failed")?;
    info!(
        network = %session.network(),
        products = snapshot.products.len(),
        categories = ?snapshot.categories,
        promos = snapshot.promos.as_ref().map_or(0, Vec::len),
        "initial sync finished"
    );
    if let Some(Ok(cards)) = &snapshot.cards {
        info!(cards = cards.len(), "cards loaded");
    }
    if let Some(Ok(addresses)) = &snapshot.addresses {
        info!(addresses = addresses.len(), "addresses loaded");
    }
    if let Some(Ok(reviews)) = &snapshot.my_reviews {
        info!(reviews = reviews.len(), "own reviews loaded");
    }
    match &snapshot.checkout {
        Some(Ok(indices)) => info!(card = ?indices.card, address = ?indices.address, "checkout defaults loaded"),
        Some(Err(err)) => warn!(error = %err, "checkout defaults unavailable"),
        None => {}
    }
    Ok(())
}
