//! Casavia client binary
//!
//! Wires the data layer together from environment configuration and runs
//! a short read-out of the selected source: listings, availability split
//! and platform statistics. Embedders use the library crate directly.

use std::sync::Arc;

use casavia_client::app_state::AppContext;
use casavia_client::config::Config;
use casavia_client::contract::NoSigningAgent;
use casavia_client::models::{filter_available, filter_unavailable};
use casavia_client::units::{format_currency, truncate_address};

/// Demo wallet used to exercise the local store path
const DEMO_WALLET: &str = "0xabcDEF0123456789abcDEF0123456789abcdef01";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        source = config.data_source.as_str(),
        contract = %config.contract_address,
        "starting casavia client"
    );

    // No wallet in a headless run; writes fail fast as WalletUnavailable
    let context = AppContext::from_config(config, Arc::new(NoSigningAgent));

    // Forward notifications into the log
    let mut notifications = context.notifier.subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            tracing::info!(level = ?notification.level, "{}", notification.message);
        }
    });

    // The local variant wants a connected wallet before mutations
    if let Some(store) = context.source.local_store() {
        store.write().await.connect(DEMO_WALLET);
    }

    let listings = context.source.listings().await?;
    tracing::info!(count = listings.len(), "fetched listings");
    for listing in &listings {
        tracing::info!(
            id = %listing.id,
            owner = %truncate_address(&listing.owner),
            rate = %format_currency(listing.daily_rate),
            days = listing.available_days,
            available = listing.is_available,
            "{}",
            listing.property_type
        );
    }

    let available = filter_available(&listings);
    let unavailable = filter_unavailable(&listings);
    tracing::info!(
        available = available.len(),
        rented = unavailable.len(),
        "availability split"
    );

    let stats = context.source.stats().await?;
    tracing::info!(
        total_listings = stats.total_listings,
        total_rentals = stats.total_rentals,
        fee_balance = %format_currency(stats.fee_balance),
        "platform statistics"
    );

    Ok(())
}
