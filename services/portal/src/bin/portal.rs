//! services/portal/src/bin/portal.rs

use booking_portal_core::domain::RecordKind;
use portal_lib::{
    adapters::{FileSessionStore, HttpPortalApi, SystemClock, TracingNavigator, TracingNotifier},
    config::Config,
    error::PortalError,
    listing::{ListingEngine, LoadOutcome},
    session::{SessionManager, SessionPorts},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), PortalError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(base_url = %config.api_base_url, "Configuration loaded. Starting portal...");

    // --- 2. Initialize Adapters ---
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let notifier = Arc::new(TracingNotifier::new());
    let navigator = Arc::new(TracingNavigator::new(config.home_route.clone()));
    let clock = Arc::new(SystemClock::new());
    let api = Arc::new(HttpPortalApi::new(config.api_base_url.clone(), store.clone())?);

    // --- 3. Restore the Session ---
    let session = SessionManager::new(
        SessionPorts {
            store: store.clone(),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
            clock: clock.clone(),
        },
        config.login_route.clone(),
    );
    match session.restore().await {
        Ok(status) => info!(?status, "Session restored"),
        Err(e) => warn!(error = %e, "Stored session was discarded"),
    }
    if !session.require_session() {
        info!(route = %navigator.current(), "Not logged in. Nothing to show.");
        session.shutdown();
        return Ok(());
    }

    // --- 4. Show Both Collections ---
    let listing = ListingEngine::new(api, notifier, clock);
    listing.set_sort(config.sort_key).await;
    for kind in [RecordKind::Appointment, RecordKind::Consultation] {
        let outcome = listing.switch_active(kind).await;
        if let LoadOutcome::Loaded { count } = outcome {
            println!("{} ({})", kind, count);
            for record in listing.derived_list().await {
                println!(
                    "  {:<24} {:<9} {:<10} {}",
                    record.name,
                    listing.classify(&record).label(),
                    record.display_date(),
                    record.display_time(),
                );
            }
        }
    }

    session.shutdown();
    Ok(())
}
