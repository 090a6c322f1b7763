//! services/portal/src/session.rs
//!
//! The session lifecycle manager.
//!
//! It owns the state derived from the armed credential and at most one watchdog
//! task, which sleeps for exactly the time left until the credential's expiry.
//! On expiry the stored credential is cleared, the user is told once, and the
//! navigator is sent to the login route. The watchdog is cancelled through a
//! `CancellationToken` on logout, re-arm, and teardown.

use booking_portal_core::credential::TokenError;
use booking_portal_core::domain::{Credential, Session, SessionStatus};
use booking_portal_core::ports::{Clock, Navigator, NotificationSink, NotifyLevel, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Malformed session token: {0}")]
    MalformedToken(#[from] TokenError),
    #[error("Session manager has been shut down")]
    ShutDown,
}

/// The collaborators driven by the session manager.
#[derive(Clone)]
pub struct SessionPorts {
    pub store: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn NotificationSink>,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
}

//=========================================================================================
// SessionManager
//=========================================================================================

pub struct SessionManager {
    shared: Arc<Shared>,
    /// Parent of every watchdog token. Cancelled on teardown so no watchdog
    /// outlives the manager.
    lifetime: CancellationToken,
}

struct Shared {
    ports: SessionPorts,
    login_route: String,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    session: Session,
    /// Bumped on every arm, logout and fail-closed transition. A watchdog only
    /// expires the session if the generation it was spawned for is still current.
    generation: u64,
    watchdog: Option<CancellationToken>,
}

impl SessionState {
    fn cancel_watchdog(&mut self) {
        if let Some(token) = self.watchdog.take() {
            token.cancel();
        }
    }
}

impl SessionManager {
    pub fn new(ports: SessionPorts, login_route: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                ports,
                login_route: login_route.into(),
                state: Mutex::new(SessionState::default()),
            }),
            lifetime: CancellationToken::new(),
        }
    }

    /// Arms the manager with a freshly issued (or restored) credential.
    ///
    /// Any watchdog left over from a previous credential is cancelled first. A
    /// credential that is already past its expiry moves straight to `Expired`.
    /// A credential that cannot be decoded fails closed: the store is cleared
    /// and the user is sent to login without an expiry notification.
    ///
    /// Refused with `SessionError::ShutDown` once `shutdown` has run, since no
    /// watchdog could be started to enforce the expiry.
    pub async fn arm(&self, credential: Credential) -> Result<(), SessionError> {
        if self.lifetime.is_cancelled() {
            warn!("Refusing to arm a session after shutdown");
            return Err(SessionError::ShutDown);
        }

        let expiry_epoch_ms = match credential.expiry_epoch_ms() {
            Ok(ms) => ms,
            Err(e) => {
                warn!(error = %e, "Rejecting malformed session token");
                self.shared.fail_closed().await;
                return Err(e.into());
            }
        };

        let mut state = self.shared.state.lock().await;
        state.cancel_watchdog();
        state.generation += 1;
        state.session = Session {
            status: SessionStatus::Active,
            expiry_epoch_ms: Some(expiry_epoch_ms),
            expired_notified: false,
        };
        self.shared.ports.store.set(&credential);
        info!(expiry_epoch_ms, "Session armed");

        if expiry_epoch_ms <= self.shared.now_ms() {
            info!(expiry_epoch_ms, "Session token was already expired when armed");
            self.shared.expire(&mut state);
            return Ok(());
        }

        let token = self.lifetime.child_token();
        state.watchdog = Some(token.clone());
        tokio::spawn(watchdog(
            Arc::clone(&self.shared),
            state.generation,
            expiry_epoch_ms,
            token,
        ));
        Ok(())
    }

    /// Re-arms from the session store, so expiry detection survives restarts.
    pub async fn restore(&self) -> Result<SessionStatus, SessionError> {
        match self.shared.ports.store.get() {
            Some(credential) => {
                debug!("Restoring session from store");
                self.arm(credential).await?;
                Ok(self.status().await)
            }
            None => Ok(SessionStatus::NoSession),
        }
    }

    /// User-initiated logout. Never shows the expiry notification.
    pub async fn logout(&self) {
        let mut state = self.shared.state.lock().await;
        state.cancel_watchdog();
        state.generation += 1;
        state.session.status = SessionStatus::NoSession;
        state.session.expiry_epoch_ms = None;
        self.shared.ports.store.clear();
        info!("Logged out");
        self.shared.ports.navigator.go_to(&self.shared.login_route);
    }

    /// Route guard for pages that need a credential: when none is stored the
    /// user is redirected to login and `false` is returned.
    pub fn require_session(&self) -> bool {
        if self.shared.ports.store.get().is_some() {
            return true;
        }
        debug!("No stored credential, redirecting to login");
        self.shared.ports.navigator.go_to(&self.shared.login_route);
        false
    }

    pub async fn session(&self) -> Session {
        self.shared.state.lock().await.session.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.state.lock().await.session.status
    }

    /// Cancels the watchdog without touching the session or the store. This is
    /// terminal: later calls to `arm` and `restore` are refused.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

impl Shared {
    fn now_ms(&self) -> i64 {
        self.ports.clock.now().timestamp_millis()
    }

    /// The `Active -> Expired` transition. A no-op from any other status.
    fn expire(&self, state: &mut SessionState) {
        if state.session.status != SessionStatus::Active {
            return;
        }
        state.cancel_watchdog();
        state.session.status = SessionStatus::Expired;
        self.ports.store.clear();

        if !state.session.expired_notified {
            self.ports
                .notifier
                .notify(NotifyLevel::Info, SESSION_EXPIRED_MESSAGE);
            state.session.expired_notified = true;
        }

        info!(expiry_epoch_ms = ?state.session.expiry_epoch_ms, "Session expired");
        self.ports.navigator.go_to(&self.login_route);
    }

    async fn fail_closed(&self) {
        let mut state = self.state.lock().await;
        state.cancel_watchdog();
        state.generation += 1;
        state.session.status = SessionStatus::Expired;
        state.session.expiry_epoch_ms = None;
        self.ports.store.clear();
        self.ports.navigator.go_to(&self.login_route);
    }
}

//=========================================================================================
// Watchdog Task
//=========================================================================================

/// Sleeps until the credential expires, then performs the expiry transition.
///
/// The remaining time is re-read from the clock after every wake-up, so a wall
/// clock that lags the timer only delays the transition rather than skipping it.
async fn watchdog(
    shared: Arc<Shared>,
    generation: u64,
    expiry_epoch_ms: i64,
    token: CancellationToken,
) {
    loop {
        let remaining_ms = expiry_epoch_ms - shared.now_ms();
        if remaining_ms <= 0 {
            break;
        }
        debug!(remaining_ms, "Watchdog sleeping until expiry");
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Watchdog cancelled");
                return;
            }
            _ = tokio::time::sleep(Duration::from_millis(remaining_ms as u64)) => {}
        }
    }

    let mut state = shared.state.lock().await;
    if state.generation == generation && !token.is_cancelled() {
        shared.expire(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_portal_core::mock::{issue_token, MockNavigator, MockNotifier, MockStore};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    const BASE_SECS: i64 = 1_717_200_000; // 2024-06-01T00:00:00Z

    /// Wall clock that advances with tokio's (paused) virtual time.
    struct VirtualClock {
        base: DateTime<Utc>,
        started: tokio::time::Instant,
    }

    impl Clock for VirtualClock {
        fn now(&self) -> DateTime<Utc> {
            self.base + chrono::Duration::from_std(self.started.elapsed()).unwrap()
        }

        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    struct Harness {
        manager: SessionManager,
        store: Arc<MockStore>,
        notifier: Arc<MockNotifier>,
        navigator: Arc<MockNavigator>,
    }

    fn harness(store: MockStore) -> Harness {
        let store = Arc::new(store);
        let notifier = Arc::new(MockNotifier::new());
        let navigator = Arc::new(MockNavigator::new());
        let clock = Arc::new(VirtualClock {
            base: Utc.timestamp_opt(BASE_SECS, 0).unwrap(),
            started: tokio::time::Instant::now(),
        });
        let manager = SessionManager::new(
            SessionPorts {
                store: store.clone(),
                notifier: notifier.clone(),
                navigator: navigator.clone(),
                clock,
            },
            "/login",
        );
        Harness {
            manager,
            store,
            notifier,
            navigator,
        }
    }

    async fn sleep_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_with_expired_token_expires_immediately() {
        let h = harness(MockStore::new());

        h.manager.arm(issue_token(BASE_SECS - 1000)).await.unwrap();

        // No tick has elapsed yet.
        let session = h.manager.session().await;
        assert_eq!(session.status, SessionStatus::Expired);
        assert!(session.expired_notified);
        assert!(h.store.is_empty());
        assert_eq!(
            h.notifier.notifications(),
            vec![(NotifyLevel::Info, SESSION_EXPIRED_MESSAGE.to_string())]
        );
        assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_token_fails_closed() {
        let h = harness(MockStore::new());

        let result = h.manager.arm(Credential::new("not-a-token")).await;

        assert!(matches!(result, Err(SessionError::MalformedToken(_))));
        assert_ne!(h.manager.status().await, SessionStatus::Active);
        assert!(h.store.is_empty());
        assert!(h.notifier.notifications().is_empty());
        assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_rearm_cancels_previous_watchdog() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();

        let corrupt = Credential::new("e30.%%%.sig");
        assert!(h.manager.arm(corrupt).await.is_err());

        sleep_secs(10).await;
        assert_eq!(h.manager.status().await, SessionStatus::Expired);
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_expires_at_deadline() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();

        let session = h.manager.session().await;
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.expiry_epoch_ms, Some((BASE_SECS + 5) * 1000));
        assert!(!h.store.is_empty());

        sleep_secs(4).await;
        assert_eq!(h.manager.status().await, SessionStatus::Active);

        sleep_secs(2).await;
        assert_eq!(h.manager.status().await, SessionStatus::Expired);
        assert!(h.store.is_empty());
        assert_eq!(h.notifier.count(NotifyLevel::Info), 1);
        assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);

        // Nothing further happens once expired.
        sleep_secs(60).await;
        assert_eq!(h.notifier.count(NotifyLevel::Info), 1);
        assert_eq!(h.navigator.routes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_watchdog_without_expiry_notice() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();

        h.manager.logout().await;

        assert_eq!(h.manager.status().await, SessionStatus::NoSession);
        assert!(h.store.is_empty());
        assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);

        sleep_secs(10).await;
        assert_eq!(h.manager.status().await, SessionStatus::NoSession);
        assert!(h.notifier.notifications().is_empty());
        assert_eq!(h.navigator.routes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_watchdog() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();
        h.manager.arm(issue_token(BASE_SECS + 60)).await.unwrap();

        sleep_secs(10).await;
        assert_eq!(h.manager.status().await, SessionStatus::Active);
        assert!(h.notifier.notifications().is_empty());

        sleep_secs(60).await;
        assert_eq!(h.manager.status().await, SessionStatus::Expired);
        assert_eq!(h.notifier.count(NotifyLevel::Info), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_latch_resets_only_on_rearm() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS - 1)).await.unwrap();
        assert!(h.manager.session().await.expired_notified);

        h.manager.logout().await;
        assert!(h.manager.session().await.expired_notified);

        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();
        assert!(!h.manager.session().await.expired_notified);

        sleep_secs(6).await;
        assert!(h.manager.session().await.expired_notified);
        // One notification per expiry event.
        assert_eq!(h.notifier.count(NotifyLevel::Info), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_arms_stored_credential() {
        let h = harness(MockStore::with_credential(issue_token(BASE_SECS + 30)));

        assert_eq!(h.manager.restore().await.unwrap(), SessionStatus::Active);

        sleep_secs(31).await;
        assert_eq!(h.manager.status().await, SessionStatus::Expired);
        assert!(h.store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_with_empty_store_is_noop() {
        let h = harness(MockStore::new());

        assert_eq!(h.manager.restore().await.unwrap(), SessionStatus::NoSession);
        assert!(h.navigator.routes().is_empty());
        assert_eq!(*h.store.sets.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_session_redirects_without_credential() {
        let h = harness(MockStore::new());
        assert!(!h.manager.require_session());
        assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);

        h.manager.arm(issue_token(BASE_SECS + 30)).await.unwrap();
        assert!(h.manager.require_session());
        assert_eq!(h.navigator.routes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_leaves_no_watchdog_behind() {
        let h = harness(MockStore::new());
        h.manager.arm(issue_token(BASE_SECS + 5)).await.unwrap();

        h.manager.shutdown();
        sleep_secs(10).await;

        assert_eq!(h.manager.status().await, SessionStatus::Active);
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_after_shutdown_is_refused() {
        let h = harness(MockStore::new());
        h.manager.shutdown();

        let result = h.manager.arm(issue_token(BASE_SECS + 5)).await;

        assert!(matches!(result, Err(SessionError::ShutDown)));
        assert_eq!(h.manager.status().await, SessionStatus::NoSession);
        assert!(h.store.is_empty());

        sleep_secs(60).await;
        assert_eq!(h.manager.status().await, SessionStatus::NoSession);
        assert!(h.notifier.notifications().is_empty());
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_after_shutdown_keeps_stored_credential() {
        let token = issue_token(BASE_SECS + 30);
        let h = harness(MockStore::with_credential(token.clone()));
        h.manager.shutdown();

        assert!(matches!(h.manager.restore().await, Err(SessionError::ShutDown)));
        assert_eq!(h.store.get(), Some(token));
    }
}
