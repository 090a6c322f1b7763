//! Recording mock adapters for unit/integration testing
//!
//! Every port has a mock here that records what it was asked to do, so tests can
//! assert on side effects (notifications shown, routes visited, store writes).

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{
    ApiMessage, AppointmentRequest, ConsultationRequest, Credential, LoginOutcome, LoginRequest,
    Record, RecordKind, RegistrationRequest,
};
use crate::ports::{
    Clock, Navigator, NotificationSink, NotifyLevel, PortError, PortResult, PortalApi,
    SessionStore,
};

/// Builds an unsigned compact token whose payload carries `exp`.
pub fn issue_token(exp_secs: i64) -> Credential {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"patient","exp":{}}}"#, exp_secs));
    Credential::new(format!("{}.{}.mock-signature", header, payload))
}

//=========================================================================================
// Session store
//=========================================================================================

/// In-memory store that also counts writes.
#[derive(Default)]
pub struct MockStore {
    credential: Mutex<Option<Credential>>,
    pub sets: Mutex<usize>,
    pub clears: Mutex<usize>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        *store.credential.lock().unwrap() = Some(credential);
        store
    }

    pub fn is_empty(&self) -> bool {
        self.credential.lock().unwrap().is_none()
    }
}

impl SessionStore for MockStore {
    fn get(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }

    fn set(&self, credential: &Credential) {
        *self.sets.lock().unwrap() += 1;
        *self.credential.lock().unwrap() = Some(credential.clone());
    }

    fn clear(&self) {
        *self.clears.lock().unwrap() += 1;
        *self.credential.lock().unwrap() = None;
    }
}

//=========================================================================================
// Notifications and navigation
//=========================================================================================

#[derive(Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<(NotifyLevel, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(NotifyLevel, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn count(&self, level: NotifyLevel) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn last(&self) -> Option<(NotifyLevel, String)> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for MockNotifier {
    fn notify(&self, level: NotifyLevel, text: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((level, text.to_string()));
    }
}

#[derive(Default)]
pub struct MockNavigator {
    routes: Mutex<Vec<String>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn go_to(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

//=========================================================================================
// Clock
//=========================================================================================

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Noon UTC on the given date, so `today()` is that date.
    pub fn on(date: NaiveDate) -> Self {
        Self::at(Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.now.lock().unwrap().date_naive()
    }
}

//=========================================================================================
// Remote API
//=========================================================================================

/// A scripted booking API. Listing replies are per kind; every account and
/// booking endpoint shares one `{ message }` reply unless a login reply is set.
pub struct MockApi {
    listings: Mutex<HashMap<RecordKind, PortResult<Vec<Record>>>>,
    login_reply: Mutex<PortResult<LoginOutcome>>,
    message_reply: Mutex<PortResult<ApiMessage>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(HashMap::new()),
            login_reply: Mutex::new(Err(PortError::Unexpected("no login reply scripted".into()))),
            message_reply: Mutex::new(Ok(ApiMessage::default())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_records(&self, kind: RecordKind, records: Vec<Record>) {
        self.listings.lock().unwrap().insert(kind, Ok(records));
    }

    pub fn fail_records(&self, kind: RecordKind, error: PortError) {
        self.listings.lock().unwrap().insert(kind, Err(error));
    }

    pub fn set_login_reply(&self, reply: PortResult<LoginOutcome>) {
        *self.login_reply.lock().unwrap() = reply;
    }

    pub fn set_message_reply(&self, reply: PortResult<ApiMessage>) {
        *self.message_reply.lock().unwrap() = reply;
    }

    /// Names of the endpoints called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn message(&self) -> PortResult<ApiMessage> {
        self.message_reply.lock().unwrap().clone()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortalApi for MockApi {
    async fn list_records(&self, kind: RecordKind) -> PortResult<Vec<Record>> {
        self.record_call(format!("list_records:{}", kind));
        self.listings
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn login(&self, _request: &LoginRequest) -> PortResult<LoginOutcome> {
        self.record_call("login");
        self.login_reply.lock().unwrap().clone()
    }

    async fn register(&self, _request: &RegistrationRequest) -> PortResult<ApiMessage> {
        self.record_call("register");
        self.message()
    }

    async fn request_password_reset(&self, _email: &str) -> PortResult<ApiMessage> {
        self.record_call("request_password_reset");
        self.message()
    }

    async fn reset_password(&self, _email: &str) -> PortResult<ApiMessage> {
        self.record_call("reset_password");
        self.message()
    }

    async fn book_appointment(&self, _request: &AppointmentRequest) -> PortResult<ApiMessage> {
        self.record_call("book_appointment");
        self.message()
    }

    async fn book_consultation(&self, _request: &ConsultationRequest) -> PortResult<ApiMessage> {
        self.record_call("book_consultation");
        self.message()
    }
}
