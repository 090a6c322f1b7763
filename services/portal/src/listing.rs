//! services/portal/src/listing.rs
//!
//! The listing engine behind the "My Appointments" page.
//!
//! It keeps the two record collections, which one is active, the search term,
//! the sort key, and the derived list. The derived list is rebuilt from the full
//! active collection on every change and never edited directly.

use booking_portal_core::domain::{Badge, Record, RecordKind, SortKey};
use booking_portal_core::ports::{Clock, NotificationSink, NotifyLevel, PortalApi};
use booking_portal_core::view;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What became of a single `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced with `count` records.
    Loaded { count: usize },
    /// The fetch failed and the user was notified; the collection is untouched.
    Failed,
    /// A newer load of the same kind was issued while this one was in flight,
    /// so its result was dropped.
    Superseded,
}

/// A read-only copy of the engine's view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub active_kind: RecordKind,
    pub search_term: String,
    pub sort_key: SortKey,
    pub derived: Vec<Record>,
    pub loading: bool,
}

//=========================================================================================
// View State
//=========================================================================================

#[derive(Default)]
struct Collections {
    appointments: Vec<Record>,
    consultations: Vec<Record>,
}

impl Collections {
    fn get(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Appointment => &self.appointments,
            RecordKind::Consultation => &self.consultations,
        }
    }

    fn replace(&mut self, kind: RecordKind, records: Vec<Record>) {
        match kind {
            RecordKind::Appointment => self.appointments = records,
            RecordKind::Consultation => self.consultations = records,
        }
    }
}

struct ViewState {
    collections: Collections,
    active_kind: RecordKind,
    search_term: String,
    sort_key: SortKey,
    derived: Vec<Record>,
    in_flight: usize,
    next_ticket: u64,
    latest_appointments: u64,
    latest_consultations: u64,
}

impl ViewState {
    fn new() -> Self {
        Self {
            collections: Collections::default(),
            active_kind: RecordKind::Appointment,
            search_term: String::new(),
            sort_key: SortKey::default(),
            derived: Vec::new(),
            in_flight: 0,
            next_ticket: 0,
            latest_appointments: 0,
            latest_consultations: 0,
        }
    }

    fn latest_ticket(&mut self, kind: RecordKind) -> &mut u64 {
        match kind {
            RecordKind::Appointment => &mut self.latest_appointments,
            RecordKind::Consultation => &mut self.latest_consultations,
        }
    }

    fn recompute(&mut self, clock: &dyn Clock) {
        let today = clock.today();
        self.derived = view::project(
            self.collections.get(self.active_kind),
            &self.search_term,
            self.sort_key,
            today,
        );
    }
}

//=========================================================================================
// ListingEngine
//=========================================================================================

pub struct ListingEngine {
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    state: Mutex<ViewState>,
}

impl ListingEngine {
    pub fn new(
        api: Arc<dyn PortalApi>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            notifier,
            clock,
            state: Mutex::new(ViewState::new()),
        }
    }

    /// Makes `kind` active and fetches its full collection.
    ///
    /// The derived list switches to `kind` immediately and is rebuilt again
    /// when the fetch succeeds. On failure the collection keeps its previous
    /// contents and one error notification is shown. There is no retry.
    ///
    /// Rebuilding before the fetch keeps the derived list a projection of the
    /// active collection at all times. The cost is that a failed switch shows
    /// the new kind's previous contents (empty on first load) rather than the
    /// list that was on screen before the switch.
    pub async fn load(&self, kind: RecordKind) -> LoadOutcome {
        let ticket = {
            let mut state = self.state.lock().await;
            state.active_kind = kind;
            state.in_flight += 1;
            state.next_ticket += 1;
            let ticket = state.next_ticket;
            *state.latest_ticket(kind) = ticket;
            state.recompute(self.clock.as_ref());
            ticket
        };

        debug!(%kind, ticket, "Fetching collection");
        let result = self.api.list_records(kind).await;

        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        if *state.latest_ticket(kind) != ticket {
            debug!(%kind, ticket, "Discarding superseded fetch result");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                state.collections.replace(kind, records);
                if state.active_kind == kind {
                    state.recompute(self.clock.as_ref());
                }
                info!(%kind, count, "Collection loaded");
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                warn!(%kind, error = %e, "Failed to fetch collection");
                let text = e.user_message().unwrap_or(kind.fetch_failure_message());
                self.notifier.notify(NotifyLevel::Error, text);
                LoadOutcome::Failed
            }
        }
    }

    /// Switching always re-fetches; the other kind's collection is not reused.
    pub async fn switch_active(&self, kind: RecordKind) -> LoadOutcome {
        self.load(kind).await
    }

    pub async fn set_search_term(&self, term: &str) {
        let mut state = self.state.lock().await;
        state.search_term = term.to_string();
        state.recompute(self.clock.as_ref());
    }

    pub async fn set_sort(&self, sort_key: SortKey) {
        let mut state = self.state.lock().await;
        state.sort_key = sort_key;
        state.recompute(self.clock.as_ref());
    }

    /// Badge for a record relative to today, independent of the current sort.
    pub fn classify(&self, record: &Record) -> Badge {
        view::classify(record, self.clock.today())
    }

    pub async fn derived_list(&self) -> Vec<Record> {
        self.state.lock().await.derived.clone()
    }

    pub async fn collection(&self, kind: RecordKind) -> Vec<Record> {
        self.state.lock().await.collections.get(kind).to_vec()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight > 0
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.lock().await;
        ViewSnapshot {
            active_kind: state.active_kind,
            search_term: state.search_term.clone(),
            sort_key: state.sort_key,
            derived: state.derived.clone(),
            loading: state.in_flight > 0,
        }
    }
}
