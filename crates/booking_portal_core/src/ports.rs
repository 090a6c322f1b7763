//! crates/booking_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the portal's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! session and listing logic to be independent of the HTTP client, the storage
//! backend, and whatever renders notifications.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    ApiMessage, AppointmentRequest, ConsultationRequest, Credential, LoginOutcome, LoginRequest,
    Record, RecordKind, RegistrationRequest,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network).
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    /// The service answered with a failure body, which may carry a reason.
    #[error("Request rejected: {}", message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },
}

impl PortError {
    /// The server-provided reason, when there is one worth showing to the user.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            PortError::Rejected { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Synchronous Client-Side Ports
//=========================================================================================

/// Persists the credential across restarts. Only the session manager writes it.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: &Credential);
    fn clear(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
    Info,
}

/// Fire-and-forget user notifications (toasts).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: NotifyLevel, text: &str);
}

/// Fire-and-forget redirect requests.
pub trait Navigator: Send + Sync {
    fn go_to(&self, route: &str);
}

/// Source of the current instant and of the user's calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// Today's date in the user's zone. Comparisons against it are date-only.
    fn today(&self) -> NaiveDate;
}

//=========================================================================================
// Remote Booking API Port
//=========================================================================================

#[async_trait]
pub trait PortalApi: Send + Sync {
    // --- Listings ---
    /// Fetches the complete collection of the given kind for the current user.
    async fn list_records(&self, kind: RecordKind) -> PortResult<Vec<Record>>;

    // --- Account ---
    async fn login(&self, request: &LoginRequest) -> PortResult<LoginOutcome>;

    async fn register(&self, request: &RegistrationRequest) -> PortResult<ApiMessage>;

    async fn request_password_reset(&self, email: &str) -> PortResult<ApiMessage>;

    async fn reset_password(&self, email: &str) -> PortResult<ApiMessage>;

    // --- Booking ---
    async fn book_appointment(&self, request: &AppointmentRequest) -> PortResult<ApiMessage>;

    async fn book_consultation(&self, request: &ConsultationRequest) -> PortResult<ApiMessage>;
}
