//! crates/booking_portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the booking portal client.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, NaiveDate, NaiveTime};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Session
//=========================================================================================

/// An opaque compact token issued by the booking service at login.
///
/// The raw text is never printed by `Debug`; use [`Credential::as_str`] when it
/// has to leave the process (storage, `Authorization` header).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Lifecycle status of the client-held session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    NoSession,
    Active,
    Expired,
}

/// A snapshot of the session derived from the armed credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub status: SessionStatus,
    pub expiry_epoch_ms: Option<i64>,
    /// Latched once the expiry notification has been shown; cleared only by a
    /// successful re-arm.
    pub expired_notified: bool,
}

//=========================================================================================
// Records
//=========================================================================================

/// Selects which of the two parallel record collections is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Appointment,
    Consultation,
}

impl RecordKind {
    /// The plural collection name, as used in routes and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Appointment => "appointments",
            RecordKind::Consultation => "consultations",
        }
    }

    /// Message shown when a listing fetch fails without a server-provided reason.
    pub fn fetch_failure_message(&self) -> &'static str {
        match self {
            RecordKind::Appointment => "Failed to fetch appointments.",
            RecordKind::Consultation => "Failed to fetch consultations.",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked appointment or consultation as returned by a list endpoint.
///
/// Records are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `None` when the service sent no date or one that could not be parsed.
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<String>,
    pub kind: RecordKind,
}

impl Record {
    /// Date as shown on a record card (`dd/mm/yyyy`).
    pub fn display_date(&self) -> String {
        match self.appointment_date {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => "No Date".to_string(),
        }
    }

    pub fn display_time(&self) -> &str {
        match self.appointment_time.as_deref() {
            Some(time) if !time.trim().is_empty() => time,
            _ => "N/A",
        }
    }
}

/// Parses the `appointmentDate` field sent by the service.
///
/// Accepts a bare `YYYY-MM-DD` date or a full RFC 3339 timestamp, in which case
/// only the date part is kept.
pub fn parse_appointment_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Ordering applied to the derived listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Name,
    Upcoming,
    Past,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortKey::Date),
            "name" => Ok(SortKey::Name),
            "upcoming" => Ok(SortKey::Upcoming),
            "past" => Ok(SortKey::Past),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// Badge shown next to a record, independent of the current sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Upcoming,
    Past,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Upcoming => "Upcoming",
            Badge::Past => "Past",
        }
    }
}

//=========================================================================================
// Requests and replies exchanged with the booking service
//=========================================================================================

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub message: Option<String>,
    pub token: Credential,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRequest {
    pub name: String,
    pub email: String,
    pub appointment_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallType {
    #[default]
    Video,
    Audio,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Video => "video",
            CallType::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationRequest {
    pub name: String,
    pub email: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub call_type: CallType,
    pub prescription_need: bool,
}

/// The `{ message }` part of a successful reply; the message is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiMessage {
    pub message: Option<String>,
}
