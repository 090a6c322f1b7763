//! services/portal/src/controllers/mod.rs
//!
//! Page-level controllers. Each one validates its form, calls the booking API,
//! and reports the result as a notification; none of them ever returns an error
//! to the caller.

pub mod auth;
pub mod booking;

pub use auth::{AuthController, Routes};
pub use booking::{AppointmentForm, BookingController, ConsultationForm};

use booking_portal_core::ports::{NotificationSink, NotifyLevel, PortError};

/// How a form submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Completed,
    /// The service refused or could not be reached.
    Rejected,
    /// The form never left the client.
    Invalid,
}

/// Client-side form problems, shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your full name.")]
    MissingName,
    #[error("Please enter your email address.")]
    MissingEmail,
    #[error("Please choose a date.")]
    MissingDate,
    #[error("The date cannot be in the past.")]
    DateInPast,
    #[error("Please choose a time.")]
    MissingTime,
    #[error("Passwords do not match!")]
    PasswordMismatch,
}

fn report_invalid(notifier: &dyn NotificationSink, error: &ValidationError) -> FormOutcome {
    notifier.notify(NotifyLevel::Error, &error.to_string());
    FormOutcome::Invalid
}

fn report_failure(notifier: &dyn NotificationSink, error: &PortError, fallback: &str) -> FormOutcome {
    tracing::warn!(error = %error, "Request failed");
    notifier.notify(NotifyLevel::Error, error.user_message().unwrap_or(fallback));
    FormOutcome::Rejected
}

fn report_success(notifier: &dyn NotificationSink, message: Option<&str>, fallback: &str) {
    let text = message.filter(|m| !m.trim().is_empty()).unwrap_or(fallback);
    notifier.notify(NotifyLevel::Success, text);
}
