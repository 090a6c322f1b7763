//! services/portal/src/controllers/booking.rs
//!
//! Booking forms for appointments and consultations.

use booking_portal_core::domain::{AppointmentRequest, CallType, ConsultationRequest};
use booking_portal_core::ports::{Clock, NotificationSink, PortalApi};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::info;

use super::{report_failure, report_invalid, report_success, FormOutcome, ValidationError};

/// The appointment form as the user filled it in.
#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    pub name: String,
    pub email: String,
    pub appointment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ConsultationForm {
    pub name: String,
    pub email: String,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub call_type: CallType,
    pub prescription_need: bool,
}

pub struct BookingController {
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl BookingController {
    pub fn new(
        api: Arc<dyn PortalApi>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            notifier,
            clock,
        }
    }

    pub async fn book_appointment(&self, form: &AppointmentForm) -> FormOutcome {
        let request = match self.validate_appointment(form) {
            Ok(request) => request,
            Err(e) => return report_invalid(self.notifier.as_ref(), &e),
        };

        match self.api.book_appointment(&request).await {
            Ok(reply) => {
                info!(date = %request.appointment_date, "Appointment booked");
                report_success(
                    self.notifier.as_ref(),
                    reply.message.as_deref(),
                    "Appointment booked successfully!",
                );
                FormOutcome::Completed
            }
            Err(e) => report_failure(self.notifier.as_ref(), &e, "Failed to book the appointment!"),
        }
    }

    pub async fn book_consultation(&self, form: &ConsultationForm) -> FormOutcome {
        let request = match self.validate_consultation(form) {
            Ok(request) => request,
            Err(e) => return report_invalid(self.notifier.as_ref(), &e),
        };

        match self.api.book_consultation(&request).await {
            Ok(reply) => {
                info!(
                    date = %request.appointment_date,
                    call_type = request.call_type.as_str(),
                    "Consultation booked"
                );
                report_success(
                    self.notifier.as_ref(),
                    reply.message.as_deref(),
                    "Consultation booked successfully!",
                );
                FormOutcome::Completed
            }
            Err(e) => report_failure(self.notifier.as_ref(), &e, "Failed to book the consultation!"),
        }
    }

    fn validate_appointment(&self, form: &AppointmentForm) -> Result<AppointmentRequest, ValidationError> {
        let (name, email, appointment_date) =
            self.validate_common(&form.name, &form.email, form.appointment_date)?;
        Ok(AppointmentRequest {
            name,
            email,
            appointment_date,
        })
    }

    fn validate_consultation(
        &self,
        form: &ConsultationForm,
    ) -> Result<ConsultationRequest, ValidationError> {
        let (name, email, appointment_date) =
            self.validate_common(&form.name, &form.email, form.appointment_date)?;
        let appointment_time = form.appointment_time.ok_or(ValidationError::MissingTime)?;
        Ok(ConsultationRequest {
            name,
            email,
            appointment_date,
            appointment_time,
            call_type: form.call_type,
            prescription_need: form.prescription_need,
        })
    }

    fn validate_common(
        &self,
        name: &str,
        email: &str,
        date: Option<NaiveDate>,
    ) -> Result<(String, String, NaiveDate), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        let date = date.ok_or(ValidationError::MissingDate)?;
        if date < self.clock.today() {
            return Err(ValidationError::DateInPast);
        }
        Ok((name.trim().to_string(), email.trim().to_string(), date))
    }
}
