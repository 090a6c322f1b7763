//! services/portal/src/controllers/auth.rs
//!
//! Login, registration, password reset and logout.

use booking_portal_core::domain::{LoginRequest, RegistrationRequest, SessionStatus};
use booking_portal_core::ports::{Navigator, NotificationSink, NotifyLevel, PortalApi};
use std::sync::Arc;
use tracing::info;

use super::{report_failure, report_invalid, report_success, FormOutcome, ValidationError};
use crate::session::SessionManager;

/// Where the auth flows send the user.
#[derive(Debug, Clone)]
pub struct Routes {
    pub login: String,
    pub home: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/".to_string(),
        }
    }
}

pub struct AuthController {
    api: Arc<dyn PortalApi>,
    session: Arc<SessionManager>,
    notifier: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
}

impl AuthController {
    pub fn new(
        api: Arc<dyn PortalApi>,
        session: Arc<SessionManager>,
        notifier: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
        routes: Routes,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            navigator,
            routes,
        }
    }

    /// Logs in and arms the session with the issued token.
    ///
    /// The user only lands on the home route if the token armed into an
    /// active session; an expired or undecodable token has already sent them
    /// back to login.
    pub async fn login(&self, email: &str, password: &str, confirm_password: &str) -> FormOutcome {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };

        let outcome = match self.api.login(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return report_failure(
                    self.notifier.as_ref(),
                    &e,
                    "Login failed. Please try again.",
                )
            }
        };

        report_success(
            self.notifier.as_ref(),
            outcome.message.as_deref(),
            "Login successful!",
        );
        if self.session.arm(outcome.token).await.is_err() {
            return FormOutcome::Rejected;
        }
        if self.session.status().await != SessionStatus::Active {
            return FormOutcome::Rejected;
        }

        info!("Login complete");
        self.navigator.go_to(&self.routes.home);
        FormOutcome::Completed
    }

    pub async fn register(&self, form: &RegistrationRequest) -> FormOutcome {
        if let Err(e) = validate_registration(form) {
            return report_invalid(self.notifier.as_ref(), &e);
        }

        match self.api.register(form).await {
            Ok(reply) => {
                report_success(
                    self.notifier.as_ref(),
                    reply.message.as_deref(),
                    "Registered successfully!",
                );
                self.navigator.go_to(&self.routes.login);
                FormOutcome::Completed
            }
            Err(e) => report_failure(self.notifier.as_ref(), &e, "Registration failed. Try again."),
        }
    }

    /// Asks the service to e-mail a reset link. Failures always show the same
    /// generic text, whatever the service said.
    pub async fn request_password_reset(&self, email: &str) -> FormOutcome {
        if email.trim().is_empty() {
            return report_invalid(self.notifier.as_ref(), &ValidationError::MissingEmail);
        }

        match self.api.request_password_reset(email.trim()).await {
            Ok(reply) => {
                report_success(
                    self.notifier.as_ref(),
                    reply.message.as_deref(),
                    "Password reset requested.",
                );
                FormOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password reset request failed");
                self.notifier.notify(
                    NotifyLevel::Error,
                    "Failed to request password reset. Please try again later.",
                );
                FormOutcome::Rejected
            }
        }
    }

    pub async fn reset_password(&self, email: &str) -> FormOutcome {
        if email.trim().is_empty() {
            return report_invalid(self.notifier.as_ref(), &ValidationError::MissingEmail);
        }

        match self.api.reset_password(email.trim()).await {
            Ok(reply) => {
                report_success(
                    self.notifier.as_ref(),
                    reply.message.as_deref(),
                    "Password reset link sent!",
                );
                self.navigator.go_to(&self.routes.login);
                FormOutcome::Completed
            }
            Err(e) => report_failure(self.notifier.as_ref(), &e, "Reset failed. Please try again."),
        }
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }
}

fn validate_registration(form: &RegistrationRequest) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if form.email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
