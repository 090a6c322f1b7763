//! services/portal/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the remote booking service. It is
//! the concrete implementation of the `PortalApi` port from the `core` crate.

use async_trait::async_trait;
use booking_portal_core::domain::{
    parse_appointment_date, ApiMessage, AppointmentRequest, ConsultationRequest, Credential,
    LoginOutcome, LoginRequest, Record, RecordKind, RegistrationRequest,
};
use booking_portal_core::ports::{PortError, PortResult, PortalApi, SessionStore};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `PortalApi` port over HTTP/JSON.
///
/// Requests carry the stored credential as a bearer token when one exists.
#[derive(Clone)]
pub struct HttpPortalApi {
    client: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
}

impl HttpPortalApi {
    /// Creates a new `HttpPortalApi`. `base_url` should end in `/`.
    pub fn new(base_url: Url, store: Arc<dyn SessionStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    fn endpoint(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::Unexpected(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(credential) => request.bearer_auth(credential.as_str()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PortResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .authorize(self.client.post(url).json(body))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        decode(response).await
    }
}

/// Maps a response onto the port's success/failure contract: a 2xx body is
/// decoded as `T`; anything else becomes `Rejected` with the body's `message`
/// if it has one.
async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed response body: {}", e)));
    }

    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    debug!(%status, ?message, "Request rejected");
    if status == StatusCode::NOT_FOUND && message.is_none() {
        return Err(PortError::NotFound(status.to_string()));
    }
    Err(PortError::Rejected { message })
}

//=========================================================================================
// Wire Structs
//=========================================================================================

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

impl MessageBody {
    fn to_domain(self) -> ApiMessage {
        ApiMessage {
            message: self.message,
        }
    }
}

/// A list endpoint's reply. The records arrive under `data`, or under the
/// collection's own name.
#[derive(Deserialize)]
struct ListBody {
    #[serde(default, alias = "appointments", alias = "consultations")]
    data: Vec<RecordWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    appointment_date: Option<String>,
    #[serde(default)]
    appointment_time: Option<String>,
}

impl RecordWire {
    fn to_domain(self, kind: RecordKind) -> Record {
        Record {
            id: self.id,
            name: self.name,
            email: self.email,
            appointment_date: self
                .appointment_date
                .as_deref()
                .and_then(parse_appointment_date),
            appointment_time: self.appointment_time,
            kind,
        }
    }
}

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    message: Option<String>,
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentPayload<'a> {
    name: &'a str,
    email: &'a str,
    appointment_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsultationPayload<'a> {
    name: &'a str,
    email: &'a str,
    appointment_date: String,
    appointment_time: String,
    call_type: &'static str,
    prescription_need: bool,
}

//=========================================================================================
// `PortalApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn list_records(&self, kind: RecordKind) -> PortResult<Vec<Record>> {
        let path = match kind {
            RecordKind::Appointment => "user/getAppointments",
            RecordKind::Consultation => "user/getConsultations",
        };
        let body: ListBody = self.get_json(path).await?;
        Ok(body
            .data
            .into_iter()
            .map(|wire| wire.to_domain(kind))
            .collect())
    }

    async fn login(&self, request: &LoginRequest) -> PortResult<LoginOutcome> {
        let payload = LoginPayload {
            email: &request.email,
            password: &request.password,
            confirm_password: &request.confirm_password,
        };
        let body: LoginBody = self.post_json("user/login", &payload).await?;
        Ok(LoginOutcome {
            message: body.message,
            token: Credential::new(body.token),
        })
    }

    async fn register(&self, request: &RegistrationRequest) -> PortResult<ApiMessage> {
        let payload = RegisterPayload {
            name: &request.name,
            email: &request.email,
            password: &request.password,
            confirm_password: &request.confirm_password,
        };
        let body: MessageBody = self.post_json("user/register", &payload).await?;
        Ok(body.to_domain())
    }

    async fn request_password_reset(&self, email: &str) -> PortResult<ApiMessage> {
        let body: MessageBody = self
            .post_json("user/request-password-reset", &EmailPayload { email })
            .await?;
        Ok(body.to_domain())
    }

    async fn reset_password(&self, email: &str) -> PortResult<ApiMessage> {
        let body: MessageBody = self
            .post_json("user/reset-password", &EmailPayload { email })
            .await?;
        Ok(body.to_domain())
    }

    async fn book_appointment(&self, request: &AppointmentRequest) -> PortResult<ApiMessage> {
        let payload = AppointmentPayload {
            name: &request.name,
            email: &request.email,
            appointment_date: request.appointment_date.format("%Y-%m-%d").to_string(),
        };
        let body: MessageBody = self.post_json("appointments/book", &payload).await?;
        Ok(body.to_domain())
    }

    async fn book_consultation(&self, request: &ConsultationRequest) -> PortResult<ApiMessage> {
        let payload = ConsultationPayload {
            name: &request.name,
            email: &request.email,
            appointment_date: request.appointment_date.format("%Y-%m-%d").to_string(),
            appointment_time: request.appointment_time.format("%H:%M").to_string(),
            call_type: request.call_type.as_str(),
            prescription_need: request.prescription_need,
        };
        let body: MessageBody = self
            .post_json("consultations/book-consultation", &payload)
            .await?;
        Ok(body.to_domain())
    }
}
