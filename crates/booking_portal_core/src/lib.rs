pub mod credential;
pub mod domain;
pub mod mock;
pub mod ports;
pub mod view;

pub use credential::TokenError;
pub use domain::{
    ApiMessage, AppointmentRequest, Badge, CallType, ConsultationRequest, Credential,
    LoginOutcome, LoginRequest, Record, RecordKind, RegistrationRequest, Session, SessionStatus,
    SortKey,
};
pub use ports::{
    Clock, Navigator, NotificationSink, NotifyLevel, PortError, PortResult, PortalApi,
    SessionStore,
};
