pub mod clock;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod store;

pub use clock::SystemClock;
pub use http::HttpPortalApi;
pub use navigation::TracingNavigator;
pub use notify::TracingNotifier;
pub use store::{FileSessionStore, MemorySessionStore};
