//! Adapters for the application ports.

mod cookie_jar;
mod reqwest_transport;
mod system_clock;

pub use cookie_jar::{CookieJarError, PersistentCookieJar};
pub use reqwest_transport::ReqwestTransport;
pub use system_clock::SystemClock;
