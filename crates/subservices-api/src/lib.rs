// subservices-api: Async Rust client for the sub.services management API

pub mod account;
pub mod client;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod instance;
pub mod params;
pub mod response;
pub mod transport;
pub mod whitelist;

pub use client::SubServices;
pub use credentials::{Credentials, DEFAULT_BASE_URL};
pub use dispatcher::{AUTHORIZATION_PARAM, Method, RequestDispatcher};
pub use error::Error;
pub use instance::Instance;
pub use params::{ParamValue, Params};
pub use response::ApiResult;
pub use transport::{DEFAULT_TIMEOUT, RequestStyle, TlsMode, TransportConfig};
pub use whitelist::Whitelist;
