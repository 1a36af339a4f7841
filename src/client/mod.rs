mod authed_http;
mod route_guard;
mod session_client;
mod session_persistence;
mod session_store;

pub use authed_http::*;
pub use route_guard::*;
pub use session_client::*;
pub use session_persistence::*;
pub use session_store::*;
