//! CDP endpoint URL and auth-header helpers.

pub mod auth;
pub mod url;

pub use auth::{headers_with_auth, OriginCredential};
pub use url::normalize_ws_url;
