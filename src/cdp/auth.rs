//! Optional static auth headers for CDP endpoints.
//!
//! Pass-through only: when a credential is configured for a URL's origin it
//! rides along on the handshake, otherwise the header set is empty. No
//! authentication logic lives here.

use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::{HeaderMap, HeaderValue};
use url::Url;

/// A static credential bound to one endpoint origin.
#[derive(Debug, Clone)]
pub struct OriginCredential {
	/// Origin the credential applies to, e.g. `http://127.0.0.1:9222`.
	pub origin: String,
	/// Full `Authorization` header value, e.g. `Bearer abc123`.
	pub header_value: String,
}

/// Headers to attach when connecting to `url`. Empty unless a credential
/// matches the URL's host and port; schemes are ignored so an `http://`
/// origin also covers the `ws://` debugger endpoint behind it.
pub fn headers_with_auth(url: &str, credentials: &[OriginCredential]) -> HeaderMap {
	let mut headers = HeaderMap::new();
	let Ok(target) = Url::parse(url) else {
		return headers;
	};

	for credential in credentials {
		let Ok(origin) = Url::parse(&credential.origin) else {
			continue;
		};
		if origin.host_str() == target.host_str() && origin.port_or_known_default() == target.port_or_known_default() {
			if let Ok(value) = HeaderValue::from_str(&credential.header_value) {
				headers.insert(AUTHORIZATION, value);
			}
			break;
		}
	}

	headers
}
