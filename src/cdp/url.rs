//! WebSocket URL normalization.
//!
//! The browser self-reports its debugger URL and may advertise an address
//! the caller cannot route to (a 0.0.0.0 binding, a container-internal
//! alias). The reachable scheme/host/port always come from the base URL the
//! caller used to reach the HTTP endpoint; path and query are preserved.

use url::Url;

use crate::error::{Error, Result};

/// Rewrites scheme, host, and port of `raw` to match `base`.
pub fn normalize_ws_url(raw: &str, base: &str) -> Result<String> {
	let mut ws = Url::parse(raw).map_err(|e| Error::Probe(format!("invalid websocket url '{raw}': {e}")))?;
	let base = Url::parse(base).map_err(|e| Error::Probe(format!("invalid CDP base url '{base}': {e}")))?;

	let scheme = match base.scheme() {
		"https" | "wss" => "wss",
		_ => "ws",
	};
	ws.set_scheme(scheme)
		.map_err(|_| Error::Probe(format!("cannot apply scheme '{scheme}' to '{raw}'")))?;
	ws.set_host(base.host_str())
		.map_err(|e| Error::Probe(format!("cannot rewrite host of '{raw}': {e}")))?;
	ws.set_port(base.port())
		.map_err(|_| Error::Probe(format!("cannot rewrite port of '{raw}'")))?;

	Ok(ws.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rewrites_unroutable_host_to_base_host() {
		let normalized =
			normalize_ws_url("ws://0.0.0.0:9222/devtools/browser/abc", "http://127.0.0.1:9222").unwrap();
		assert_eq!(normalized, "ws://127.0.0.1:9222/devtools/browser/abc");
	}

	#[test]
	fn https_base_upgrades_to_wss() {
		let normalized =
			normalize_ws_url("ws://container-internal:9222/devtools/browser/x", "https://127.0.0.1:9443").unwrap();
		assert_eq!(normalized, "wss://127.0.0.1:9443/devtools/browser/x");
	}

	#[test]
	fn path_and_query_survive_normalization() {
		let normalized =
			normalize_ws_url("ws://10.0.0.5:9222/devtools/page/7?panel=network", "http://127.0.0.1:9222").unwrap();
		assert_eq!(normalized, "ws://127.0.0.1:9222/devtools/page/7?panel=network");
	}

	#[test]
	fn malformed_input_is_rejected() {
		assert!(normalize_ws_url("not a url", "http://127.0.0.1:9222").is_err());
		assert!(normalize_ws_url("ws://0.0.0.0:9222/x", "not a url").is_err());
	}
}
