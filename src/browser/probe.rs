//! CDP readiness probing.
//!
//! Two tiers: HTTP liveness against `/json/version`, then a WebSocket
//! handshake against the advertised debugger URL. Individual probes are
//! cheap and short-lived; callers drive them through a deadline-bounded
//! polling loop. A failed probe is "not ready", never fatal.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, trace};

use crate::cdp;
use crate::cdp::auth::OriginCredential;
use crate::error::{Error, Result};

const HTTP_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
const WS_PROBE_TIMEOUT: Duration = Duration::from_millis(800);

/// Bounded sleep-and-retry policy, parameterized per call site.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub interval: Duration,
	pub max_wait: Duration,
}

/// `/json/version` response subset from the Chrome DevTools Protocol.
#[derive(Debug, Deserialize)]
pub struct CdpVersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: Option<String>,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
	#[serde(rename = "User-Agent")]
	pub user_agent: Option<String>,
}

/// Fetches CDP version metadata from `<base_url>/json/version`.
///
/// One short-lived attempt; any non-success status, network error, timeout,
/// or malformed body is a retryable probe failure.
pub async fn fetch_version(base_url: &str) -> Result<CdpVersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(HTTP_PROBE_TIMEOUT)
		.build()
		.map_err(|e| Error::Probe(format!("failed to build HTTP client: {e}")))?;

	let response = client
		.get(format!("{base_url}/json/version"))
		.send()
		.await
		.map_err(|e| Error::Probe(format!("{base_url}/json/version unreachable: {e}")))?;

	if !response.status().is_success() {
		return Err(Error::Probe(format!("{base_url}/json/version returned {}", response.status())));
	}

	let body: serde_json::Value = response
		.json()
		.await
		.map_err(|e| Error::Probe(format!("{base_url}/json/version body unreadable: {e}")))?;
	if !body.is_object() {
		return Err(Error::Probe(format!("{base_url}/json/version body is not a JSON object")));
	}

	serde_json::from_value(body).map_err(|e| Error::Probe(format!("{base_url}/json/version malformed: {e}")))
}

/// Single HTTP liveness check, used by reuse and shutdown decisions.
pub async fn is_reachable(base_url: &str) -> bool {
	fetch_version(base_url).await.is_ok()
}

/// Confirms the debugger endpoint accepts a WebSocket handshake.
///
/// The advertised URL is normalized against `base_url` first since the
/// browser may self-report an address unusable by the caller.
pub async fn probe_websocket(base_url: &str, credentials: &[OriginCredential]) -> Result<()> {
	let info = fetch_version(base_url).await?;
	let raw = info
		.web_socket_debugger_url
		.filter(|u| !u.is_empty())
		.ok_or_else(|| Error::Probe(format!("{base_url} advertises no webSocketDebuggerUrl")))?;
	let ws_url = cdp::normalize_ws_url(&raw, base_url)?;

	let mut request = ws_url
		.as_str()
		.into_client_request()
		.map_err(|e| Error::Probe(format!("invalid websocket request for '{ws_url}': {e}")))?;
	request.headers_mut().extend(cdp::headers_with_auth(&ws_url, credentials));

	let handshake = tokio::time::timeout(WS_PROBE_TIMEOUT, connect_async(request)).await;
	match handshake {
		Ok(Ok((mut stream, _response))) => {
			let _ = stream.close(None).await;
			trace!(target: "cdp.probe", url = %ws_url, "websocket handshake ok");
			Ok(())
		}
		Ok(Err(e)) => Err(Error::Probe(format!("websocket handshake to '{ws_url}' failed: {e}"))),
		Err(_) => Err(Error::Probe(format!("websocket handshake to '{ws_url}' timed out"))),
	}
}

/// Polls until the endpoint is both HTTP-reachable and WebSocket-capable,
/// or the policy deadline elapses. Strictly bounded; never spins.
pub async fn await_ready(base_url: &str, credentials: &[OriginCredential], policy: RetryPolicy) -> Result<()> {
	let started = Instant::now();
	let deadline = started + policy.max_wait;
	let mut last_error;

	loop {
		match probe_websocket(base_url, credentials).await {
			Ok(()) => {
				debug!(target: "cdp.probe", url = base_url, waited_ms = started.elapsed().as_millis() as u64, "endpoint ready");
				return Ok(());
			}
			Err(e) => last_error = e,
		}
		if Instant::now() >= deadline {
			break;
		}
		tokio::time::sleep(policy.interval).await;
	}

	Err(Error::Probe(format!(
		"{base_url} not ready within {} ms; last error: {last_error}",
		policy.max_wait.as_millis()
	)))
}

#[cfg(test)]
mod tests {
	use super::*;

	/// A loopback port that nothing listens on.
	fn dead_port() -> u16 {
		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		drop(listener);
		port
	}

	#[tokio::test]
	async fn fetch_version_fails_fast_on_closed_port() {
		let url = format!("http://127.0.0.1:{}", dead_port());
		let err = fetch_version(&url).await.unwrap_err();
		assert!(matches!(err, Error::Probe(_)), "got {err:?}");
	}

	#[tokio::test]
	async fn await_ready_respects_the_deadline() {
		let url = format!("http://127.0.0.1:{}", dead_port());
		let policy = RetryPolicy {
			interval: Duration::from_millis(10),
			max_wait: Duration::from_millis(80),
		};
		let started = std::time::Instant::now();
		let err = await_ready(&url, &[], policy).await.unwrap_err();
		assert!(matches!(err, Error::Probe(_)), "got {err:?}");
		assert!(started.elapsed() < Duration::from_secs(5), "polling overran its deadline");
	}

	#[tokio::test]
	async fn unreachable_endpoint_reports_not_reachable() {
		let url = format!("http://127.0.0.1:{}", dead_port());
		assert!(!is_reachable(&url).await);
	}
}
