//! Single-session registry: idempotent start, bounded stop, URL lending.
//!
//! The registry exclusively owns the active [`RunningChrome`]. Concurrent
//! callers serialize on one mutex held across launch and shutdown, so a
//! second `start` can never race a first into a duplicate process.

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::launcher::{self, RunningChrome};
use super::probe;
use crate::actions::{Action, AutomationEngine};
use crate::config::{BrowserConfig, BrowserProfile};
use crate::error::{Error, Result};

/// Graceful-stop bounds: poll every 100 ms, escalate to kill after 2.5 s.
const STOP_TIMEOUT: Duration = Duration::from_millis(2500);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Identity of the active session as observed by a `start` caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
	pub pid: u32,
	pub cdp_port: u16,
	pub cdp_url: String,
}

/// Holds zero or one active browser session.
#[derive(Default)]
pub struct SessionRegistry {
	inner: Mutex<Option<RunningChrome>>,
}

static GLOBAL: OnceLock<SessionRegistry> = OnceLock::new();

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide registry instance.
	pub fn global() -> &'static SessionRegistry {
		GLOBAL.get_or_init(SessionRegistry::new)
	}

	/// Starts a session, reusing a tracked one whose endpoint still answers.
	/// A tracked-but-unreachable session is discarded and relaunched.
	pub async fn start(&self, config: &BrowserConfig, profile: &BrowserProfile) -> Result<SessionInfo> {
		let mut slot = self.inner.lock().await;

		if let Some(running) = slot.as_ref() {
			let url = loopback_url(running.cdp_port);
			if probe::is_reachable(&url).await {
				debug!(target: "cdp.session", pid = running.pid, port = running.cdp_port, "reusing reachable session");
				return Ok(session_info(running));
			}
			warn!(target: "cdp.session", pid = running.pid, port = running.cdp_port, "tracked session unreachable; discarding stale handle");
			if let Some(mut stale) = slot.take() {
				let _ = stale.child.start_kill();
			}
		}

		let running = launcher::launch(config, profile).await?;
		info!(target: "cdp.session", pid = running.pid, port = running.cdp_port, profile = %profile.name, "browser session started");
		let info = session_info(&running);
		*slot = Some(running);
		Ok(info)
	}

	/// Stops the tracked session. No-op when absent. The handle is always
	/// cleared, even when the process ignores the termination signal.
	pub async fn stop(&self) -> Result<()> {
		let mut slot = self.inner.lock().await;
		let Some(mut running) = slot.take() else {
			debug!(target: "cdp.session", "stop requested with no tracked session");
			return Ok(());
		};

		let url = loopback_url(running.cdp_port);
		terminate(&mut running, &url).await;
		info!(target: "cdp.session", pid = running.pid, "browser session stopped");
		Ok(())
	}

	/// The loopback CDP base URL of the active session.
	pub async fn current_url(&self) -> Result<String> {
		let slot = self.inner.lock().await;
		let running = slot.as_ref().ok_or(Error::NotStarted)?;
		Ok(loopback_url(running.cdp_port))
	}

	/// Lends the current CDP URL to an automation engine for one action.
	/// The engine borrows the URL; it never owns the session.
	pub async fn dispatch<E: AutomationEngine + ?Sized>(&self, engine: &E, action: Action) -> Result<Value> {
		let url = self.current_url().await?;
		engine.perform(&url, action).await
	}
}

fn loopback_url(port: u16) -> String {
	format!("http://127.0.0.1:{port}")
}

fn session_info(running: &RunningChrome) -> SessionInfo {
	SessionInfo {
		pid: running.pid,
		cdp_port: running.cdp_port,
		cdp_url: loopback_url(running.cdp_port),
	}
}

/// Graceful TERM, bounded confirmation wait, forced kill as a last resort.
/// Confirmation is process exit or endpoint unreachability, whichever comes
/// first; the remaining child is reaped by `kill_on_drop` regardless.
async fn terminate(running: &mut RunningChrome, base_url: &str) {
	if let Err(e) = send_term(running.pid) {
		debug!(target: "cdp.session", pid = running.pid, error = %e, "TERM delivery failed; process may already be gone");
	}

	let deadline = Instant::now() + STOP_TIMEOUT;
	loop {
		if let Ok(Some(status)) = running.child.try_wait() {
			debug!(target: "cdp.session", pid = running.pid, status = ?status, "browser exited after TERM");
			return;
		}
		if !probe::is_reachable(base_url).await {
			debug!(target: "cdp.session", pid = running.pid, "endpoint gone after TERM");
			return;
		}
		if Instant::now() >= deadline {
			warn!(target: "cdp.session", pid = running.pid, "graceful stop timed out; killing");
			let _ = running.child.start_kill();
			let _ = tokio::time::timeout(Duration::from_secs(1), running.child.wait()).await;
			return;
		}
		tokio::time::sleep(STOP_POLL_INTERVAL).await;
	}
}

#[cfg(unix)]
fn send_term(pid: u32) -> std::io::Result<()> {
	// pid 0 would signal the caller's entire process group.
	if pid == 0 {
		return Err(std::io::Error::other("refusing to signal pid 0"));
	}
	let status = std::process::Command::new("kill").args(["-TERM", &pid.to_string()]).status()?;
	if !status.success() {
		return Err(std::io::Error::other(format!("kill -TERM {pid} returned {status}")));
	}
	Ok(())
}

#[cfg(windows)]
fn send_term(pid: u32) -> std::io::Result<()> {
	if pid == 0 {
		return Err(std::io::Error::other("refusing to signal pid 0"));
	}
	let status = std::process::Command::new("taskkill").args(["/PID", &pid.to_string()]).status()?;
	if !status.success() {
		return Err(std::io::Error::other(format!("taskkill /PID {pid} returned {status}")));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn send_term_refuses_pid_zero() {
		assert!(send_term(0).is_err());
	}

	#[tokio::test]
	async fn stop_without_a_session_is_a_noop() {
		let registry = SessionRegistry::new();
		registry.stop().await.unwrap();
		registry.stop().await.unwrap();
	}

	#[tokio::test]
	async fn current_url_requires_a_started_session() {
		let registry = SessionRegistry::new();
		let err = registry.current_url().await.unwrap_err();
		assert!(matches!(err, Error::NotStarted), "got {err:?}");
	}

	#[tokio::test]
	async fn dispatch_requires_a_started_session() {
		struct NoopEngine;

		#[async_trait::async_trait]
		impl AutomationEngine for NoopEngine {
			async fn perform(&self, _cdp_url: &str, _action: Action) -> Result<Value> {
				Ok(Value::Null)
			}
		}

		let registry = SessionRegistry::new();
		let err = registry
			.dispatch(&NoopEngine, Action::Snapshot)
			.await
			.unwrap_err();
		assert!(matches!(err, Error::NotStarted), "got {err:?}");
	}
}
