//! Error taxonomy for browser lifecycle and CDP connectivity.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
	/// Operator mistake: bad explicit executable path, non-loopback profile, etc.
	/// Never retried.
	#[error("configuration error: {0}")]
	Config(String),

	/// No Chromium-family executable discovered on this host.
	#[error("no Chromium-family browser found; install Chrome/Chromium or set an explicit executable path")]
	NotFound,

	/// The spawned browser never exposed a reachable CDP endpoint in time.
	/// The launcher kills its own child before surfacing this.
	#[error("CDP endpoint on port {port} not reachable within {waited_ms} ms (profile '{profile}')")]
	ConnectivityTimeout { port: u16, profile: String, waited_ms: u64 },

	/// The browser binary could not be spawned at all.
	#[error("failed to launch browser: {0}")]
	Launch(String),

	/// A single probe attempt failed. Retryable by the polling loop, terminal
	/// only once a deadline expires.
	#[error("CDP probe failed: {0}")]
	Probe(String),

	/// An interaction descriptor the session boundary does not understand.
	/// Per-call; never affects session state.
	#[error("unknown action: {0}")]
	UnknownAction(String),

	/// `current_url` or `dispatch` called with no tracked session.
	#[error("browser session not started")]
	NotStarted,

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
