//! Per-launch browser configuration and profile types.

use std::path::PathBuf;

use serde::Deserialize;

use crate::cdp::auth::OriginCredential;

/// Caller-supplied launch configuration. Immutable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserConfig {
	/// Explicit executable override. Must exist on disk or resolution fails
	/// with a configuration error instead of falling through to detection.
	pub executable_path: Option<PathBuf>,
	pub headless: bool,
	pub no_sandbox: bool,
	pub enabled: Option<bool>,
	pub control_port: Option<u16>,
	/// Root under which `browser-data/<profile>` is created. Defaults to the
	/// process working directory.
	pub work_dir: Option<PathBuf>,
	/// Static credentials attached to CDP requests per origin.
	#[serde(skip)]
	pub credentials: Vec<OriginCredential>,
}

/// A named browser profile bound to one debugging port and one on-disk
/// user-data directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserProfile {
	/// Unique identifier for the profile directory.
	pub name: String,
	pub cdp_port: u16,
	pub cdp_url: String,
	pub cdp_is_loopback: bool,
	/// Cosmetic only.
	#[serde(default = "default_color")]
	pub color: String,
}

fn default_color() -> String {
	"cyan".to_string()
}

impl BrowserProfile {
	/// A loopback profile on `port`, the only kind this crate will launch.
	pub fn loopback(name: impl Into<String>, port: u16) -> Self {
		Self {
			name: name.into(),
			cdp_port: port,
			cdp_url: format!("http://127.0.0.1:{port}"),
			cdp_is_loopback: true,
			color: default_color(),
		}
	}
}
