//! Browser executable discovery across operating systems.
//!
//! Resolution order: explicit override, then the OS default browser (only
//! when it is Chromium-family), then a fixed list of well-known install
//! locations. Linux and Windows default-handler detection is intentionally
//! unimplemented and always falls through to the candidate scan.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::BrowserConfig;
use crate::error::{Error, Result};

/// Vendor family of a discovered executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
	Chrome,
	Brave,
	Edge,
	Chromium,
	Canary,
	Custom,
}

/// A resolved browser binary. Never persisted.
#[derive(Debug, Clone)]
pub struct BrowserExecutable {
	pub kind: BrowserKind,
	pub path: PathBuf,
}

/// Platform-specific discovery, selected once per process.
trait PlatformProbe {
	/// The OS default HTTP handler, reported only when Chromium-family.
	/// `None` covers both "no default" and "default is not Chromium".
	fn default_browser(&self) -> Option<BrowserExecutable>;

	/// Ordered well-known install locations. Absolute entries are checked
	/// for existence, bare names resolved through `PATH`.
	fn candidates(&self) -> Vec<String>;
}

struct MacProbe;
struct LinuxProbe;
struct WindowsProbe;

fn platform_probe() -> &'static dyn PlatformProbe {
	if cfg!(target_os = "macos") {
		&MacProbe
	} else if cfg!(target_os = "windows") {
		&WindowsProbe
	} else {
		&LinuxProbe
	}
}

/// Resolves the executable to launch, or `Ok(None)` when nothing suitable
/// exists on the host.
pub fn resolve(config: &BrowserConfig) -> Result<Option<BrowserExecutable>> {
	if let Some(path) = &config.executable_path {
		if !path.exists() {
			return Err(Error::Config(format!(
				"explicit browser executable does not exist: {}",
				path.display()
			)));
		}
		let kind = infer_kind(&path.to_string_lossy()).unwrap_or(BrowserKind::Custom);
		return Ok(Some(BrowserExecutable { kind, path: path.clone() }));
	}

	let probe = platform_probe();

	if let Some(found) = probe.default_browser() {
		debug!(target: "cdp.finder", path = %found.path.display(), kind = ?found.kind, "using OS default browser");
		return Ok(Some(found));
	}

	for candidate in probe.candidates() {
		let is_pathlike = candidate.starts_with('/') || candidate.contains('\\') || candidate.contains(':');
		let path = if is_pathlike {
			let path = PathBuf::from(&candidate);
			if !path.exists() {
				continue;
			}
			path
		} else {
			match which::which(&candidate) {
				Ok(path) => path,
				Err(_) => continue,
			}
		};
		let kind = infer_kind(&candidate).unwrap_or(BrowserKind::Chrome);
		debug!(target: "cdp.finder", path = %path.display(), kind = ?kind, "found browser candidate");
		return Ok(Some(BrowserExecutable { kind, path }));
	}

	Ok(None)
}

/// Infers the vendor family from a bundle id, desktop entry, or file name by
/// case-insensitive substring match. `None` when no vendor token matches.
fn infer_kind(identifier: &str) -> Option<BrowserKind> {
	let id = identifier.to_ascii_lowercase();
	if id.contains("canary") {
		Some(BrowserKind::Canary)
	} else if id.contains("brave") {
		Some(BrowserKind::Brave)
	} else if id.contains("edge") {
		Some(BrowserKind::Edge)
	} else if id.contains("chromium") || id.contains("opera") || id.contains("vivaldi") || id.contains("yandex") {
		Some(BrowserKind::Chromium)
	} else if id.contains("chrome") {
		Some(BrowserKind::Chrome)
	} else {
		None
	}
}

impl PlatformProbe for MacProbe {
	fn default_browser(&self) -> Option<BrowserExecutable> {
		let bundle_id = mac_default_http_handler()?;
		let kind = infer_kind(&bundle_id)?;
		let path = mac_bundle_path(&bundle_id)?;
		Some(BrowserExecutable { kind, path })
	}

	fn candidates(&self) -> Vec<String> {
		[
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
		]
		.iter()
		.map(|s| s.to_string())
		.collect()
	}
}

/// Reads the default HTTP handler bundle id from the launch-services
/// registry. Best-effort: any failure to run or parse yields `None`.
fn mac_default_http_handler() -> Option<String> {
	let output = std::process::Command::new("defaults")
		.args(["read", "com.apple.LaunchServices/com.apple.launchservices.secure", "LSHandlers"])
		.output()
		.ok()?;
	if !output.status.success() {
		return None;
	}
	let text = String::from_utf8_lossy(&output.stdout);

	// Output is textual plist: a list of `{ ... }` handler blocks. Pick the
	// block declaring LSHandlerURLScheme = http and pull its role bundle id.
	for block in text.split('{').skip(1) {
		let block = block.split('}').next().unwrap_or("");
		let lowered = block.to_ascii_lowercase();
		if !lowered.contains("lshandlerurlscheme") || !lowered.contains("http") {
			continue;
		}
		for line in block.lines() {
			let line = line.trim();
			if let Some(rest) = line.strip_prefix("LSHandlerRoleAll") {
				let id: String = rest.chars().filter(|c| !"=\" ;".contains(*c)).collect();
				if !id.is_empty() {
					return Some(id);
				}
			}
		}
	}
	None
}

/// Maps a known Chromium-family bundle id to its standard install path,
/// returning it only when present on disk.
fn mac_bundle_path(bundle_id: &str) -> Option<PathBuf> {
	let app = match bundle_id.to_ascii_lowercase().as_str() {
		"com.google.chrome" => "Google Chrome.app/Contents/MacOS/Google Chrome",
		"com.google.chrome.canary" => "Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
		"com.brave.browser" => "Brave Browser.app/Contents/MacOS/Brave Browser",
		"com.microsoft.edgemac" => "Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
		"org.chromium.chromium" => "Chromium.app/Contents/MacOS/Chromium",
		_ => return None,
	};
	let path = Path::new("/Applications").join(app);
	path.exists().then_some(path)
}

impl PlatformProbe for LinuxProbe {
	// xdg default-handler detection is not implemented; candidate scan only.
	fn default_browser(&self) -> Option<BrowserExecutable> {
		None
	}

	fn candidates(&self) -> Vec<String> {
		[
			"google-chrome-stable",
			"google-chrome",
			"brave-browser",
			"brave",
			"chromium-browser",
			"chromium",
			"/usr/bin/google-chrome-stable",
			"/usr/bin/google-chrome",
			"/usr/bin/brave-browser",
			"/usr/bin/chromium-browser",
			"/usr/bin/chromium",
			"/snap/bin/chromium",
			"/snap/bin/brave",
		]
		.iter()
		.map(|s| s.to_string())
		.collect()
	}
}

impl PlatformProbe for WindowsProbe {
	// Registry-based default-handler detection is not implemented.
	fn default_browser(&self) -> Option<BrowserExecutable> {
		None
	}

	fn candidates(&self) -> Vec<String> {
		let mut roots = Vec::new();
		for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
			if let Ok(value) = std::env::var(key) {
				roots.push(PathBuf::from(value));
			}
		}
		if roots.is_empty() {
			roots.push(PathBuf::from(r"C:\Program Files"));
			roots.push(PathBuf::from(r"C:\Program Files (x86)"));
		}

		let suffixes: &[&[&str]] = &[
			&["Google", "Chrome", "Application", "chrome.exe"],
			&["Microsoft", "Edge", "Application", "msedge.exe"],
			&["BraveSoftware", "Brave-Browser", "Application", "brave.exe"],
			&["Chromium", "Application", "chrome.exe"],
		];

		let mut candidates = Vec::new();
		for root in roots {
			for suffix in suffixes {
				let mut path = root.clone();
				for component in *suffix {
					path.push(component);
				}
				candidates.push(path.to_string_lossy().to_string());
			}
		}

		candidates.extend(["chrome.exe", "msedge.exe", "brave.exe", "chromium.exe"].map(String::from));
		candidates
	}
}
