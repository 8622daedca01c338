//! Browser process launch and readiness-bounded startup.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{info, warn};

use super::finder::{self, BrowserExecutable};
use super::probe::{self, RetryPolicy};
use crate::config::{BrowserConfig, BrowserProfile};
use crate::error::{Error, Result};

/// Launch readiness bounds: poll every 200 ms, give up after 15 s.
pub(crate) const LAUNCH_READY_POLICY: RetryPolicy = RetryPolicy {
	interval: Duration::from_millis(200),
	max_wait: Duration::from_secs(15),
};

/// One spawned browser process plus its profile directory and debug port.
/// Exists only between a successful launch and a stop or crash; exclusively
/// owned by the session registry.
#[derive(Debug)]
pub struct RunningChrome {
	pub pid: u32,
	pub exe: BrowserExecutable,
	pub user_data_dir: PathBuf,
	pub cdp_port: u16,
	pub started_at: Instant,
	pub(crate) child: Child,
}

/// Spawns the browser for `profile` and blocks until its CDP endpoint is
/// reachable, killing the child on a readiness timeout.
pub async fn launch(config: &BrowserConfig, profile: &BrowserProfile) -> Result<RunningChrome> {
	launch_with_policy(config, profile, LAUNCH_READY_POLICY).await
}

/// As [`launch`], with an explicit readiness policy.
pub async fn launch_with_policy(config: &BrowserConfig, profile: &BrowserProfile, policy: RetryPolicy) -> Result<RunningChrome> {
	if !profile.cdp_is_loopback {
		return Err(Error::Config(format!(
			"profile '{}' is not loopback; remote browsers cannot be launched locally",
			profile.name
		)));
	}

	let exe = finder::resolve(config)?.ok_or(Error::NotFound)?;

	let work_dir = match &config.work_dir {
		Some(dir) => dir.clone(),
		None => std::env::current_dir()?,
	};
	let user_data_dir = work_dir.join("browser-data").join(&profile.name);
	std::fs::create_dir_all(&user_data_dir)?;

	let args = launch_args(config, profile, &user_data_dir);
	info!(
		target: "cdp.launch",
		exe = %exe.path.display(),
		kind = ?exe.kind,
		port = profile.cdp_port,
		headless = config.headless,
		"launching browser"
	);

	let mut command = Command::new(&exe.path);
	command
		.args(&args)
		.env("HOME", &user_data_dir)
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true);

	let mut child = command
		.spawn()
		.map_err(|e| Error::Launch(format!("failed to spawn {}: {e}", exe.path.display())))?;
	// A missing pid means the child is already gone; pid 0 must never reach
	// the signal path, where it would address the whole process group.
	let Some(pid) = child.id() else {
		let _ = child.wait().await;
		return Err(Error::Launch(format!("{} exited immediately after spawn", exe.path.display())));
	};
	let started_at = Instant::now();

	let ready = tokio::select! {
		result = probe::await_ready(&profile.cdp_url, &config.credentials, policy) => result,
		status = child.wait() => Err(Error::Launch(format!(
			"browser exited before its CDP endpoint came up (status: {:?})",
			status.ok()
		))),
	};

	match ready {
		Ok(()) => {
			info!(target: "cdp.launch", pid, port = profile.cdp_port, "browser ready");
			Ok(RunningChrome {
				pid,
				exe,
				user_data_dir,
				cdp_port: profile.cdp_port,
				started_at,
				child,
			})
		}
		Err(Error::Launch(e)) => Err(Error::Launch(e)),
		Err(e) => {
			warn!(target: "cdp.launch", pid, port = profile.cdp_port, error = %e, "readiness timeout; killing spawned browser");
			let _ = child.start_kill();
			let _ = child.wait().await;
			Err(Error::ConnectivityTimeout {
				port: profile.cdp_port,
				profile: profile.name.clone(),
				waited_ms: started_at.elapsed().as_millis() as u64,
			})
		}
	}
}

/// Fixed launch argument set, conditionals last, `about:blank` trailing.
fn launch_args(config: &BrowserConfig, profile: &BrowserProfile, user_data_dir: &std::path::Path) -> Vec<String> {
	let mut args = vec![
		format!("--remote-debugging-port={}", profile.cdp_port),
		format!("--user-data-dir={}", user_data_dir.display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
		"--disable-sync".to_string(),
		"--disable-background-networking".to_string(),
		"--disable-component-update".to_string(),
		"--disable-features=Translate,MediaRouter".to_string(),
		"--disable-session-crashed-bubble".to_string(),
		"--hide-crash-restore-bubble".to_string(),
		"--password-store=basic".to_string(),
	];

	if config.headless {
		args.push("--headless=new".to_string());
		args.push("--disable-gpu".to_string());
	}
	if config.no_sandbox {
		args.push("--no-sandbox".to_string());
		args.push("--disable-setuid-sandbox".to_string());
	}
	if cfg!(target_os = "linux") {
		// /dev/shm is tiny in most containers.
		args.push("--disable-dev-shm-usage".to_string());
	}

	args.push("about:blank".to_string());
	args
}

#[cfg(test)]
mod tests {
	use super::*;

	fn profile() -> BrowserProfile {
		BrowserProfile::loopback("default", 9222)
	}

	#[test]
	fn launch_args_carry_the_fixed_flag_set() {
		let config = BrowserConfig::default();
		let args = launch_args(&config, &profile(), std::path::Path::new("/tmp/browser-data/default"));

		assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
		assert!(args.contains(&"--user-data-dir=/tmp/browser-data/default".to_string()));
		assert!(args.contains(&"--no-first-run".to_string()));
		assert!(args.contains(&"--disable-background-networking".to_string()));
		assert!(args.contains(&"--password-store=basic".to_string()));
		assert_eq!(args.last().unwrap(), "about:blank");
	}

	#[test]
	fn headless_adds_gpu_disable_and_sandbox_flags_stay_opt_in() {
		let config = BrowserConfig {
			headless: true,
			..Default::default()
		};
		let args = launch_args(&config, &profile(), std::path::Path::new("/tmp/x"));
		assert!(args.contains(&"--headless=new".to_string()));
		assert!(args.contains(&"--disable-gpu".to_string()));
		assert!(!args.contains(&"--no-sandbox".to_string()));

		let config = BrowserConfig {
			no_sandbox: true,
			..Default::default()
		};
		let args = launch_args(&config, &profile(), std::path::Path::new("/tmp/x"));
		assert!(!args.contains(&"--headless=new".to_string()));
		assert!(args.contains(&"--no-sandbox".to_string()));
		assert!(args.contains(&"--disable-setuid-sandbox".to_string()));
	}

	#[test]
	fn launch_readiness_is_bounded_at_fifteen_seconds() {
		assert_eq!(LAUNCH_READY_POLICY.interval, Duration::from_millis(200));
		assert_eq!(LAUNCH_READY_POLICY.max_wait, Duration::from_secs(15));
	}

	#[tokio::test]
	async fn non_loopback_profile_is_rejected_before_spawning() {
		let profile = BrowserProfile {
			name: "remote".to_string(),
			cdp_port: 9222,
			cdp_url: "http://10.1.2.3:9222".to_string(),
			cdp_is_loopback: false,
			color: "red".to_string(),
		};
		let err = launch(&BrowserConfig::default(), &profile).await.unwrap_err();
		assert!(matches!(err, Error::Config(_)), "got {err:?}");
	}
}
