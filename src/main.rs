//! Demo binary: start a managed headless session, print its CDP URL, and
//! tear it down on ctrl-c.

use cdp_session::{BrowserConfig, BrowserProfile, SessionRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> cdp_session::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let port = std::env::args()
		.nth(1)
		.and_then(|arg| arg.parse().ok())
		.unwrap_or(9222);

	let config = BrowserConfig {
		headless: true,
		..Default::default()
	};
	let profile = BrowserProfile::loopback("default", port);

	let registry = SessionRegistry::global();
	let session = registry.start(&config, &profile).await?;
	info!(pid = session.pid, url = %session.cdp_url, "session ready; ctrl-c to stop");

	tokio::signal::ctrl_c().await?;
	registry.stop().await?;
	info!("session stopped");
	Ok(())
}
