//! Managed Chromium session lifecycle over the Chrome DevTools Protocol.
//!
//! Discovers a Chromium-family binary, launches it with a remote-debugging
//! endpoint, confirms the endpoint answers HTTP and accepts a WebSocket
//! handshake, and tracks the single resulting session until it is stopped.
//! Downstream automation borrows the session's CDP URL per call; it never
//! owns the process.
//!
//! ```no_run
//! use cdp_session::{BrowserConfig, BrowserProfile, SessionRegistry};
//!
//! # async fn run() -> cdp_session::Result<()> {
//! let config = BrowserConfig { headless: true, ..Default::default() };
//! let profile = BrowserProfile::loopback("default", 9222);
//!
//! let registry = SessionRegistry::global();
//! let session = registry.start(&config, &profile).await?;
//! println!("CDP at {}", session.cdp_url);
//! registry.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod browser;
pub mod cdp;
pub mod config;
pub mod error;

pub use actions::{Action, AutomationEngine, ScrollDirection};
pub use browser::{BrowserExecutable, BrowserKind, RetryPolicy, SessionInfo, SessionRegistry};
pub use cdp::{headers_with_auth, normalize_ws_url, OriginCredential};
pub use config::{BrowserConfig, BrowserProfile};
pub use error::{Error, Result};
