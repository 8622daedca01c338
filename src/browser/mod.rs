//! Browser process lifecycle: discovery, launch, readiness, session state.

pub mod finder;
pub mod launcher;
pub mod probe;
pub mod registry;

pub use finder::{BrowserExecutable, BrowserKind};
pub use launcher::RunningChrome;
pub use probe::{CdpVersionInfo, RetryPolicy};
pub use registry::{SessionInfo, SessionRegistry};
