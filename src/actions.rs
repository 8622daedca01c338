//! Interaction descriptors and the automation-engine seam.
//!
//! The engine that actually drives the page (navigation, snapshots, input)
//! is an external collaborator: it receives a reachable CDP base URL and an
//! action, and either performs it or fails descriptively. Only descriptor
//! validation lives here; a bad descriptor is a per-call error and never
//! touches session state.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

/// A validated interaction request for the automation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Navigate { url: String },
	Click { target: String },
	Type { target: String, text: String },
	Scroll { target: Option<String>, direction: ScrollDirection },
	Hover { target: String },
	Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
	Up,
	Down,
}

impl Action {
	/// Parses an action name plus JSON arguments into a descriptor.
	/// Unsupported names and malformed arguments are both unknown actions.
	pub fn parse(name: &str, args: &Value) -> Result<Self> {
		let required = |key: &str| {
			args.get(key)
				.and_then(Value::as_str)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.ok_or_else(|| Error::UnknownAction(format!("{name}: missing or invalid '{key}'")))
		};

		match name {
			"navigate" => Ok(Self::Navigate { url: required("url")? }),
			"click" => Ok(Self::Click { target: required("target")? }),
			"type" => Ok(Self::Type {
				target: required("target")?,
				text: required("text")?,
			}),
			"scroll" => {
				let direction = match args.get("direction").and_then(Value::as_str) {
					Some("up") => ScrollDirection::Up,
					Some("down") | None => ScrollDirection::Down,
					Some(other) => {
						return Err(Error::UnknownAction(format!("scroll: invalid direction '{other}'")));
					}
				};
				let target = args.get("target").and_then(Value::as_str).map(str::to_string);
				Ok(Self::Scroll { target, direction })
			}
			"hover" => Ok(Self::Hover { target: required("target")? }),
			"snapshot" => Ok(Self::Snapshot),
			other => Err(Error::UnknownAction(other.to_string())),
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Navigate { .. } => "navigate",
			Self::Click { .. } => "click",
			Self::Type { .. } => "type",
			Self::Scroll { .. } => "scroll",
			Self::Hover { .. } => "hover",
			Self::Snapshot => "snapshot",
		}
	}
}

/// External automation engine: given a reachable CDP URL, perform the
/// requested action or fail with a descriptive error.
#[async_trait]
pub trait AutomationEngine: Send + Sync {
	async fn perform(&self, cdp_url: &str, action: Action) -> Result<Value>;
}
