//! Jira Cloud client for jira-bridge.
//!
//! Talks to the Jira Cloud REST API v3 with Basic auth (email + API token)
//! and implements `IssueTracker` on top of it.

mod client;
mod types;

pub use client::JiraClient;
pub use types::*;
