//! Core types, traits, and error handling for jira-bridge.
//!
//! This crate provides the data model, the `IssueTracker` trait, ADF
//! conversion, and field projection shared by the client and the MCP server.

pub mod adf;
pub mod config;
pub mod error;
pub mod fields;
pub mod tracker;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use tracker::IssueTracker;
pub use types::*;
