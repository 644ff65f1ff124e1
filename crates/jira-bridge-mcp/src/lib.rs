//! MCP (Model Context Protocol) server for jira-bridge.
//!
//! Exposes Jira issue operations as MCP tools over stdio.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::ToolHandler;
pub use server::McpServer;
