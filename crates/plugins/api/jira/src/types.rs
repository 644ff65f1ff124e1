//! Jira API request payloads and response envelopes.
//!
//! Response entities (issues, transitions, comments) live in
//! `jira_bridge_core::types`; this module holds the wire shapes that only
//! the client needs.

use jira_bridge_core::Transition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Search
// =============================================================================

/// Request body for `POST /search/jql`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Comma-separated expand list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

// =============================================================================
// Transitions
// =============================================================================

/// Response from `GET /issue/{key}/transitions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Request body for `POST /issue/{key}/transitions`.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionPayload {
    pub transition: TransitionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<TransitionUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionId {
    pub id: String,
}

/// Field operations applied together with the transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionUpdate {
    pub comment: Vec<CommentOperation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentOperation {
    pub add: AddCommentPayload,
}

// =============================================================================
// Comments
// =============================================================================

/// Request body for `POST /issue/{key}/comment`.
#[derive(Debug, Clone, Serialize)]
pub struct AddCommentPayload {
    /// ADF document
    pub body: Value,
}

// =============================================================================
// Create / update
// =============================================================================

/// Fields for `POST /issue`. Unset optionals are left out of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueFields {
    pub project: KeyRef,
    pub summary: String,
    pub issuetype: NameRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<AccountRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NameRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyRef>,
}

/// Fields for `PUT /issue/{key}`.
///
/// Outer `None` leaves a field out of the payload; `Some(None)` sends `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateIssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<AccountRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<NameRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// `{ "key": ... }` reference (project, parent).
#[derive(Debug, Clone, Serialize)]
pub struct KeyRef {
    pub key: String,
}

/// `{ "name": ... }` reference (issue type, priority).
#[derive(Debug, Clone, Serialize)]
pub struct NameRef {
    pub name: String,
}

/// `{ "accountId": ... }` user reference.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRef {
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// `{ "fields": { ... } }` envelope for create and update.
#[derive(Debug, Clone, Serialize)]
pub struct IssuePayload {
    pub fields: serde_json::Map<String, Value>,
}
