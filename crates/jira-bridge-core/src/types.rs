//! Issue-tracker data model.
//!
//! These types mirror the JSON shapes returned by Jira Cloud REST API v3.
//! Every reference field is optional because callers may narrow the
//! returned field set.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// References
// =============================================================================

/// A Jira account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Workflow status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_category: Option<StatusCategory>,
}

/// Status category: `new`, `indeterminate` or `done`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCategory {
    /// Numeric on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Parent issue reference (epic or parent of a subtask).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<ParentFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// =============================================================================
// Issue
// =============================================================================

/// A Jira issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Project-prefixed key, e.g. "PROJ-123"
    pub key: String,
    #[serde(default, rename = "self")]
    pub self_link: String,
    #[serde(default)]
    pub fields: IssueFields,
}

/// Issue field bag: well-known fields plus every other field by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// ADF document, plain string, or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    /// Custom fields and any system field not modelled above, keyed by field id
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// An issue with its field bag exactly as the server returned it.
///
/// Field projection works on this form so that values it does not recognise
/// survive untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    pub id: String,
    pub key: String,
    #[serde(default, rename = "self")]
    pub self_link: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawIssue {
    /// Decode the field bag into the typed form.
    pub fn into_issue(self) -> crate::Result<Issue> {
        let fields = serde_json::from_value(Value::Object(self.fields)).map_err(|e| {
            crate::Error::InvalidData(format!("Unexpected fields on issue {}: {}", self.key, e))
        })?;
        Ok(Issue {
            id: self.id,
            key: self.key,
            self_link: self.self_link,
            fields,
        })
    }
}

// =============================================================================
// Search
// =============================================================================

/// One page of a JQL search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Opaque cursor for the next page; absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Options for a JQL search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_results: u32,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
    pub next_page_token: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            fields: Vec::new(),
            expand: Vec::new(),
            next_page_token: None,
        }
    }
}

// =============================================================================
// Transitions, comments, field metadata
// =============================================================================

/// An edge in the issue's workflow, as currently available for that issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to: Status,
    #[serde(default)]
    pub has_screen: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_conditional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub author: Option<User>,
    /// ADF document or plain string
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Body accepted by `add_comment`.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentBody {
    /// Plain text, converted to ADF before sending
    Text(String),
    /// Already-structured ADF document, sent verbatim
    Document(Value),
}

impl From<&str> for CommentBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CommentBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Entry of the field metadata catalog (`GET /field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

// =============================================================================
// Create / update inputs
// =============================================================================

/// Response from `POST /issue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(default, rename = "self")]
    pub self_link: String,
}

/// Flat input for creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateIssueInput {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub parent_key: Option<String>,
    /// Extra fields merged verbatim into the payload, e.g. `customfield_10010`
    #[serde(default)]
    pub additional_fields: Option<Map<String, Value>>,
}

/// Flat input for updating an issue. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateIssueInput {
    pub issue_key: String,
    #[serde(default)]
    pub summary: FieldUpdate<String>,
    #[serde(default)]
    pub description: FieldUpdate<String>,
    #[serde(default)]
    pub assignee_id: FieldUpdate<String>,
    #[serde(default)]
    pub priority: FieldUpdate<String>,
    #[serde(default)]
    pub labels: FieldUpdate<Vec<String>>,
    #[serde(default)]
    pub additional_fields: Option<Map<String, Value>>,
}

/// Tri-state field update.
///
/// Deserializes from an explicit value (`Set`) or `null` (`Clear`); use
/// `#[serde(default)]` so a missing key becomes `Unchanged`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Key absent: leave the field as it is
    #[default]
    Unchanged,
    /// Key present with `null`: clear the field
    Clear,
    /// Key present with a value: overwrite
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Map the contained value, preserving absence and clearing.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(v) => FieldUpdate::Set(f(v)),
        }
    }

    /// Serializer-facing form: outer `None` is omitted, `Some(None)` is `null`.
    pub fn into_patch(self) -> Option<Option<T>> {
        match self {
            Self::Unchanged => None,
            Self::Clear => Some(None),
            Self::Set(v) => Some(Some(v)),
        }
    }
}

impl FieldUpdate<String> {
    /// Treat an empty string the same as an explicit `null`.
    pub fn empty_as_clear(self) -> Self {
        match self {
            Self::Set(s) if s.is_empty() => Self::Clear,
            other => other,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
