//! MCP tool definitions and their argument types.

use serde::Deserialize;
use serde_json::json;

use crate::protocol::ToolDefinition;

pub use jira_bridge_core::{CreateIssueInput as CreateIssueArgs, UpdateIssueInput as UpdateIssueArgs};

/// Default page size for `list_issues`.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Upper bound for `list_issues` page size.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Fields requested by `list_issues` when the caller names none.
pub const DEFAULT_LIST_FIELDS: [&str; 6] = [
    "summary",
    "status",
    "priority",
    "issuetype",
    "assignee",
    "updated",
];

/// Fields re-fetched after `update_issue`.
pub const UPDATE_REFETCH_FIELDS: [&str; 5] =
    ["summary", "description", "assignee", "priority", "labels"];

#[derive(Debug, Clone, Deserialize)]
pub struct GetIssueArgs {
    pub issue_key: String,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub expand: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListIssuesArgs {
    pub jql: String,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl ListIssuesArgs {
    /// Requested page size, defaulted and capped.
    pub fn page_size(&self) -> u32 {
        self.max_results
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetIssueFieldsArgs {
    pub issue_key: String,
    #[serde(default = "default_true")]
    pub include_custom: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentArgs {
    pub issue_key: String,
    pub body: String,
}

/// Arguments for tools that only need an issue key.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueKeyArgs {
    pub issue_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionIssueArgs {
    pub issue_key: String,
    pub transition_id: String,
    #[serde(default)]
    pub comment: Option<String>,
}

fn issue_key_property() -> serde_json::Value {
    json!({
        "type": "string",
        "description": "Issue key (e.g., 'PROJ-123') or ID"
    })
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// All tools, in the order they are listed to clients.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "create_issue",
            "Create a new Jira issue (Story, Bug, Task, Epic, etc.)",
            json!({
                "type": "object",
                "properties": {
                    "project_key": {
                        "type": "string",
                        "description": "Project key (e.g., 'PROJ')"
                    },
                    "summary": {
                        "type": "string",
                        "description": "Issue title/summary"
                    },
                    "issue_type": {
                        "type": "string",
                        "description": "Issue type (e.g., 'Story', 'Bug', 'Task', 'Epic')"
                    },
                    "description": {
                        "type": "string",
                        "description": "Issue description (plain text)"
                    },
                    "assignee_id": {
                        "type": "string",
                        "description": "Assignee account ID"
                    },
                    "priority": {
                        "type": "string",
                        "description": "Priority name (e.g., 'High', 'Medium', 'Low')"
                    },
                    "labels": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Labels to add to the issue"
                    },
                    "parent_key": {
                        "type": "string",
                        "description": "Parent issue key for subtasks or stories under an epic"
                    },
                    "additional_fields": {
                        "type": "object",
                        "description": "Additional fields as key-value pairs (e.g., custom fields)"
                    }
                },
                "required": ["project_key", "summary", "issue_type"]
            }),
        ),
        tool(
            "get_issue",
            "Get detailed information about a specific Jira issue",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property(),
                    "fields": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Specific fields to retrieve (default: all)"
                    },
                    "expand": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Fields to expand (e.g., 'changelog', 'renderedFields')"
                    }
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "list_issues",
            "Search for issues using JQL (Jira Query Language)",
            json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "JQL query to search issues"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 20, max: 100)",
                        "minimum": 0,
                        "default": DEFAULT_LIST_LIMIT
                    },
                    "next_page_token": {
                        "type": "string",
                        "description": "Token for pagination (from previous response)"
                    },
                    "fields": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Specific fields to retrieve"
                    }
                },
                "required": ["jql"]
            }),
        ),
        tool(
            "get_issue_fields",
            "Get all fields (including custom fields) for an issue with their names and values",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property(),
                    "include_custom": {
                        "type": "boolean",
                        "description": "Include custom fields in the response",
                        "default": true
                    }
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "add_comment",
            "Add a comment to a Jira issue",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property(),
                    "body": {
                        "type": "string",
                        "description": "Comment text (plain text, will be converted to ADF)"
                    }
                },
                "required": ["issue_key", "body"]
            }),
        ),
        tool(
            "get_transitions",
            "Get available status transitions for an issue",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property()
                },
                "required": ["issue_key"]
            }),
        ),
        tool(
            "transition_issue",
            "Transition an issue to a new status",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property(),
                    "transition_id": {
                        "type": "string",
                        "description": "ID of the transition to perform"
                    },
                    "comment": {
                        "type": "string",
                        "description": "Optional comment to add with the transition"
                    }
                },
                "required": ["issue_key", "transition_id"]
            }),
        ),
        tool(
            "update_issue",
            "Update an existing Jira issue (summary, description, assignee, priority, labels, custom fields)",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": issue_key_property(),
                    "summary": {
                        "type": "string",
                        "description": "New issue title/summary"
                    },
                    "description": {
                        "type": ["string", "null"],
                        "description": "New issue description (plain text, null to clear)"
                    },
                    "assignee_id": {
                        "type": ["string", "null"],
                        "description": "New assignee account ID (null to unassign)"
                    },
                    "priority": {
                        "type": ["string", "null"],
                        "description": "New priority name (e.g., 'High', 'Medium', 'Low')"
                    },
                    "labels": {
                        "type": ["array", "null"],
                        "items": { "type": "string" },
                        "description": "New labels (replaces existing labels, null to clear)"
                    },
                    "additional_fields": {
                        "type": "object",
                        "description": "Additional fields to update (e.g., custom fields)"
                    }
                },
                "required": ["issue_key"]
            }),
        ),
    ]
}
