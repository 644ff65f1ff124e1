//! Tool handlers for MCP server.
//!
//! Each handler decodes its arguments, calls the issue tracker, and reshapes
//! the result into a flat JSON object. Every failure, including bad arguments
//! and unknown tool names, becomes an `isError` result with an `Error: ` text.

use std::sync::Arc;

use jira_bridge_core::adf::adf_to_text;
use jira_bridge_core::fields::project_fields;
use jira_bridge_core::{CommentBody, Error, IssueTracker, Result, SearchOptions, User};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::tools::{
    self, AddCommentArgs, CreateIssueArgs, GetIssueArgs, GetIssueFieldsArgs, IssueKeyArgs,
    ListIssuesArgs, TransitionIssueArgs, UpdateIssueArgs, DEFAULT_LIST_FIELDS,
    UPDATE_REFETCH_FIELDS,
};

/// Tool handler that executes tools against an issue tracker.
pub struct ToolHandler {
    tracker: Arc<dyn IssueTracker>,
}

impl ToolHandler {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        tools::definitions()
    }

    /// Execute a tool by name with arguments.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let outcome = self
            .dispatch(name, arguments)
            .await
            .and_then(|value| Ok(serde_json::to_string_pretty(&value)?));

        match outcome {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                ToolCallResult::error(e)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Option<Value>) -> Result<Value> {
        match name {
            "create_issue" => self.create_issue(decode(arguments)?).await,
            "get_issue" => self.get_issue(decode(arguments)?).await,
            "list_issues" => self.list_issues(decode(arguments)?).await,
            "get_issue_fields" => self.get_issue_fields(decode(arguments)?).await,
            "add_comment" => self.add_comment(decode(arguments)?).await,
            "get_transitions" => self.get_transitions(decode(arguments)?).await,
            "transition_issue" => self.transition_issue(decode(arguments)?).await,
            "update_issue" => self.update_issue(decode(arguments)?).await,
            _ => Err(Error::InvalidInput(format!("Unknown tool: {}", name))),
        }
    }

    async fn create_issue(&self, args: CreateIssueArgs) -> Result<Value> {
        require("project_key", &args.project_key)?;
        require("summary", &args.summary)?;
        require("issue_type", &args.issue_type)?;

        let created = self.tracker.create_issue(args).await?;
        Ok(json!({
            "id": created.id,
            "key": created.key,
            "self": created.self_link,
            "message": format!("Issue {} created successfully", created.key),
        }))
    }

    async fn get_issue(&self, args: GetIssueArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;

        let issue = self
            .tracker
            .get_issue(
                &args.issue_key,
                &args.fields.unwrap_or_default(),
                &args.expand.unwrap_or_default(),
            )
            .await?;
        let f = &issue.fields;

        let mut result = json!({
            "key": issue.key,
            "id": issue.id,
            "summary": f.summary,
            "description": adf_to_text(f.description.as_ref()),
            "status": f.status.as_ref().map(|s| &s.name),
            "priority": f.priority.as_ref().map(|p| &p.name),
            "issuetype": f.issuetype.as_ref().map(|t| &t.name),
            "assignee": display_name(f.assignee.as_ref()).unwrap_or("Unassigned"),
            "reporter": display_name(f.reporter.as_ref()),
            "project": f.project.as_ref().map(|p| json!({"key": p.key, "name": p.name})),
            "labels": f.labels,
            "created": f.created,
            "updated": f.updated,
        });

        if let Some(parent) = &f.parent {
            result["parent"] = json!({
                "key": parent.key,
                "summary": parent.fields.as_ref().and_then(|p| p.summary.as_deref()),
            });
        }

        Ok(result)
    }

    async fn list_issues(&self, args: ListIssuesArgs) -> Result<Value> {
        require("jql", &args.jql)?;

        let options = SearchOptions {
            max_results: args.page_size(),
            fields: args
                .fields
                .unwrap_or_else(|| DEFAULT_LIST_FIELDS.iter().map(|f| f.to_string()).collect()),
            expand: Vec::new(),
            next_page_token: args.next_page_token,
        };
        let page = self.tracker.search_issues(&args.jql, options).await?;

        let issues: Vec<Value> = page
            .issues
            .iter()
            .map(|issue| {
                let f = &issue.fields;
                json!({
                    "key": issue.key,
                    "summary": f.summary.as_deref().unwrap_or("No summary"),
                    "status": f.status.as_ref().map_or("Unknown", |s| s.name.as_str()),
                    "priority": f.priority.as_ref().map_or("None", |p| p.name.as_str()),
                    "issuetype": f.issuetype.as_ref().map_or("Unknown", |t| t.name.as_str()),
                    "assignee": display_name(f.assignee.as_ref()).unwrap_or("Unassigned"),
                    "updated": f.updated,
                })
            })
            .collect();

        Ok(json!({
            "total": page.total,
            "maxResults": page.max_results,
            "nextPageToken": page.next_page_token,
            "issues": issues,
        }))
    }

    async fn get_issue_fields(&self, args: GetIssueFieldsArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;

        let (issue, catalog) = tokio::try_join!(
            self.tracker.get_raw_issue(&args.issue_key, &[], &[]),
            self.tracker.get_fields(),
        )?;

        let fields = project_fields(&issue.fields, &catalog, args.include_custom);
        Ok(json!({
            "key": issue.key,
            "fields": fields,
        }))
    }

    async fn add_comment(&self, args: AddCommentArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;
        require("body", &args.body)?;

        let comment = self
            .tracker
            .add_comment(&args.issue_key, CommentBody::Text(args.body))
            .await?;

        Ok(json!({
            "id": comment.id,
            "author": display_name(comment.author.as_ref()),
            "created": comment.created,
            "body": adf_to_text(comment.body.as_ref()),
        }))
    }

    async fn get_transitions(&self, args: IssueKeyArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;

        let transitions = self.tracker.get_transitions(&args.issue_key).await?;
        let available: Vec<Value> = transitions
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "name": t.name,
                    "toStatus": t.to.name,
                    "toStatusCategory": t.to.status_category.as_ref().map(|c| &c.name),
                })
            })
            .collect();

        Ok(json!({
            "issue_key": args.issue_key,
            "available_transitions": available,
        }))
    }

    async fn transition_issue(&self, args: TransitionIssueArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;
        require("transition_id", &args.transition_id)?;

        self.tracker
            .transition_issue(&args.issue_key, &args.transition_id, args.comment.as_deref())
            .await?;

        let issue = self
            .tracker
            .get_issue(&args.issue_key, &["status".to_string()], &[])
            .await?;
        let status = issue
            .fields
            .status
            .map(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(json!({
            "issue_key": args.issue_key,
            "new_status": status,
            "message": format!("Issue transitioned successfully to '{}'", status),
        }))
    }

    async fn update_issue(&self, args: UpdateIssueArgs) -> Result<Value> {
        require("issue_key", &args.issue_key)?;

        let key = args.issue_key.clone();
        self.tracker.update_issue(args).await?;

        let refetch: Vec<String> = UPDATE_REFETCH_FIELDS.iter().map(|f| f.to_string()).collect();
        let issue = self.tracker.get_issue(&key, &refetch, &[]).await?;
        let f = &issue.fields;

        Ok(json!({
            "key": issue.key,
            "summary": f.summary,
            "description": adf_to_text(f.description.as_ref()),
            "assignee": display_name(f.assignee.as_ref()),
            "priority": f.priority.as_ref().map(|p| &p.name),
            "labels": f.labels.clone().unwrap_or_default(),
            "message": format!("Issue {} updated successfully", issue.key),
        }))
    }
}

/// Decode tool arguments; a missing argument object is treated as `{}`.
fn decode<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T> {
    let arguments = arguments.unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn display_name(user: Option<&User>) -> Option<&str> {
    user.and_then(|u| u.display_name.as_deref())
}
