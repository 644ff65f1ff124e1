//! Tracker trait: the operations the tool handlers need from an issue tracker.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Comment, CommentBody, CreateIssueInput, CreatedIssue, FieldMeta, Issue, RawIssue,
    SearchOptions, SearchPage, Transition, UpdateIssueInput,
};

/// Issue-tracker operations. Implemented by the Jira REST client.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one issue with its field bag untouched. Empty `fields`/`expand`
    /// mean "server default".
    async fn get_raw_issue(
        &self,
        key: &str,
        fields: &[String],
        expand: &[String],
    ) -> Result<RawIssue>;

    /// Fetch one issue and decode its well-known fields.
    async fn get_issue(&self, key: &str, fields: &[String], expand: &[String]) -> Result<Issue> {
        self.get_raw_issue(key, fields, expand).await?.into_issue()
    }

    /// Run a JQL search, one page at a time.
    async fn search_issues(&self, jql: &str, options: SearchOptions) -> Result<SearchPage>;

    /// Add a comment and return it as stored.
    async fn add_comment(&self, key: &str, body: CommentBody) -> Result<Comment>;

    /// Transitions currently available for the issue.
    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>>;

    /// Apply a transition, optionally commenting in the same request.
    async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<()>;

    /// The field metadata catalog.
    async fn get_fields(&self) -> Result<Vec<FieldMeta>>;

    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue>;

    async fn update_issue(&self, input: UpdateIssueInput) -> Result<()>;
}
