//! Jira API client implementation.
//!
//! Targets Jira Cloud REST API v3. Every request carries Basic auth built
//! from the account email and API token.

use async_trait::async_trait;
use base64::Engine;
use jira_bridge_core::adf::text_to_adf;
use jira_bridge_core::{
    Comment, CommentBody, Config, CreateIssueInput, CreatedIssue, Error, FieldMeta, FieldUpdate,
    IssueTracker, RawIssue, Result, SearchOptions, SearchPage, Transition, UpdateIssueInput,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{
    AccountRef, AddCommentPayload, CommentOperation, CreateIssueFields, IssuePayload, KeyRef,
    NameRef, SearchRequest, TransitionId, TransitionPayload, TransitionUpdate,
    TransitionsResponse, UpdateIssueFields,
};

/// REST API path appended to the host.
const API_PATH: &str = "/rest/api/3";

/// Jira API client.
pub struct JiraClient {
    base_url: reqwest::Url,
    auth_header: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

impl JiraClient {
    /// Create a client from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(build_api_base(&config.host), &config.email, &config.api_token)
    }

    /// Create a client with an explicit API base URL (for testing with httpmock).
    /// The base URL is used as-is (no `/rest/api/3` suffix appended).
    pub fn with_base_url(
        base_url: impl Into<String>,
        email: &str,
        api_token: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("jira-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::Config(format!("Invalid Jira base URL: {}", base_url)))?;

        Ok(Self {
            base_url,
            auth_header: basic_auth(email, api_token),
            client,
        })
    }

    /// API base URL, e.g. `https://company.atlassian.net/rest/api/3`.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Resolve path segments against the base URL. Each segment is
    /// percent-encoded, so an issue key can never add path components.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build request with auth and JSON headers.
    fn request(&self, method: reqwest::Method, segments: &[&str]) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(segments))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    /// Send a request and decode the JSON body.
    ///
    /// Returns `Ok(None)` for 204 No Content or an empty body.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                endpoint = endpoint,
                message = message,
                "Jira API error response"
            );
            return Err(Error::api(status_code, endpoint, message));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::InvalidData(format!("Failed to parse response from {}: {}", endpoint, e)))
    }

    /// Send a request that must return a body.
    async fn send_expecting<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T> {
        self.send(builder, endpoint).await?.ok_or_else(|| {
            Error::InvalidData(format!("Empty response body from {}", endpoint))
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_discarding(
        &self,
        builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<()> {
        self.send::<Value>(builder, endpoint).await.map(|_| ())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build the API base URL from a configured host.
///
/// A bare host gets `https://`; an explicit scheme is kept.
fn build_api_base(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host, API_PATH)
    } else {
        format!("https://{}{}", host, API_PATH)
    }
}

/// `Basic base64(email:token)` header value.
fn basic_auth(email: &str, api_token: &str) -> String {
    let credentials = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", email, api_token));
    format!("Basic {}", credentials)
}

/// Query parameters for field selection and expansion; empty lists are skipped.
fn selection_query(fields: &[String], expand: &[String]) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !fields.is_empty() {
        params.push(("fields", fields.join(",")));
    }
    if !expand.is_empty() {
        params.push(("expand", expand.join(",")));
    }
    params
}

/// Merge caller-supplied fields over the assembled ones.
fn merge_fields(fields: &mut Map<String, Value>, additional: Option<Map<String, Value>>) {
    if let Some(additional) = additional {
        fields.extend(additional);
    }
}

fn to_object<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidData(format!(
            "Expected a JSON object, got {}",
            other
        ))),
    }
}

fn build_create_payload(input: CreateIssueInput) -> Result<IssuePayload> {
    let fields = CreateIssueFields {
        project: KeyRef {
            key: input.project_key,
        },
        summary: input.summary,
        issuetype: NameRef {
            name: input.issue_type,
        },
        description: input
            .description
            .filter(|d| !d.is_empty())
            .map(|d| text_to_adf(&d)),
        assignee: input
            .assignee_id
            .filter(|a| !a.is_empty())
            .map(|account_id| AccountRef { account_id }),
        priority: input
            .priority
            .filter(|p| !p.is_empty())
            .map(|name| NameRef { name }),
        labels: input.labels,
        parent: input
            .parent_key
            .filter(|p| !p.is_empty())
            .map(|key| KeyRef { key }),
    };

    let mut map = to_object(&fields)?;
    merge_fields(&mut map, input.additional_fields);
    Ok(IssuePayload { fields: map })
}

fn build_update_payload(input: UpdateIssueInput) -> Result<IssuePayload> {
    let labels = match input.labels {
        FieldUpdate::Unchanged => None,
        // Jira rejects null labels; an empty list clears them
        FieldUpdate::Clear => Some(Vec::new()),
        FieldUpdate::Set(labels) => Some(labels),
    };

    let fields = UpdateIssueFields {
        summary: input.summary.into_patch(),
        description: input
            .description
            .empty_as_clear()
            .map(|d| text_to_adf(&d))
            .into_patch(),
        assignee: input
            .assignee_id
            .empty_as_clear()
            .map(|account_id| AccountRef { account_id })
            .into_patch(),
        priority: input
            .priority
            .empty_as_clear()
            .map(|name| NameRef { name })
            .into_patch(),
        labels,
    };

    let mut map = to_object(&fields)?;
    merge_fields(&mut map, input.additional_fields);
    Ok(IssuePayload { fields: map })
}

// =============================================================================
// Trait implementation
// =============================================================================

#[async_trait]
impl IssueTracker for JiraClient {
    async fn get_raw_issue(
        &self,
        key: &str,
        fields: &[String],
        expand: &[String],
    ) -> Result<RawIssue> {
        let endpoint = format!("/issue/{}", key);
        debug!(endpoint = endpoint, ?fields, ?expand, "Jira GET issue");

        let builder = self
            .request(reqwest::Method::GET, &["issue", key])
            .query(&selection_query(fields, expand));
        self.send_expecting(builder, &endpoint).await
    }

    async fn search_issues(&self, jql: &str, options: SearchOptions) -> Result<SearchPage> {
        let endpoint = "/search/jql";
        let body = SearchRequest {
            jql: jql.to_string(),
            max_results: options.max_results,
            fields: Some(options.fields).filter(|f| !f.is_empty()),
            expand: Some(options.expand.join(",")).filter(|e| !e.is_empty()),
            next_page_token: options.next_page_token.filter(|t| !t.is_empty()),
        };
        debug!(
            jql = jql,
            max_results = body.max_results,
            has_token = body.next_page_token.is_some(),
            "Jira search"
        );

        let builder = self
            .request(reqwest::Method::POST, &["search", "jql"])
            .json(&body);
        self.send_expecting(builder, endpoint).await
    }

    async fn add_comment(&self, key: &str, body: CommentBody) -> Result<Comment> {
        let endpoint = format!("/issue/{}/comment", key);
        let body = match body {
            CommentBody::Text(text) => text_to_adf(&text),
            CommentBody::Document(doc) => doc,
        };
        debug!(endpoint = endpoint, "Jira POST comment");

        let builder = self
            .request(reqwest::Method::POST, &["issue", key, "comment"])
            .json(&AddCommentPayload { body });
        self.send_expecting(builder, &endpoint).await
    }

    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let endpoint = format!("/issue/{}/transitions", key);
        debug!(endpoint = endpoint, "Jira GET transitions");

        let builder = self.request(reqwest::Method::GET, &["issue", key, "transitions"]);
        let response: TransitionsResponse = self.send_expecting(builder, &endpoint).await?;
        Ok(response.transitions)
    }

    async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let endpoint = format!("/issue/{}/transitions", key);
        let payload = TransitionPayload {
            transition: TransitionId {
                id: transition_id.to_string(),
            },
            update: comment.filter(|c| !c.is_empty()).map(|c| TransitionUpdate {
                comment: vec![CommentOperation {
                    add: AddCommentPayload {
                        body: text_to_adf(c),
                    },
                }],
            }),
        };
        debug!(
            issue = key,
            transition_id = transition_id,
            with_comment = payload.update.is_some(),
            "Transitioning issue"
        );

        let builder = self
            .request(reqwest::Method::POST, &["issue", key, "transitions"])
            .json(&payload);
        self.send_discarding(builder, &endpoint).await
    }

    async fn get_fields(&self) -> Result<Vec<FieldMeta>> {
        let endpoint = "/field";
        debug!("Jira GET field catalog");

        let builder = self.request(reqwest::Method::GET, &["field"]);
        self.send_expecting(builder, endpoint).await
    }

    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue> {
        let endpoint = "/issue";
        debug!(
            project = input.project_key,
            issue_type = input.issue_type,
            "Creating issue"
        );

        let payload = build_create_payload(input)?;
        let builder = self.request(reqwest::Method::POST, &["issue"]).json(&payload);
        self.send_expecting(builder, endpoint).await
    }

    async fn update_issue(&self, input: UpdateIssueInput) -> Result<()> {
        let key = input.issue_key.clone();
        let endpoint = format!("/issue/{}", key);
        let payload = build_update_payload(input)?;
        debug!(
            endpoint = endpoint,
            fields = ?payload.fields.keys().collect::<Vec<_>>(),
            "Updating issue"
        );

        let builder = self
            .request(reqwest::Method::PUT, &["issue", &key])
            .json(&payload);
        self.send_discarding(builder, &endpoint).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_base_bare_host() {
        assert_eq!(
            build_api_base("company.atlassian.net"),
            "https://company.atlassian.net/rest/api/3"
        );
    }

    #[test]
    fn test_api_base_strips_trailing_slash() {
        assert_eq!(
            build_api_base("company.atlassian.net/"),
            "https://company.atlassian.net/rest/api/3"
        );
    }

    #[test]
    fn test_api_base_keeps_scheme() {
        assert_eq!(
            build_api_base("http://localhost:8080"),
            "http://localhost:8080/rest/api/3"
        );
        assert_eq!(
            build_api_base("https://company.atlassian.net"),
            "https://company.atlassian.net/rest/api/3"
        );
    }

    #[test]
    fn test_new_from_config() {
        let config = Config {
            host: "company.atlassian.net".to_string(),
            email: "dev@company.com".to_string(),
            api_token: "token".to_string(),
        };
        let client = JiraClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://company.atlassian.net/rest/api/3");
    }

    #[test]
    fn test_basic_auth() {
        // base64("user:pass")
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_auth_header_on_request() {
        let client =
            JiraClient::with_base_url("http://localhost", "user@example.com", "api-token-123")
                .unwrap();
        let built = client
            .request(reqwest::Method::GET, &["field"])
            .build()
            .unwrap();

        assert_eq!(built.url().as_str(), "http://localhost/field");
        let auth = built
            .headers()
            .get("Authorization")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(auth, basic_auth("user@example.com", "api-token-123"));
        assert_eq!(built.headers().get("Accept").unwrap(), "application/json");
    }

    #[test]
    fn test_issue_key_is_one_path_segment() {
        let client = JiraClient::with_base_url(
            "https://company.atlassian.net/rest/api/3/",
            "user@example.com",
            "t",
        )
        .unwrap();

        let url = client.url(&["issue", "PROJ-1/../../field?x=1#y", "comment"]);
        assert_eq!(
            url.as_str(),
            "https://company.atlassian.net/rest/api/3/issue/PROJ-1%2F..%2F..%2Ffield%3Fx=1%23y/comment"
        );
        assert!(url.query().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = JiraClient::with_base_url("not a url", "user@example.com", "t").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_selection_query() {
        assert!(selection_query(&[], &[]).is_empty());

        let params = selection_query(
            &["summary".to_string(), "status".to_string()],
            &["changelog".to_string()],
        );
        assert_eq!(
            params,
            vec![
                ("fields", "summary,status".to_string()),
                ("expand", "changelog".to_string())
            ]
        );
    }

    #[test]
    fn test_create_payload_omits_unset_fields() {
        let payload = build_create_payload(CreateIssueInput {
            project_key: "PROJ".to_string(),
            summary: "New task".to_string(),
            issue_type: "Task".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "fields": {
                    "project": {"key": "PROJ"},
                    "summary": "New task",
                    "issuetype": {"name": "Task"}
                }
            })
        );
    }

    #[test]
    fn test_create_payload_full() {
        let mut extra = Map::new();
        extra.insert("customfield_10016".to_string(), json!(5));

        let payload = build_create_payload(CreateIssueInput {
            project_key: "PROJ".to_string(),
            summary: "Story".to_string(),
            issue_type: "Story".to_string(),
            description: Some("Body".to_string()),
            assignee_id: Some("acc-1".to_string()),
            priority: Some("High".to_string()),
            labels: Some(vec!["backend".to_string()]),
            parent_key: Some("PROJ-1".to_string()),
            additional_fields: Some(extra),
        })
        .unwrap();

        let fields = &payload.fields;
        assert_eq!(fields["description"], text_to_adf("Body"));
        assert_eq!(fields["assignee"], json!({"accountId": "acc-1"}));
        assert_eq!(fields["priority"], json!({"name": "High"}));
        assert_eq!(fields["labels"], json!(["backend"]));
        assert_eq!(fields["parent"], json!({"key": "PROJ-1"}));
        assert_eq!(fields["customfield_10016"], json!(5));
    }

    #[test]
    fn test_update_payload_tri_state() {
        let payload = build_update_payload(UpdateIssueInput {
            issue_key: "PROJ-1".to_string(),
            summary: FieldUpdate::Set("Renamed".to_string()),
            description: FieldUpdate::Unchanged,
            assignee_id: FieldUpdate::Clear,
            priority: FieldUpdate::Set(String::new()),
            labels: FieldUpdate::Unchanged,
            additional_fields: None,
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "fields": {
                    "summary": "Renamed",
                    "assignee": null,
                    "priority": null
                }
            })
        );
    }

    #[test]
    fn test_update_payload_clears_labels_with_empty_list() {
        let payload = build_update_payload(UpdateIssueInput {
            issue_key: "PROJ-1".to_string(),
            labels: FieldUpdate::Clear,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(payload.fields["labels"], json!([]));
        assert_eq!(payload.fields.len(), 1);
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;

        fn create_client(server: &MockServer) -> JiraClient {
            JiraClient::with_base_url(server.base_url(), "user@example.com", "api-token").unwrap()
        }

        fn sample_issue_json() -> Value {
            json!({
                "id": "10001",
                "key": "PROJ-1",
                "self": "https://test.atlassian.net/rest/api/3/issue/10001",
                "fields": {
                    "summary": "Fix login bug",
                    "description": {
                        "version": 1,
                        "type": "doc",
                        "content": [{
                            "type": "paragraph",
                            "content": [{"type": "text", "text": "Login fails on mobile"}]
                        }]
                    },
                    "status": {
                        "id": "1",
                        "name": "To Do",
                        "statusCategory": {"id": 2, "key": "new", "name": "To Do"}
                    },
                    "priority": {"id": "2", "name": "High"},
                    "issuetype": {"id": "10001", "name": "Bug", "subtask": false},
                    "assignee": {
                        "accountId": "5b10a2844c20165700ede21g",
                        "displayName": "John Doe",
                        "active": true
                    },
                    "project": {"id": "10000", "key": "PROJ", "name": "Project"},
                    "labels": ["bug"],
                    "created": "2024-01-01T10:00:00.000+0000",
                    "updated": "2024-01-02T15:30:00.000+0000",
                    "customfield_10016": 3
                }
            })
        }

        #[tokio::test]
        async fn test_get_issue() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/issue/PROJ-1")
                    .header("Authorization", basic_auth("user@example.com", "api-token"));
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let issue = client.get_issue("PROJ-1", &[], &[]).await.unwrap();

            mock.assert();
            assert_eq!(issue.key, "PROJ-1");
            assert_eq!(issue.fields.summary.as_deref(), Some("Fix login bug"));
            assert_eq!(issue.fields.status.unwrap().name, "To Do");
            assert_eq!(issue.fields.other["customfield_10016"], 3);
        }

        #[tokio::test]
        async fn test_get_raw_issue_keeps_every_key() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issue/PROJ-1");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let raw = client.get_raw_issue("PROJ-1", &[], &[]).await.unwrap();

            assert_eq!(raw.fields, sample_issue_json()["fields"].as_object().unwrap().clone());
            assert_eq!(raw.fields["issuetype"]["subtask"], false);
        }

        #[tokio::test]
        async fn test_get_issue_with_selection() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/issue/PROJ-1")
                    .query_param("fields", "summary,status")
                    .query_param("expand", "changelog,renderedFields");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            client
                .get_issue(
                    "PROJ-1",
                    &["summary".to_string(), "status".to_string()],
                    &["changelog".to_string(), "renderedFields".to_string()],
                )
                .await
                .unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_search_issues_body() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST).path("/search/jql").json_body(json!({
                    "jql": "project = PROJ",
                    "maxResults": 25,
                    "fields": ["summary", "status"],
                    "nextPageToken": "page-2"
                }));
                then.status(200).json_body(json!({
                    "maxResults": 25,
                    "total": 1,
                    "issues": [sample_issue_json()],
                    "nextPageToken": "page-3"
                }));
            });

            let client = create_client(&server);
            let page = client
                .search_issues(
                    "project = PROJ",
                    SearchOptions {
                        max_results: 25,
                        fields: vec!["summary".to_string(), "status".to_string()],
                        expand: vec![],
                        next_page_token: Some("page-2".to_string()),
                    },
                )
                .await
                .unwrap();

            mock.assert();
            assert_eq!(page.total, Some(1));
            assert_eq!(page.issues.len(), 1);
            assert_eq!(page.next_page_token.as_deref(), Some("page-3"));
        }

        #[tokio::test]
        async fn test_search_issues_defaults() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST).path("/search/jql").json_body(json!({
                    "jql": "assignee = currentUser()",
                    "maxResults": 50
                }));
                then.status(200).json_body(json!({"issues": []}));
            });

            let client = create_client(&server);
            let page = client
                .search_issues("assignee = currentUser()", SearchOptions::default())
                .await
                .unwrap();

            mock.assert();
            assert!(page.issues.is_empty());
            assert!(page.next_page_token.is_none());
        }

        #[tokio::test]
        async fn test_add_comment_converts_text() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/issue/PROJ-1/comment")
                    .json_body(json!({"body": text_to_adf("Looks good\n\nShip it")}));
                then.status(201).json_body(json!({
                    "id": "100",
                    "author": {"accountId": "abc", "displayName": "Jane"},
                    "body": text_to_adf("Looks good\n\nShip it"),
                    "created": "2024-01-03T10:00:00.000+0000",
                    "updated": "2024-01-03T10:00:00.000+0000"
                }));
            });

            let client = create_client(&server);
            let comment = client
                .add_comment("PROJ-1", CommentBody::from("Looks good\n\nShip it"))
                .await
                .unwrap();

            mock.assert();
            assert_eq!(comment.id, "100");
            assert_eq!(
                comment.author.unwrap().display_name.as_deref(),
                Some("Jane")
            );
        }

        #[tokio::test]
        async fn test_add_comment_document_sent_verbatim() {
            let server = MockServer::start();
            let doc = json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": "bold", "marks": [{"type": "strong"}]}]
                }]
            });

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/issue/PROJ-1/comment")
                    .json_body(json!({"body": doc.clone()}));
                then.status(201).json_body(json!({"id": "101", "body": doc.clone()}));
            });

            let client = create_client(&server);
            let comment = client
                .add_comment("PROJ-1", CommentBody::Document(doc.clone()))
                .await
                .unwrap();

            mock.assert();
            assert_eq!(comment.id, "101");
        }

        #[tokio::test]
        async fn test_get_transitions() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issue/PROJ-1/transitions");
                then.status(200).json_body(json!({
                    "transitions": [{
                        "id": "21",
                        "name": "Start Progress",
                        "to": {
                            "id": "3",
                            "name": "In Progress",
                            "statusCategory": {"id": 4, "key": "indeterminate", "name": "In Progress"}
                        },
                        "hasScreen": false,
                        "isGlobal": true,
                        "isInitial": false,
                        "isConditional": false
                    }]
                }));
            });

            let client = create_client(&server);
            let transitions = client.get_transitions("PROJ-1").await.unwrap();

            assert_eq!(transitions.len(), 1);
            assert_eq!(transitions[0].id, "21");
            assert_eq!(transitions[0].to.name, "In Progress");
            assert!(transitions[0].is_global);
        }

        #[tokio::test]
        async fn test_transition_issue_no_content() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/issue/PROJ-1/transitions")
                    .json_body(json!({"transition": {"id": "11"}}));
                then.status(204);
            });

            let client = create_client(&server);
            client.transition_issue("PROJ-1", "11", None).await.unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_transition_issue_with_comment() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/issue/PROJ-1/transitions")
                    .json_body(json!({
                        "transition": {"id": "31"},
                        "update": {
                            "comment": [{"add": {"body": text_to_adf("Done in PR 42")}}]
                        }
                    }));
                then.status(204);
            });

            let client = create_client(&server);
            client
                .transition_issue("PROJ-1", "31", Some("Done in PR 42"))
                .await
                .unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_get_fields() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/field");
                then.status(200).json_body(json!([
                    {"id": "summary", "name": "Summary", "custom": false},
                    {"id": "customfield_10016", "name": "Story Points", "custom": true,
                     "schema": {"type": "number"}}
                ]));
            });

            let client = create_client(&server);
            let fields = client.get_fields().await.unwrap();

            assert_eq!(fields.len(), 2);
            assert_eq!(fields[1].name, "Story Points");
            assert!(fields[1].custom);
        }

        #[tokio::test]
        async fn test_create_issue() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST).path("/issue").json_body(json!({
                    "fields": {
                        "project": {"key": "PROJ"},
                        "summary": "New task",
                        "issuetype": {"name": "Task"},
                        "labels": ["ops"]
                    }
                }));
                then.status(201).json_body(json!({
                    "id": "10002",
                    "key": "PROJ-2",
                    "self": "https://test.atlassian.net/rest/api/3/issue/10002"
                }));
            });

            let client = create_client(&server);
            let created = client
                .create_issue(CreateIssueInput {
                    project_key: "PROJ".to_string(),
                    summary: "New task".to_string(),
                    issue_type: "Task".to_string(),
                    labels: Some(vec!["ops".to_string()]),
                    ..Default::default()
                })
                .await
                .unwrap();

            mock.assert();
            assert_eq!(created.key, "PROJ-2");
            assert!(created.self_link.ends_with("/issue/10002"));
        }

        #[tokio::test]
        async fn test_update_issue_no_content() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(PUT)
                    .path("/issue/PROJ-1")
                    .json_body(json!({"fields": {"summary": "Renamed", "assignee": null}}));
                then.status(204);
            });

            let client = create_client(&server);
            client
                .update_issue(UpdateIssueInput {
                    issue_key: "PROJ-1".to_string(),
                    summary: FieldUpdate::Set("Renamed".to_string()),
                    assignee_id: FieldUpdate::Clear,
                    ..Default::default()
                })
                .await
                .unwrap();

            mock.assert();
        }

        // =================================================================
        // Error handling tests
        // =================================================================

        #[tokio::test]
        async fn test_handle_404() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issue/PROJ-999");
                then.status(404)
                    .body(r#"{"errorMessages":["Issue does not exist"]}"#);
            });

            let client = create_client(&server);
            let err = client.get_issue("PROJ-999", &[], &[]).await.unwrap_err();

            match err {
                Error::Api {
                    status,
                    endpoint,
                    message,
                } => {
                    assert_eq!(status, 404);
                    assert_eq!(endpoint, "/issue/PROJ-999");
                    assert!(message.contains("Issue does not exist"));
                }
                other => panic!("Expected API error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_handle_401() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/field");
                then.status(401).body("Unauthorized");
            });

            let client = create_client(&server);
            let err = client.get_fields().await.unwrap_err();

            assert!(err.is_client_error());
            assert_eq!(err.status(), Some(401));
        }

        #[tokio::test]
        async fn test_handle_500() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST).path("/search/jql");
                then.status(500).body("Internal Server Error");
            });

            let client = create_client(&server);
            let err = client
                .search_issues("project = PROJ", SearchOptions::default())
                .await
                .unwrap_err();

            assert!(err.is_server_error());
            assert!(err.to_string().contains("Internal Server Error"));
        }

        #[tokio::test]
        async fn test_malformed_body() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/issue/PROJ-1");
                then.status(200).body("<html>not json</html>");
            });

            let client = create_client(&server);
            let err = client.get_issue("PROJ-1", &[], &[]).await.unwrap_err();

            assert!(matches!(err, Error::InvalidData(_)));
        }

        #[tokio::test]
        async fn test_connection_refused() {
            let client =
                JiraClient::with_base_url("http://127.0.0.1:1", "user@example.com", "t").unwrap();
            let err = client.get_fields().await.unwrap_err();

            assert!(matches!(err, Error::Http(_)));
        }
    }
}
