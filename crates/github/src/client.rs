//! [`GithubClient`]: the REST implementation of [`WorkflowApi`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use dispatch::{
    ApiError, Branch, ConfigResponse, DispatchRequest, Workflow, WorkflowApi, WorkflowId,
    WorkflowList, WorkflowOption,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// Default GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type requested on every call.
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Repository coordinates and credentials for a [`GithubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    /// Personal access token. `None` or an empty string sends no `Authorization` header.
    pub token: Option<String>,
    /// API base URL (default: `https://api.github.com`; GitHub Enterprise
    /// installations use `https://<host>/api/v3`).
    pub api_url: String,
}

impl GithubConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Authenticated client for the workflow endpoints of one repository.
///
/// Holds no mutable state; every call builds a fresh request and hands it to
/// the injected [`HttpTransport`].
pub struct GithubClient<T> {
    owner: String,
    repo: String,
    token: Option<String>,
    base_url: Url,
    transport: T,
}

impl<T: HttpTransport> GithubClient<T> {
    /// Validates `config` and creates a client.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidConfiguration`] if the owner or repository name is
    /// empty, or the base URL cannot be parsed or cannot carry a path.
    pub fn new(config: GithubConfig, transport: T) -> Result<Self, ApiError> {
        let owner = config.owner.trim().to_string();
        let repo = config.repo.trim().to_string();
        if owner.is_empty() || repo.is_empty() {
            return Err(ApiError::InvalidConfiguration {
                message: "repository owner and name must not be empty".to_string(),
            });
        }

        let base_url =
            Url::parse(config.api_url.trim()).map_err(|e| ApiError::InvalidConfiguration {
                message: format!("invalid API URL '{}': {e}", config.api_url),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfiguration {
                message: format!("API URL '{}' cannot carry a path", config.api_url),
            });
        }

        let token = config.token.filter(|token| !token.is_empty());

        Ok(Self { owner, repo, token, base_url, transport })
    }

    /// Returns the injected transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the `owner/repo` slug this client targets.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    // -----------------------------------------------------------------------
    // Request construction
    // -----------------------------------------------------------------------

    /// Builds `{base}/repos/{owner}/{repo}/{segments...}` with every segment
    /// percent-encoded.
    fn repo_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidConfiguration {
                    message: format!("API URL '{}' cannot carry a path", self.base_url),
                })?;
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        Ok(url)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<&DispatchRequest>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![("Accept".to_string(), ACCEPT_MEDIA_TYPE.to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("token {token}")));
        }

        let body = match body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_vec(body).map_err(|source| ApiError::Encode { source })?)
            }
            None => None,
        };

        Ok(HttpRequest { method, url: url.into(), headers, body })
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "Sending GitHub API request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status, bytes = response.body.len(), "GitHub API responded");
        trace!(body = %String::from_utf8_lossy(&response.body), "GitHub API response body");
        Ok(response)
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        url: Url,
        context: &'static str,
    ) -> Result<D, ApiError> {
        let request = self.build_request(HttpMethod::Get, url, None)?;
        let response = self.execute(request).await?;

        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| ApiError::Decode { context, source })
    }
}

/// Extracts GitHub's `message` from an error body, falling back to the raw text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

#[async_trait]
impl<T: HttpTransport> WorkflowApi for GithubClient<T> {
    #[instrument(skip(self))]
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        let url = self.repo_url(&["actions", "workflows"])?;
        let list: WorkflowList = self.get_json(url, "workflows").await?;
        debug!(count = list.workflows.len(), "Listed workflows");
        Ok(list.workflows)
    }

    #[instrument(skip(self))]
    async fn list_branches(&self, page: u32, per_page: u32) -> Result<Vec<String>, ApiError> {
        let mut url = self.repo_url(&["branches"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        let branches: Vec<Branch> = self.get_json(url, "branches").await?;
        Ok(branches.into_iter().map(|branch| branch.name).collect())
    }

    #[instrument(skip(self))]
    async fn list_workflow_options(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowOption>, ApiError> {
        let id = workflow_id.to_string();
        let url = self.repo_url(&["actions", "workflows", id.as_str(), "config"])?;
        let config: ConfigResponse = self.get_json(url, "workflow config").await?;
        let options = config.workflow_options();
        debug!(count = options.len(), "Derived workflow options");
        Ok(options)
    }

    #[instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), ApiError> {
        let url = self.repo_url(&["actions", "workflows", workflow, "dispatches"])?;
        let body = DispatchRequest {
            git_ref: git_ref.to_string(),
            inputs: inputs.clone(),
        };
        let request = self.build_request(HttpMethod::Post, url, Some(&body))?;
        let response = self.execute(request).await?;

        if !response.is_success() {
            return Err(ApiError::DispatchFailed {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        info!(status = response.status, "Workflow dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::json;

    /// Replays queued responses and records every request it receives.
    #[derive(Default)]
    struct StubTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn respond(self, status: u16, body: serde_json::Value) -> Self {
            let body = if body.is_null() { Vec::new() } else { body.to_string().into_bytes() };
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse { status, body }));
            self
        }

        fn respond_raw(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ApiError::Transport { message: message.to_string() }));
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no response queued for request")
        }
    }

    fn client(transport: StubTransport) -> GithubClient<StubTransport> {
        let config = GithubConfig::new("octo-org", "octo-repo").with_token("s3cret");
        GithubClient::new(config, transport).unwrap()
    }

    #[tokio::test]
    async fn list_workflows_sends_authenticated_get() {
        let transport = StubTransport::default().respond(
            200,
            json!({ "total_count": 2, "workflows": [
                { "id": 1, "name": "CI" },
                { "id": 2, "name": "Release" }
            ] }),
        );
        let client = client(transport);

        let workflows = client.list_workflows().await.unwrap();

        assert_eq!(
            workflows,
            vec![
                Workflow { id: WorkflowId::new(1), name: "CI".into() },
                Workflow { id: WorkflowId::new(2), name: "Release".into() },
            ]
        );
        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://api.github.com/repos/octo-org/octo-repo/actions/workflows"
        );
        assert_eq!(request.header("Accept"), Some("application/vnd.github.v3+json"));
        assert_eq!(request.header("Authorization"), Some("token s3cret"));
        assert_eq!(request.header("Content-Type"), None);
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn empty_token_sends_no_authorization_header() {
        let transport = StubTransport::default().respond(200, json!({ "workflows": [] }));
        let config = GithubConfig::new("octo-org", "octo-repo").with_token("");
        let client = GithubClient::new(config, transport).unwrap();

        client.list_workflows().await.unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.header("Accept"), Some(ACCEPT_MEDIA_TYPE));
    }

    #[tokio::test]
    async fn list_workflows_without_field_is_a_decode_error() {
        let transport = StubTransport::default().respond(200, json!({ "total_count": 0 }));
        let client = client(transport);

        let err = client.list_workflows().await.unwrap_err();

        assert!(matches!(err, ApiError::Decode { context: "workflows", .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let transport = StubTransport::default().respond_raw(200, "{not json");
        let client = client(transport);

        let err = client.list_workflows().await.unwrap_err();

        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn non_success_get_carries_github_message() {
        let transport = StubTransport::default()
            .respond(401, json!({ "message": "Bad credentials", "documentation_url": "x" }));
        let client = client(transport);

        let err = client.list_workflows().await.unwrap_err();

        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failures_are_propagated() {
        let transport = StubTransport::default().fail("connection refused");
        let client = client(transport);

        let err = client.list_workflows().await.unwrap_err();

        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[tokio::test]
    async fn list_branches_requests_page_and_returns_names_in_order() {
        let transport = StubTransport::default().respond(
            200,
            json!([
                { "name": "main", "protected": true },
                { "name": "dev", "protected": false },
                { "name": "release-1" }
            ]),
        );
        let client = client(transport);

        let branches = client.list_branches(3, 100).await.unwrap();

        assert_eq!(branches, vec!["main", "dev", "release-1"]);
        assert_eq!(
            client.transport().requests()[0].url,
            "https://api.github.com/repos/octo-org/octo-repo/branches?page=3&per_page=100"
        );
    }

    #[tokio::test]
    async fn workflow_options_are_derived_from_config() {
        let transport = StubTransport::default().respond(
            200,
            json!({ "config": { "jobs": [
                { "steps": [
                    { "env": { "INPUT_MESSAGE": "", "DEBUG": "false" } },
                    { "env": { "INPUT_MESSAGE": "" } },
                    { "uses": "actions/checkout@v4" }
                ] }
            ] } }),
        );
        let client = client(transport);

        let mut options = client
            .list_workflow_options(WorkflowId::new(161335))
            .await
            .unwrap();
        options.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            options,
            vec![
                WorkflowOption { name: "DEBUG".into(), kind: dispatch::OptionKind::Boolean },
                WorkflowOption { name: "INPUT_MESSAGE".into(), kind: dispatch::OptionKind::String },
            ]
        );
        assert_eq!(
            client.transport().requests()[0].url,
            "https://api.github.com/repos/octo-org/octo-repo/actions/workflows/161335/config"
        );
    }

    #[tokio::test]
    async fn dispatch_posts_json_body() {
        let transport = StubTransport::default().respond(204, serde_json::Value::Null);
        let client = client(transport);
        let inputs = BTreeMap::from([
            ("DEBUG".to_string(), "true".to_string()),
            ("INPUT_MESSAGE".to_string(), "hello".to_string()),
        ]);

        client.dispatch_workflow("Deploy", "main", &inputs).await.unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://api.github.com/repos/octo-org/octo-repo/actions/workflows/Deploy/dispatches"
        );
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), Some("token s3cret"));
        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({ "ref": "main", "inputs": { "DEBUG": "true", "INPUT_MESSAGE": "hello" } })
        );
    }

    #[tokio::test]
    async fn dispatch_percent_encodes_workflow_names() {
        let transport = StubTransport::default().respond(204, serde_json::Value::Null);
        let client = client(transport);

        client
            .dispatch_workflow("Nightly Build", "main", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(
            client.transport().requests()[0].url,
            "https://api.github.com/repos/octo-org/octo-repo/actions/workflows/Nightly%20Build/dispatches"
        );
    }

    #[tokio::test]
    async fn dispatch_non_success_is_dispatch_failed() {
        let transport = StubTransport::default()
            .respond(422, json!({ "message": "No ref found for: gone" }));
        let client = client(transport);

        let err = client
            .dispatch_workflow("Deploy", "gone", &BTreeMap::new())
            .await
            .unwrap_err();

        match err {
            ApiError::DispatchFailed { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "No ref found for: gone");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn enterprise_base_url_keeps_its_path() {
        let transport = StubTransport::default().respond(200, json!({ "workflows": [] }));
        let config = GithubConfig::new("octo-org", "octo-repo")
            .with_api_url("https://ghe.example.com/api/v3/");
        let client = GithubClient::new(config, transport).unwrap();

        client.list_workflows().await.unwrap();

        assert_eq!(
            client.transport().requests()[0].url,
            "https://ghe.example.com/api/v3/repos/octo-org/octo-repo/actions/workflows"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = GithubConfig::new("octo-org", "octo-repo").with_api_url("not a url");
        let result = GithubClient::new(config, StubTransport::default());
        assert!(matches!(result, Err(ApiError::InvalidConfiguration { .. })));

        let config = GithubConfig::new("octo-org", "octo-repo").with_api_url("mailto:dev@example.com");
        let result = GithubClient::new(config, StubTransport::default());
        assert!(matches!(result, Err(ApiError::InvalidConfiguration { .. })));
    }

    #[test]
    fn empty_repository_coordinates_are_rejected() {
        let result = GithubClient::new(GithubConfig::new("", "octo-repo"), StubTransport::default());
        assert!(matches!(result, Err(ApiError::InvalidConfiguration { .. })));

        let result = GithubClient::new(GithubConfig::new("octo-org", "  "), StubTransport::default());
        assert!(matches!(result, Err(ApiError::InvalidConfiguration { .. })));
    }

    #[test]
    fn repository_slug_uses_trimmed_coordinates() {
        let config = GithubConfig::new(" octo-org ", "octo-repo\n");
        let client = GithubClient::new(config, StubTransport::default()).unwrap();
        assert_eq!(client.repository(), "octo-org/octo-repo");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message(b"  upstream timeout \n"), "upstream timeout");
        assert_eq!(error_message(br#"{"message":"Not Found"}"#), "Not Found");
    }
}
