use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{DashError, Result};
use crate::models::Project;

pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v1.1/";

pub struct CircleClient {
    client: Client,
    api_url: Url,
}

impl CircleClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cidash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut api_url =
            Url::parse(base_url).map_err(|e| DashError::Config(format!("Invalid API URL: {e}")))?;

        if !matches!(api_url.scheme(), "http" | "https") || api_url.cannot_be_a_base() {
            return Err(DashError::Config(format!(
                "Invalid API URL: {base_url} is not an http(s) base"
            )));
        }

        // Relative joins drop the last path segment unless it ends with a slash
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self { client, api_url })
    }

    /// Circle only answers with JSON when asked, and takes the token as a query credential
    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        token: &Token,
    ) -> reqwest::RequestBuilder {
        request
            .header(ACCEPT, "application/json")
            .query(&[("circle-token", token.as_str())])
    }

    pub(super) fn projects_url(&self) -> Result<Url> {
        self.api_url
            .join("projects")
            .map_err(|e| DashError::Config(format!("Invalid projects URL: {e}")))
    }

    pub(super) fn project_builds_url(&self, project: &Project) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| DashError::Config("Invalid project URL".to_string()))?
            .pop_if_empty()
            .extend([
                "project",
                project.vcs_type.as_str(),
                project.user.as_str(),
                project.name.as_str(),
            ]);
        Ok(url)
    }

    pub(super) async fn get_json<T: DeserializeOwned>(&self, url: Url, token: &Token) -> Result<T> {
        debug!("GET {url}");

        let request = self.auth_request(self.client.get(url), token);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashError::Api(format!("{status} - {body}")));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
