use async_trait::async_trait;

use super::client::CircleClient;
use crate::auth::Token;
use crate::error::{DashError, Result};
use crate::models::{Build, Project};
use crate::providers::Provider;

#[async_trait]
impl Provider for CircleClient {
    async fn list_projects(&self, token: &Token) -> Result<Vec<Project>> {
        if token.is_empty() {
            return Err(DashError::Auth);
        }

        let url = self.projects_url()?;
        self.get_json(url, token).await
    }

    async fn latest_build(&self, project: &Project, token: &Token) -> Result<Build> {
        if token.is_empty() {
            return Err(DashError::Auth);
        }

        let url = self.project_builds_url(project)?;
        let builds: Vec<Build> = self.get_json(url, token).await?;

        // Circle lists builds newest first
        builds
            .into_iter()
            .next()
            .ok_or_else(|| DashError::NotFound(project.slug()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};

    use super::*;
    use crate::models::fixtures::project;

    const PROJECTS: &str = r#"[
        {"reponame": "widget", "username": "alice", "language": "Rust", "vcs_type": "github"},
        {"reponame": "gadget", "username": "alice", "language": null, "vcs_type": "bitbucket"}
    ]"#;

    const BUILDS: &str = r#"[
        {
            "subject": "Newest",
            "status": "failed",
            "user": {"login": "alice", "name": "Alice", "avatar_url": "https://a.example/1"},
            "lifecycle": "finished",
            "branch": "main",
            "build_num": 12,
            "start_time": "2024-03-01T10:00:00Z",
            "stop_time": "2024-03-01T10:02:00Z"
        },
        {
            "subject": "Older",
            "status": "success",
            "user": {"login": "bob"},
            "lifecycle": "finished",
            "branch": "main",
            "build_num": 11,
            "start_time": "2024-02-28T09:00:00Z",
            "stop_time": "2024-02-28T09:03:00Z"
        }
    ]"#;

    fn token() -> Token {
        Token::from("secret")
    }

    #[tokio::test]
    async fn test_list_projects_sends_query_token_and_accept_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects")
            .match_query(Matcher::UrlEncoded("circle-token".into(), "secret".into()))
            .match_header("accept", "application/json")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PROJECTS)
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let projects = client.list_projects(&token()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "widget");
        assert_eq!(projects[1].vcs_type, "bitbucket");
        assert_eq!(projects[1].language, None);
    }

    #[tokio::test]
    async fn test_list_projects_with_empty_token_makes_no_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let result = client.list_projects(&Token::from("")).await;

        assert!(matches!(result, Err(DashError::Auth)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_projects_malformed_json_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let result = client.list_projects(&token()).await;

        assert!(matches!(result, Err(DashError::Decode(_))));
    }

    #[tokio::test]
    async fn test_list_projects_unexpected_shape_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"projects": []}"#)
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let result = client.list_projects(&token()).await;

        assert!(matches!(result, Err(DashError::Decode(_))));
    }

    #[tokio::test]
    async fn test_list_projects_connection_failure_is_transport_error() {
        let client = CircleClient::new("http://127.0.0.1:1/").unwrap();
        let result = client.list_projects(&token()).await;

        assert!(matches!(result, Err(DashError::Transport(_))));
    }

    #[tokio::test]
    async fn test_rejected_token_is_api_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "You must log in first."}"#)
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let err = client.list_projects(&token()).await.unwrap_err();

        assert!(matches!(err, DashError::Api(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("You must log in first."));
    }

    #[tokio::test]
    async fn test_latest_build_takes_first_listed_build() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/project/github/alice/widget")
            .match_query(Matcher::UrlEncoded("circle-token".into(), "secret".into()))
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(BUILDS)
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let build = client
            .latest_build(&project("widget"), &token())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(build.build_num, 12);
        assert_eq!(build.commit.as_deref(), Some("Newest"));
        assert_eq!(build.status, "failed");
        assert_eq!(build.user.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_latest_build_for_never_built_project_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/project/github/alice/widget")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = CircleClient::new(&server.url()).unwrap();
        let result = client.latest_build(&project("widget"), &token()).await;

        match result {
            Err(DashError::NotFound(slug)) => assert_eq!(slug, "github/alice/widget"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_latest_build_under_versioned_base_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1.1/project/github/alice/widget")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(BUILDS)
            .create_async()
            .await;

        let client = CircleClient::new(&format!("{}/api/v1.1/", server.url())).unwrap();
        let build = client
            .latest_build(&project("widget"), &token())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(build.build_num, 12);
    }
}
