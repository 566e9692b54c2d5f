pub mod circleci;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::auth::Token;
use crate::error::Result;
use crate::models::{Build, Project};

/// Source of project and build data for the dashboard.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    async fn list_projects(&self, token: &Token) -> Result<Vec<Project>>;

    /// Most recent build of `project`. Fails with `NotFound` if it has never built.
    async fn latest_build(&self, project: &Project, token: &Token) -> Result<Build>;
}
