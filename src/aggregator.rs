use std::sync::Arc;

use log::{debug, info};

use crate::auth::Token;
use crate::error::{DashError, Result};
use crate::models::Summary;
use crate::providers::Provider;

/// Runs one discovery-plus-fetch cycle against a provider.
pub struct Aggregator {
    provider: Arc<dyn Provider>,
    token: Token,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn Provider>, token: Token) -> Self {
        Self { provider, token }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Latest build of every project, in the order the provider lists them.
    ///
    /// Projects are fetched one at a time. The first failing call fails the
    /// whole cycle; no partial result is returned.
    pub async fn aggregate(&self) -> Result<Vec<Summary>> {
        if !self.has_token() {
            return Err(DashError::Auth);
        }

        let projects = self.provider.list_projects(&self.token).await?;
        info!("Fetching latest builds for {} projects...", projects.len());

        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            debug!("Fetching latest build for {}", project.slug());
            let build = self.provider.latest_build(&project, &self.token).await?;
            summaries.push(Summary::new(project, build));
        }

        Ok(summaries)
    }
}
