use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Circle sends `null` where a field has no value yet; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A repository the provider tracks for the authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "reponame")]
    pub name: String,
    #[serde(rename = "username")]
    pub user: String,
    #[serde(default)]
    pub language: Option<String>,
    pub vcs_type: String,
}

impl Project {
    pub fn slug(&self) -> String {
        format!("{}/{}/{}", self.vcs_type, self.user, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One CI run as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    #[serde(rename = "subject", default)]
    pub commit: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: BuildUser,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lifecycle: String,
    #[serde(default)]
    pub branch: Option<String>,
    pub build_num: u64,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stop_time: Option<DateTime<Utc>>,
}

/// Latest build of a single project, as published to dashboard clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "reponame")]
    pub name: String,
    pub language: Option<String>,
    #[serde(rename = "build_info")]
    pub build: Build,
}

impl Summary {
    pub fn new(project: Project, build: Build) -> Self {
        Self {
            name: project.name,
            language: project.language,
            build,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashResponse {
    pub builds: Vec<Summary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
