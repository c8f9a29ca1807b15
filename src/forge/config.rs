//! Configuration for Git forge platform connections.
use secrecy::SecretString;

/// Default page size for paginated forge queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// Most results the GitHub search API serves for a single query.
pub const SEARCH_RESULT_CAP: usize = 1000;

use crate::{
    error::Result,
    forge::{github::Github, traits::Forge},
};

/// Remote repository connection configuration for authenticating and
/// interacting with forge platforms.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Full repository path.
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
/// Supported Git forge platforms.
pub enum Remote {
    Github(RemoteConfig),
}

impl Remote {
    /// Create forge client instance for the configured platform.
    pub async fn get_forge(&self) -> Result<Box<dyn Forge>> {
        match self {
            Remote::Github(config) => {
                let forge = Github::new(config.clone()).await?;
                Ok(Box::new(forge))
            }
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        match self {
            Remote::Github(config) => config,
        }
    }
}
