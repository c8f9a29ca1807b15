//! Error types for relnotes.

use std::{fmt, num::ParseIntError};
use thiserror::Error;

/// Pipeline stage a collaborator call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ListReleases,
    BranchHead,
    ResolveTime,
    ListCommits,
    ListIssues,
    FetchFile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ListReleases => "list releases",
            Stage::BranchHead => "resolve branch head",
            Stage::ResolveTime => "resolve commit time",
            Stage::ListCommits => "list commits",
            Stage::ListIssues => "list issues",
            Stage::FetchFile => "fetch file",
        };
        f.write_str(name)
    }
}

/// Main error type for relnotes operations.
#[derive(Error, Debug)]
pub enum RelnotesError {
    #[error(
        "Unable to set beginning of range automatically for branch '{branch}': specify it on the command-line"
    )]
    RangeUnresolvable { branch: String },

    #[error(
        "Malformed pull request reference '#{reference}' in commit {commit}: {source}"
    )]
    MalformedCommitReference {
        commit: String,
        reference: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Failed to {stage} for '{identifier}': {source}")]
    CollaboratorFailure {
        stage: Stage,
        identifier: String,
        #[source]
        source: Box<RelnotesError>,
    },

    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Forge/Git errors
    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using RelnotesError
pub type Result<T> = std::result::Result<T, RelnotesError>;

impl RelnotesError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a range unresolvable error
    pub fn range_unresolvable(branch: impl Into<String>) -> Self {
        Self::RangeUnresolvable {
            branch: branch.into(),
        }
    }

    /// Wrap an error raised by a collaborator call with the stage and
    /// identifier it was raised for.
    pub fn collaborator(
        stage: Stage,
        identifier: impl Into<String>,
        source: RelnotesError,
    ) -> Self {
        Self::CollaboratorFailure {
            stage,
            identifier: identifier.into(),
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for RelnotesError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<octocrab::Error> for RelnotesError {
    fn from(err: octocrab::Error) -> Self {
        Self::ForgeError(format!("GitHub API error: {}", err))
    }
}
