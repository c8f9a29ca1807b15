//! Interface to the forge hosting the project: releases, commit history,
//! pull request metadata and repository files.

/// Configuration and authentication for forge platforms.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Wrapper adding logging and stage context to forge calls.
pub mod manager;

/// Page-by-page collection of list endpoints.
pub mod paging;

/// Issue search query construction.
pub mod query;

/// Shared data types for releases, commits and issues.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
