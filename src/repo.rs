//! Local git repository queries.
use git2::Repository;
use log::*;
use std::path::Path;

use crate::error::{RelnotesError, Result};

/// Name of the branch checked out in the repository containing `path`.
pub fn current_branch(path: &Path) -> Result<String> {
    let repo = Repository::discover(path)?;
    let head = repo.head()?;

    if !head.is_branch() {
        return Err(RelnotesError::InvalidArgs(
            "HEAD is detached: pass --branch explicitly".into(),
        ));
    }

    let branch = head
        .shorthand()
        .ok_or_else(|| {
            RelnotesError::InvalidArgs("branch name is not valid utf-8".into())
        })?
        .to_string();

    debug!("detected current branch: {branch}");

    Ok(branch)
}
