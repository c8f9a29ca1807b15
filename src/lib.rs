pub mod changelog;
mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod forge;
pub mod notes;
pub mod orchestrator;
pub mod range;
pub mod release_index;
mod repo;
pub mod version;

pub use cli::{Args, Command};
pub use config::{Config, RelnotesConfig};
pub use error::{RelnotesError, Result};
pub use forge::manager::ForgeManager;
pub use orchestrator::{
    CollectRequest, Orchestrator, ReleaseNotes, RepoReport,
};
pub use repo::current_branch;

#[cfg(test)]
pub mod test_helpers;
