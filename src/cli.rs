//! CLI argument parsing and forge platform configuration.
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{ContextCompat, eyre};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::env;

use crate::{
    config::DEFAULT_CONFIG_FILE,
    error::Result,
    forge::{
        config::{Remote, RemoteConfig},
        query::{SortField, SortOrder},
    },
    orchestrator::CollectRequest,
};

/// Default directory for per-repository release note reports.
pub const DEFAULT_OUTPUT_DIR: &str = "./";

/// Global CLI arguments for forge configuration and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitHub repository URL (https://github.com/owner/repo).
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, global = true)]
    /// Branch the release is cut from. Defaults to the checked out branch.
    pub branch: Option<String>,

    #[arg(long, global = true)]
    /// Label marking release-note-worthy pull requests.
    pub label: Option<String>,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the relnotes configuration file.
    pub config: String,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Changelog subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate release notes for a range of the branch history.
    Generate {
        /// Range as [[START..]END]. Defaults to the last release of the
        /// branch up to its head.
        #[arg(default_value = "")]
        range: String,

        /// Write the notes to this file instead of stdout.
        #[arg(long)]
        markdown_file: Option<String>,
    },

    /// Print the resolved range without generating notes.
    Range {
        #[arg(default_value = "")]
        range: String,
    },

    /// Print the last release of every branch as JSON.
    Index,

    /// Search repositories for merged release-note pull requests and write
    /// one `<repo>.releasenote` report per repository.
    Collect {
        /// Repositories of the owner, comma separated. Defaults to the
        /// repository of --github-repo.
        #[arg(long, value_delimiter = ',')]
        repos: Vec<String>,

        /// Release version printed in each report header.
        #[arg(long, default_value = "")]
        release_version: String,

        /// Only pull requests merged after this date (YYYY-MM-DD or RFC 3339).
        #[arg(long, value_parser = parse_date)]
        start_date: Option<DateTime<Utc>>,

        /// Only pull requests merged before this date (YYYY-MM-DD or RFC 3339).
        #[arg(long, value_parser = parse_date)]
        end_date: Option<DateTime<Utc>>,

        /// Sort search results by this field instead of best match.
        #[arg(long, value_enum)]
        sort: Option<SortField>,

        /// Sort order, used together with --sort.
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        order: SortOrder,

        /// Directory the reports are written to.
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output: String,
    },
}

impl Command {
    /// Search settings of a `collect` invocation.
    pub fn collect_request(&self) -> Option<CollectRequest> {
        match self {
            Command::Collect {
                repos,
                release_version,
                start_date,
                end_date,
                sort,
                order,
                ..
            } => Some(CollectRequest {
                repos: repos.clone(),
                version: release_version.clone(),
                merged_after: *start_date,
                merged_before: *end_date,
                sort: *sort,
                order: *order,
            }),
            _ => None,
        }
    }
}

/// Parses a `YYYY-MM-DD` date (midnight UTC) or an RFC 3339 timestamp.
fn parse_date(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .ok_or_else(|| {
            format!("invalid date '{value}': expected YYYY-MM-DD or RFC 3339")
        })
}

impl Args {
    /// Configure remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<Remote> {
        if !self.github_repo.is_empty() {
            return get_github_remote(&self.github_repo, &self.github_token);
        }

        Err(eyre!("must configure a remote with --github-repo").into())
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(eyre!(
            "only http and https schemes are supported for repo urls"
        )
        .into()),
    }
}

/// Configure GitHub remote with URL parsing and token resolution.
fn get_github_remote(github_repo: &str, github_token: &str) -> Result<Remote> {
    let parsed = GitUrl::parse(github_repo)?;

    validate_scheme(parsed.scheme)?;

    let mut token = github_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = parsed.token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
    {
        token = env_var_token;
    }

    if token.is_empty() {
        return Err(eyre!("must set github token").into());
    }

    let host = parsed
        .host
        .ok_or(eyre!("unable to parse host from github repo"))?;

    let owner = parsed
        .owner
        .ok_or(eyre!("unable to parse owner from github repo"))?;

    let project_path = parsed
        .path
        .strip_prefix("/")
        .wrap_err("failed to process project path")?
        .to_string();

    Ok(Remote::Github(RemoteConfig {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        path: project_path,
        token: SecretString::from(token),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn args(repo: &str, token: &str) -> Args {
        Args {
            github_repo: repo.into(),
            github_token: token.into(),
            branch: None,
            label: None,
            config: DEFAULT_CONFIG_FILE.into(),
            debug: false,
            command: Command::Index,
        }
    }

    #[test]
    fn gets_github_remote() {
        let remote = args(
            "https://github.com/kubernetes/kubernetes",
            "github_token",
        )
        .get_remote()
        .unwrap();

        let Remote::Github(config) = remote;
        assert_eq!(config.host, "github.com");
        assert_eq!(config.owner, "kubernetes");
        assert_eq!(config.repo, "kubernetes");
        assert_eq!(config.token.expose_secret(), "github_token");
    }

    #[test]
    fn requires_a_remote() {
        assert!(args("", "token").get_remote().is_err());
    }

    #[test]
    fn only_supports_http_and_https_schemes() {
        let result =
            args("git@github.com:owner/repo", "token").get_remote();
        assert!(result.is_err());
    }

    #[test]
    fn parses_generate_subcommand() {
        let args = Args::try_parse_from([
            "relnotes",
            "--github-repo",
            "https://github.com/o/r",
            "generate",
            "v1.7.5..v1.7.6",
            "--markdown-file",
            "notes.md",
            "--branch",
            "release-1.7",
        ])
        .unwrap();

        assert_eq!(args.branch.as_deref(), Some("release-1.7"));
        match args.command {
            Command::Generate {
                range,
                markdown_file,
            } => {
                assert_eq!(range, "v1.7.5..v1.7.6");
                assert_eq!(markdown_file.as_deref(), Some("notes.md"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_collect_subcommand() {
        let args = Args::try_parse_from([
            "relnotes",
            "collect",
            "--repos",
            "pilot,mixer",
            "--release-version",
            "0.2.0",
            "--start-date",
            "2017-08-01",
            "--end-date",
            "2017-09-01T12:00:00Z",
            "--sort",
            "created",
            "--order",
            "asc",
        ])
        .unwrap();

        let req = args.command.collect_request().unwrap();
        assert_eq!(req.repos, vec!["pilot".to_string(), "mixer".to_string()]);
        assert_eq!(req.version, "0.2.0");
        assert_eq!(
            req.merged_after.unwrap().to_rfc3339(),
            "2017-08-01T00:00:00+00:00"
        );
        assert_eq!(
            req.merged_before.unwrap().to_rfc3339(),
            "2017-09-01T12:00:00+00:00"
        );
        assert_eq!(req.sort, Some(SortField::Created));
        assert_eq!(req.order, SortOrder::Asc);
    }

    #[test]
    fn collect_defaults_leave_search_unbounded() {
        let args = Args::try_parse_from(["relnotes", "collect"]).unwrap();
        let req = args.command.collect_request().unwrap();

        assert!(req.repos.is_empty());
        assert!(req.merged_after.is_none());
        assert!(req.sort.is_none());
        assert_eq!(req.order, SortOrder::Desc);
        assert!(matches!(
            args.command,
            Command::Collect { ref output, .. } if output == DEFAULT_OUTPUT_DIR
        ));
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = Args::try_parse_from([
            "relnotes",
            "collect",
            "--start-date",
            "last tuesday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn range_defaults_to_empty() {
        let args =
            Args::try_parse_from(["relnotes", "range"]).unwrap();
        assert!(matches!(args.command, Command::Range { range } if range.is_empty()));
    }
}
