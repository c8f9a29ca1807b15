use clap::Parser;
use log::*;
use std::path::Path;

use relnotes::{
    Args, Command, Config, ForgeManager, Orchestrator, RelnotesConfig,
    RepoReport, current_branch,
};

fn initialize_logger(debug: bool) -> color_eyre::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("relnotes")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn write_markdown(path: &str, markdown: &str) -> color_eyre::Result<()> {
    let path = Path::new(path);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, markdown).await?;
    info!("wrote release notes to {}", path.display());

    Ok(())
}

async fn write_reports(
    output: &str,
    reports: &[RepoReport],
) -> color_eyre::Result<()> {
    let dir = Path::new(output);
    tokio::fs::create_dir_all(dir).await?;

    for report in reports {
        let path = dir.join(format!("{}.releasenote", report.repo));
        tokio::fs::write(&path, &report.report).await?;
        info!("wrote release notes to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    let remote = cli_args.get_remote()?;
    let remote_config = remote.config().clone();
    let forge = ForgeManager::new(remote.get_forge().await?);

    let file_config = Config::load(Path::new(&cli_args.config))?;

    // collect never reads the branch, so it may run outside a checkout
    let branch = match &cli_args.branch {
        Some(branch) => branch.clone(),
        None if matches!(cli_args.command, Command::Collect { .. }) => {
            current_branch(Path::new(".")).unwrap_or_else(|_| "master".into())
        }
        None => current_branch(Path::new("."))?,
    };

    let mut builder = RelnotesConfig::builder();
    builder
        .owner(remote_config.owner)
        .repo(remote_config.repo)
        .branch(branch)
        .file_config(&file_config);

    if let Some(label) = &cli_args.label {
        builder.label(label.clone());
    }

    let orchestrator = Orchestrator::new(builder.build()?, forge);

    let collect_request = cli_args.command.collect_request();

    match cli_args.command {
        Command::Generate {
            range,
            markdown_file,
        } => {
            let notes = orchestrator.generate(&range).await?;
            let markdown = notes.to_markdown();

            match markdown_file {
                Some(path) => write_markdown(&path, &markdown).await?,
                None => print!("{markdown}"),
            }
        }
        Command::Range { range } => {
            let range = orchestrator.resolve_range(&range).await?;
            println!("{range}");
        }
        Command::Index => {
            let index = orchestrator.release_index().await?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
        Command::Collect { output, .. } => {
            let req = collect_request.unwrap_or_default();
            let reports = orchestrator.collect(&req).await;
            write_reports(&output, &reports).await?;
        }
    }

    Ok(())
}
