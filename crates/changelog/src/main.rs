#![allow(unused)]

use crate::prelude::{print, println, *};
use changelog_core::config::{load_config, Config};
use clap::Parser;
use std::path::PathBuf;

mod coordinator;
mod error;
mod generate;
mod github;
mod prelude;
mod source;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate a changelog from the commits between two git references"
)]
pub struct App {
    /// GitHub owner of the repository
    #[clap(short, long, env = "GITHUB_OWNER", default_value = "")]
    owner: String,

    /// GitHub repository name
    #[clap(short, long, env = "GITHUB_REPO", default_value = "")]
    repo: String,

    /// Beginning of the changelog range (tag, branch or commit)
    #[clap(short, long, default_value = "master~1")]
    from: String,

    /// End of the changelog range (tag, branch or commit)
    #[clap(short, long, default_value = "master")]
    to: String,

    /// Config file (JSON, YAML or TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Read history from the local repository instead of the GitHub API
    #[clap(short, long)]
    local: bool,

    /// Maximum number of commits to include
    #[clap(long)]
    max: Option<usize>,

    /// Print the collected changelog data as JSON instead of rendering it
    #[clap(long)]
    json: bool,

    /// Whether to display additional information.
    #[clap(long, env = "CHANGELOG_VERBOSE", default_value = "false")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn resolve_config(app: &App) -> Result<Config> {
    let config = load_config(app.config.as_deref())?.with_overrides(
        &app.owner,
        &app.repo,
        app.max,
        app.local.then_some(true),
    );
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();
    init_logging(app.verbose);
    color_eyre::install()?;

    let config = resolve_config(&app)?;
    log::debug!(
        "Generating changelog for {}/{} from {} to {}",
        config.owner,
        config.repo,
        app.from,
        app.to
    );

    let repo_path = std::env::current_dir().wrap_err("Unable to determine current directory")?;
    let data = generate::collect_changes(&config, &app.from, &app.to, repo_path).await?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print!("{}", generate::render_changelog(&config, &data)?);
    }

    Ok(())
}
