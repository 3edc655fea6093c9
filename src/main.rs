//! Statusboard - Aggregated status dashboard backend
//!
//! Main entry point for the statusboard CLI.

use chrono::Utc;
use clap::{Parser, Subcommand};
use statusboard::aggregator::Aggregator;
use statusboard::config::{validate_config_result, GitHubOverrides, StatusBoardConfig};
use statusboard::integrations::{GitHubAdapter, PullRequest};
use statusboard::server::{DashboardServer, OpenPrsResponse};
use statusboard::ticket::Ticket;
use statusboard::StatusBoardError;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// Statusboard - open pull requests and service status in one place
#[derive(Parser, Debug)]
#[command(name = "statusboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/statusboard/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub organization or user owning the repositories
    #[arg(long, env = "GITHUB_OWNER")]
    owner: Option<String>,

    /// Repositories to query (comma-separated)
    #[arg(long, env = "GITHUB_REPOS")]
    repos: Option<String>,

    /// GitHub instance URL (https://github.com or an Enterprise host)
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration
    Check,

    /// Serve the dashboard API
    Serve {
        /// Address to bind (default: server.host:server.port from config)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Print open pull requests for every configured repository
    OpenPrs {
        /// Print the JSON payload served by /api/github/open-prs
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = statusboard::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> statusboard::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(StatusBoardConfig::default_path);

    if let Commands::Init { force } = cli.command {
        return handle_init_command(&config_path, force);
    }

    let mut config = if cli.config.is_some() {
        StatusBoardConfig::load(&config_path)?
    } else {
        StatusBoardConfig::load_default_or_new()?
    };

    config.github.apply(GitHubOverrides {
        token: cli.token,
        owner: cli.owner,
        repos: cli.repos,
        api_url: cli.api_url,
    });

    validate_config_result(&config)?;

    tracing::info!(
        repos = config.github.repos.len(),
        authenticated = config.github.has_token(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Check => handle_check_command(&config),
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr());
            let adapter = GitHubAdapter::new(&config.github.api_url)?;
            let server = DashboardServer::new(config.github, Arc::new(adapter));
            println!("Serving dashboard API on http://{}", addr);
            server.run(&addr).await?;
            Ok(())
        }
        Commands::OpenPrs { json } => handle_open_prs_command(&config, json).await,
    }
}

fn handle_init_command(path: &Path, force: bool) -> statusboard::Result<()> {
    if path.exists() && !force {
        return Err(StatusBoardError::Config(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    StatusBoardConfig::new().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set github.owner and github.repos in the file");
    println!("  2. Export GITHUB_TOKEN with a personal access token");
    println!("  3. Run: statusboard open-prs");
    Ok(())
}

fn handle_check_command(config: &StatusBoardConfig) -> statusboard::Result<()> {
    match config.github.resolve() {
        Ok(resolved) => {
            println!("Configuration OK");
            println!("  Owner:  {}", resolved.owner);
            println!("  Repos:  {}", resolved.repos.join(", "));
            println!("  API:    {}", config.github.api_url);
            println!("  Server: {}", config.server.addr());
            Ok(())
        }
        Err(missing) => Err(StatusBoardError::Config(format!(
            "{}\n  hint: {}",
            missing.error, missing.hint
        ))),
    }
}

async fn handle_open_prs_command(
    config: &StatusBoardConfig,
    json: bool,
) -> statusboard::Result<()> {
    let resolved = config.github.resolve().map_err(|missing| {
        StatusBoardError::Config(format!("{}\n  hint: {}", missing.error, missing.hint))
    })?;

    let adapter = GitHubAdapter::new(&config.github.api_url)?;
    let aggregator = Aggregator::new(Arc::new(adapter));
    let data = aggregator
        .aggregate(&resolved.credential, &resolved.owner, &resolved.repos)
        .await?;

    if json {
        let payload = OpenPrsResponse {
            success: true,
            data,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let now = Utc::now();
    println!(
        "Open pull requests for {} ({} across {} repositories)",
        resolved.owner,
        data.total_items(),
        data.len()
    );
    for (repo, pulls) in data.iter() {
        println!();
        print_repo_tickets(repo, pulls, now);
    }

    Ok(())
}

fn print_repo_tickets(repo: &str, pulls: &[PullRequest], now: chrono::DateTime<Utc>) {
    println!("{} ({} open)", repo, pulls.len());
    if pulls.is_empty() {
        println!("  (none)");
        return;
    }

    for pull in pulls {
        let ticket = Ticket::from_pull_request(repo, pull);
        println!(
            "  {:<20} {:<6} {:>4}d  {:<16} {}",
            ticket.id,
            ticket.status,
            ticket.age_days(now),
            ticket.author.as_deref().unwrap_or("-"),
            ticket.title
        );
    }
}
