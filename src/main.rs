mod cli;

use std::io::Read;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use pexels_source::client::PexelsClient;
use pexels_source::config::{Settings, SourceConfig};
use pexels_source::credentials::discover_api_key;
use pexels_source::platform::{self, PlatformEnv};
use pexels_source::variants::{select_variant_link, size_to_rank, Variant};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    platform::load_env_files();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let mode = settings.resolve_mode(cli.mode, |k| std::env::var(k).ok())?;
    let config = SourceConfig::from_settings(&settings, mode)?;

    match cli.command {
        Commands::Endpoint => println!("{}", config.resolve_endpoint_url()?),
        Commands::ResponseKey => println!("{}", config.resolve_response_key()),
        Commands::Rank { size } => println!("{}", size_to_rank(&size)?),
        Commands::Pick { size, file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
                    buf
                }
            };
            let variants: Vec<Variant> = serde_json::from_str(&raw).context("parsing variant list")?;
            println!("{}", select_variant_link(&variants, size_to_rank(&size)?)?);
        }
        Commands::Key => match discover_api_key().await {
            Some(_) => println!("Pexels API key found"),
            None => return Err(anyhow!("no Pexels API key: set PEXELS_API_KEY or launch with a pexels.env team file")),
        },
        Commands::Env => {
            match PlatformEnv::from_env() {
                Ok(env) => {
                    println!("team: {}", env.team_id);
                    println!("workspace: {}", env.workspace_id);
                    println!("input file: {}", env.input_file.as_deref().unwrap_or("-"));
                }
                Err(e) => println!("platform context: {}", e),
            }
            let data_dir = platform::app_data_dir()?;
            println!("data dir: {}", data_dir.display());
            println!("images dir: {}", platform::images_tmp_dir(&data_dir).display());
            let download_type = settings.download_type()?;
            println!("download type: {} ({})", download_type, download_type.description());
        }
        Commands::Search { query, page, size } => {
            let size = match size {
                Some(s) => {
                    size_to_rank(&s)?;
                    s
                }
                None => settings.size()?.to_string(),
            };
            let key = discover_api_key()
                .await
                .ok_or_else(|| anyhow!("no Pexels API key: set PEXELS_API_KEY or launch with a pexels.env team file"))?;
            let client = PexelsClient::new(config, key)?;
            for hit in client.search_hits(&query, page, &size).await? {
                println!("{}", serde_json::to_string(&hit)?);
            }
        }
    }
    Ok(())
}
