//! Pexels API key lookup.
//!
//! The key comes from `PEXELS_API_KEY` in the process environment or from a
//! `pexels.env` file kept in the team files. The remote lookup is best effort:
//! every failure is logged at debug level and reported as `None`.

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::constants::{API_KEY_VAR, CREDENTIALS_FILE};
use crate::platform::PlatformEnv;
use crate::storage::FileStore;

/// Read the API key out of dotenv-formatted text. A repeated assignment
/// replaces the earlier one.
pub fn parse_api_key(contents: &str) -> Result<Option<String>> {
    let mut found = None;
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        let (key, value) = item.context("parsing credentials file")?;
        if key == API_KEY_VAR {
            found = Some(value.trim().to_string());
        }
    }
    Ok(found.filter(|v| !v.is_empty()))
}

pub fn key_from_env() -> Option<String> {
    std::env::var(API_KEY_VAR).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Download `remote_path` into a temporary directory and read the key from it.
/// The directory is removed before returning, whatever the outcome.
pub async fn key_from_file(store: &dyn FileStore, team_id: u64, remote_path: &str) -> Option<String> {
    match fetch_key(store, team_id, remote_path).await {
        Ok(key) => {
            info!("Pexels API key was loaded from the team files.");
            Some(key)
        }
        Err(e) => {
            debug!("Pexels API key was not loaded from the team files: {:#}", e);
            None
        }
    }
}

async fn fetch_key(store: &dyn FileStore, team_id: u64, remote_path: &str) -> Result<String> {
    let dir = tempfile::tempdir().context("creating temp dir for credentials")?;
    let local = dir.path().join(CREDENTIALS_FILE);
    store.download(team_id, remote_path, &local).await?;
    let contents = tokio::fs::read_to_string(&local)
        .await
        .with_context(|| format!("reading {}", local.display()))?;
    parse_api_key(&contents)?.ok_or_else(|| anyhow!("{} is not set in {}", API_KEY_VAR, remote_path))
}

/// `env_key` (usually [`key_from_env`]) first, then the team file the app was
/// launched with.
pub async fn resolve_api_key(store: &dyn FileStore, platform: &PlatformEnv, env_key: Option<String>) -> Option<String> {
    if let Some(key) = env_key {
        return Some(key);
    }
    let Some(remote) = platform.input_file.as_deref() else {
        debug!("no input file given, skipping team files lookup");
        return None;
    };
    key_from_file(store, platform.team_id, remote).await
}

/// [`resolve_api_key`] with the platform context and file store taken from
/// the environment. Missing platform settings just mean no remote lookup.
pub async fn discover_api_key() -> Option<String> {
    let env_key = key_from_env();
    let platform = match PlatformEnv::from_env() {
        Ok(p) => p,
        Err(e) => {
            debug!("platform context unavailable: {}", e);
            return env_key;
        }
    };
    match platform.file_store() {
        Ok(store) => resolve_api_key(&store, &platform, env_key).await,
        Err(e) => {
            debug!("team files unavailable: {:#}", e);
            env_key
        }
    }
}
