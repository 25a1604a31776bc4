//! Access to the hosting platform: its environment variables, dotenv files and
//! team file storage.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use directories::{BaseDirs, ProjectDirs};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::constants::IMAGES_TMP_DIR;
use crate::error::Error;
use crate::storage::FileStore;

const LOCAL_ENV_FILE: &str = "local.env";
const USER_ENV_FILE: &str = "supervisely.env";
const DATA_DIR_VAR: &str = "SLY_APP_DATA_DIR";

/// Load `local.env` from the working directory and `supervisely.env` from the
/// home directory. Variables already set are kept; missing files are skipped.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_ENV_FILE)];
    if let Some(base) = BaseDirs::new() {
        candidates.push(base.home_dir().join(USER_ENV_FILE));
    }
    let mut loaded = Vec::new();
    for path in candidates {
        match dotenvy::from_path(&path) {
            Ok(()) => {
                debug!("loaded env file {}", path.display());
                loaded.push(path);
            }
            Err(e) => debug!("skipped env file {}: {}", path.display(), e),
        }
    }
    loaded
}

/// Run context handed to the app by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEnv {
    pub team_id: u64,
    pub workspace_id: u64,
    /// Team file the app was launched with, if any.
    pub input_file: Option<String>,
    pub server_address: Option<String>,
    pub api_token: Option<String>,
}

impl PlatformEnv {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any variable source; each value accepts its plain name or
    /// the `context.*` alias used by the app launcher.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| -> Option<String> {
            names.iter().find_map(|n| lookup(*n)).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        let id = |names: &[&str]| -> Result<u64, Error> {
            first(names)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| Error::MissingEnv(names[0].to_string()))
        };
        Ok(Self {
            team_id: id(&["TEAM_ID", "context.teamId"])?,
            workspace_id: id(&["WORKSPACE_ID", "context.workspaceId"])?,
            input_file: first(&["FILE", "context.slyFile"]),
            server_address: first(&["SERVER_ADDRESS"]),
            api_token: first(&["API_TOKEN"]),
        })
    }

    /// File store for this team, when the platform supplied an address and token.
    pub fn file_store(&self) -> Result<HttpFileStore> {
        let server = self.server_address.as_deref().ok_or(Error::MissingEnv("SERVER_ADDRESS".into()))?;
        let token = self.api_token.as_deref().ok_or(Error::MissingEnv("API_TOKEN".into()))?;
        HttpFileStore::new(server, token)
    }
}

/// Working directory for app data. `SLY_APP_DATA_DIR` wins over the per-user
/// data dir; the directory is created if needed.
pub fn app_data_dir() -> Result<PathBuf> {
    let path = match std::env::var(DATA_DIR_VAR) {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => ProjectDirs::from("com", "pexels-source", "pexels-source")
            .context("unable to determine data directory")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    Ok(path)
}

/// Scratch directory for downloaded images inside the app data dir.
pub fn images_tmp_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(IMAGES_TMP_DIR)
}

/// Team file storage over the platform's public HTTP API.
pub struct HttpFileStore {
    client: reqwest::Client,
    download_url: Url,
    token: String,
}

impl HttpFileStore {
    pub fn new(server_address: &str, token: &str) -> Result<Self> {
        let base = Url::parse(&format!("{}/", server_address.trim_end_matches('/')))
            .with_context(|| format!("invalid server address: {server_address}"))?;
        let download_url = base.join("public/api/v3/file-storage.download")?;
        let client = reqwest::Client::builder().user_agent("pexels-source/0.1").build()?;
        Ok(Self { client, download_url, token: token.to_string() })
    }
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn download(&self, team_id: u64, remote_path: &str, local_path: &Path) -> Result<()> {
        let resp = self
            .client
            .post(self.download_url.clone())
            .header("x-api-key", &self.token)
            .json(&json!({ "teamId": team_id, "path": remote_path }))
            .send()
            .await
            .with_context(|| format!("requesting team file {remote_path}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("downloading team file {} failed: HTTP {}", remote_path, status));
        }
        let bytes = resp.bytes().await?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(local_path, &bytes)
            .await
            .with_context(|| format!("writing {}", local_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn reads_plain_names() {
        let env = PlatformEnv::from_lookup(lookup(&[
            ("TEAM_ID", "7"),
            ("WORKSPACE_ID", "12"),
            ("FILE", "/pexels/pexels.env"),
            ("SERVER_ADDRESS", "https://app.example.com"),
            ("API_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(env.team_id, 7);
        assert_eq!(env.workspace_id, 12);
        assert_eq!(env.input_file.as_deref(), Some("/pexels/pexels.env"));
        assert!(env.file_store().is_ok());
    }

    #[test]
    fn reads_context_aliases() {
        let env = PlatformEnv::from_lookup(lookup(&[("context.teamId", "3"), ("context.workspaceId", "4")])).unwrap();
        assert_eq!((env.team_id, env.workspace_id), (3, 4));
        assert_eq!(env.input_file, None);
    }

    #[test]
    fn missing_team_id_is_reported() {
        let err = PlatformEnv::from_lookup(lookup(&[("WORKSPACE_ID", "4")])).unwrap_err();
        assert_eq!(err, Error::MissingEnv("TEAM_ID".into()));
    }

    #[test]
    fn non_numeric_id_is_reported() {
        let err = PlatformEnv::from_lookup(lookup(&[("TEAM_ID", "x"), ("WORKSPACE_ID", "4")])).unwrap_err();
        assert_eq!(err, Error::MissingEnv("TEAM_ID".into()));
    }

    #[test]
    fn file_store_needs_server_and_token() {
        let env = PlatformEnv::from_lookup(lookup(&[("TEAM_ID", "1"), ("WORKSPACE_ID", "1")])).unwrap();
        assert!(env.file_store().is_err());
    }

    #[test]
    fn download_url_is_joined_on_server_address() {
        let store = HttpFileStore::new("https://app.example.com/", "t").unwrap();
        assert_eq!(store.download_url.as_str(), "https://app.example.com/public/api/v3/file-storage.download");
    }

    #[tokio::test]
    async fn download_writes_team_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/public/api/v3/file-storage.download"))
            .and(header("x-api-key", "secret"))
            .and(body_json(json!({ "teamId": 7, "path": "/pexels/pexels.env" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("PEXELS_API_KEY=k\n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("nested").join("pexels.env");
        let store = HttpFileStore::new(&server.uri(), "secret").unwrap();
        store.download(7, "/pexels/pexels.env", &local).await.unwrap();
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "PEXELS_API_KEY=k\n");
    }

    #[tokio::test]
    async fn download_fails_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("pexels.env");
        let store = HttpFileStore::new(&server.uri(), "secret").unwrap();
        let err = store.download(7, "/missing.env", &local).await.unwrap_err();
        assert!(err.to_string().contains("404"), "{err:#}");
        assert!(!local.exists());
    }

    #[tokio::test]
    async fn download_reports_unwritable_destination() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("X=1\n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let store = HttpFileStore::new(&server.uri(), "secret").unwrap();
        let err = store.download(7, "/x.env", &blocker.join("pexels.env")).await.unwrap_err();
        assert!(format!("{err:#}").contains("creating"), "{err:#}");
    }

    #[test]
    fn images_dir_is_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(images_tmp_dir(dir.path()), dir.path().join("images"));
    }
}
