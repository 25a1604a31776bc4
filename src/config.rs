use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::constants::{IMAGES_PER_PAGE, PEXELS_API_URL};
use crate::error::{Error, Result};
use crate::mapping::DownloadType;
use crate::mode::Mode;
use crate::variants::size_to_rank;

/// Environment variable that overrides the mode from the settings file.
pub const MODE_VAR: &str = "PEXELS_MODE";

const SETTINGS_FILE: &str = "pexels.toml";

/// Optional on-disk settings (`pexels.toml`). Every field may be omitted.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    /// Mode name -> path fragment. Replaces the built-in entries it names.
    #[serde(default)]
    pub endpoints: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub download_type: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl Settings {
    /// Read settings from `path`, or from the per-user config dir when no path
    /// is given. A missing default file yields the defaults; an explicit path
    /// must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_settings_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading settings: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing settings: {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Mode precedence: explicit override, then `PEXELS_MODE` as reported by
    /// `lookup`, then the file.
    pub fn resolve_mode<F>(&self, cli: Option<Mode>, lookup: F) -> Result<Mode>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(m) = cli {
            return Ok(m);
        }
        if let Some(raw) = lookup(MODE_VAR) {
            if !raw.trim().is_empty() {
                return raw.parse();
            }
        }
        match &self.mode {
            Some(raw) => raw.parse(),
            None => Ok(Mode::default()),
        }
    }

    /// Validated size name, defaulting to the largest tier.
    pub fn size(&self) -> Result<&str> {
        let size = self.size.as_deref().unwrap_or("original");
        size_to_rank(size)?;
        Ok(size)
    }

    pub fn download_type(&self) -> Result<DownloadType> {
        match &self.download_type {
            Some(raw) => raw.parse(),
            None => Ok(DownloadType::default()),
        }
    }
}

fn default_settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "pexels-source", "pexels-source")?;
    Some(proj.config_dir().join(SETTINGS_FILE))
}

/// Request configuration for one run. Built once at startup and passed to
/// every helper that depends on the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    mode: Mode,
    api_url: String,
    endpoints: BTreeMap<Mode, String>,
    per_page: u32,
}

impl SourceConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            api_url: PEXELS_API_URL.to_string(),
            endpoints: default_endpoints(),
            per_page: IMAGES_PER_PAGE,
        }
    }

    /// Apply file settings on top of the defaults. The mode is resolved by the
    /// caller, see [`Settings::resolve_mode`].
    pub fn from_settings(settings: &Settings, mode: Mode) -> Result<Self> {
        let mut cfg = Self::new(mode);
        if let Some(url) = &settings.api_url {
            cfg = cfg.with_api_url(url)?;
        }
        if let Some(map) = &settings.endpoints {
            for (name, fragment) in map {
                match name.parse::<Mode>() {
                    Ok(m) => cfg.set_endpoint(m, fragment.clone()),
                    Err(e) => warn!("ignoring endpoint override: {}", e),
                }
            }
        }
        if let Some(n) = settings.per_page {
            cfg.per_page = n.clamp(1, IMAGES_PER_PAGE);
        }
        Ok(cfg)
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl { url: url.to_string(), reason: e.to_string() })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidUrl { url: url.to_string(), reason: format!("unsupported scheme `{}`", other) })
            }
        }
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn set_endpoint(&mut self, mode: Mode, fragment: impl Into<String>) {
        self.endpoints.insert(mode, fragment.into());
    }

    pub fn remove_endpoint(&mut self, mode: Mode) -> Option<String> {
        self.endpoints.remove(&mode)
    }

    pub fn mode(&self) -> Mode { self.mode }
    pub fn api_url(&self) -> &str { &self.api_url }
    pub fn per_page(&self) -> u32 { self.per_page }

    /// Search URL for the configured mode, e.g. `https://api.pexels.com/v1/search`.
    pub fn resolve_endpoint_url(&self) -> Result<String> {
        let endpoint = self
            .endpoints
            .get(&self.mode)
            .map(|s| s.trim().trim_matches('/'))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::EmptyEndpoint { mode: self.mode.to_string(), valid: self.valid_modes() })?;
        Ok(format!("{}/{}", self.api_url, endpoint))
    }

    /// Name of the array holding result items in a search response.
    pub fn resolve_response_key(&self) -> &'static str {
        self.mode.response_key()
    }

    fn valid_modes(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(m, _)| m.to_string())
            .collect()
    }
}

impl Default for SourceConfig {
    fn default() -> Self { Self::new(Mode::default()) }
}

fn default_endpoints() -> BTreeMap<Mode, String> {
    BTreeMap::from([
        (Mode::Images, "v1/search".to_string()),
        (Mode::Videos, "videos/search".to_string()),
    ])
}
