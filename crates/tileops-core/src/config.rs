use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tileops.yaml";
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";
pub const ENV_CMS_URL: &str = "CMS_URL";
pub const ENV_PORT: &str = "TILEOPS_PORT";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DataMode
// ---------------------------------------------------------------------------

/// Which data source the store reads: the built-in sample data or a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    Demo,
    Live,
}

impl DataMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DataMode::Demo => "demo",
            DataMode::Live => "live",
        }
    }

    pub fn is_demo(self) -> bool {
        self == DataMode::Demo
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Supabase project URL, e.g. `https://abc.supabase.co`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            cms_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            backend: BackendConfig::default(),
            content: ContentConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Write the defaults to `path` unless a file is already there. Returns
    /// whether anything was written.
    pub fn init(path: &Path) -> Result<bool> {
        let data = format!(
            "# Set {ENV_SUPABASE_URL} and {ENV_SUPABASE_KEY} (or backend.url/backend.key) for live data.\n{}",
            serde_yaml::to_string(&Self::default())?
        );
        crate::io::write_if_missing(path, data.as_bytes())
    }

    /// The config file to read: `explicit` when given, otherwise
    /// `tileops.yaml` in `dir` if it exists.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        }
    }

    /// File (if any) overlaid with the process environment.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let mut cfg = match Self::locate(explicit, dir) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Overlay environment variables onto the file values. Blank variables
    /// are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_SUPABASE_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = get(ENV_SUPABASE_KEY) {
            self.backend.key = Some(key);
        }
        if let Some(url) = get(ENV_CMS_URL) {
            self.content.cms_url = Some(url);
        }
        if let Some(port) = get(ENV_PORT) {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring unparseable {ENV_PORT}"),
            }
        }
    }

    /// Live only when both the backend URL and key are present.
    pub fn mode(&self) -> DataMode {
        match (non_blank(&self.backend.url), non_blank(&self.backend.key)) {
            (Some(_), Some(_)) => DataMode::Live,
            _ => DataMode::Demo,
        }
    }

    pub fn cms_url(&self) -> Option<&str> {
        non_blank(&self.content.cms_url)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let url = non_blank(&self.backend.url);
        let key = non_blank(&self.backend.key);

        match (url, key) {
            (Some(_), None) => warnings.push(ConfigWarning::warning(format!(
                "backend.url is set but backend.key is not ({ENV_SUPABASE_KEY}); running in demo mode"
            ))),
            (None, Some(_)) => warnings.push(ConfigWarning::warning(format!(
                "backend.key is set but backend.url is not ({ENV_SUPABASE_URL}); running in demo mode"
            ))),
            _ => {}
        }
        if let Some(url) = url {
            if !is_http_url(url) {
                warnings.push(ConfigWarning::error(format!(
                    "backend.url '{url}' must start with http:// or https://"
                )));
            }
        }
        if let Some(cms) = self.cms_url() {
            if !is_http_url(cms) {
                warnings.push(ConfigWarning::warning(format!(
                    "content.cms_url '{cms}' is not an http(s) URL; default company info will be used"
                )));
            }
        }
        if self.backend.timeout_secs == 0 || self.content.timeout_secs == 0 {
            warnings.push(ConfigWarning::warning(
                "a timeout_secs of 0 disables request timeouts",
            ));
        }
        if self.server.port == 0 {
            warnings.push(ConfigWarning::error("server.port must not be 0"));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
