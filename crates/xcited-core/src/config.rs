use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/xcited/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XcitedConfig {
    /// Number of download worker threads (CLI `--num-workers` overrides).
    pub workers: usize,
    /// Connect and read (low-speed) timeout in seconds.
    pub timeout_secs: u64,
    /// Receive buffer size in bytes; each progress advance is at most this large.
    pub chunk_size: usize,
    /// Static User-Agent sent with every request. Some hosts answer 403 without one.
    pub user_agent: String,
    /// Retry once with certificate verification disabled when the TLS handshake fails.
    pub tls_fallback: bool,
    /// Directory under which `<author_id>/` is created.
    pub output_root: PathBuf,
    /// Optional proxy URL handed to the transport (e.g. "http://127.0.0.1:8080").
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for XcitedConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            timeout_secs: 10,
            chunk_size: 32 * 1024,
            user_agent: "Mozilla/5.0".to_string(),
            tls_fallback: true,
            output_root: PathBuf::from("."),
            proxy: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("xcited")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<XcitedConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = XcitedConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: XcitedConfig = toml::from_str(&data)?;
    Ok(cfg)
}
