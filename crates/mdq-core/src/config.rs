use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Throttle parameters (`[throttle]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum dispatches in any trailing 60-minute window.
    pub max_per_hour: usize,
    /// Minimum random delay between dispatches, in seconds.
    pub min_delay_secs: f64,
    /// Maximum random delay between dispatches, in seconds.
    pub max_delay_secs: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_per_hour: 50,
            min_delay_secs: 2.0,
            max_delay_secs: 5.0,
        }
    }
}

/// Proxy selection mode: always the first address, or rotate through the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    #[default]
    Fixed,
    Rotating,
}

/// Proxy settings (`[proxy]` section). An empty pool means direct connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Outbound proxy addresses, e.g. `socks5://127.0.0.1:9050`.
    pub addresses: Vec<String>,
    /// Fixed or rotating selection.
    #[serde(default)]
    pub mode: ProxyMode,
    /// In rotating mode, advance to the next address every N dispatches.
    pub rotation_frequency: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            mode: ProxyMode::Fixed,
            rotation_frequency: 1,
        }
    }
}

/// Global configuration loaded from `~/.config/mdq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdqConfig {
    /// Retry previously failed items on the next run of a queue.
    pub retry_failed: bool,
    /// Poll interval while paused, in milliseconds.
    pub pause_poll_ms: u64,
    /// External fetch command; `{url}`, `{output_dir}`, `{format}`, `{quality}`
    /// and `{proxy}` placeholders are substituted per item. The command must
    /// print the output file path as its last stdout line.
    #[serde(default)]
    pub fetch_command: Option<String>,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl Default for MdqConfig {
    fn default() -> Self {
        Self {
            retry_failed: true,
            pause_poll_ms: 200,
            fetch_command: None,
            throttle: ThrottleConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MdqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MdqConfig = toml::from_str(&data)?;
    Ok(cfg)
}
