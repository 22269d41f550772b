use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// HTTP request options (section `[fetch]` in config.toml).
///
/// The site serves a misconfigured certificate, so verification is off by
/// default and redirects are followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Verify TLS certificates.
    pub verify_certificates: bool,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            verify_certificates: false,
            follow_redirects: true,
            connect_timeout_secs: 15,
            request_timeout_secs: 600,
        }
    }
}

/// Global configuration loaded from `~/.config/bdmusic/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BdmusicConfig {
    /// Request options applied to every listing and song fetch.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Maximum concurrent song downloads (None = host parallelism).
    #[serde(default)]
    pub max_parallel_downloads: Option<usize>,
}

impl Default for BdmusicConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            max_parallel_downloads: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bdmusic")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BdmusicConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BdmusicConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BdmusicConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BdmusicConfig::default();
        assert!(!cfg.fetch.verify_certificates);
        assert!(cfg.fetch.follow_redirects);
        assert_eq!(cfg.fetch.connect_timeout_secs, 15);
        assert_eq!(cfg.fetch.request_timeout_secs, 600);
        assert!(cfg.max_parallel_downloads.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = BdmusicConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: BdmusicConfig = toml::from_str(&toml).unwrap();
        assert_eq!(
            parsed.fetch.verify_certificates,
            cfg.fetch.verify_certificates
        );
        assert_eq!(parsed.fetch.follow_redirects, cfg.fetch.follow_redirects);
        assert_eq!(
            parsed.fetch.connect_timeout_secs,
            cfg.fetch.connect_timeout_secs
        );
        assert_eq!(
            parsed.fetch.request_timeout_secs,
            cfg.fetch.request_timeout_secs
        );
    }

    #[test]
    fn config_toml_empty_uses_defaults() {
        let cfg: BdmusicConfig = toml::from_str("").unwrap();
        assert!(!cfg.fetch.verify_certificates);
        assert!(cfg.max_parallel_downloads.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_parallel_downloads = 4

            [fetch]
            verify_certificates = true
            follow_redirects = false
            connect_timeout_secs = 5
            request_timeout_secs = 30
        "#;
        let cfg: BdmusicConfig = toml::from_str(toml).unwrap();
        assert!(cfg.fetch.verify_certificates);
        assert!(!cfg.fetch.follow_redirects);
        assert_eq!(cfg.fetch.connect_timeout_secs, 5);
        assert_eq!(cfg.fetch.request_timeout_secs, 30);
        assert_eq!(cfg.max_parallel_downloads, Some(4));
    }
}
