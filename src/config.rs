use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::error::Error;
use crate::global::utils::get_global_config_file;
use crate::listing::{DAILY_URL, RELEASES_URL};

/// Optional user configuration, read from `config.toml` in the platform
/// config directory. Every key has a default, so a partial file is fine.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Mirror of the release tree; one directory per `major.minor` family.
    #[serde(default = "default_releases_url")]
    pub releases_url: String,
    /// Mirror of the daily-build archive listing.
    #[serde(default = "default_daily_url")]
    pub daily_url: String,
    /// Download cache location, overriding the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Long-term-support release families. The listings do not mark LTS
    /// status, so this stays a hand-maintained allow-list.
    #[serde(default = "default_lts_minors")]
    pub lts_minors: Vec<String>,
}

fn default_releases_url() -> String {
    RELEASES_URL.to_string()
}

fn default_daily_url() -> String {
    DAILY_URL.to_string()
}

fn default_lts_minors() -> Vec<String> {
    ["2.83", "2.93", "3.3", "3.6", "4.2"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Config {
        Config {
            releases_url: default_releases_url(),
            daily_url: default_daily_url(),
            cache_dir: None,
            lts_minors: default_lts_minors(),
        }
    }
}

impl Config {
    /// Loads the config file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.as_ref().display())))?;
        config.normalize();
        Ok(config)
    }

    /// Loads the global config file if present, defaults otherwise.
    pub fn load_or_default() -> Result<Config, Error> {
        let path = get_global_config_file()?;
        if path.exists() {
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn releases_url(&self) -> &str {
        &self.releases_url
    }

    pub fn daily_url(&self) -> &str {
        &self.daily_url
    }

    fn normalize(&mut self) {
        for url in [&mut self.releases_url, &mut self.daily_url] {
            if !url.ends_with('/') {
                url.push('/');
            }
        }
    }
}
