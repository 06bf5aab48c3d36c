//! Configuration for the studio and the headless runner.
//!
//! Values are resolved in three layers, later ones winning:
//! 1. TOML file (or built-in defaults when there is none)
//! 2. `NETPULSE_*` environment variables
//! 3. Command-line flags, passed in as [`ConfigOverrides`]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::animator::animator::Animator;
use crate::classifier::mock::{MockClassifier, DEFAULT_DELAY};
use crate::error::NetError;
use crate::network::topology::Topology;
use crate::network::weights::WeightFile;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "netpulse.toml";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "NETPULSE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration value: {0}")]
    Invalid(String),

    #[error("weight file does not fit the configured network: {0}")]
    Weights(#[from] NetError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { addr: "127.0.0.1:7878".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Layer sizes, input first.
    pub layers: Topology,
    pub tick_interval_ms: u64,
    /// Fixed seed for reproducible weights; fresh entropy when absent.
    pub seed: Option<u64>,
    /// Weight file loaded at startup instead of drawing random weights.
    pub weights_path: Option<PathBuf>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            layers: Topology::default(),
            tick_interval_ms: 1500,
            seed: None,
            weights_path: None,
        }
    }
}

impl NetworkConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// An initialized animator for this configuration, with weights from
    /// `weights_path` when one is set.
    pub fn build_animator(&self) -> ConfigResult<Animator> {
        let mut animator = match self.seed {
            Some(seed) => Animator::seeded(seed),
            None => Animator::from_entropy(),
        };
        animator.initialize(self.layers.clone());

        if let Some(path) = &self.weights_path {
            animator.import_weights(WeightFile::load_json(path)?)?;
            info!(path = %path.display(), "weights loaded");
        }
        Ok(animator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub delay_ms: u64,
    pub seed: Option<u64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig { delay_ms: DEFAULT_DELAY.as_millis() as u64, seed: None }
    }
}

impl ClassifierConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn build_classifier(&self) -> MockClassifier {
        match self.seed {
            Some(seed) => MockClassifier::seeded(seed, self.delay()),
            None => MockClassifier::from_entropy(self.delay()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub classifier: ClassifierConfig,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub addr: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub seed: Option<u64>,
    pub weights_path: Option<PathBuf>,
}

impl StudioConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<StudioConfig> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `NETPULSE_ADDR`, `NETPULSE_TICK_MS` and `NETPULSE_SEED`.
    pub fn apply_environment_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Same as `apply_environment_overrides`, reading variables through
    /// `lookup`. Values that do not parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("NETPULSE_ADDR") {
            self.server.addr = addr;
        }
        if let Some(ms) = lookup("NETPULSE_TICK_MS").and_then(|v| v.trim().parse().ok()) {
            self.network.tick_interval_ms = ms;
        }
        if let Some(seed) = lookup("NETPULSE_SEED").and_then(|v| v.trim().parse().ok()) {
            self.network.seed = Some(seed);
            self.classifier.seed = Some(seed);
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &ConfigOverrides) {
        if let Some(addr) = &cli.addr {
            self.server.addr = addr.clone();
        }
        if let Some(ms) = cli.tick_interval_ms {
            self.network.tick_interval_ms = ms;
        }
        if let Some(seed) = cli.seed {
            self.network.seed = Some(seed);
            self.classifier.seed = Some(seed);
        }
        if let Some(path) = &cli.weights_path {
            self.network.weights_path = Some(path.clone());
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.network.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("network.tick_interval_ms must be positive".into()));
        }
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server.addr must not be empty".into()));
        }
        Ok(())
    }
}

/// Finds the configuration file to use, if any.
///
/// `NETPULSE_CONFIG` must point at an existing file when set. Otherwise
/// `./netpulse.toml` is used if present, and `None` means built-in defaults.
pub fn find_config_file() -> ConfigResult<Option<PathBuf>> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        return if path.exists() { Ok(Some(path)) } else { Err(ConfigError::FileNotFound(path)) };
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    Ok(local.exists().then_some(local))
}

/// Loads the file (explicit `path`, else discovered), then applies the
/// environment and `cli` overrides, then validates.
pub fn load_config(path: Option<&Path>, cli: &ConfigOverrides) -> ConfigResult<StudioConfig> {
    let file = match path {
        Some(p) if !p.exists() => return Err(ConfigError::FileNotFound(p.to_path_buf())),
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file()?,
    };

    let mut config = match file {
        Some(file) => StudioConfig::from_toml_str(&fs::read_to_string(&file)?)?,
        None => StudioConfig::default(),
    };
    config.apply_environment_overrides();
    config.apply_cli_overrides(cli);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_the_stock_network() {
        let c = StudioConfig::default();
        assert_eq!(c.network.layers.layer_sizes(), &[6, 8, 8, 4]);
        assert_eq!(c.network.tick_interval(), Duration::from_millis(1500));
        assert_eq!(c.classifier.delay(), DEFAULT_DELAY);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = StudioConfig::from_toml_str(
            r#"
            [network]
            layers = [3, 5, 2]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(c.network.layers.layer_sizes(), &[3, 5, 2]);
        assert_eq!(c.network.seed, Some(42));
        assert_eq!(c.network.tick_interval_ms, 1500);
        assert_eq!(c.server, ServerConfig::default());
    }

    #[test]
    fn bad_topology_is_a_parse_error() {
        let err = StudioConfig::from_toml_str("[network]\nlayers = [4]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_then_cli_override_the_file() {
        let mut c = StudioConfig::from_toml_str("[server]\naddr = \"0.0.0.0:9000\"\n").unwrap();
        let env: HashMap<&str, &str> =
            [("NETPULSE_TICK_MS", "250"), ("NETPULSE_SEED", "nope"), ("NETPULSE_ADDR", "127.0.0.1:1")]
                .into_iter()
                .collect();
        c.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(c.network.tick_interval_ms, 250);
        assert_eq!(c.network.seed, None);
        assert_eq!(c.server.addr, "127.0.0.1:1");

        c.apply_cli_overrides(&ConfigOverrides {
            tick_interval_ms: Some(100),
            seed: Some(9),
            ..Default::default()
        });
        assert_eq!(c.network.tick_interval_ms, 100);
        assert_eq!(c.network.seed, Some(9));
        assert_eq!(c.classifier.seed, Some(9));
        assert_eq!(c.server.addr, "127.0.0.1:1");
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut c = StudioConfig::default();
        c.network.tick_interval_ms = 0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_config_reads_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[classifier]\ndelay_ms = 0\n[network]\ntick_interval_ms = 40").unwrap();
        let c = load_config(Some(file.path()), &ConfigOverrides::default()).unwrap();
        assert_eq!(c.classifier.delay_ms, 0);
        // NETPULSE_TICK_MS may be set in the environment running the tests.
        if env::var("NETPULSE_TICK_MS").is_err() {
            assert_eq!(c.network.tick_interval_ms, 40);
        }
    }

    #[test]
    fn seeded_network_config_is_reproducible() {
        let network = NetworkConfig { seed: Some(5), ..Default::default() };
        let a = network.build_animator().unwrap();
        let b = network.build_animator().unwrap();
        assert_eq!(a.export_weights().unwrap(), b.export_weights().unwrap());
        assert_eq!(a.cursor(), Ok(0));
    }

    #[test]
    fn weights_path_is_loaded_and_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let donor = NetworkConfig { seed: Some(1), ..Default::default() }.build_animator().unwrap();
        donor.export_weights().unwrap().save_json(&path).unwrap();

        let network = NetworkConfig { seed: Some(2), weights_path: Some(path.clone()), ..Default::default() };
        let loaded = network.build_animator().unwrap();
        assert_eq!(loaded.export_weights().unwrap(), donor.export_weights().unwrap());

        let mismatched = NetworkConfig {
            layers: Topology::new(vec![2, 2]).unwrap(),
            weights_path: Some(path),
            ..Default::default()
        };
        assert!(matches!(mismatched.build_animator(), Err(ConfigError::Weights(_))));
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(Some(&missing), &ConfigOverrides::default()),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
