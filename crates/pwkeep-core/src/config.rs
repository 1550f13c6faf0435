//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/pwkeep/config.toml)
//! 3. Environment variables (PWKEEP_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "PWKEEP";

/// Database file name used in the data directory and in portable mode
pub const DATABASE_FILE: &str = "passwords.db";

/// Default lifetime of a notification in the TUI
pub const DEFAULT_NOTIFY_MS: u64 = 1000;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Explicit database file, overrides every other location
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Keep the database next to the executable
    #[serde(default)]
    pub portable: bool,

    /// How long a TUI notification stays visible, in milliseconds
    #[serde(default = "default_notify_ms")]
    pub notify_ms: u64,

    /// Log file for TUI mode (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: None,
            portable: false,
            notify_ms: DEFAULT_NOTIFY_MS,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (PWKEEP_DATA_DIR, PWKEEP_DB, PWKEEP_PORTABLE)
    /// 2. Config file (~/.config/pwkeep/config.toml or PWKEEP_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file_only(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load the config file as written, ignoring environment variables
    ///
    /// Use this before saving, so temporary `PWKEEP_*` overrides are not
    /// written back to the file.
    pub fn load_file_only(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // PWKEEP_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // PWKEEP_DB
        if let Ok(val) = std::env::var(format!("{}_DB", ENV_PREFIX)) {
            self.database = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // PWKEEP_PORTABLE
        if let Ok(val) = std::env::var(format!("{}_PORTABLE", ENV_PREFIX)) {
            self.portable = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with PWKEEP_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pwkeep")
            .join("config.toml")
    }

    /// Resolve the SQLite database path
    ///
    /// Explicit `database` wins, then portable mode (next to the running
    /// executable), then `{data_dir}/passwords.db`.
    pub fn sqlite_path(&self) -> PathBuf {
        if let Some(ref path) = self.database {
            return path.clone();
        }

        if self.portable {
            if let Some(dir) = executable_dir() {
                return dir.join(DATABASE_FILE);
            }
        }

        self.data_dir.join(DATABASE_FILE)
    }

    /// Default debug log location
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    /// Notification lifetime as a duration
    pub fn notify_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.notify_ms)
    }
}

/// Directory containing the running executable
fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pwkeep")
}

fn default_notify_ms() -> u64 {
    DEFAULT_NOTIFY_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["PWKEEP_DATA_DIR", "PWKEEP_DB", "PWKEEP_PORTABLE"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.portable);
        assert!(config.database.is_none());
        assert_eq!(config.notify_ms, 1000);
        assert!(config.data_dir.ends_with("pwkeep"));
    }

    #[test]
    fn test_sqlite_path_defaults_to_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data/pwkeep"),
            ..Config::default()
        };
        assert_eq!(config.sqlite_path(), PathBuf::from("/data/pwkeep/passwords.db"));
    }

    #[test]
    fn test_explicit_database_wins() {
        let config = Config {
            data_dir: PathBuf::from("/data/pwkeep"),
            database: Some(PathBuf::from("/secrets/vault.db")),
            portable: true,
            ..Config::default()
        };
        assert_eq!(config.sqlite_path(), PathBuf::from("/secrets/vault.db"));
    }

    #[test]
    fn test_portable_uses_executable_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data/pwkeep"),
            portable: true,
            ..Config::default()
        };
        let exe_dir = env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(config.sqlite_path(), exe_dir.join("passwords.db"));
    }

    #[test]
    fn test_env_overrides_are_not_saved() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "notify_ms = 500\n").unwrap();

        env::set_var("PWKEEP_DB", "/tmp/throwaway.db");
        assert_eq!(
            Config::load_from_path(&path).unwrap().database,
            Some(PathBuf::from("/tmp/throwaway.db"))
        );

        let mut config = Config::load_file_only(&path).unwrap();
        assert!(config.database.is_none());
        config.notify_ms = 750;
        config.save_to_path(&path).unwrap();
        env::remove_var("PWKEEP_DB");

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("throwaway"));
        assert_eq!(Config::load_from_path(&path).unwrap().notify_ms, 750);
    }

    #[test]
    fn test_log_path() {
        let mut config = Config {
            data_dir: PathBuf::from("/data/pwkeep"),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/data/pwkeep/debug.log"));

        config.log_file = Some(PathBuf::from("/tmp/pwkeep.log"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/pwkeep.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("PWKEEP_DATA_DIR", "/tmp/pwkeep-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/pwkeep-test"));
    }

    #[test]
    fn test_env_override_database() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("PWKEEP_DB", "/tmp/other.db");
        config.apply_env_overrides();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/other.db")));

        // Empty string clears it
        env::set_var("PWKEEP_DB", "");
        config.apply_env_overrides();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_env_override_portable() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("PWKEEP_PORTABLE", "true");
        config.apply_env_overrides();
        assert!(config.portable);

        env::set_var("PWKEEP_PORTABLE", "0");
        config.apply_env_overrides();
        assert!(!config.portable);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/pwkeep"),
            database: Some(PathBuf::from("/data/custom.db")),
            portable: false,
            notify_ms: 1500,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("database"));
        assert!(toml_str.contains("notify_ms"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            portable = true
            notify_ms = 250
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.portable);
        assert_eq!(config.notify_duration(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(!config.portable);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            notify_ms: 2000,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
