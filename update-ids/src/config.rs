use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Directory to scan for markdown files
    pub const ROOT: &str = "UPDATE_IDS_ROOT";
    /// Registry location, relative to the scan root
    pub const REGISTRY_FILE: &str = "UPDATE_IDS_FILE";
    pub const ID_LENGTH: &str = "UPDATE_IDS_LENGTH";
    pub const MAX_ATTEMPTS: &str = "UPDATE_IDS_MAX_ATTEMPTS";
    /// Set to "true" or "1" to report what would change without touching any file.
    pub const CHECK: &str = "UPDATE_IDS_CHECK";
}

/// Default values
pub mod defaults {
    pub const ROOT: &str = ".";
    pub const REGISTRY_FILE: &str = ".github/ids.json";
    pub const ID_LENGTH: usize = 6;
    pub const MAX_ATTEMPTS: usize = 5;
}

#[derive(Clone, Debug)]
pub struct Config {
    pub root: PathBuf,
    pub registry_file: PathBuf,
    pub id_length: usize,
    pub max_attempts: usize,
    pub check_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(defaults::ROOT),
            registry_file: PathBuf::from(defaults::REGISTRY_FILE),
            id_length: defaults::ID_LENGTH,
            max_attempts: defaults::MAX_ATTEMPTS,
            check_only: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let root = env::var(env_vars::ROOT).unwrap_or_else(|_| defaults::ROOT.to_string());
        let mut config = Self::with_root(root);

        if let Ok(file) = env::var(env_vars::REGISTRY_FILE) {
            config.registry_file = PathBuf::from(file);
        }
        config.id_length = positive_from_env(env_vars::ID_LENGTH, defaults::ID_LENGTH);
        config.max_attempts = positive_from_env(env_vars::MAX_ATTEMPTS, defaults::MAX_ATTEMPTS);
        config.check_only = env::var(env_vars::CHECK)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        config
    }

    /// Config rooted at `root` with every other field at its default
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Absolute-or-relative path of the registry file, resolved against the scan root
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_file)
    }
}

fn positive_from_env(var: &str, default: usize) -> usize {
    match env::var(var) {
        Ok(raw) => parse_positive(&raw).unwrap_or_else(|| {
            log::warn!("[IDS] Ignoring invalid {}={:?}, using {}", var, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
