//! Harness settings read from the environment.

use std::path::PathBuf;

pub const NAMESPACE_ENV: &str = "IAM_E2E_NAMESPACE";
pub const BOOTSTRAP_FILE_ENV: &str = "IAM_E2E_BOOTSTRAP_FILE";

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_BOOTSTRAP_FILE: &str = "bootstrap.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Namespace custom resources are created in.
    pub namespace: String,
    /// Where `bootstrap` writes, and scenarios read, the bootstrapped resources.
    pub bootstrap_file: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            bootstrap_file: PathBuf::from(DEFAULT_BOOTSTRAP_FILE),
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            namespace: get(NAMESPACE_ENV).unwrap_or(defaults.namespace),
            bootstrap_file: get(BOOTSTRAP_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.bootstrap_file),
        }
    }
}
