//! Configuration for the tern driver.
//!
//! Loaded from `tern.toml` in the working directory, or from the file
//! given with `--config`. Command-line flags override it.
//!
//! Example tern.toml:
//! ```toml
//! [limits]
//! max_vars = 1024
//! max_depth = 64
//!
//! [toolchain]
//! cc = "clang"
//! output = "build/out.c"
//! binary = "build/program"
//! flags = ["-march=native"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tern_transpile::Limits;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "tern.toml";

/// Native compiler settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// C compiler, looked up on PATH.
    pub cc: String,
    /// Generated C file.
    pub output: PathBuf,
    /// Built executable.
    pub binary: PathBuf,
    /// Extra compiler flags, appended after the mode flags.
    pub flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: "cc".to_string(),
            output: PathBuf::from("out.c"),
            binary: PathBuf::from("program"),
            flags: Vec::new(),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TernConfig {
    pub limits: Limits,
    pub toolchain: ToolchainConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl TernConfig {
    /// Load `tern.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    /// Load config from a file path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = TernConfig::load(dir.path()).unwrap();
        assert_eq!(config, TernConfig::default());
        assert_eq!(config.toolchain.cc, "cc");
        assert_eq!(config.toolchain.output, PathBuf::from("out.c"));
        assert_eq!(config.limits.max_vars, 512);
    }

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(
            file,
            r#"
[limits]
max_vars = 8

[toolchain]
cc = "clang"
flags = ["-march=native"]
"#
        )
        .unwrap();

        let config = TernConfig::load(dir.path()).unwrap();
        assert_eq!(config.limits.max_vars, 8);
        assert_eq!(config.limits.max_depth, 128);
        assert_eq!(config.toolchain.cc, "clang");
        assert_eq!(config.toolchain.flags, vec!["-march=native"]);
        assert_eq!(config.toolchain.binary, PathBuf::from("program"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[limits]\nmax_vars = \"many\"\n").unwrap();
        let err = TernConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = TernConfig::load_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
