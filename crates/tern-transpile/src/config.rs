//! Compilation options: operating mode and capacity limits.

use crate::error::ModeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating mode selected for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Blocks close on dedent; no tracing, no auto-run.
    #[default]
    Optimized,
    /// Every block needs an explicit `end` or `}`.
    Raw,
    Debug,
    DebugOpt,
    DebugRaw,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Optimized,
        Mode::Raw,
        Mode::Debug,
        Mode::DebugOpt,
        Mode::DebugRaw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Optimized => "optimized",
            Mode::Raw => "raw",
            Mode::Debug => "debug",
            Mode::DebugOpt => "debug_opt",
            Mode::DebugRaw => "debug_raw",
        }
    }

    /// Whether indent-opened blocks close implicitly on dedent.
    pub fn auto_close(self) -> bool {
        !self.is_raw()
    }

    pub fn is_raw(self) -> bool {
        matches!(self, Mode::Raw | Mode::DebugRaw)
    }

    /// Whether every parse/emit/block event is traced.
    pub fn trace(self) -> bool {
        matches!(self, Mode::Debug | Mode::DebugOpt | Mode::DebugRaw)
    }

    /// Whether the built program runs right after a successful build.
    pub fn auto_run(self) -> bool {
        self.trace()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "optimized" => Ok(Mode::Optimized),
            "raw" => Ok(Mode::Raw),
            "debug" => Ok(Mode::Debug),
            "debug_opt" => Ok(Mode::DebugOpt),
            "debug_raw" => Ok(Mode::DebugRaw),
            _ => Err(ModeError(s.to_string())),
        }
    }
}

/// Capacity limits for the growable tables of a compilation.
///
/// ```toml
/// [limits]
/// max_vars = 512
/// max_depth = 128
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Distinct variable names in the symbol table.
    pub max_vars: usize,
    /// Open blocks at any one time.
    pub max_depth: usize,
    /// Function definitions.
    pub max_functions: usize,
    /// Recorded diagnostics; later ones are counted but not stored.
    pub max_diagnostics: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vars: 512,
            max_depth: 128,
            max_functions: 256,
            max_diagnostics: 256,
        }
    }
}

/// Everything a compilation needs besides the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub mode: Mode,
    pub limits: Limits,
}

impl Options {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_names() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!("debug-raw".parse::<Mode>().unwrap(), Mode::DebugRaw);
        assert!("fast".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_predicates() {
        assert!(Mode::Optimized.auto_close());
        assert!(!Mode::Optimized.trace());
        assert!(!Mode::Raw.auto_close());
        assert!(Mode::DebugOpt.auto_close());
        assert!(!Mode::DebugRaw.auto_close());
        assert!(Mode::Debug.auto_run());
        assert!(!Mode::Raw.auto_run());
    }

    #[test]
    fn test_default_mode_is_optimized() {
        assert_eq!(Options::default().mode, Mode::Optimized);
        assert_eq!(Options::default().limits.max_vars, 512);
    }
}
