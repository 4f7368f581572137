//! Native toolchain invocation.
//!
//! The generated C file is compiled with the system C compiler, found on
//! PATH. Optimisation and debug flags depend on the operating mode.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};
use tern_transpile::Mode;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("C compiler '{0}' not found")]
    NotAvailable(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {}", stderr.trim())]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Optimisation and debug flags for a mode.
pub fn mode_flags(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Raw => &["-O0"],
        Mode::DebugRaw => &["-O0", "-g"],
        Mode::Optimized => &["-O3", "-w"],
        Mode::Debug | Mode::DebugOpt => &["-O3", "-g"],
    }
}

/// A C compiler plus the extra flags passed on every build.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub cc: String,
    pub extra_flags: Vec<String>,
}

impl Toolchain {
    pub fn new(cc: impl Into<String>) -> Self {
        Self {
            cc: cc.into(),
            extra_flags: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.extra_flags = flags;
        self
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.cc).is_ok()
    }

    /// Compiler command line for building `source` into `binary`.
    pub fn command(&self, mode: Mode, source: &Path, binary: &Path) -> Command {
        self.command_for(&self.cc, mode, source, binary)
    }

    fn command_for(
        &self,
        program: impl AsRef<OsStr>,
        mode: Mode,
        source: &Path,
        binary: &Path,
    ) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(mode_flags(mode));
        cmd.args(&self.extra_flags);
        cmd.arg(source).arg("-o").arg(binary).arg("-lm");
        cmd
    }

    /// Compile `source` into `binary`, returning how long it took.
    pub fn build(&self, mode: Mode, source: &Path, binary: &Path) -> Result<Duration, ToolchainError> {
        let program =
            which::which(&self.cc).map_err(|_| ToolchainError::NotAvailable(self.cc.clone()))?;
        let mut cmd = self.command_for(&program, mode, source, binary);
        debug!(command = ?cmd, "building");

        let started = Instant::now();
        let output = cmd.output().map_err(|source| ToolchainError::Spawn {
            program: self.cc.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ToolchainError::Failed {
                program: self.cc.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(started.elapsed())
    }
}

/// Run a built program with inherited stdio and return its exit code.
pub fn run_program(binary: &Path) -> Result<i32, ToolchainError> {
    let spawn_error = |source| ToolchainError::Spawn {
        program: binary.display().to_string(),
        source,
    };
    let path = binary.canonicalize().map_err(spawn_error)?;
    debug!(program = %path.display(), "running");
    let status = Command::new(&path).status().map_err(spawn_error)?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(mode_flags(Mode::Raw), ["-O0"]);
        assert_eq!(mode_flags(Mode::DebugRaw), ["-O0", "-g"]);
        assert_eq!(mode_flags(Mode::Optimized), ["-O3", "-w"]);
        assert_eq!(mode_flags(Mode::DebugOpt), ["-O3", "-g"]);
    }

    #[test]
    fn test_command_line() {
        let toolchain = Toolchain::new("cc").with_flags(vec!["-march=native".into()]);
        let cmd = toolchain.command(Mode::Optimized, Path::new("out.c"), Path::new("program"));
        assert_eq!(cmd.get_program(), "cc");
        assert_eq!(
            args(&cmd),
            vec!["-O3", "-w", "-march=native", "out.c", "-o", "program", "-lm"]
        );
    }

    #[test]
    fn test_missing_compiler() {
        let toolchain = Toolchain::new("tern-test-no-such-compiler");
        assert!(!toolchain.is_available());
        let err = toolchain
            .build(Mode::Raw, Path::new("out.c"), Path::new("program"))
            .unwrap_err();
        assert!(matches!(err, ToolchainError::NotAvailable(_)));
        assert_eq!(err.to_string(), "C compiler 'tern-test-no-such-compiler' not found");
    }

    #[test]
    fn test_run_missing_program() {
        let err = run_program(Path::new("tern-test-no-such-program")).unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }));
    }
}
