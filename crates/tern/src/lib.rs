//! Command-line driver for the Tern transpiler.
//!
//! Reads a Tern program, transpiles it, and when no errors were found
//! writes the C file, builds it with the native toolchain and, in debug
//! modes, runs the result.

pub mod cli;
pub mod config;
pub mod report;
pub mod toolchain;

use anyhow::Context;
use cli::Cli;
use config::TernConfig;
use std::io::Read;
use std::path::Path;
use tern_transpile::{Diagnostic, Options, transpile};
use toolchain::Toolchain;
use tracing::debug;

/// Run one invocation and return the process exit code.
///
/// Compilation problems are reported and turned into a non-zero code;
/// only I/O and configuration failures come back as `Err`.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = match &cli.config {
        Some(path) => TernConfig::load_file(path)?,
        None => TernConfig::load(Path::new("."))?,
    };
    let mode = cli.mode.unwrap_or_default();
    let source = read_input(&cli.input)?;

    let options = Options::new(mode).with_limits(config.limits);
    let mut result = transpile(&source, &options);
    debug!(
        %mode,
        errors = result.diagnostics.error_count(),
        warnings = result.diagnostics.warning_count(),
        "transpiled"
    );
    if !result.is_ok() {
        report::print(&result.diagnostics, cli.json)?;
        return Ok(1);
    }

    let output = cli.output.as_ref().unwrap_or(&config.toolchain.output);
    std::fs::write(output, result.render())
        .with_context(|| format!("failed to write {}", output.display()))?;
    debug!(path = %output.display(), "wrote C source");
    if cli.emit_only {
        report::print(&result.diagnostics, cli.json)?;
        return Ok(0);
    }

    let binary = cli.binary.as_ref().unwrap_or(&config.toolchain.binary);
    let cc = cli.cc.as_ref().unwrap_or(&config.toolchain.cc);
    let compiler = Toolchain::new(cc.as_str()).with_flags(config.toolchain.flags.clone());
    let elapsed = match compiler.build(mode, output, binary) {
        Ok(elapsed) => elapsed,
        Err(err) => {
            result.diagnostics.push(Diagnostic::error(0, err.to_string()));
            report::print(&result.diagnostics, cli.json)?;
            return Ok(1);
        }
    };
    report::print(&result.diagnostics, cli.json)?;

    if mode.auto_run() {
        return Ok(toolchain::run_program(binary)?);
    }
    if !cli.json {
        println!(
            "Compiled: {} ({:.3}s)",
            binary.display(),
            elapsed.as_secs_f64()
        );
    }
    Ok(0)
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}
