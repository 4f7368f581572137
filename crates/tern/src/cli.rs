//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;
use tern_transpile::Mode;

/// Transpile a Tern program to C and build it with the system C compiler.
#[derive(Debug, Parser)]
#[command(name = "tern", version, about)]
pub struct Cli {
    /// Tern source file, use - for stdin
    pub input: PathBuf,

    /// Operating mode: optimized (default), raw, debug, debug_opt or debug_raw
    pub mode: Option<Mode>,

    /// Generated C file (default: toolchain.output from tern.toml, else out.c)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Built executable (default: toolchain.binary from tern.toml, else program)
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// C compiler to invoke
    #[arg(long)]
    pub cc: Option<String>,

    /// Configuration file to use instead of ./tern.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after writing the C file
    #[arg(long)]
    pub emit_only: bool,

    /// Print the diagnostic report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
