use clap::Parser;
use tern::cli::Cli;
use tern_transpile::Mode;
use tracing_subscriber::EnvFilter;

/// Log to stderr. `RUST_LOG` wins; otherwise debug modes trace every
/// parse, emit and block event.
fn init_tracing(mode: Mode) {
    let default = if mode.trace() {
        "tern_transpile=trace,tern=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.mode.unwrap_or_default());

    match tern::run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}
