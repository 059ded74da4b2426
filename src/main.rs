use clap::Parser;
use fxsignal::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
