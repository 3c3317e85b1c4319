//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use stopwise_cli::CliError;

fn main() {
    match stopwise_cli::run() {
        Ok(()) => {}
        // Clap renders help, version and usage errors itself.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("stopwise: {err}");
            std::process::exit(1);
        }
    }
}
