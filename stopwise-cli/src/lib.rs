//! Command-line interface for the Stopwise routing pipeline.
//!
//! The `stopwise` binary drives an archive of routing problems: `init`
//! seeds a problem from JSON, `matrix` registers cost matrices, `solve` runs
//! the native solver over a matrix and `metrics` exports comparative totals
//! as CSV. Every option can come from CLI flags, configuration files or
//! `STOPWISE_`-prefixed environment variables.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use stopwise_core::{ProblemArchive, RoutingProblem};

mod clients;
mod error;
mod fs;
mod init;
mod matrix;
mod metrics;
mod solve;

pub use error::CliError;

use clients::{DefaultQueryClientFactory, QueryClientFactory};
use init::{InitArgs, run_init};
use matrix::{MatrixArgs, run_matrix};
use metrics::{MetricsArgs, run_metrics};
use solve::{DefaultSolverFactory, SolveArgs, SolverFactory, run_solve};

/// Archive directory used when `--store-dir` is not given.
pub const DEFAULT_STORE_DIR: &str = "routing-problems";

const ARG_STORE_DIR: &str = "store-dir";
const ARG_PROBLEM: &str = "problem";
const ARG_INPUT: &str = "input";
const ARG_KIND: &str = "kind";
const ARG_NAME: &str = "name";
const ARG_MATRIX: &str = "matrix";
const ARG_SOLUTION: &str = "solution";
const ARG_TIME_LIMIT_SECS: &str = "time-limit-secs";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_CONCURRENCY: &str = "concurrency";
const ARG_BASELINE: &str = "baseline";
const ARG_LIVE_ROUTE: &str = "live-route";
const ARG_OUTPUT: &str = "output";
const ENV_INIT_PROBLEM: &str = "STOPWISE_CMDS_INIT_PROBLEM";
const ENV_INIT_INPUT: &str = "STOPWISE_CMDS_INIT_INPUT";
const ENV_MATRIX_PROBLEM: &str = "STOPWISE_CMDS_MATRIX_PROBLEM";
const ENV_SOLVE_PROBLEM: &str = "STOPWISE_CMDS_SOLVE_PROBLEM";
const ENV_SOLVE_MATRIX: &str = "STOPWISE_CMDS_SOLVE_MATRIX";
const ENV_SOLVE_SOLUTION: &str = "STOPWISE_CMDS_SOLVE_SOLUTION";
const ENV_METRICS_PROBLEM: &str = "STOPWISE_CMDS_METRICS_PROBLEM";

/// Run the Stopwise CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure. Argument errors
/// carry the Clap error so the caller can render usage.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(
        cli.command,
        &DefaultQueryClientFactory,
        &DefaultSolverFactory,
        &mut stdout,
    )
}

fn run_command(
    command: Command,
    clients: &dyn QueryClientFactory,
    solvers: &dyn SolverFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Init(args) => run_init(args, writer),
        Command::Matrix(args) => run_matrix(args, clients, writer),
        Command::Solve(args) => run_solve(args, solvers, writer),
        Command::Metrics(args) => run_metrics(args, clients, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stopwise",
    about = "Build cost matrices, solve routing problems and compare solutions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a problem from a JSON seed.
    Init(InitArgs),
    /// Build and register a cost matrix.
    Matrix(MatrixArgs),
    /// Solve a problem over one of its matrices.
    Solve(SolveArgs),
    /// Export comparative metrics for one or more problems.
    Metrics(MetricsArgs),
}

fn open_archive(store_dir: &Utf8Path) -> Result<ProblemArchive, CliError> {
    Ok(ProblemArchive::open(store_dir)?)
}

fn load_problem(
    store_dir: &Utf8Path,
    name: &str,
) -> Result<(ProblemArchive, RoutingProblem), CliError> {
    let archive = open_archive(store_dir)?;
    let problem = archive.load(name)?;
    Ok((archive, problem))
}

fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(writer, "{line}").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
