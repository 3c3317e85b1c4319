//! `solve` command: solve a problem over one of its matrices and register
//! the result.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopwise_core::{SolveMode, SolveResponse, Solver};

use crate::{
    ARG_MATRIX, ARG_PROBLEM, ARG_SOLUTION, ARG_STORE_DIR, ARG_TIME_LIMIT_SECS, CliError,
    DEFAULT_STORE_DIR, ENV_SOLVE_MATRIX, ENV_SOLVE_PROBLEM, ENV_SOLVE_SOLUTION, load_problem,
    write_line,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "solve",
    long_about = "Solve a problem over a registered matrix. Problems with a \
                 fleet and demands are solved as capacitated routing, others \
                 as a single-vehicle tour. The result is registered under the \
                 given solution name; an empty result means no feasible \
                 assignment was found.",
    about = "Solve a problem and register the solution"
)]
#[ortho_config(prefix = "STOPWISE")]
pub(crate) struct SolveArgs {
    /// Directory holding archived problems.
    #[arg(long = ARG_STORE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) store_dir: Option<Utf8PathBuf>,
    /// Problem to solve.
    #[arg(long = ARG_PROBLEM, value_name = "name")]
    #[serde(default)]
    pub(crate) problem: Option<String>,
    /// Registered matrix to optimise over.
    #[arg(long = ARG_MATRIX, value_name = "name")]
    #[serde(default)]
    pub(crate) matrix: Option<String>,
    /// Name under which the solution is registered.
    #[arg(long = ARG_SOLUTION, value_name = "name")]
    #[serde(default)]
    pub(crate) solution: Option<String>,
    /// Improvement budget in seconds, overriding the mode's preset.
    #[arg(long = ARG_TIME_LIMIT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
}

impl SolveArgs {
    fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    pub(crate) store_dir: Utf8PathBuf,
    pub(crate) problem: String,
    pub(crate) matrix: String,
    pub(crate) solution: String,
    pub(crate) time_limit: Option<Duration>,
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let problem = args.problem.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_SOLVE_PROBLEM,
        })?;
        let matrix = args.matrix.ok_or(CliError::MissingArgument {
            field: ARG_MATRIX,
            env: ENV_SOLVE_MATRIX,
        })?;
        let solution = args.solution.ok_or(CliError::MissingArgument {
            field: ARG_SOLUTION,
            env: ENV_SOLVE_SOLUTION,
        })?;
        Ok(Self {
            store_dir: args
                .store_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE_DIR)),
            problem,
            matrix,
            solution,
            time_limit: args.time_limit_secs.map(Duration::from_secs),
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(crate) trait SolverFactory {
    fn build(
        &self,
        mode: &SolveMode,
        time_limit: Option<Duration>,
    ) -> Result<Box<dyn Solver>, CliError>;
}

/// Builds the native local-search solver when the `solver` feature is on.
pub(crate) struct DefaultSolverFactory;

impl SolverFactory for DefaultSolverFactory {
    #[cfg(feature = "solver")]
    fn build(
        &self,
        mode: &SolveMode,
        time_limit: Option<Duration>,
    ) -> Result<Box<dyn Solver>, CliError> {
        use stopwise_solver::{LocalSearchSolver, SolverConfig};

        let preset = SolverConfig::for_mode(mode);
        let config = match time_limit {
            Some(limit) => preset.with_time_limit(limit),
            None => preset,
        };
        Ok(Box::new(LocalSearchSolver::with_config(config)))
    }

    #[cfg(not(feature = "solver"))]
    fn build(
        &self,
        _mode: &SolveMode,
        _time_limit: Option<Duration>,
    ) -> Result<Box<dyn Solver>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver",
            action: "solving a problem",
        })
    }
}

pub(crate) fn run_solve(
    args: SolveArgs,
    solvers: &dyn SolverFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_solve(&config, solvers, writer)
}

pub(crate) fn execute_solve(
    config: &SolveConfig,
    solvers: &dyn SolverFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let (archive, mut problem) = load_problem(&config.store_dir, &config.problem)?;
    let problem_error = |source| CliError::Problem {
        problem: config.problem.clone(),
        source,
    };

    let response = {
        let request = problem.solve_request(&config.matrix).map_err(problem_error)?;
        let solver = solvers.build(request.mode(), config.time_limit)?;
        solver
            .solve(&request)
            .map_err(|source| CliError::Solve { source })?
    };
    let summary = summarise(config, &response);

    problem
        .add_solution(config.solution.clone(), response.solution)
        .map_err(problem_error)?;
    archive.save(&problem)?;
    write_line(writer, &summary)
}

fn summarise(config: &SolveConfig, response: &SolveResponse) -> String {
    if response.is_empty() {
        warn!(
            "no feasible solution for problem {} over matrix {}",
            config.problem, config.matrix
        );
        return format!(
            "no feasible solution for problem {}; registered empty solution {}",
            config.problem, config.solution
        );
    }
    let diagnostics = &response.diagnostics;
    info!(
        "solved {} in {:?} with {} improving move(s) and {} guided round(s)",
        config.problem,
        diagnostics.elapsed,
        diagnostics.improving_moves,
        diagnostics.guided_rounds
    );
    format!(
        "registered solution {} for problem {}: {} route(s), objective {:.3}",
        config.solution,
        config.problem,
        response.solution.len(),
        response.objective
    )
}
