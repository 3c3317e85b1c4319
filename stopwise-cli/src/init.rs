//! `init` command: create an archived problem from a JSON seed.

use std::collections::BTreeMap;
use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopwise_core::{Coordinate, ProblemError, RoutingProblem, Solution};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_INPUT, ARG_PROBLEM, ARG_STORE_DIR, CliError, DEFAULT_STORE_DIR, ENV_INIT_INPUT,
    ENV_INIT_PROBLEM, open_archive, write_line,
};

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "init",
    long_about = "Create a routing problem from a JSON seed holding \
                 coordinates as [lat, lon] pairs and, optionally, the depot \
                 index, per-stop demands, vehicle capacities and named \
                 solutions. The fleet size is the number of capacities.",
    about = "Create a problem from a JSON seed"
)]
#[ortho_config(prefix = "STOPWISE")]
pub(crate) struct InitArgs {
    /// Directory holding archived problems.
    #[arg(long = ARG_STORE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) store_dir: Option<Utf8PathBuf>,
    /// Name of the new problem.
    #[arg(long = ARG_PROBLEM, value_name = "name")]
    #[serde(default)]
    pub(crate) problem: Option<String>,
    /// Path to the JSON seed.
    #[arg(long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
}

impl InitArgs {
    fn into_config(self) -> Result<InitConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InitConfig::try_from(merged)
    }
}

/// Resolved `init` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitConfig {
    pub(crate) store_dir: Utf8PathBuf,
    pub(crate) problem: String,
    pub(crate) input: Utf8PathBuf,
}

impl InitConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.input, ARG_INPUT)
    }
}

impl TryFrom<InitArgs> for InitConfig {
    type Error = CliError;

    fn try_from(args: InitArgs) -> Result<Self, Self::Error> {
        let problem = args.problem.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_INIT_PROBLEM,
        })?;
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INIT_INPUT,
        })?;
        Ok(Self {
            store_dir: args
                .store_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE_DIR)),
            problem,
            input,
        })
    }
}

/// JSON seed accepted by `init`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProblemSeed {
    pub(crate) coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub(crate) depot_index: Option<usize>,
    #[serde(default)]
    pub(crate) demands: Option<Vec<u64>>,
    #[serde(default)]
    pub(crate) capacities: Option<Vec<u64>>,
    #[serde(default)]
    pub(crate) solutions: BTreeMap<String, Solution>,
}

impl ProblemSeed {
    /// Build the named problem, validating every field.
    pub(crate) fn into_problem(self, name: &str) -> Result<RoutingProblem, ProblemError> {
        let mut problem = RoutingProblem::new(name);
        problem.set_coordinates(self.coordinates)?;
        if let Some(depot) = self.depot_index {
            problem.set_depot_index(depot)?;
        }
        if let Some(demands) = self.demands {
            problem.set_demands(demands)?;
        }
        if let Some(capacities) = self.capacities {
            problem.set_fleet(capacities.len(), capacities)?;
        }
        for (solution_name, solution) in self.solutions {
            problem.add_solution(solution_name, solution)?;
        }
        Ok(problem)
    }
}

pub(crate) fn run_init(args: InitArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_init(&config, writer)
}

pub(crate) fn execute_init(config: &InitConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let seed = load_seed(&config.input)?;
    let problem = seed
        .into_problem(&config.problem)
        .map_err(|source| CliError::InvalidSeed {
            path: config.input.clone(),
            source,
        })?;

    let archive = open_archive(&config.store_dir)?;
    if archive.exists(&config.problem)? {
        return Err(CliError::ProblemExists {
            name: config.problem.clone(),
        });
    }
    archive.save(&problem)?;
    debug!("archived problem {} under {}", config.problem, archive.root());

    write_line(
        writer,
        &format!(
            "created problem {} with {} stop(s)",
            config.problem,
            problem.stop_count()
        ),
    )
}

/// Loads a JSON-encoded [`ProblemSeed`] from disk.
pub(crate) fn load_seed(path: &Utf8Path) -> Result<ProblemSeed, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSeed {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseSeed {
        path: path.to_path_buf(),
        source,
    })
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}
