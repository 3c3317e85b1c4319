//! `matrix` command: build and register a cost matrix for a problem.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use log::warn;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopwise_core::{
    Coordinate, CostMatrix, MatrixError, NetworkMatrixBuilder, bulk_matrices, geodesic_matrix,
};

use crate::clients::{QueryClientFactory, default_base_url};
use crate::{
    ARG_CONCURRENCY, ARG_KIND, ARG_NAME, ARG_OSRM_BASE_URL, ARG_PROBLEM, ARG_STORE_DIR, CliError,
    DEFAULT_STORE_DIR, ENV_MATRIX_PROBLEM, load_problem, write_line,
};

/// Suffix of the duration matrix registered alongside a bulk table.
pub(crate) const DURATION_SUFFIX: &str = "-duration";

/// How a matrix is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MatrixKind {
    /// Great-circle distances.
    #[default]
    Geodesic,
    /// One routing-engine query per ordered pair.
    Network,
    /// One bulk table request yielding distances and durations.
    Table,
}

impl MatrixKind {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Geodesic => "geodesic",
            Self::Network => "network",
            Self::Table => "table",
        }
    }
}

/// CLI arguments for the `matrix` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "matrix",
    long_about = "Build a cost matrix over every stop of a problem and \
                 register it by name. Network and table matrices query an \
                 OSRM-compatible routing engine; a table build also \
                 registers the duration matrix as <name>-duration.",
    about = "Build and register a cost matrix"
)]
#[ortho_config(prefix = "STOPWISE")]
pub(crate) struct MatrixArgs {
    /// Directory holding archived problems.
    #[arg(long = ARG_STORE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) store_dir: Option<Utf8PathBuf>,
    /// Problem to extend.
    #[arg(long = ARG_PROBLEM, value_name = "name")]
    #[serde(default)]
    pub(crate) problem: Option<String>,
    /// Matrix kind; defaults to geodesic.
    #[arg(long = ARG_KIND, value_enum)]
    #[serde(default)]
    pub(crate) kind: Option<MatrixKind>,
    /// Registered matrix name; defaults to the kind.
    #[arg(long = ARG_NAME, value_name = "matrix")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Base URL for the routing engine (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Concurrent pairwise queries for network matrices.
    #[arg(long = ARG_CONCURRENCY, value_name = "n")]
    #[serde(default)]
    pub(crate) concurrency: Option<usize>,
}

impl MatrixArgs {
    fn into_config(self) -> Result<MatrixConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatrixConfig::try_from(merged)
    }
}

/// Resolved `matrix` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatrixConfig {
    pub(crate) store_dir: Utf8PathBuf,
    pub(crate) problem: String,
    pub(crate) kind: MatrixKind,
    pub(crate) name: String,
    pub(crate) osrm_base_url: String,
    pub(crate) concurrency: Option<usize>,
}

impl TryFrom<MatrixArgs> for MatrixConfig {
    type Error = CliError;

    fn try_from(args: MatrixArgs) -> Result<Self, Self::Error> {
        let problem = args.problem.ok_or(CliError::MissingArgument {
            field: ARG_PROBLEM,
            env: ENV_MATRIX_PROBLEM,
        })?;
        let kind = args.kind.unwrap_or_default();
        Ok(Self {
            store_dir: args
                .store_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE_DIR)),
            problem,
            kind,
            name: args.name.unwrap_or_else(|| kind.label().to_owned()),
            osrm_base_url: args.osrm_base_url.unwrap_or_else(default_base_url),
            concurrency: args.concurrency,
        })
    }
}

pub(crate) fn run_matrix(
    args: MatrixArgs,
    clients: &dyn QueryClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_matrix(&config, clients, writer)
}

pub(crate) fn execute_matrix(
    config: &MatrixConfig,
    clients: &dyn QueryClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let (archive, mut problem) = load_problem(&config.store_dir, &config.problem)?;
    let built = build_matrices(config, problem.coordinates(), clients)?;

    let mut registered = Vec::with_capacity(built.len());
    for (name, matrix) in built {
        if matrix.has_unreachable() {
            warn!("matrix {name} has unreachable cells");
        }
        problem
            .add_matrix(name.clone(), matrix)
            .map_err(|source| CliError::Problem {
                problem: config.problem.clone(),
                source,
            })?;
        registered.push(name);
    }
    archive.save(&problem)?;

    write_line(
        writer,
        &format!(
            "registered {} matrix {} for problem {}",
            config.kind.label(),
            registered.join(", "),
            config.problem
        ),
    )
}

fn build_matrices(
    config: &MatrixConfig,
    coordinates: &[Coordinate],
    clients: &dyn QueryClientFactory,
) -> Result<Vec<(String, CostMatrix)>, CliError> {
    let failed = |source: MatrixError| CliError::BuildMatrix {
        problem: config.problem.clone(),
        kind: config.kind.label(),
        source,
    };
    match config.kind {
        MatrixKind::Geodesic => {
            let matrix = geodesic_matrix(coordinates).map_err(failed)?;
            Ok(vec![(config.name.clone(), matrix)])
        }
        MatrixKind::Network => {
            let client = clients.build(&config.osrm_base_url)?;
            let builder = config
                .concurrency
                .map_or_else(NetworkMatrixBuilder::new, |n| {
                    NetworkMatrixBuilder::new().with_concurrency(n)
                });
            let matrix = builder
                .build(client.as_ref(), coordinates)
                .map_err(failed)?;
            Ok(vec![(config.name.clone(), matrix)])
        }
        MatrixKind::Table => {
            let client = clients.build(&config.osrm_base_url)?;
            let tables = bulk_matrices(client.as_ref(), coordinates).map_err(failed)?;
            Ok(vec![
                (config.name.clone(), tables.distances),
                (format!("{}{DURATION_SUFFIX}", config.name), tables.durations),
            ])
        }
    }
}
