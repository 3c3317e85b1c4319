//! `metrics` command: export comparative totals of every solution as CSV.

use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopwise_core::{CostQueryClient, MetricsReport};

use crate::clients::{QueryClientFactory, default_base_url};
use crate::fs::create_utf8_file;
use crate::{
    ARG_BASELINE, ARG_LIVE_ROUTE, ARG_OSRM_BASE_URL, ARG_OUTPUT, ARG_PROBLEM, ARG_STORE_DIR,
    CliError, DEFAULT_STORE_DIR, ENV_METRICS_PROBLEM, open_archive,
};

/// CLI arguments for the `metrics` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "metrics",
    long_about = "Total every solution of the named problems under every \
                 registered matrix and write one semicolon-separated CSV. \
                 With a baseline, each row also carries the fractional \
                 improvement over the baseline on the same matrix. With \
                 --live-route, each solution is also priced by querying the \
                 routing engine for its full stop sequence.",
    about = "Export solution metrics as CSV"
)]
#[ortho_config(prefix = "STOPWISE")]
pub(crate) struct MetricsArgs {
    /// Directory holding archived problems.
    #[arg(long = ARG_STORE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) store_dir: Option<Utf8PathBuf>,
    /// Problems to report on; repeat for several.
    #[arg(long = ARG_PROBLEM, value_name = "name")]
    #[serde(default)]
    pub(crate) problem: Vec<String>,
    /// Solution used as the improvement baseline.
    #[arg(long = ARG_BASELINE, value_name = "solution")]
    #[serde(default)]
    pub(crate) baseline: Option<String>,
    /// Also price each solution along live road routes.
    #[arg(long = ARG_LIVE_ROUTE)]
    #[serde(default)]
    pub(crate) live_route: bool,
    /// Base URL for the routing engine (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// CSV destination; standard output when omitted.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MetricsArgs {
    fn into_config(self) -> Result<MetricsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MetricsConfig::try_from(merged)
    }
}

/// Resolved `metrics` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MetricsConfig {
    pub(crate) store_dir: Utf8PathBuf,
    pub(crate) problems: Vec<String>,
    pub(crate) baseline: Option<String>,
    /// Routing engine URL when live-route pricing is requested.
    pub(crate) live_route: Option<String>,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<MetricsArgs> for MetricsConfig {
    type Error = CliError;

    fn try_from(args: MetricsArgs) -> Result<Self, Self::Error> {
        if args.problem.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_PROBLEM,
                env: ENV_METRICS_PROBLEM,
            });
        }
        let live_route = args
            .live_route
            .then(|| args.osrm_base_url.unwrap_or_else(default_base_url));
        Ok(Self {
            store_dir: args
                .store_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE_DIR)),
            problems: args.problem,
            baseline: args.baseline,
            live_route,
            output: args.output,
        })
    }
}

pub(crate) fn run_metrics(
    args: MetricsArgs,
    clients: &dyn QueryClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_metrics(&config, clients, writer)
}

pub(crate) fn execute_metrics(
    config: &MetricsConfig,
    clients: &dyn QueryClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = collect_report(config, clients)?;
    match &config.output {
        Some(path) => write_report_file(&report, path),
        None => report.write_csv(writer).map_err(CliError::WriteMetrics),
    }
}

fn collect_report(
    config: &MetricsConfig,
    clients: &dyn QueryClientFactory,
) -> Result<MetricsReport, CliError> {
    let client: Option<Box<dyn CostQueryClient>> = config
        .live_route
        .as_deref()
        .map(|base_url| clients.build(base_url))
        .transpose()?;
    let archive = open_archive(&config.store_dir)?;
    let baseline = config.baseline.as_deref();

    let mut report = MetricsReport::new();
    for name in &config.problems {
        let problem = archive.load(name)?;
        let records = match &client {
            Some(client) => problem.metrics_with_live_route(baseline, client.as_ref()),
            None => problem.metrics(baseline),
        }
        .map_err(|source| CliError::Problem {
            problem: name.clone(),
            source,
        })?;
        records.into_iter().for_each(|record| report.push(record));
    }
    Ok(report)
}

fn write_report_file(report: &MetricsReport, path: &Utf8Path) -> Result<(), CliError> {
    let file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    report.write_csv(&mut out).map_err(CliError::WriteMetrics)?;
    out.flush().map_err(CliError::WriteOutput)
}
