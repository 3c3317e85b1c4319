//! Error types emitted by the Stopwise CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use stopwise_core::{ArchiveError, MatrixError, ProblemError, SolveError};
#[cfg(feature = "osrm")]
use stopwise_osrm::ClientBuildError;
use thiserror::Error;

/// Errors emitted by the Stopwise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the problem seed failed.
    #[error("failed to open problem seed at {path:?}: {source}")]
    OpenSeed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Problem seed JSON could not be decoded.
    #[error("failed to parse problem seed JSON at {path:?}: {source}")]
    ParseSeed {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The problem seed decoded but describes an inconsistent problem.
    #[error("problem seed in {path:?} is invalid: {source}")]
    InvalidSeed {
        path: Utf8PathBuf,
        #[source]
        source: ProblemError,
    },
    /// `init` refuses to overwrite an archived problem.
    #[error("problem {name:?} already exists in the store")]
    ProblemExists { name: String },
    /// Reading or writing the problem archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// A problem rejected a query or an update.
    #[error("problem {problem:?}: {source}")]
    Problem {
        problem: String,
        #[source]
        source: ProblemError,
    },
    /// Building a cost matrix failed.
    #[error("failed to build {kind} matrix for {problem:?}: {source}")]
    BuildMatrix {
        problem: String,
        kind: &'static str,
        #[source]
        source: MatrixError,
    },
    /// Constructing the OSRM client failed.
    #[cfg(feature = "osrm")]
    #[error("failed to build OSRM client for {base_url:?}: {source}")]
    BuildClient {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// The solver rejected the request.
    #[error("solver failed: {source}")]
    Solve { source: SolveError },
    /// Creating the metrics output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing the metrics CSV failed.
    #[error("failed to write metrics CSV: {0}")]
    WriteMetrics(#[source] csv::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
