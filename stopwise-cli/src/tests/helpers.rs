//! Test helpers: temporary stores, seeds and deterministic collaborators.

use super::*;
use crate::clients::QueryClientFactory;
use crate::init::{InitConfig, execute_init};
use crate::matrix::{MatrixConfig, MatrixKind, execute_matrix};
use crate::solve::SolverFactory;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;
use stopwise_core::test_support::ScriptedQueryClient;
use stopwise_core::{
    Coordinate, CostQueryClient, Diagnostics, ProblemArchive, RoutingProblem, Solution,
    SolveError, SolveMode, SolveRequest, SolveResponse, Solver,
};
use tempfile::TempDir;

/// Four stops on a small square, with a crossing baseline tour.
pub(super) const SQUARE_SEED: &str = r#"{
    "coordinates": [[0.0, 0.0], [0.0, 0.01], [0.01, 0.01], [0.01, 0.0]],
    "solutions": {"baseline": {"tsp_1": [0, 2, 1, 3, 0]}}
}"#;

/// Perimeter tour of the square seed.
pub(super) const PERIMETER: [usize; 5] = [0, 1, 2, 3, 0];

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

/// A temporary directory holding a problem store and input files.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn store_dir(&self) -> Utf8PathBuf {
        self.path("store")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }

    /// Seed and archive `problem` from [`SQUARE_SEED`].
    pub(super) fn init_square(&self, problem: &str) {
        let config = InitConfig {
            store_dir: self.store_dir(),
            problem: problem.to_owned(),
            input: self.write("seed.json", SQUARE_SEED),
        };
        execute_init(&config, &mut Vec::new()).expect("init succeeds");
    }

    /// Register a geodesic matrix named `geodesic` on `problem`.
    pub(super) fn add_geodesic(&self, problem: &str) {
        let config = MatrixConfig {
            store_dir: self.store_dir(),
            problem: problem.to_owned(),
            kind: MatrixKind::Geodesic,
            name: MatrixKind::Geodesic.label().to_owned(),
            osrm_base_url: "http://unused".to_owned(),
            concurrency: None,
        };
        execute_matrix(&config, &ScriptedClients, &mut Vec::new()).expect("matrix succeeds");
    }

    pub(super) fn load(&self, problem: &str) -> RoutingProblem {
        ProblemArchive::open(self.store_dir())
            .expect("open store")
            .load(problem)
            .expect("problem archived")
    }
}

pub(super) fn square_stops() -> Vec<Coordinate> {
    [(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0)]
        .into_iter()
        .map(|(lat, lon)| Coordinate::new(lat, lon).expect("valid coordinate"))
        .collect()
}

/// Serves a scripted engine over the square seed: unit sides, longer
/// diagonals.
pub(super) struct ScriptedClients;

impl QueryClientFactory for ScriptedClients {
    fn build(&self, _base_url: &str) -> Result<Box<dyn CostQueryClient>, CliError> {
        let distances = vec![
            vec![0.0, 100.0, 141.0, 100.0],
            vec![100.0, 0.0, 100.0, 141.0],
            vec![141.0, 100.0, 0.0, 100.0],
            vec![100.0, 141.0, 100.0, 0.0],
        ];
        Ok(Box::new(ScriptedQueryClient::new(square_stops(), distances)))
    }
}

/// Always answers with the perimeter tour.
struct PerimeterSolver;

impl Solver for PerimeterSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveResponse, SolveError> {
        let mut solution = Solution::new();
        solution.insert_route("tsp_1", PERIMETER.to_vec());
        Ok(SolveResponse {
            objective: solution.cost_under(request.matrix()),
            solution,
            diagnostics: Diagnostics::default(),
        })
    }
}

/// Builds [`PerimeterSolver`] regardless of mode.
pub(super) struct PerimeterSolvers;

impl SolverFactory for PerimeterSolvers {
    fn build(
        &self,
        _mode: &SolveMode,
        _time_limit: Option<Duration>,
    ) -> Result<Box<dyn Solver>, CliError> {
        Ok(Box::new(PerimeterSolver))
    }
}
