use async_trait::async_trait;
use thiserror::Error;

use siphon_shared::{Container, LevelId, MoveStep};

/// Errors that can occur while calling the external solver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The remote call errored before producing a verdict
    #[error("solver unreachable: {reason}")]
    Unreachable { reason: String },
}

/// The solver's answer for one configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverVerdict {
    /// Whether any solution exists from the submitted configuration.
    pub solvable: bool,
    /// Length of the returned solution path.
    pub steps: u32,
    /// The solution path, first step first.
    pub solution: Vec<MoveStep>,
}

/// The external path-finding assistant, consumed as an opaque remote call
/// with bounded latency. The gateway applies its own timeout around
/// [`Solver::solve`]; implementations need not enforce one themselves.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(
        &self,
        level_id: LevelId,
        tubes: &[Container],
        moves_so_far: u32,
    ) -> Result<SolverVerdict, SolverError>;
}
