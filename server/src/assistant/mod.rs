mod gateway;
mod solver;

pub use gateway::{AssistantConfig, AssistantGateway, HintOutcome, SolveOutcome};
pub use solver::{Solver, SolverError, SolverVerdict};
