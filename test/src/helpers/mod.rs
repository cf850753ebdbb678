mod stores;

pub use fixtures::{engine_over, one_pour_level, registered_user, seeded_store, tube};
pub use signer::sign_assertion;
pub use solvers::{HangingSolver, ScriptedSolver};
pub use stores::{ConflictingSessions, DuplicateTapSessions};
