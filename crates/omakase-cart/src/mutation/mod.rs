//! Cart mutations.

mod machine;
mod pipeline;

pub use machine::{MutationKind, MutationPhase, OptimisticMutation, RollbackOutcome};
pub use pipeline::{CartMutations, MutationReport};
