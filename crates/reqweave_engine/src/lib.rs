//! Reqweave Engine - artifact reconciliation pipeline
//!
//! Builds a chain of linked requirements artifacts (use-case model, ER
//! model, CRUD matrix, derived functional requirements) from informal
//! inputs, then keeps them mutually consistent through a bounded loop of
//! consistency checks and targeted completions.
//!
//! Flow:
//! inputs -> use-case model -> ER model -> CRUD matrix -> check ->
//! (on violations) targeted completion -> merge -> check again, until Pass
//! or the iteration bound.
//!
//! Invariants:
//! - one weakly connected ER component after a completed pass
//! - no duplicate CRUD triplets, no dangling references after a merge
//! - bounded iteration: convergence failure, never an infinite loop
//! - stage commits are all-or-nothing; partial output is never merged

pub mod builder;
pub mod consistency;
pub mod error;
pub mod logging;
pub mod merge;
pub mod parser;
pub mod reconciler;
pub mod retry;
pub mod store;

pub use builder::{
    CrudMatrixSynthesizer, ErModelSynthesizer, ErSynthesis, RequirementsWriter,
    UseCaseModelBuilder,
};
pub use consistency::ConsistencyChecker;
pub use error::{ParseError, PipelineError, Stage};
pub use merge::{ArtifactDelta, DeltaMerger};
pub use reconciler::{CancelToken, PipelineOutput, Reconciler, SynthesisInputs};
pub use store::ArtifactStore;
