//! Error taxonomy for the pipeline
//!
//! `GenError` covers the transport; `ParseError` covers generated text that
//! does not match an expected structural format; `PipelineError` is what
//! callers of the reconciliation loop see. Consistency violations are NOT
//! errors: they are routine data that drives the loop.

use reqweave_common::{CompletenessReport, GenError};
use std::fmt;
use thiserror::Error;

/// Generated text did not match the expected structural format.
///
/// Never trusted implicitly: one stage-level retry, then the stage aborts
/// and the prior snapshot is retained.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("no use case blocks found in generator output")]
    NoUseCaseBlocks,

    #[error("use case block \"{0}\" is missing field: {1}")]
    MissingField(String, &'static str),

    #[error("generated use cases do not match the requested set (missing: [{missing}], extra: [{extra}])")]
    NameSetMismatch { missing: String, extra: String },

    #[error("no entity lines found in generator output")]
    NoEntities,

    #[error("malformed cardinality in relation line: {0}")]
    BadCardinality(String),

    #[error("no CRUD tuples found in generator output")]
    NoTriplets,

    #[error("malformed CRUD tuple: {0}")]
    BadTriplet(String),

    #[error("unknown CRUD operation: {0}")]
    BadOperation(String),

    #[error("no bridging relation line found in generator output")]
    NoBridgingRelation,

    #[error("no requirement blocks found in generator output")]
    NoRequirements,

    #[error("requirement block \"{0}\" is missing field: {1}")]
    MissingRequirementField(String, &'static str),
}

/// Pipeline stage names, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    UseCaseModel,
    ErModel,
    CrudMatrix,
    Requirements,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::UseCaseModel => "use-case model",
            Stage::ErModel => "ER model",
            Stage::CrudMatrix => "CRUD matrix",
            Stage::Requirements => "functional requirements",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failures of a pipeline run.
///
/// Whatever surfaces here, the store keeps its last committed, internally
/// consistent snapshot: partial merges never occur.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation failed in {stage} stage: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenError,
    },

    #[error("{stage} stage produced unparseable output: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: ParseError,
    },

    #[error("reconciliation did not converge after {iterations} iterations")]
    Convergence {
        iterations: u32,
        /// Last completeness report, attached for diagnosis
        report: CompletenessReport,
    },

    #[error("reconciliation cancelled after {iterations} iterations")]
    Cancelled { iterations: u32 },
}
