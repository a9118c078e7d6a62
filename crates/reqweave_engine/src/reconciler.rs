//! Reconciliation loop
//!
//! Sequences artifact construction, alternates consistency checking with
//! targeted completion, and bounds iteration. The loop is the sole writer
//! of the store; every stage commits all-or-nothing, so whatever terminal
//! is reached, the store holds the last internally consistent snapshot.
//!
//! State machine:
//! `Init -> BuildUseCases -> BuildEr -> BuildCrud -> Check ->
//!  {Pass | RequestCompletion -> Merge -> Check ...} ->
//!  Terminated(Pass | ConvergenceFailure)`

use crate::builder::{
    CrudMatrixSynthesizer, ErModelSynthesizer, RequirementsWriter, UseCaseModelBuilder,
};
use crate::consistency::ConsistencyChecker;
use crate::error::PipelineError;
use crate::merge::{ArtifactDelta, DeltaMerger};
use crate::store::ArtifactStore;
use reqweave_common::{
    CompletenessReport, DataEntity, EntityClass, PipelineConfig, SystemDescription, TextGenerator,
    Violation,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Initial inputs supplied by the human.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisInputs {
    pub description: SystemDescription,
    pub entities: Vec<DataEntity>,
    pub use_case_names: Vec<String>,
}

/// What a successful run returns; the artifacts themselves live in the
/// caller's store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub report: CompletenessReport,
    /// Completion iterations that ran before Pass (0 = first check passed)
    pub iterations: u32,
}

/// Cooperative cancellation, checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct Reconciler<'a> {
    generator: &'a dyn TextGenerator,
    config: &'a PipelineConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(generator: &'a dyn TextGenerator, config: &'a PipelineConfig) -> Self {
        Self { generator, config }
    }

    pub fn run(
        &self,
        store: &mut ArtifactStore,
        inputs: &SynthesisInputs,
    ) -> Result<PipelineOutput, PipelineError> {
        self.run_with_cancel(store, inputs, &CancelToken::new())
    }

    pub fn run_with_cancel(
        &self,
        store: &mut ArtifactStore,
        inputs: &SynthesisInputs,
        cancel: &CancelToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let uc_builder = UseCaseModelBuilder::new(self.generator, &self.config.retry);
        let er_builder = ErModelSynthesizer::new(self.generator, &self.config.retry);
        let crud_builder = CrudMatrixSynthesizer::new(self.generator, &self.config.retry);

        // BuildUseCases
        info!(
            "building use-case model for {} name(s)",
            inputs.use_case_names.len()
        );
        let model = uc_builder.build(
            store,
            &inputs.description,
            &inputs.entities,
            &inputs.use_case_names,
        )?;
        store.commit_use_cases(model);

        // BuildEr
        info!("synthesizing ER model over {} entities", inputs.entities.len());
        let synthesis = er_builder.synthesize(store, &inputs.description, &inputs.entities)?;
        store.commit_er_model(synthesis.model);

        // Inferred entities arrive with proposed management use cases that
        // still need descriptions
        let fresh: Vec<String> = synthesis
            .new_use_cases
            .into_iter()
            .filter(|name| store.use_case(name).is_none())
            .collect();
        if !fresh.is_empty() {
            let added = uc_builder.complete(store, &inputs.description, &fresh)?;
            DeltaMerger::apply(
                store,
                &ArtifactDelta {
                    new_use_cases: added,
                    ..ArtifactDelta::default()
                },
            );
        }
        if !synthesis.removed_use_cases.is_empty() {
            DeltaMerger::apply(
                store,
                &ArtifactDelta {
                    remove_use_cases: synthesis.removed_use_cases,
                    ..ArtifactDelta::default()
                },
            );
        }

        // BuildCrud
        let matrix = crud_builder.synthesize(store)?;
        store.commit_crud_matrix(matrix);

        // Check <-> RequestCompletion/Merge
        let mut iterations = 0u32;
        loop {
            let report = ConsistencyChecker::check(store.er_model(), store.crud_matrix());
            if report.passed() {
                info!("consistency check passed after {} iteration(s)", iterations);
                if self.config.write_requirements {
                    let writer = RequirementsWriter::new(self.generator, &self.config.retry);
                    let doc = writer.write(store, &inputs.description)?;
                    store.commit_requirements(doc);
                }
                return Ok(PipelineOutput { report, iterations });
            }

            if iterations >= self.config.max_iterations {
                warn!(
                    "iteration bound {} reached with {} open violation(s)",
                    self.config.max_iterations,
                    report.violations.len()
                );
                return Err(PipelineError::Convergence { iterations, report });
            }
            if cancel.is_cancelled() {
                info!("cancelled between iterations; last committed snapshot stands");
                return Err(PipelineError::Cancelled { iterations });
            }

            iterations += 1;
            debug!(
                "iteration {}/{}: {} violation(s)",
                iterations,
                self.config.max_iterations,
                report.violations.len()
            );

            // Isolated entities: bridge them into the primary component or
            // cascade them out
            if !report.isolated_entities().is_empty() {
                let delta = er_builder.complete_connectivity(store, &inputs.description)?;
                DeltaMerger::apply(store, &delta);
            }

            // Re-check coverage against what survived the ER completion
            let report = ConsistencyChecker::check(store.er_model(), store.crud_matrix());

            // Internal entities with uncovered operations get a management
            // use case if none exists yet
            let new_names = self.missing_management_use_cases(store, &report);
            if !new_names.is_empty() {
                let added = uc_builder.complete(store, &inputs.description, &new_names)?;
                DeltaMerger::apply(
                    store,
                    &ArtifactDelta {
                        new_use_cases: added,
                        ..ArtifactDelta::default()
                    },
                );
            }

            // CRUD completion for whatever the report still names
            let needs_crud = report
                .violations
                .iter()
                .any(|v| matches!(v, Violation::MissingOperations { .. }));
            if needs_crud {
                let new_triplets = crud_builder.complete(store, &report)?;
                DeltaMerger::apply(
                    store,
                    &ArtifactDelta {
                        new_triplets,
                        ..ArtifactDelta::default()
                    },
                );
            }
        }
    }

    /// `Manage <Entity>` names for internal entities with uncovered
    /// operations and no management use case yet.
    fn missing_management_use_cases(
        &self,
        store: &ArtifactStore,
        report: &CompletenessReport,
    ) -> Vec<String> {
        report
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::MissingOperations { entity, .. } => Some(entity),
                _ => None,
            })
            .filter(|entity| {
                store
                    .er_model()
                    .entity(entity)
                    .is_some_and(|e| e.class == EntityClass::Internal)
            })
            .map(|entity| format!("Manage {}", entity))
            .filter(|name| store.use_case(name).is_none())
            .collect()
    }
}
