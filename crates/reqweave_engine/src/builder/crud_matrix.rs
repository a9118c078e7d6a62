//! CRUD matrix synthesizer
//!
//! Triplets come from the gateway, grounded in use-case flow text; anything
//! naming an entity or use case absent from the store is rejected before it
//! reaches the matrix. The matrix is a set, so unions deduplicate for free.

use super::{parsed_round_trip, render_use_cases};
use crate::error::{PipelineError, Stage};
use crate::parser::parse_crud_triplets;
use crate::store::ArtifactStore;
use reqweave_common::{
    prompts, CompletenessReport, CrudMatrix, CrudTriplet, RetryConfig, TextGenerator,
};
use tracing::{info, warn};

pub struct CrudMatrixSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
    retry: &'a RetryConfig,
}

impl<'a> CrudMatrixSynthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, retry: &'a RetryConfig) -> Self {
        Self { generator, retry }
    }

    /// Synthesize triplets for the current artifacts and union them with
    /// the prior matrix.
    pub fn synthesize(&self, store: &mut ArtifactStore) -> Result<CrudMatrix, PipelineError> {
        let entity_names = store.entity_names();
        let use_case_names = store.use_case_names();
        let descriptions = render_use_cases(store.use_cases());
        let prompt = prompts::crud_matrix_prompt(&entity_names, &use_case_names, &descriptions);

        let parsed = parsed_round_trip(
            self.generator,
            self.retry,
            store,
            Stage::CrudMatrix,
            &prompt,
            parse_crud_triplets,
        )?;

        let grounded = filter_grounded(store, parsed);
        let mut matrix = store.crud_matrix().clone();
        let before = matrix.len();
        matrix.extend(grounded);
        info!("CRUD synthesis: {} triplet(s), {} new", matrix.len(), matrix.len() - before);
        Ok(matrix)
    }

    /// Completion mode: only the interactions the violation report names as
    /// missing. Existing triplets returned anyway are deduplicated by the
    /// set union at merge time.
    pub fn complete(
        &self,
        store: &mut ArtifactStore,
        report: &CompletenessReport,
    ) -> Result<Vec<CrudTriplet>, PipelineError> {
        let entity_names = store.entity_names();
        let descriptions = render_use_cases(store.use_cases());
        let triplets_text = store
            .crud_matrix()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",\n");
        let prompt = prompts::crud_completion_prompt(
            &entity_names,
            &descriptions,
            &triplets_text,
            &report.to_string(),
        );

        let parsed = parsed_round_trip(
            self.generator,
            self.retry,
            store,
            Stage::CrudMatrix,
            &prompt,
            parse_crud_triplets,
        )?;

        Ok(filter_grounded(store, parsed))
    }
}

/// Reject triplets whose entity or use case is not in the current store.
fn filter_grounded(store: &ArtifactStore, triplets: Vec<CrudTriplet>) -> Vec<CrudTriplet> {
    triplets
        .into_iter()
        .filter(|t| {
            let entity_ok = store.er_model().contains_entity(&t.entity);
            let use_case_ok = store.use_case(&t.use_case).is_some();
            if !entity_ok {
                warn!("rejecting triplet {}: unknown entity", t);
            } else if !use_case_ok {
                warn!("rejecting triplet {}: unknown use case", t);
            }
            entity_ok && use_case_ok
        })
        .collect()
}
