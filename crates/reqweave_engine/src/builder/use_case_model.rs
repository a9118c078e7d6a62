//! Use-case model builder
//!
//! Produces one structured record per requested name, preserving input
//! order. Generated output is held to name-set fidelity: a missing or
//! invented use case is a parse failure, never silently accepted.

use super::parsed_round_trip;
use crate::error::{ParseError, PipelineError, Stage};
use crate::parser::{parse_use_case_blocks, ParsedUseCase};
use crate::store::ArtifactStore;
use reqweave_common::{prompts, DataEntity, RetryConfig, SystemDescription, TextGenerator, UseCase, UseCaseId};
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct UseCaseModelBuilder<'a> {
    generator: &'a dyn TextGenerator,
    retry: &'a RetryConfig,
}

impl<'a> UseCaseModelBuilder<'a> {
    pub fn new(generator: &'a dyn TextGenerator, retry: &'a RetryConfig) -> Self {
        Self { generator, retry }
    }

    /// Build the initial use-case model: one record per input name, in
    /// input order, with store-assigned ids.
    pub fn build(
        &self,
        store: &mut ArtifactStore,
        description: &SystemDescription,
        entities: &[DataEntity],
        names: &[String],
    ) -> Result<Vec<UseCase>, PipelineError> {
        let entity_names: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();
        let prompt = prompts::use_case_model_prompt(description.as_str(), &entity_names, names);

        let mut blocks = parsed_round_trip(
            self.generator,
            self.retry,
            store,
            Stage::UseCaseModel,
            &prompt,
            |text| {
                let blocks = parse_use_case_blocks(text)?;
                validate_fidelity(names, &blocks)?;
                Ok(blocks)
            },
        )?;

        // Fidelity holds, so every input name resolves to exactly one block;
        // reorder to input order and assign ids.
        let mut model = Vec::with_capacity(names.len());
        for name in names {
            if let Some(pos) = blocks.iter().position(|b| &b.name == name) {
                let block = blocks.swap_remove(pos);
                model.push(into_use_case(store.next_use_case_id(), block));
            }
        }
        info!("built use-case model with {} record(s)", model.len());
        Ok(model)
    }

    /// Completion mode: describe newly discovered use cases, one gateway
    /// call per name, preserving input order.
    pub fn complete(
        &self,
        store: &mut ArtifactStore,
        description: &SystemDescription,
        new_names: &[String],
    ) -> Result<Vec<UseCase>, PipelineError> {
        let entity_names = store.entity_names();
        let existing = store.use_case_names();

        let mut added = Vec::with_capacity(new_names.len());
        for name in new_names {
            debug!("requesting description for new use case \"{}\"", name);
            let prompt =
                prompts::new_use_case_prompt(description.as_str(), &entity_names, &existing, name);
            let block = parsed_round_trip(
                self.generator,
                self.retry,
                store,
                Stage::UseCaseModel,
                &prompt,
                |text| {
                    let blocks = parse_use_case_blocks(text)?;
                    blocks
                        .into_iter()
                        .find(|b| &b.name == name)
                        .ok_or_else(|| ParseError::NameSetMismatch {
                            missing: name.clone(),
                            extra: String::new(),
                        })
                },
            )?;
            added.push(into_use_case(store.next_use_case_id(), block));
        }
        Ok(added)
    }
}

fn validate_fidelity(names: &[String], blocks: &[ParsedUseCase]) -> Result<(), ParseError> {
    let want: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let got: BTreeSet<&str> = blocks.iter().map(|b| b.name.as_str()).collect();

    let missing: Vec<&str> = want.difference(&got).copied().collect();
    let extra: Vec<&str> = got.difference(&want).copied().collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(ParseError::NameSetMismatch {
            missing: missing.join(", "),
            extra: extra.join(", "),
        });
    }
    Ok(())
}

fn into_use_case(id: UseCaseId, block: ParsedUseCase) -> UseCase {
    UseCase {
        id,
        name: block.name,
        actors: block.actors,
        preconditions: block.preconditions,
        postconditions: block.postconditions,
        main_flow: block.main_flow,
        alternate_flows: block.alternate_flows,
    }
}
