//! ER model synthesizer
//!
//! Initial synthesis derives relations (and inferred join-record entities)
//! from use-case semantics via the gateway. The completion pass is local
//! where it can be: connectivity is computed here, and only the bridging
//! relations for stranded components go back through the gateway. A
//! component with no grounded bridge after one retry is marked for
//! deletion; the merger cascades from there.

use super::parsed_round_trip;
use crate::error::{PipelineError, Stage};
use crate::merge::ArtifactDelta;
use crate::parser::{parse_bridge_relation, parse_er_output};
use crate::store::ArtifactStore;
use reqweave_common::{
    prompts, DataEntity, EntityClass, ErModel, RetryConfig, SystemDescription, TextGenerator,
};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Result of the initial synthesis: the model plus the generator's own
/// account of what it added or removed, so the merger and the use-case
/// builder can act without re-deriving the diff.
#[derive(Debug, Clone)]
pub struct ErSynthesis {
    pub model: ErModel,
    /// Management use cases proposed for inferred entities
    pub new_use_cases: Vec<String>,
    pub removed_use_cases: Vec<String>,
}

pub struct ErModelSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
    retry: &'a RetryConfig,
}

impl<'a> ErModelSynthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, retry: &'a RetryConfig) -> Self {
        Self { generator, retry }
    }

    /// Initial synthesis from the system description, the supplied entities
    /// and the current use-case model.
    ///
    /// Supplied entities are authoritative: they keep their classification
    /// and are never dropped here, even if the generator omits them.
    /// Inferred entities come in as internal.
    pub fn synthesize(
        &self,
        store: &mut ArtifactStore,
        description: &SystemDescription,
        entities: &[DataEntity],
    ) -> Result<ErSynthesis, PipelineError> {
        let entity_names: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();
        let use_case_names = store.use_case_names();
        let prompt = prompts::er_model_prompt(description.as_str(), &entity_names, &use_case_names);

        let parse = parsed_round_trip(
            self.generator,
            self.retry,
            store,
            Stage::ErModel,
            &prompt,
            parse_er_output,
        )?;

        let mut model = ErModel::default();
        for entity in entities {
            let attributes = parse
                .entities
                .iter()
                .find(|(name, _)| name == &entity.name)
                .map(|(_, attrs)| attrs.clone())
                .unwrap_or_else(|| entity.attributes.clone());
            model
                .entities
                .push(entity.clone().with_attributes(attributes));
        }
        for (name, attrs) in &parse.entities {
            if !model.contains_entity(name) {
                info!("ER synthesis inferred entity \"{}\"", name);
                model.entities.push(
                    DataEntity::new(name.clone(), EntityClass::Internal)
                        .with_attributes(attrs.clone()),
                );
            }
        }

        for relation in parse.relations {
            if model.contains_entity(&relation.left) && model.contains_entity(&relation.right) {
                model.relations.push(relation);
            } else {
                warn!("dropping relation naming unknown entity: {}", relation);
            }
        }

        if !parse.removed_entities.is_empty() {
            // Supplied entities cannot be removed by the initial synthesis;
            // isolation handling is the only deletion path.
            warn!(
                "ignoring removal of supplied entities: {}",
                parse.removed_entities.join(", ")
            );
        }

        Ok(ErSynthesis {
            model,
            new_use_cases: parse.new_use_cases,
            removed_use_cases: parse.removed_use_cases,
        })
    }

    /// Completion pass: compute connected components and, for every
    /// component other than the primary, either obtain a grounded bridging
    /// relation or mark the component's entities for deletion.
    pub fn complete_connectivity(
        &self,
        store: &mut ArtifactStore,
        description: &SystemDescription,
    ) -> Result<ArtifactDelta, PipelineError> {
        let er = store.er_model().clone();
        let components = er.connected_components();
        if components.len() <= 1 {
            return Ok(ArtifactDelta::default());
        }

        let primary = match er.primary_component() {
            Some(p) => p,
            None => return Ok(ArtifactDelta::default()),
        };
        let primary_set: BTreeSet<&str> = primary.iter().map(String::as_str).collect();
        let use_case_names = store.use_case_names();

        let mut delta = ArtifactDelta::default();
        for component in &components {
            if component == &primary {
                continue;
            }
            let component_set: BTreeSet<&str> = component.iter().map(String::as_str).collect();
            let prompt = prompts::er_bridge_prompt(
                description.as_str(),
                &primary,
                component,
                &use_case_names,
            );

            let bridged = parsed_round_trip(
                self.generator,
                self.retry,
                store,
                Stage::ErModel,
                &prompt,
                |text| {
                    let relation = parse_bridge_relation(text)?;
                    let joins = (component_set.contains(relation.left.as_str())
                        && primary_set.contains(relation.right.as_str()))
                        || (component_set.contains(relation.right.as_str())
                            && primary_set.contains(relation.left.as_str()));
                    if !joins {
                        return Err(crate::error::ParseError::NoBridgingRelation);
                    }
                    Ok(relation)
                },
            );

            match bridged {
                Ok(relation) => {
                    info!("bridging component via: {}", relation);
                    delta.new_relations.push(relation);
                }
                Err(PipelineError::Parse { .. }) => {
                    info!(
                        "no grounded relation for isolated entities [{}]; marking for deletion",
                        component.join(", ")
                    );
                    delta.remove_entities.extend(component.iter().cloned());
                }
                Err(other) => return Err(other),
            }
        }
        Ok(delta)
    }
}
