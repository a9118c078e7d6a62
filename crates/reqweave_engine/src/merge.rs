//! Delta merging
//!
//! A delta is a generated fragment: new entities, relations, use cases,
//! triplets, or a deletion list. Unions deduplicate by identity key (the
//! existing snapshot wins); deletions cascade so no artifact is left
//! referencing a removed entity. Merging an empty delta changes nothing.
//!
//! The merge works on snapshot copies and commits each artifact kind at the
//! end, so a reader never observes a half-applied delta.

use crate::store::ArtifactStore;
use reqweave_common::{CrudTriplet, DataEntity, Relation, UseCase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactDelta {
    pub new_entities: Vec<DataEntity>,
    pub new_relations: Vec<Relation>,
    pub new_use_cases: Vec<UseCase>,
    pub new_triplets: Vec<CrudTriplet>,
    pub remove_entities: Vec<String>,
    pub remove_use_cases: Vec<String>,
}

impl ArtifactDelta {
    pub fn is_empty(&self) -> bool {
        self.new_entities.is_empty()
            && self.new_relations.is_empty()
            && self.new_use_cases.is_empty()
            && self.new_triplets.is_empty()
            && self.remove_entities.is_empty()
            && self.remove_use_cases.is_empty()
    }
}

pub struct DeltaMerger;

impl DeltaMerger {
    pub fn apply(store: &mut ArtifactStore, delta: &ArtifactDelta) {
        if delta.is_empty() {
            return;
        }

        let mut er = store.er_model().clone();
        let mut use_cases = store.use_cases().to_vec();
        let mut matrix = store.crud_matrix().clone();

        // Additions, deduplicated by identity key
        for entity in &delta.new_entities {
            if er.contains_entity(&entity.name) {
                debug!("entity \"{}\" already present, keeping existing", entity.name);
            } else {
                er.entities.push(entity.clone());
            }
        }
        for relation in &delta.new_relations {
            if !er.contains_entity(&relation.left) || !er.contains_entity(&relation.right) {
                warn!("dropping relation naming unknown entity: {}", relation);
                continue;
            }
            if !er.relations.iter().any(|r| r.key() == relation.key()) {
                er.relations.push(relation.clone());
            }
        }
        for use_case in &delta.new_use_cases {
            if use_cases.iter().any(|u| u.name == use_case.name) {
                debug!("use case \"{}\" already present, keeping existing", use_case.name);
            } else {
                use_cases.push(use_case.clone());
            }
        }
        for triplet in &delta.new_triplets {
            if er.contains_entity(&triplet.entity)
                && use_cases.iter().any(|u| u.name == triplet.use_case)
            {
                matrix.insert(triplet.clone());
            } else {
                warn!("dropping triplet {} with unresolved reference", triplet);
            }
        }

        // Deletions cascade: relations touching the entity, the management
        // use case introduced for it, and every triplet referencing either
        let mut doomed_use_cases: BTreeSet<String> =
            delta.remove_use_cases.iter().cloned().collect();
        for entity in &delta.remove_entities {
            info!("removing entity \"{}\" and everything referencing it", entity);
            er.entities.retain(|e| &e.name != entity);
            er.relations.retain(|r| !r.touches(entity));
            matrix.remove_entity(entity);
            doomed_use_cases.insert(format!("Manage {}", entity));
        }
        for name in &doomed_use_cases {
            if use_cases.iter().any(|u| &u.name == name) {
                info!("cascade: removing use case \"{}\"", name);
            }
            use_cases.retain(|u| &u.name != name);
            matrix.remove_use_case(name);
        }

        store.commit_er_model(er);
        store.commit_use_cases(use_cases);
        store.commit_crud_matrix(matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqweave_common::{Cardinality, CrudMatrix, CrudOp, EntityClass, ErModel, UseCaseId};

    fn entity(name: &str) -> DataEntity {
        DataEntity::new(name, EntityClass::Internal)
    }

    fn relation(left: &str, right: &str, verb: &str) -> Relation {
        Relation {
            left: left.to_string(),
            left_card: Cardinality::parse("1").unwrap(),
            right: right.to_string(),
            right_card: Cardinality::parse("0..*").unwrap(),
            verb: verb.to_string(),
        }
    }

    fn use_case(id: u32, name: &str) -> UseCase {
        UseCase {
            id: UseCaseId(id),
            name: name.to_string(),
            actors: vec!["Admin".to_string()],
            preconditions: String::new(),
            postconditions: String::new(),
            main_flow: vec!["step".to_string()],
            alternate_flows: vec![],
        }
    }

    fn seeded_store() -> ArtifactStore {
        let mut store = ArtifactStore::new();
        store.commit_er_model(ErModel {
            entities: vec![entity("Student"), entity("Book"), entity("ReviewRecord")],
            relations: vec![relation("Student", "Book", "borrows")],
        });
        store.commit_use_cases(vec![
            use_case(1, "Borrow Book"),
            use_case(2, "Manage ReviewRecord"),
        ]);
        store.commit_crud_matrix(
            [
                CrudTriplet::new("Book", "Borrow Book", CrudOp::Read),
                CrudTriplet::new("ReviewRecord", "Manage ReviewRecord", CrudOp::Create),
                CrudTriplet::new("ReviewRecord", "Borrow Book", CrudOp::Read),
            ]
            .into_iter()
            .collect(),
        );
        store
    }

    #[test]
    fn test_empty_delta_is_a_no_op() {
        let mut store = seeded_store();
        let er_before = store.er_model().clone();
        let ucs_before = store.use_cases().to_vec();
        let matrix_before = store.crud_matrix().clone();

        DeltaMerger::apply(&mut store, &ArtifactDelta::default());

        assert_eq!(store.er_model(), &er_before);
        assert_eq!(store.use_cases(), ucs_before.as_slice());
        assert_eq!(store.crud_matrix(), &matrix_before);
    }

    #[test]
    fn test_additions_deduplicate_by_identity_key() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            new_entities: vec![entity("Book"), entity("Subject")],
            new_relations: vec![
                relation("Student", "Book", "borrows"), // already present
                relation("Book", "Subject", "belongs to"),
            ],
            new_use_cases: vec![use_case(9, "Borrow Book"), use_case(10, "Manage Subject")],
            new_triplets: vec![
                CrudTriplet::new("Book", "Borrow Book", CrudOp::Read), // already present
                CrudTriplet::new("Subject", "Manage Subject", CrudOp::Create),
            ],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);

        assert_eq!(store.er_model().entities.len(), 4);
        assert_eq!(store.er_model().relations.len(), 2);
        // Existing snapshot wins: the original Borrow Book record survives
        let borrow = store.use_case("Borrow Book").unwrap();
        assert_eq!(borrow.id, UseCaseId(1));
        assert_eq!(store.use_cases().len(), 3);
        assert_eq!(store.crud_matrix().len(), 4);
    }

    #[test]
    fn test_merge_is_idempotent_for_repeated_delta() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            new_entities: vec![entity("Subject")],
            new_relations: vec![relation("Book", "Subject", "belongs to")],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);
        let er_after_first = store.er_model().clone();
        DeltaMerger::apply(&mut store, &delta);

        assert_eq!(store.er_model(), &er_after_first);
    }

    #[test]
    fn test_entity_removal_cascades() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            remove_entities: vec!["ReviewRecord".to_string()],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);

        // Entity gone from the ER model
        assert!(!store.er_model().contains_entity("ReviewRecord"));
        // Its management use case gone
        assert!(store.use_case("Manage ReviewRecord").is_none());
        // Every triplet referencing it gone, including via other use cases
        assert!(store.crud_matrix().iter().all(|t| t.entity != "ReviewRecord"));
        // Unrelated artifacts untouched
        assert!(store.use_case("Borrow Book").is_some());
        assert!(store
            .crud_matrix()
            .contains(&CrudTriplet::new("Book", "Borrow Book", CrudOp::Read)));
    }

    #[test]
    fn test_relation_removal_cascades_with_entity() {
        let mut store = seeded_store();
        // Wire ReviewRecord into the graph first
        DeltaMerger::apply(
            &mut store,
            &ArtifactDelta {
                new_relations: vec![relation("Student", "ReviewRecord", "writes")],
                ..ArtifactDelta::default()
            },
        );
        assert_eq!(store.er_model().relations.len(), 2);

        DeltaMerger::apply(
            &mut store,
            &ArtifactDelta {
                remove_entities: vec!["ReviewRecord".to_string()],
                ..ArtifactDelta::default()
            },
        );

        assert_eq!(store.er_model().relations.len(), 1);
        assert!(store.er_model().relations.iter().all(|r| !r.touches("ReviewRecord")));
    }

    #[test]
    fn test_explicit_use_case_removal() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            remove_use_cases: vec!["Borrow Book".to_string()],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);

        assert!(store.use_case("Borrow Book").is_none());
        assert!(store.crud_matrix().iter().all(|t| t.use_case != "Borrow Book"));
    }

    #[test]
    fn test_unresolved_triplet_is_dropped() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            new_triplets: vec![CrudTriplet::new("Ghost", "Borrow Book", CrudOp::Read)],
            ..ArtifactDelta::default()
        };

        let before = store.crud_matrix().len();
        DeltaMerger::apply(&mut store, &delta);
        assert_eq!(store.crud_matrix().len(), before);
    }

    #[test]
    fn test_unresolved_relation_is_dropped() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            new_relations: vec![relation("Student", "Ghost", "haunts")],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);
        assert_eq!(store.er_model().relations.len(), 1);
    }

    #[test]
    fn test_added_entity_resolves_added_relation_in_same_delta() {
        let mut store = seeded_store();
        let delta = ArtifactDelta {
            new_entities: vec![entity("BorrowRecord")],
            new_relations: vec![relation("Student", "BorrowRecord", "creates")],
            ..ArtifactDelta::default()
        };

        DeltaMerger::apply(&mut store, &delta);

        assert!(store.er_model().contains_entity("BorrowRecord"));
        assert_eq!(store.er_model().relations.len(), 2);
    }
}
