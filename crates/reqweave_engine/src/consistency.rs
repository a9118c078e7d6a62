//! Structural consistency checking across artifacts
//!
//! Pure functions of the current snapshots; violations are routine data
//! that drives the reconciliation loop, not errors. Output ordering is
//! deterministic: coverage violations in entity order with operations in
//! C, R, U, D order, then isolation, then dangling references.

use reqweave_common::{
    CompletenessReport, CrudMatrix, CrudOp, DataEntity, EntityClass, ErModel, Violation,
};
use std::collections::BTreeSet;

pub struct ConsistencyChecker;

impl ConsistencyChecker {
    pub fn check(er: &ErModel, matrix: &CrudMatrix) -> CompletenessReport {
        let mut violations = Vec::new();

        let mut entities: Vec<&DataEntity> = er.entities.iter().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));

        for entity in entities {
            let ops = matrix.ops_for_entity(&entity.name);
            let missing: Vec<CrudOp> = match entity.class {
                EntityClass::Internal => CrudOp::ALL
                    .iter()
                    .filter(|op| !ops.contains(op))
                    .copied()
                    .collect(),
                EntityClass::External => {
                    if ops.contains(&CrudOp::Read) {
                        Vec::new()
                    } else {
                        vec![CrudOp::Read]
                    }
                }
            };
            if !missing.is_empty() {
                violations.push(Violation::MissingOperations {
                    entity: entity.name.clone(),
                    missing,
                });
            }
        }

        for entity in er.entities_outside_primary() {
            violations.push(Violation::IsolatedEntity { entity });
        }

        // Matrix iteration is ordered, so dangling references come out
        // sorted; deduplicate per (use case, entity) pair
        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
        for triplet in matrix.iter() {
            if !er.contains_entity(&triplet.entity)
                && seen.insert((triplet.use_case.as_str(), triplet.entity.as_str()))
            {
                violations.push(Violation::DanglingReference {
                    use_case: triplet.use_case.clone(),
                    entity: triplet.entity.clone(),
                });
            }
        }

        CompletenessReport::from_violations(violations)
    }
}
