//! Core artifact types for requirements synthesis.
//!
//! Everything the pipeline produces or reconciles lives here: data entities,
//! use cases, ER relations, CRUD triplets, completeness reports, and the
//! append-only interaction log. Identity keys are names (entity name,
//! use-case name, triplet tuple); the store enforces uniqueness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// Free-text description of the target system. Immutable once supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescription(String);

impl SystemDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Classification of a data entity relative to the system boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    /// Lives inside the system boundary; must be fully CRUD-covered
    #[default]
    Internal,
    /// Third-party or upstream system; only needs to be read
    External,
}

/// A data entity with its attributes. Unique by name within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntity {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub class: EntityClass,
}

impl DataEntity {
    pub fn new(name: impl Into<String>, class: EntityClass) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            class,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Monotonic use-case identifier, rendered as `UC-NN`.
///
/// Ids are assigned by the store counter, never trusted from generator
/// output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UseCaseId(pub u32);

impl UseCaseId {
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().strip_prefix("UC-")?.parse().ok().map(Self)
    }
}

impl fmt::Display for UseCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UC-{:02}", self.0)
    }
}

/// A structured use-case record. Unique by name within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCase {
    pub id: UseCaseId,
    pub name: String,
    pub actors: Vec<String>,
    pub preconditions: String,
    pub postconditions: String,
    /// Ordered main-flow steps
    pub main_flow: Vec<String>,
    pub alternate_flows: Vec<String>,
}

impl fmt::Display for UseCase {
    /// Renders the boundary block format, `=== Use Case: <Name> ===`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Use Case: {} ===", self.name)?;
        writeln!(f, "Primary Actor(s): {}", self.actors.join(", "))?;
        writeln!(f, "Preconditions: {}", self.preconditions)?;
        writeln!(f, "Postconditions: {}", self.postconditions)?;
        writeln!(f, "Main Flow:")?;
        for (i, step) in self.main_flow.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, step)?;
        }
        writeln!(f, "Alternate Flow(s):")?;
        for alt in &self.alternate_flows {
            writeln!(f, "  - {}", alt)?;
        }
        writeln!(f, "===============================")
    }
}

/// Relation endpoint cardinality, e.g. `1`, `1..1`, `0..*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality(String);

impl Cardinality {
    /// Accepts `N`, `*`, and `N..M` forms where N, M are digits or `*`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let bound_ok = |b: &str| b == "*" || (!b.is_empty() && b.chars().all(|c| c.is_ascii_digit()));
        let valid = match s.split_once("..") {
            Some((lo, hi)) => bound_ok(lo) && bound_ok(hi),
            None => bound_ok(s),
        };
        valid.then(|| Self(s.to_string()))
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An edge between two data entities, undirected for connectivity purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub left: String,
    pub left_card: Cardinality,
    pub right: String,
    pub right_card: Cardinality,
    pub verb: String,
}

impl Relation {
    pub fn touches(&self, entity: &str) -> bool {
        self.left == entity || self.right == entity
    }

    /// Identity key for deduplication: endpoints plus verb phrase.
    pub fn key(&self) -> (String, String, String) {
        (self.left.clone(), self.right.clone(), self.verb.clone())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" --> \"{}\" {} : {}",
            self.left, self.left_card, self.right_card, self.right, self.verb
        )
    }
}

/// ER model: entity set plus relation set.
///
/// The relations induce an undirected graph over the entities; after a
/// completion pass the graph must be weakly connected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErModel {
    pub entities: Vec<DataEntity>,
    pub relations: Vec<Relation>,
}

impl ErModel {
    pub fn entity(&self, name: &str) -> Option<&DataEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entity(name).is_some()
    }

    /// Weakly connected components of the entity-relation graph.
    ///
    /// Component members are sorted; components are ordered by their first
    /// member, so the result is deterministic. Relations naming unknown
    /// entities contribute no edges.
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let names: BTreeSet<&str> = self.entities.iter().map(|e| e.name.as_str()).collect();
        let mut adj: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for rel in &self.relations {
            if names.contains(rel.left.as_str()) && names.contains(rel.right.as_str()) {
                adj.entry(rel.left.as_str()).or_default().push(rel.right.as_str());
                adj.entry(rel.right.as_str()).or_default().push(rel.left.as_str());
            }
        }

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut components = Vec::new();
        for start in &names {
            if seen.contains(start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([*start]);
            while let Some(name) = queue.pop_front() {
                if !seen.insert(name) {
                    continue;
                }
                component.insert(name.to_string());
                if let Some(neighbors) = adj.get(name) {
                    queue.extend(neighbors.iter().copied());
                }
            }
            components.push(component.into_iter().collect());
        }
        components
    }

    /// The component chosen as primary: the largest one, ties broken by the
    /// lexicographically smallest member.
    pub fn primary_component(&self) -> Option<Vec<String>> {
        self.connected_components()
            .into_iter()
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b[0].cmp(&a[0])))
    }

    /// Entities not reachable from the primary component, sorted by name.
    pub fn entities_outside_primary(&self) -> Vec<String> {
        let primary: BTreeSet<String> = match self.primary_component() {
            Some(c) => c.into_iter().collect(),
            None => return Vec::new(),
        };
        let mut outside: Vec<String> = self
            .entities
            .iter()
            .map(|e| e.name.clone())
            .filter(|n| !primary.contains(n))
            .collect();
        outside.sort();
        outside
    }

    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }
}

impl fmt::Display for ErModel {
    /// Renders the boundary format: entity list plus relation list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entities:")?;
        for entity in &self.entities {
            writeln!(f, "- {}: {}", entity.name, entity.attributes.join(", "))?;
        }
        writeln!(f, "Relations:")?;
        for relation in &self.relations {
            writeln!(f, "- {}", relation)?;
        }
        Ok(())
    }
}

/// One of the four CRUD operations. The derived order (C, R, U, D) is the
/// order reports render missing operations in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CrudOp {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudOp {
    pub const ALL: [CrudOp; 4] = [CrudOp::Create, CrudOp::Read, CrudOp::Update, CrudOp::Delete];

    pub fn letter(&self) -> char {
        match self {
            CrudOp::Create => 'C',
            CrudOp::Read => 'R',
            CrudOp::Update => 'U',
            CrudOp::Delete => 'D',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(CrudOp::Create),
            'R' => Some(CrudOp::Read),
            'U' => Some(CrudOp::Update),
            'D' => Some(CrudOp::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for CrudOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// An assertion that a use case performs an operation on an entity.
///
/// Derived `Ord` gives entity-then-use-case-then-operation ordering, which
/// is what keeps matrix iteration and reports deterministic.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CrudTriplet {
    pub entity: String,
    pub use_case: String,
    pub op: CrudOp,
}

impl CrudTriplet {
    pub fn new(entity: impl Into<String>, use_case: impl Into<String>, op: CrudOp) -> Self {
        Self {
            entity: entity.into(),
            use_case: use_case.into(),
            op,
        }
    }
}

impl fmt::Display for CrudTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\"{}\", \"{}\", \"{}\")", self.entity, self.use_case, self.op)
    }
}

/// Set of CRUD triplets. Set semantics: no duplicates, deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudMatrix {
    triplets: BTreeSet<CrudTriplet>,
}

impl CrudMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the triplet was already present.
    pub fn insert(&mut self, triplet: CrudTriplet) -> bool {
        self.triplets.insert(triplet)
    }

    pub fn contains(&self, triplet: &CrudTriplet) -> bool {
        self.triplets.contains(triplet)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrudTriplet> {
        self.triplets.iter()
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Union of operations across all triplets for the given entity.
    pub fn ops_for_entity(&self, entity: &str) -> BTreeSet<CrudOp> {
        self.triplets
            .iter()
            .filter(|t| t.entity == entity)
            .map(|t| t.op)
            .collect()
    }

    /// Drop every triplet referencing the given entity.
    pub fn remove_entity(&mut self, entity: &str) {
        self.triplets.retain(|t| t.entity != entity);
    }

    /// Drop every triplet referencing the given use case.
    pub fn remove_use_case(&mut self, use_case: &str) {
        self.triplets.retain(|t| t.use_case != use_case);
    }
}

impl Extend<CrudTriplet> for CrudMatrix {
    fn extend<I: IntoIterator<Item = CrudTriplet>>(&mut self, iter: I) {
        self.triplets.extend(iter);
    }
}

impl FromIterator<CrudTriplet> for CrudMatrix {
    fn from_iter<I: IntoIterator<Item = CrudTriplet>>(iter: I) -> Self {
        Self {
            triplets: iter.into_iter().collect(),
        }
    }
}

/// A structural defect found by the consistency checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// An entity's triplet union does not meet its class requirement
    MissingOperations {
        entity: String,
        missing: Vec<CrudOp>,
    },
    /// An entity not reachable from the primary ER component
    IsolatedEntity { entity: String },
    /// A triplet naming an entity absent from the ER model
    DanglingReference { use_case: String, entity: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingOperations { entity, missing } => {
                let ops: Vec<String> = missing.iter().map(|op| op.to_string()).collect();
                write!(
                    f,
                    "Entity \"{}\" is missing operation(s): {}",
                    entity,
                    ops.join(", ")
                )
            }
            Violation::IsolatedEntity { entity } => {
                write!(f, "Entity \"{}\" has no relation to any other entity", entity)
            }
            Violation::DanglingReference { use_case, entity } => {
                write!(
                    f,
                    "Use case \"{}\" references entity \"{}\" which is not in the ER model",
                    use_case, entity
                )
            }
        }
    }
}

/// Terminal status of a completeness evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pass,
    Fail,
}

/// Ordered violation list plus terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub violations: Vec<Violation>,
    pub status: ReportStatus,
}

impl CompletenessReport {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let status = if violations.is_empty() {
            ReportStatus::Pass
        } else {
            ReportStatus::Fail
        };
        Self { violations, status }
    }

    pub fn passed(&self) -> bool {
        self.status == ReportStatus::Pass
    }

    pub fn isolated_entities(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter_map(|v| match v {
                Violation::IsolatedEntity { entity } => Some(entity.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for CompletenessReport {
    /// One line per violation; `Evaluation Result: Pass` only when clean.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }
        if self.passed() {
            writeln!(f, "Evaluation Result: Pass")?;
        }
        Ok(())
    }
}

/// Speaker role in the interaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One interaction record: who said what, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Append-only sequence of interaction records.
///
/// Provenance for every generation round-trip; entries are never reordered
/// or removed, only appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionLog {
    entries: Vec<LogEntry>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: ChatRole, content: impl Into<String>) {
        self.entries.push(LogEntry {
            role,
            content: content.into(),
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A derived functional requirement (`FR-NN`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalRequirement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input: String,
    pub output: String,
}

/// Chapter 1 of the generated SRS: the functional requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsDocument {
    pub requirements: Vec<FunctionalRequirement>,
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_use_case_id_roundtrip() {
        let id = UseCaseId(7);
        assert_eq!(id.to_string(), "UC-07");
        assert_eq!(UseCaseId::parse("UC-07"), Some(id));
        assert_eq!(UseCaseId::parse("UC-123"), Some(UseCaseId(123)));
        assert_eq!(UseCaseId::parse("FR-01"), None);
        assert_eq!(UseCaseId::parse("UC-"), None);
    }

    #[test]
    fn test_cardinality_accepts_common_forms() {
        for s in ["1", "0..*", "1..1", "*", "0..1"] {
            assert!(Cardinality::parse(s).is_some(), "rejected {}", s);
        }
        for s in ["", "one", "1..", "..*", "1...2"] {
            assert!(Cardinality::parse(s).is_none(), "accepted {}", s);
        }
    }

    #[test]
    fn test_crud_op_letters() {
        assert_eq!(CrudOp::from_letter('c'), Some(CrudOp::Create));
        assert_eq!(CrudOp::from_letter('D'), Some(CrudOp::Delete));
        assert_eq!(CrudOp::from_letter('X'), None);
        assert_eq!(CrudOp::Update.letter(), 'U');
    }

    #[test]
    fn test_crud_matrix_deduplicates() {
        let mut matrix = CrudMatrix::new();
        assert!(matrix.insert(CrudTriplet::new("Book", "Borrow Book", CrudOp::Read)));
        assert!(!matrix.insert(CrudTriplet::new("Book", "Borrow Book", CrudOp::Read)));
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn test_crud_matrix_ops_union() {
        let matrix: CrudMatrix = [
            CrudTriplet::new("Book", "Manage Book", CrudOp::Create),
            CrudTriplet::new("Book", "Borrow Book", CrudOp::Read),
            CrudTriplet::new("Student", "Borrow Book", CrudOp::Read),
        ]
        .into_iter()
        .collect();

        let ops = matrix.ops_for_entity("Book");
        assert!(ops.contains(&CrudOp::Create));
        assert!(ops.contains(&CrudOp::Read));
        assert!(!ops.contains(&CrudOp::Delete));
    }

    #[test]
    fn test_connected_components_split() {
        let model = ErModel {
            entities: vec![entity("Student"), entity("Book"), entity("ReviewRecord")],
            relations: vec![relation("Student", "Book", "borrows")],
        };

        let components = model.connected_components();
        assert_eq!(components.len(), 2);
        assert!(!model.is_connected());
        assert_eq!(model.primary_component().unwrap(), vec!["Book", "Student"]);
        assert_eq!(model.entities_outside_primary(), vec!["ReviewRecord"]);
    }

    #[test]
    fn test_connected_components_single_entity() {
        let model = ErModel {
            entities: vec![entity("Book")],
            relations: vec![],
        };
        assert!(model.is_connected());
        assert!(model.entities_outside_primary().is_empty());
    }

    #[test]
    fn test_relation_to_unknown_entity_adds_no_edge() {
        let model = ErModel {
            entities: vec![entity("Student"), entity("Book")],
            relations: vec![relation("Student", "Ghost", "haunts")],
        };
        assert_eq!(model.connected_components().len(), 2);
    }

    #[test]
    fn test_report_display_missing_ops() {
        let report = CompletenessReport::from_violations(vec![Violation::MissingOperations {
            entity: "Admin".to_string(),
            missing: vec![CrudOp::Update, CrudOp::Delete],
        }]);

        let text = report.to_string();
        assert!(text.contains("Entity \"Admin\" is missing operation(s): U, D"));
        assert!(!text.contains("Evaluation Result: Pass"));
    }

    #[test]
    fn test_report_display_pass() {
        let report = CompletenessReport::from_violations(vec![]);
        assert!(report.passed());
        assert_eq!(report.to_string(), "Evaluation Result: Pass\n");
    }

    #[test]
    fn test_interaction_log_appends_in_order() {
        let mut log = InteractionLog::new();
        log.append(ChatRole::User, "prompt");
        log.append(ChatRole::Assistant, "response");

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].role, ChatRole::User);
        assert_eq!(log.entries()[1].content, "response");
    }
}
