//! Artifact store: current snapshots plus the append-only interaction log
//!
//! One owner, one writer (the orchestrator). Commits replace a snapshot
//! wholesale, per artifact kind: readers never observe a partially updated
//! artifact. Log entries are only ever appended.

use reqweave_common::{
    ChatRole, CrudMatrix, ErModel, InteractionLog, RequirementsDocument, UseCase, UseCaseId,
};

#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    use_cases: Vec<UseCase>,
    er_model: ErModel,
    crud_matrix: CrudMatrix,
    requirements: Option<RequirementsDocument>,
    log: InteractionLog,
    next_use_case: u32,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            next_use_case: 1,
            ..Self::default()
        }
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    pub fn use_case(&self, name: &str) -> Option<&UseCase> {
        self.use_cases.iter().find(|uc| uc.name == name)
    }

    pub fn use_case_names(&self) -> Vec<String> {
        self.use_cases.iter().map(|uc| uc.name.clone()).collect()
    }

    pub fn er_model(&self) -> &ErModel {
        &self.er_model
    }

    pub fn entity_names(&self) -> Vec<String> {
        self.er_model.entities.iter().map(|e| e.name.clone()).collect()
    }

    pub fn crud_matrix(&self) -> &CrudMatrix {
        &self.crud_matrix
    }

    pub fn requirements(&self) -> Option<&RequirementsDocument> {
        self.requirements.as_ref()
    }

    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    /// Replace the use-case model snapshot. The id counter advances past
    /// every committed id so assignment stays monotonic.
    pub fn commit_use_cases(&mut self, model: Vec<UseCase>) {
        for uc in &model {
            if uc.id.0 >= self.next_use_case {
                self.next_use_case = uc.id.0 + 1;
            }
        }
        self.use_cases = model;
    }

    pub fn commit_er_model(&mut self, model: ErModel) {
        self.er_model = model;
    }

    pub fn commit_crud_matrix(&mut self, matrix: CrudMatrix) {
        self.crud_matrix = matrix;
    }

    pub fn commit_requirements(&mut self, doc: RequirementsDocument) {
        self.requirements = Some(doc);
    }

    pub fn append_log(&mut self, role: ChatRole, content: impl Into<String>) {
        self.log.append(role, content);
    }

    /// Assign the next monotonic use-case id.
    pub fn next_use_case_id(&mut self) -> UseCaseId {
        let id = UseCaseId(self.next_use_case);
        self.next_use_case += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqweave_common::{CrudOp, CrudTriplet};

    fn use_case(id: u32, name: &str) -> UseCase {
        UseCase {
            id: UseCaseId(id),
            name: name.to_string(),
            actors: vec!["Student".to_string()],
            preconditions: String::new(),
            postconditions: String::new(),
            main_flow: vec!["step".to_string()],
            alternate_flows: vec![],
        }
    }

    #[test]
    fn test_commit_replaces_snapshot() {
        let mut store = ArtifactStore::new();
        store.commit_use_cases(vec![use_case(1, "Borrow Book")]);
        store.commit_use_cases(vec![use_case(2, "Return Book")]);

        assert_eq!(store.use_cases().len(), 1);
        assert_eq!(store.use_cases()[0].name, "Return Book");
    }

    #[test]
    fn test_id_assignment_is_monotonic() {
        let mut store = ArtifactStore::new();
        assert_eq!(store.next_use_case_id(), UseCaseId(1));
        assert_eq!(store.next_use_case_id(), UseCaseId(2));

        // Committing a model with higher ids moves the counter past them
        store.commit_use_cases(vec![use_case(7, "Borrow Book")]);
        assert_eq!(store.next_use_case_id(), UseCaseId(8));
    }

    #[test]
    fn test_counter_never_rewinds_on_commit() {
        let mut store = ArtifactStore::new();
        for _ in 0..5 {
            store.next_use_case_id();
        }
        store.commit_use_cases(vec![use_case(1, "Borrow Book")]);
        assert_eq!(store.next_use_case_id(), UseCaseId(6));
    }

    #[test]
    fn test_log_is_append_only_ordered() {
        let mut store = ArtifactStore::new();
        store.append_log(ChatRole::User, "first");
        store.append_log(ChatRole::Assistant, "second");
        store.append_log(ChatRole::User, "third");

        let contents: Vec<&str> = store.log().entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_matrix_commit_is_whole_snapshot() {
        let mut store = ArtifactStore::new();
        let matrix: CrudMatrix = [CrudTriplet::new("Book", "Borrow Book", CrudOp::Read)]
            .into_iter()
            .collect();
        store.commit_crud_matrix(matrix.clone());
        assert_eq!(store.crud_matrix(), &matrix);

        store.commit_crud_matrix(CrudMatrix::new());
        assert!(store.crud_matrix().is_empty());
    }
}
