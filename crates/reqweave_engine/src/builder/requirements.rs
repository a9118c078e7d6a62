//! Functional-requirements writer
//!
//! Runs after a Pass: derives the SRS functional-requirements chapter from
//! the final artifacts. Templated text generation; the only structure held
//! to account is the FR block format, and ids are renumbered locally.

use super::{parsed_round_trip, render_use_cases};
use crate::error::{PipelineError, Stage};
use crate::parser::parse_requirements;
use crate::store::ArtifactStore;
use reqweave_common::{
    prompts, RequirementsDocument, RetryConfig, SystemDescription, TextGenerator,
};
use tracing::info;

pub struct RequirementsWriter<'a> {
    generator: &'a dyn TextGenerator,
    retry: &'a RetryConfig,
}

impl<'a> RequirementsWriter<'a> {
    pub fn new(generator: &'a dyn TextGenerator, retry: &'a RetryConfig) -> Self {
        Self { generator, retry }
    }

    pub fn write(
        &self,
        store: &mut ArtifactStore,
        description: &SystemDescription,
    ) -> Result<RequirementsDocument, PipelineError> {
        let er_text = store.er_model().to_string();
        let use_case_text = render_use_cases(store.use_cases());
        let prompt = prompts::functional_requirements_prompt(
            description.as_str(),
            &er_text,
            &use_case_text,
        );

        let mut requirements = parsed_round_trip(
            self.generator,
            self.retry,
            store,
            Stage::Requirements,
            &prompt,
            parse_requirements,
        )?;

        // Ids are assigned locally, like use-case ids
        for (i, req) in requirements.iter_mut().enumerate() {
            req.id = format!("FR-{:02}", i + 1);
        }
        info!("derived {} functional requirement(s)", requirements.len());
        Ok(RequirementsDocument { requirements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqweave_common::FakeGenerator;

    fn retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 1,
            initial_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    #[test]
    fn test_write_renumbers_ids() {
        let response = r#"
1.1 Book Lending Function
    Function ID: FR-07
    Description: Students borrow available books.
    Input: Student id, book id.
    Output: Updated book status.

1.2 Catalog Management Function
    Function ID: FR-99
    Description: Admins maintain the catalog.
    Input: Book data.
    Output: Updated catalog.
"#;
        let fake = FakeGenerator::always(response);
        let mut store = ArtifactStore::new();

        let retry_cfg = retry();
        let writer = RequirementsWriter::new(&fake, &retry_cfg);
        let doc = writer
            .write(&mut store, &SystemDescription::new("A library system"))
            .unwrap();

        assert_eq!(doc.requirements.len(), 2);
        assert_eq!(doc.requirements[0].id, "FR-01");
        assert_eq!(doc.requirements[1].id, "FR-02");
    }

    #[test]
    fn test_write_rejects_prose_after_retry() {
        let fake = FakeGenerator::always("The system shall be good.");
        let mut store = ArtifactStore::new();

        let retry_cfg = retry();
        let writer = RequirementsWriter::new(&fake, &retry_cfg);
        let result = writer.write(&mut store, &SystemDescription::new("A library system"));

        assert!(matches!(
            result,
            Err(PipelineError::Parse {
                stage: Stage::Requirements,
                ..
            })
        ));
    }
}
