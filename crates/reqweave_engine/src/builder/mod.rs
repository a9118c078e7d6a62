//! Artifact builders
//!
//! Each builder drives one generation stage: prompt, gateway round-trip,
//! strict parse, validation. Transport failures get bounded retries inside
//! `generate_with_retry`; a structural parse failure gets exactly one fresh
//! round-trip before the stage aborts. Every round-trip is appended to the
//! interaction log, accepted or not.

pub mod crud_matrix;
pub mod er_model;
pub mod requirements;
pub mod use_case_model;

pub use crud_matrix::CrudMatrixSynthesizer;
pub use er_model::{ErModelSynthesizer, ErSynthesis};
pub use requirements::RequirementsWriter;
pub use use_case_model::UseCaseModelBuilder;

use crate::error::{ParseError, PipelineError, Stage};
use crate::retry::generate_with_retry;
use crate::store::ArtifactStore;
use reqweave_common::{ChatRole, LogEntry, RetryConfig, TextGenerator};
use tracing::warn;

/// One gateway round-trip: generate against the current log, append prompt
/// and response to the log, then parse.
fn round_trip(
    generator: &dyn TextGenerator,
    retry: &RetryConfig,
    store: &mut ArtifactStore,
    stage: Stage,
    prompt: &str,
) -> Result<String, PipelineError> {
    let context: Vec<LogEntry> = store.log().entries().to_vec();
    let response = generate_with_retry(generator, prompt, &context, retry)
        .map_err(|e| PipelineError::Generation { stage, source: e })?;
    store.append_log(ChatRole::User, prompt);
    store.append_log(ChatRole::Assistant, &response);
    Ok(response)
}

/// Round-trip plus strict parse, with one stage-level retry on a parse
/// failure. The rejected response stays in the log as provenance.
pub(crate) fn parsed_round_trip<T>(
    generator: &dyn TextGenerator,
    retry: &RetryConfig,
    store: &mut ArtifactStore,
    stage: Stage,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, ParseError>,
) -> Result<T, PipelineError> {
    let response = round_trip(generator, retry, store, stage, prompt)?;
    match parse(&response) {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!("{} output failed to parse: {} (one retry)", stage, first);
            let response = round_trip(generator, retry, store, stage, prompt)?;
            parse(&response).map_err(|e| PipelineError::Parse { stage, source: e })
        }
    }
}

/// Render use-case records as prompt input, in their block format.
pub(crate) fn render_use_cases(use_cases: &[reqweave_common::UseCase]) -> String {
    use_cases.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
