//! Reqweave Common - shared artifact types and the generation boundary
//!
//! Everything both sides of the pipeline need: the artifact data model, the
//! text-generator contract (with HTTP and fake implementations), prompt
//! templates, and configuration.

pub mod config;
pub mod llm_client;
pub mod prompts;
pub mod types;

pub use config::*;
pub use llm_client::*;
pub use types::*;
