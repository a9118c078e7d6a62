//! Prompt templates for the generation boundary.
//!
//! Wording belongs to the external generator's contract, not to the
//! reconciliation core; the templates live here so every request is
//! reproducible and shows up verbatim in the interaction log. Each builder
//! fn fills a `{placeholder}` template and returns the final prompt text.

pub mod crud;
pub mod er;
pub mod requirements;
pub mod use_case;

pub use crud::*;
pub use er::*;
pub use requirements::*;
pub use use_case::*;
