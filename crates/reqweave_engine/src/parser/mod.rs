//! Strict parsers for generator output
//!
//! Generator text is untrusted. Every boundary format is validated into
//! typed artifacts or rejected with a `ParseError`; nothing is accepted
//! implicitly.

pub mod crud;
pub mod er;
pub mod requirements;
pub mod use_case;

pub use crud::parse_crud_triplets;
pub use er::{parse_bridge_relation, parse_er_output, ErParse};
pub use requirements::parse_requirements;
pub use use_case::{parse_use_case_blocks, ParsedUseCase};
