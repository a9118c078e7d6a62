//! CRUD tuple-list parser
//!
//! The generator returns a list of `("Entity", "UseCase", "Op")` tuples.
//! Surrounding brackets and prose are tolerated; each tuple itself is
//! parsed strictly.

use crate::error::ParseError;
use regex::Regex;
use reqweave_common::{CrudOp, CrudTriplet};

pub fn parse_crud_triplets(text: &str) -> Result<Vec<CrudTriplet>, ParseError> {
    let group_re = Regex::new(r"\(([^()]*)\)").expect("static regex");
    let tuple_re = Regex::new(r#"^\s*"([^"]+)"\s*,\s*"([^"]+)"\s*,\s*"([^"]+)"\s*,?\s*$"#)
        .expect("static regex");

    let mut triplets = Vec::new();
    for group in group_re.captures_iter(text) {
        let inner = &group[1];
        if !inner.contains('"') {
            // Parenthesized prose, e.g. "(see above)"
            continue;
        }
        let caps = tuple_re
            .captures(inner)
            .ok_or_else(|| ParseError::BadTriplet(inner.trim().to_string()))?;

        let op_text = caps[3].trim().to_string();
        let mut chars = op_text.chars();
        let op = match (chars.next().and_then(CrudOp::from_letter), chars.next()) {
            (Some(op), None) => op,
            _ => return Err(ParseError::BadOperation(op_text)),
        };

        triplets.push(CrudTriplet::new(caps[1].trim(), caps[2].trim(), op));
    }

    if triplets.is_empty() {
        return Err(ParseError::NoTriplets);
    }
    Ok(triplets)
}
