//! Functional-requirement block parser
//!
//! Blocks look like `1.1 <Name>` followed by `Function ID`, `Description`,
//! `Input` and `Output` fields. Generated FR ids are parsed but later
//! renumbered; like use-case ids they are never trusted.

use crate::error::ParseError;
use regex::Regex;
use reqweave_common::FunctionalRequirement;

pub fn parse_requirements(text: &str) -> Result<Vec<FunctionalRequirement>, ParseError> {
    let header_re = Regex::new(r"^\s*\d+\.\d+\s+(.+?)\s*$").expect("static regex");

    let mut requirements = Vec::new();
    let mut current: Option<FunctionalRequirement> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if let Some(caps) = header_re.captures(raw_line) {
            if let Some(req) = current.take() {
                validate(&req)?;
                requirements.push(req);
            }
            current = Some(FunctionalRequirement {
                id: String::new(),
                name: caps[1].to_string(),
                description: String::new(),
                input: String::new(),
                output: String::new(),
            });
            continue;
        }

        let Some(req) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("Function ID:") {
            req.id = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Description:") {
            req.description = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Input:") {
            req.input = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Output:") {
            req.output = rest.trim().to_string();
        }
    }

    if let Some(req) = current.take() {
        validate(&req)?;
        requirements.push(req);
    }

    if requirements.is_empty() {
        return Err(ParseError::NoRequirements);
    }
    Ok(requirements)
}

fn validate(req: &FunctionalRequirement) -> Result<(), ParseError> {
    if req.description.is_empty() {
        return Err(ParseError::MissingRequirementField(req.name.clone(), "Description"));
    }
    if req.input.is_empty() {
        return Err(ParseError::MissingRequirementField(req.name.clone(), "Input"));
    }
    if req.output.is_empty() {
        return Err(ParseError::MissingRequirementField(req.name.clone(), "Output"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
1.1 Book Lending Function
    Function ID: FR-01
    Description: Students can borrow available books; the system updates the book status.
    Input: Student identifier, book identifier.
    Output: Updated book status and a borrow record.

1.2 Catalog Management Function
    Function ID: FR-02
    Description: Admins maintain the book catalog.
    Input: Book data.
    Output: Updated catalog.
"#;

    #[test]
    fn test_parses_blocks() {
        let requirements = parse_requirements(SAMPLE).unwrap();

        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].name, "Book Lending Function");
        assert_eq!(requirements[0].id, "FR-01");
        assert!(requirements[1].description.contains("catalog"));
    }

    #[test]
    fn test_rejects_block_missing_description() {
        let text = "1.1 Broken Function\n    Function ID: FR-01\n    Input: a\n    Output: b\n";
        assert!(matches!(
            parse_requirements(text),
            Err(ParseError::MissingRequirementField(_, "Description"))
        ));
    }

    #[test]
    fn test_rejects_empty_output() {
        assert!(matches!(
            parse_requirements("nothing here"),
            Err(ParseError::NoRequirements)
        ));
    }
}
