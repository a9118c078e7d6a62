//! Use-case block parser
//!
//! Blocks are delimited by `=== Use Case: <Name> ===` and carry the
//! `Primary Actor(s)`, `Preconditions`, `Postconditions`, numbered
//! `Main Flow` and bulleted `Alternate Flow(s)` fields. Surrounding prose
//! is tolerated; a block missing a required field is rejected.

use crate::error::ParseError;
use regex::Regex;

/// A parsed use-case record, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUseCase {
    pub name: String,
    pub actors: Vec<String>,
    pub preconditions: String,
    pub postconditions: String,
    pub main_flow: Vec<String>,
    pub alternate_flows: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    MainFlow,
    AlternateFlows,
}

pub fn parse_use_case_blocks(text: &str) -> Result<Vec<ParsedUseCase>, ParseError> {
    let header_re = Regex::new(r"^=+\s*Use Case:\s*(.+?)\s*=+$").expect("static regex");
    let step_re = Regex::new(r"^\d+[.)]\s*(.+)$").expect("static regex");

    let mut blocks: Vec<ParsedUseCase> = Vec::new();
    let mut current: Option<ParsedUseCase> = None;
    let mut field = Field::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if let Some(caps) = header_re.captures(line) {
            if let Some(block) = current.take() {
                validate(&block)?;
                blocks.push(block);
            }
            current = Some(ParsedUseCase {
                name: caps[1].to_string(),
                actors: Vec::new(),
                preconditions: String::new(),
                postconditions: String::new(),
                main_flow: Vec::new(),
                alternate_flows: Vec::new(),
            });
            field = Field::None;
            continue;
        }

        // A bare separator line ends the current block
        if !line.is_empty() && line.chars().all(|c| c == '=') {
            if let Some(block) = current.take() {
                validate(&block)?;
                blocks.push(block);
            }
            field = Field::None;
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("Primary Actor(s):") {
            block.actors = split_list(rest);
            field = Field::None;
        } else if let Some(rest) = line.strip_prefix("Preconditions:") {
            block.preconditions = rest.trim().to_string();
            field = Field::None;
        } else if let Some(rest) = line.strip_prefix("Postconditions:") {
            block.postconditions = rest.trim().to_string();
            field = Field::None;
        } else if line.starts_with("Main Flow:") {
            field = Field::MainFlow;
        } else if line.starts_with("Alternate Flow(s):") {
            field = Field::AlternateFlows;
        } else if field == Field::MainFlow {
            if let Some(caps) = step_re.captures(line) {
                block.main_flow.push(caps[1].trim().to_string());
            }
        } else if field == Field::AlternateFlows {
            if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
                block.alternate_flows.push(rest.trim().to_string());
            }
        }
    }

    if let Some(block) = current.take() {
        validate(&block)?;
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(ParseError::NoUseCaseBlocks);
    }
    Ok(blocks)
}

fn validate(block: &ParsedUseCase) -> Result<(), ParseError> {
    if block.actors.is_empty() {
        return Err(ParseError::MissingField(block.name.clone(), "Primary Actor(s)"));
    }
    if block.main_flow.is_empty() {
        return Err(ParseError::MissingField(block.name.clone(), "Main Flow"));
    }
    Ok(())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
