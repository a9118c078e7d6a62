//! ER model parser
//!
//! Entity lines (`Name: attr1, attr2`), relation lines
//! (`A "<card>" --> "<card>" B : verb`), and the trailing added/removed
//! lists the generator emits so the merger never has to re-derive the diff.

use crate::error::ParseError;
use regex::Regex;
use reqweave_common::{Cardinality, Relation};

/// Raw parse of an ER response. Entity classification is assigned by the
/// caller; names here are just what the generator said.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErParse {
    pub entities: Vec<(String, Vec<String>)>,
    pub relations: Vec<Relation>,
    pub new_entities: Vec<String>,
    pub new_use_cases: Vec<String>,
    pub removed_entities: Vec<String>,
    pub removed_use_cases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Entities,
    Relations,
}

fn relation_regex() -> Regex {
    Regex::new(r#"^[-*\s]*(.+?)\s+"([^"]+)"\s*-->\s*"([^"]+)"\s+(.+?)\s*:\s*(.+?)\s*$"#)
        .expect("static regex")
}

fn parse_relation_line(caps: &regex::Captures<'_>, line: &str) -> Result<Relation, ParseError> {
    let left_card = Cardinality::parse(&caps[2])
        .ok_or_else(|| ParseError::BadCardinality(line.to_string()))?;
    let right_card = Cardinality::parse(&caps[3])
        .ok_or_else(|| ParseError::BadCardinality(line.to_string()))?;

    Ok(Relation {
        left: caps[1].trim().to_string(),
        left_card,
        right: caps[4].trim().to_string(),
        right_card,
        verb: caps[5].trim().to_string(),
    })
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_er_output(text: &str) -> Result<ErParse, ParseError> {
    let relation_re = relation_regex();
    let mut parse = ErParse::default();
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("New Entities:") {
            parse.new_entities = split_list(rest);
            section = Section::None;
            continue;
        }
        if let Some(rest) = line.strip_prefix("New Use Cases:") {
            parse.new_use_cases = split_list(rest);
            section = Section::None;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Removed Entities:") {
            parse.removed_entities = split_list(rest);
            section = Section::None;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Removed Use Cases:") {
            parse.removed_use_cases = split_list(rest);
            section = Section::None;
            continue;
        }

        if line.starts_with("Entities") {
            section = Section::Entities;
            continue;
        }
        if line.starts_with("Relations") || line.starts_with("Relationships") {
            section = Section::Relations;
            continue;
        }

        if let Some(caps) = relation_re.captures(line) {
            parse.relations.push(parse_relation_line(&caps, line)?);
            continue;
        }

        if section == Section::Entities {
            if let Some((name, attrs)) = parse_entity_line(line) {
                parse.entities.push((name, attrs));
            }
        }
    }

    if parse.entities.is_empty() {
        return Err(ParseError::NoEntities);
    }
    Ok(parse)
}

/// Parse a single bridging-relation response. `NONE` (the prompt's "no
/// grounded relation exists" answer) and prose-only output both reject.
pub fn parse_bridge_relation(text: &str) -> Result<Relation, ParseError> {
    let relation_re = relation_regex();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.eq_ignore_ascii_case("NONE") {
            return Err(ParseError::NoBridgingRelation);
        }
        if let Some(caps) = relation_re.captures(line) {
            return parse_relation_line(&caps, line);
        }
    }
    Err(ParseError::NoBridgingRelation)
}

/// `Name: attr1, attr2` with optional list markers and `**` emphasis.
fn parse_entity_line(line: &str) -> Option<(String, Vec<String>)> {
    let stripped = line
        .trim_start_matches(|c: char| {
            c == '-' || c == '*' || c == '.' || c.is_ascii_digit() || c.is_whitespace()
        })
        .trim();
    let (name, attrs) = stripped.split_once(':')?;
    let name = name.trim().trim_matches('*').trim();
    if name.is_empty() || name.contains('"') {
        return None;
    }
    Some((name.to_string(), split_list(attrs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
Entities:
- Student: StudentID, Name, Age
- Book: BookID, Title, Status
- BorrowRecord: RecordID, StudentID, BookID
Relations:
- Student "1" --> "0..*" BorrowRecord : borrows
- Book "1" --> "0..*" BorrowRecord : is borrowed in
New Entities: BorrowRecord
New Use Cases: Manage BorrowRecord
Removed Entities:
Removed Use Cases:
"#;

    #[test]
    fn test_parses_entities_and_relations() {
        let parse = parse_er_output(SAMPLE).unwrap();

        assert_eq!(parse.entities.len(), 3);
        assert_eq!(parse.entities[0].0, "Student");
        assert_eq!(parse.entities[0].1, vec!["StudentID", "Name", "Age"]);
        assert_eq!(parse.relations.len(), 2);
        assert_eq!(parse.relations[0].left, "Student");
        assert_eq!(parse.relations[0].right, "BorrowRecord");
        assert_eq!(parse.relations[0].verb, "borrows");
    }

    #[test]
    fn test_parses_delta_lists() {
        let parse = parse_er_output(SAMPLE).unwrap();

        assert_eq!(parse.new_entities, vec!["BorrowRecord"]);
        assert_eq!(parse.new_use_cases, vec!["Manage BorrowRecord"]);
        assert!(parse.removed_entities.is_empty());
        assert!(parse.removed_use_cases.is_empty());
    }

    #[test]
    fn test_numbered_bold_entity_lines() {
        let text = r#"
Entities and Attributes:
1. **Student**: StudentID, Name
2. **Book**: BookID, Title
Relationships:
- Student "1" --> "0..*" Book : borrows
"#;
        let parse = parse_er_output(text).unwrap();
        assert_eq!(parse.entities[0].0, "Student");
        assert_eq!(parse.entities[1].0, "Book");
        assert_eq!(parse.relations.len(), 1);
    }

    #[test]
    fn test_rejects_bad_cardinality() {
        let text = r#"
Entities:
- Student: StudentID
Relations:
- Student "lots" --> "0..*" Book : borrows
"#;
        assert!(matches!(
            parse_er_output(text),
            Err(ParseError::BadCardinality(_))
        ));
    }

    #[test]
    fn test_rejects_output_without_entities() {
        assert!(matches!(
            parse_er_output("nothing useful"),
            Err(ParseError::NoEntities)
        ));
    }

    #[test]
    fn test_bridge_relation_first_match_wins() {
        let text = "Here is the relation:\nStudent \"1\" --> \"0..*\" ReviewRecord : writes\n";
        let relation = parse_bridge_relation(text).unwrap();

        assert_eq!(relation.left, "Student");
        assert_eq!(relation.right, "ReviewRecord");
    }

    #[test]
    fn test_bridge_relation_none_answer() {
        assert!(matches!(
            parse_bridge_relation("NONE"),
            Err(ParseError::NoBridgingRelation)
        ));
        assert!(matches!(
            parse_bridge_relation("I could not find one, sorry."),
            Err(ParseError::NoBridgingRelation)
        ));
    }
}
