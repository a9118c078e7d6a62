//! Use-case modeling prompts

/// Full use-case model synthesis: one block per requested name.
pub const USE_CASE_MODEL_PROMPT: &str = r#"You are responsible for use case modeling and validation in the requirements team.
System Overview: {intro}
Data Entities: {entities}
Use Cases: {use_cases}

Task Steps:
    (a) Identify primary actors: determine the key roles involved in each use case.
    (b) Specify preconditions and postconditions: what must be true before the use case begins, and the expected system state after it ends.
    (c) Describe the main and alternate flows: a logical sequence of steps for normal execution plus alternative scenarios.
    (d) Ensure completeness: every use case in the list must be described fully, with no omissions.

Make sure:
    - Every use case listed is described, and ONLY those: do not invent extra use cases.
    - Use the use case names exactly as given.
    - Language is clear, concise, and precise.

Output Format (repeat for each use case, nothing else):

=== Use Case: <Use Case Name> ===
Primary Actor(s): <comma-separated actors>
Preconditions: <state before execution>
Postconditions: <state after execution>
Main Flow:
  1. <step 1>
  2. <step 2>
Alternate Flow(s):
  - <alternative scenario 1>
===============================
"#;

/// Single use-case completion: supplement one newly discovered use case.
pub const NEW_USE_CASE_PROMPT: &str = r#"You are a senior system analyst. Supplement one new use case description based on the following:
System description: {intro}
Data entities: {entities}
Current use case names (keep a consistent style and format): {existing}
New use case to be added: {name}

Describe ONLY the new use case, in exactly this format:

=== Use Case: {name} ===
Primary Actor(s): <comma-separated actors>
Preconditions: <state before execution>
Postconditions: <state after execution>
Main Flow:
  1. <step 1>
  2. <step 2>
Alternate Flow(s):
  - <alternative scenario 1>
===============================
"#;

pub fn use_case_model_prompt(intro: &str, entities: &[String], use_cases: &[String]) -> String {
    USE_CASE_MODEL_PROMPT
        .replace("{intro}", intro)
        .replace("{entities}", &entities.join(", "))
        .replace("{use_cases}", &use_cases.join(", "))
}

pub fn new_use_case_prompt(intro: &str, entities: &[String], existing: &[String], name: &str) -> String {
    NEW_USE_CASE_PROMPT
        .replace("{intro}", intro)
        .replace("{entities}", &entities.join(", "))
        .replace("{existing}", &existing.join(", "))
        .replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_model_prompt_fills_placeholders() {
        let prompt = use_case_model_prompt(
            "A library system",
            &["Student".to_string(), "Book".to_string()],
            &["Borrow Book".to_string()],
        );

        assert!(prompt.contains("A library system"));
        assert!(prompt.contains("Student, Book"));
        assert!(prompt.contains("Borrow Book"));
        assert!(!prompt.contains("{intro}"));
    }

    #[test]
    fn test_new_use_case_prompt_names_the_case() {
        let prompt = new_use_case_prompt(
            "A library system",
            &["Book".to_string()],
            &["Borrow Book".to_string()],
            "Manage BorrowRecord",
        );

        assert!(prompt.contains("=== Use Case: Manage BorrowRecord ==="));
        assert!(!prompt.contains("{name}"));
    }
}
