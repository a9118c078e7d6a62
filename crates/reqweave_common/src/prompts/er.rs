//! ER model synthesis and completion prompts

/// Full ER model synthesis from entities and use-case semantics.
pub const ER_MODEL_PROMPT: &str = r#"You are responsible for data model design and validation in a requirements team. Based on the following information, build a complete E-R model.
System introduction: {intro}
Data entities: {entities}
Use cases: {use_cases}

Thinking steps:
    1. Identify relationships using common sense: analyze the business scenario and apply domain knowledge to identify relationships among entities.
    2. Supplement missing entities: infer potentially missing entities and define their associations. E.g., for "User posts Review", add entity "ReviewRecord".
    3. Output the complete data model: include all entities (including added ones), their attributes, and relationships. At the end, list newly added or removed entities and the corresponding use cases.

Rules:
    1. Cover all given entities, and supplement missing ones only where the use cases require a join record.
    2. For each new entity, list a management use case (e.g. "Manage ReviewRecord") under New Use Cases.
    3. Relationships must be logical and business-driven.
    4. List added and removed items using comma delimiters only, with no additional explanation.

Output Format (nothing else):

Entities:
- <Name>: <attr1>, <attr2>
Relations:
- <EntityA> "<card>" --> "<card>" <EntityB> : <verb phrase>
New Entities: <comma-separated names, or blank>
New Use Cases: <comma-separated names, or blank>
Removed Entities: <comma-separated names, or blank>
Removed Use Cases: <comma-separated names, or blank>
"#;

/// Targeted completion: one bridging relation for a disconnected component.
pub const ER_BRIDGE_PROMPT: &str = r#"The E-R model of this system is not connected. Propose ONE relationship that grounds the disconnected entities in the rest of the model, based on real data interactions implied by the use cases.
System introduction: {intro}
Connected entities: {primary}
Disconnected entities: {stranded}
Use cases: {use_cases}

Rules:
    - The relationship must join one disconnected entity to one connected entity.
    - Do not invent entities; use only the names listed above.
    - If no meaningful, business-grounded relationship exists, answer exactly: NONE

Output Format (one line, nothing else):

<EntityA> "<card>" --> "<card>" <EntityB> : <verb phrase>
"#;

pub fn er_model_prompt(intro: &str, entities: &[String], use_cases: &[String]) -> String {
    ER_MODEL_PROMPT
        .replace("{intro}", intro)
        .replace("{entities}", &entities.join(", "))
        .replace("{use_cases}", &use_cases.join(", "))
}

pub fn er_bridge_prompt(
    intro: &str,
    primary: &[String],
    stranded: &[String],
    use_cases: &[String],
) -> String {
    ER_BRIDGE_PROMPT
        .replace("{intro}", intro)
        .replace("{primary}", &primary.join(", "))
        .replace("{stranded}", &stranded.join(", "))
        .replace("{use_cases}", &use_cases.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_er_model_prompt_fills_placeholders() {
        let prompt = er_model_prompt(
            "A library system",
            &["Student".to_string(), "Book".to_string()],
            &["Borrow Book".to_string()],
        );

        assert!(prompt.contains("Student, Book"));
        assert!(prompt.contains("New Entities:"));
        assert!(!prompt.contains("{entities}"));
    }

    #[test]
    fn test_er_bridge_prompt_lists_both_sides() {
        let prompt = er_bridge_prompt(
            "A library system",
            &["Student".to_string(), "Book".to_string()],
            &["ReviewRecord".to_string()],
            &["Borrow Book".to_string()],
        );

        assert!(prompt.contains("Connected entities: Student, Book"));
        assert!(prompt.contains("Disconnected entities: ReviewRecord"));
    }
}
