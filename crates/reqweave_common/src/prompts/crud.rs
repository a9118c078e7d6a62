//! CRUD matrix synthesis and completion prompts

/// Full CRUD matrix synthesis from use-case flow text.
pub const CRUD_MATRIX_PROMPT: &str = r#"The data entities are as follows: {entities}
The use cases are as follows: {use_cases}
The use case descriptions are as follows:
{descriptions}

Output a structured list of triples (Entity, Use_case, CRUD operation) based on the following rules:
    - C (Create): the use case adds new data for the entity.
    - U (Update): the use case modifies existing data for the entity.
    - R (Read): the use case queries existing data for the entity.
    - D (Delete): the use case deletes data for the entity.
Each use case for each entity may correspond to multiple CRUD operations; list them completely.
Note that if a use case only manages an entity, it includes C, R, U, and D operations.
If a use case's flow does not reference an entity, do not generate a triple for that pair.

Output format is a list of tuples, for example:
[
    ("Task", "View Project", "R"),
    ("Project", "Manage Project", "C"),
]
Return only the list of triples without any explanations or natural language text.
"#;

/// Targeted completion: only the triplets missing from the current matrix.
pub const CRUD_COMPLETION_PROMPT: &str = r#"You are responsible for completing the system's CRUD matrix based on recent updates to use cases and a missing-interaction report.

Data Entities:
{entities}

Use Case Descriptions:
{descriptions}

Previous CRUD Triplets:
{triplets}

Missing Report:
{report}

Task Instructions:
    1. Read the entity/use-case interaction gaps named in the Missing Report.
    2. Analyze the use case descriptions to detect any new interactions (C, R, U, D) between entities and use cases.
    3. Construct new CRUD triplets ONLY for missing interactions; do not repeat existing triplets.
    4. Every triplet must reflect an interaction grounded in the use case descriptions, with consistent naming.

Output format is a list of tuples:
[
    ("Entity", "UseCase", "Operation"),
]
Return only the list of triples without any explanations or natural language text.
"#;

pub fn crud_matrix_prompt(entities: &[String], use_cases: &[String], descriptions: &str) -> String {
    CRUD_MATRIX_PROMPT
        .replace("{entities}", &entities.join(", "))
        .replace("{use_cases}", &use_cases.join(", "))
        .replace("{descriptions}", descriptions)
}

pub fn crud_completion_prompt(
    entities: &[String],
    descriptions: &str,
    triplets: &str,
    report: &str,
) -> String {
    CRUD_COMPLETION_PROMPT
        .replace("{entities}", &entities.join(", "))
        .replace("{descriptions}", descriptions)
        .replace("{triplets}", triplets)
        .replace("{report}", report)
}
