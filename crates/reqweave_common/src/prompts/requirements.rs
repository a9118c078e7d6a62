//! Functional-requirements chapter prompt

/// Derive the SRS functional-requirements chapter from the final artifacts.
pub const FUNCTIONAL_REQUIREMENTS_PROMPT: &str = r#"You are responsible for writing Chapter 1 (Functional Requirements) of the software requirement specification.
System description: {intro}
Data model:
{er_model}
Use case descriptions:
{use_cases}

Steps:
    1. Clarify the functional scope by extracting core functions from the use cases and the data model.
    2. Clearly define each function, including description, input, and output.
    3. Each function must be feasible: inputs must allow transformation to outputs.
    4. Content must align with the use cases and data model; no invented functions, no undefined terms.

Output format (repeat for each function, nothing else):

1.1 <Function Name>
    Function ID: FR-01
    Description: <what the function does>
    Input: <inputs>
    Output: <outputs>
"#;

pub fn functional_requirements_prompt(intro: &str, er_model: &str, use_cases: &str) -> String {
    FUNCTIONAL_REQUIREMENTS_PROMPT
        .replace("{intro}", intro)
        .replace("{er_model}", er_model)
        .replace("{use_cases}", use_cases)
}
