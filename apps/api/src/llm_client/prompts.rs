// Shared prompt fragments. Each feature defines its own prompts.rs alongside it;
// this file holds the cross-cutting pieces.

/// Appended to every prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
IMPORTANT:
- Return ONLY the JSON. No extra text, notes, or markdown formatting.
- Do NOT include explanations or apologies.";

/// Appends the JSON-only instruction to a rendered prompt.
pub fn json_only(prompt: &str) -> String {
    format!("{}\n\n{JSON_ONLY_INSTRUCTION}", prompt.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_only_appends_instruction_once() {
        let prompt = json_only("Describe the market.\n\n");
        assert!(prompt.starts_with("Describe the market.\n\nIMPORTANT:"));
        assert_eq!(prompt.matches("Return ONLY the JSON").count(), 1);
    }
}
