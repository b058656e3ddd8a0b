use color_eyre::Result;
use dialoguer::{Input, Password};

/// Prompt for a string value with optional default. Empty input is rejected
/// unless a default exists.
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default_value) = default {
        input = input.default(default_value.to_string());
    }
    input
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Masked input for tokens and API keys.
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", prompt, e))
}

/// `arg` when given, otherwise the result of `prompt`.
pub fn value_or_prompt(arg: Option<String>, prompt: impl FnOnce() -> Result<String>) -> Result<String> {
    match arg {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => prompt().map(|v| v.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_or_prompt_prefers_arg() {
        let value = value_or_prompt(Some(" abc ".to_string()), || panic!("should not prompt")).unwrap();
        assert_eq!(value, "abc");

        let prompted = value_or_prompt(Some("  ".to_string()), || Ok("typed".to_string())).unwrap();
        assert_eq!(prompted, "typed");
    }
}
