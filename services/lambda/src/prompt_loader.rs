use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a system prompt from a file, trimming surrounding whitespace.
pub fn load_system_prompt(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;

    let prompt = content.trim();
    if prompt.is_empty() {
        anyhow::bail!("Prompt file is empty: {}", path.display());
    }

    Ok(prompt.to_string())
}
