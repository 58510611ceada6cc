use std::path::PathBuf;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an AI assistant designed to help with various tasks.";

/// Loads system prompts from a directory of text files
#[derive(Debug, Clone)]
pub struct PromptLoader {
    dir: PathBuf,
}

impl PromptLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read `file_name` from the prompt directory, trimmed.
    ///
    /// Falls back to [`DEFAULT_SYSTEM_PROMPT`] when the file is missing,
    /// unreadable or blank.
    pub fn load(&self, file_name: &str) -> String {
        let path = self.dir.join(file_name);
        match std::fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(path = %path.display(), "Loaded system prompt");
                text.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "System prompt file is empty, using default");
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read system prompt, using default");
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
        }
    }
}

/// Mask a secret so only its last four characters remain visible
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "Not configured".to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    let tail: String = chars[hidden..].iter().collect();
    format!("{}{}", "*".repeat(hidden), tail)
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["key", "secret", "password", "token"]
        .iter()
        .any(|marker| key.contains(marker))
}

/// Log agent settings, masking anything that looks like a credential
pub fn log_agent_initialization(agent_name: &str, settings: &[(&str, &str)]) {
    tracing::info!(agent = agent_name, "Initializing agent");

    for (key, value) in settings {
        let shown = if is_secret_key(key) {
            mask_secret(value)
        } else if value.is_empty() {
            "Not configured".to_string()
        } else {
            value.to_string()
        };
        tracing::info!(agent = agent_name, setting = *key, value = %shown, "Agent setting");
    }
}
