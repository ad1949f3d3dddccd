use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use tracing::debug;

/// README text ready for analysis. Undecodable bytes are already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
}

/// Body of GitHub's "get repository README" response, as saved to disk.
#[derive(Debug, Deserialize)]
struct ReadmePayload {
    #[serde(default)]
    content: String,
    encoding: Option<String>,
}

impl Document {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(String::from_utf8_lossy(bytes))
    }

    pub fn from_readme_payload(json: &str) -> Result<Self> {
        let payload: ReadmePayload =
            serde_json::from_str(json).context("Failed to parse README payload")?;

        match payload.encoding.as_deref() {
            None | Some("base64") => {}
            Some(other) => bail!("Unexpected README encoding: {}", other),
        }

        let cleaned: String = payload
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = BASE64
            .decode(cleaned)
            .context("Failed to decode base64 README content")?;
        Ok(Self::from_bytes(&bytes))
    }

    /// `*.json` files are API payloads; anything else is raw README bytes.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

        let is_payload = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_payload {
            Self::from_readme_payload(&String::from_utf8_lossy(&bytes))
                .with_context(|| format!("Invalid README payload in {}", path.display()))
        } else {
            Ok(Self::from_bytes(&bytes))
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
