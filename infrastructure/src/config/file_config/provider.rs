//! Provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// Which backend answers think/discuss/cluster/chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Prompts rendered locally and sent to an OpenAI-compatible API
    #[default]
    OpenAi,
    /// A deliberation service exposing `/think`, `/discuss`, `/cluster`, `/chat`
    Endpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub kind: ProviderKind,
    /// Base URL; `https://api.openai.com/v1` for the OpenAI kind when unset
    pub base_url: Option<String>,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY")
    pub api_key_env: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_secs: 60,
        }
    }
}

impl FileProviderConfig {
    pub const OPENAI_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn resolved_base_url(&self) -> Option<String> {
        match (&self.base_url, self.kind) {
            (Some(url), _) => Some(url.clone()),
            (None, ProviderKind::OpenAi) => Some(Self::OPENAI_BASE_URL.to_string()),
            (None, ProviderKind::Endpoint) => None,
        }
    }

    /// API key read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_base_url() {
        let openai = FileProviderConfig::default();
        assert_eq!(
            openai.resolved_base_url().as_deref(),
            Some("https://api.openai.com/v1")
        );

        let endpoint = FileProviderConfig {
            kind: ProviderKind::Endpoint,
            ..Default::default()
        };
        assert!(endpoint.resolved_base_url().is_none());

        let custom = FileProviderConfig {
            kind: ProviderKind::Endpoint,
            base_url: Some("http://localhost:8787".to_string()),
            ..Default::default()
        };
        assert_eq!(
            custom.resolved_base_url().as_deref(),
            Some("http://localhost:8787")
        );
    }

    #[test]
    fn test_kind_deserialize() {
        let config: FileProviderConfig = toml::from_str("kind = \"endpoint\"").unwrap();
        assert_eq!(config.kind, ProviderKind::Endpoint);
        assert_eq!(config.model, "gpt-4o-mini");
    }
}
