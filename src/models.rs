use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub endpoint_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

const fn default_timeout() -> u64 {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: default_timeout(),
            theme: ThemeConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub accent_color: String,
    pub placeholder_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent_color: "cyan".to_string(),
            placeholder_color: "darkgray".to_string(),
        }
    }
}

/// Settings for the built-in generation endpoint (`talkgen serve`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub bind: String,
    pub upstream_base_url: String,
    pub model: String,
    /// Name of the environment variable holding the upstream API key.
    /// The key itself never lives in the config file.
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            upstream_base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            request_timeout: default_timeout(),
        }
    }
}
