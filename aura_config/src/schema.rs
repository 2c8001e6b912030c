use std::path::{Path, PathBuf};
use std::time::Duration;

use aura_conversation::TurnConfig;
use aura_core::DEFAULT_PERSONA_INSTRUCTION;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable overriding `providers.gemini.api_key`.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding `database.url`.
pub const DATABASE_URL_ENV: &str = "AURA_DATABASE_URL";

const CONFIG_DIR_NAME: &str = "aura";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub conversation: ConversationSettings,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PersonaConfig {
    #[serde(default = "PersonaConfig::default_name")]
    pub name: String,
    #[serde(default = "PersonaConfig::default_instruction")]
    pub instruction: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            instruction: Self::default_instruction(),
        }
    }
}

impl PersonaConfig {
    fn default_name() -> String {
        "Serenity".to_string()
    }

    fn default_instruction() -> String {
        DEFAULT_PERSONA_INSTRUCTION.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversationSettings {
    #[serde(default = "ConversationSettings::default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "ConversationSettings::default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    #[serde(default = "ConversationSettings::default_serialize_writes")]
    pub serialize_writes: bool,
    #[serde(default = "ConversationSettings::default_mood_history_limit")]
    pub mood_history_limit: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            history_limit: Self::default_history_limit(),
            generation_timeout_secs: Self::default_generation_timeout_secs(),
            serialize_writes: Self::default_serialize_writes(),
            mood_history_limit: Self::default_mood_history_limit(),
        }
    }
}

impl ConversationSettings {
    const fn default_history_limit() -> usize {
        10
    }

    const fn default_generation_timeout_secs() -> u64 {
        30
    }

    const fn default_serialize_writes() -> bool {
        true
    }

    const fn default_mood_history_limit() -> usize {
        7
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GeminiConfig {
    fn default_model() -> String {
        "gemini-2.0-flash-lite".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        dirs::home_dir().map_or_else(
            || "sqlite://aura.db?mode=rwc".to_string(),
            |home| {
                format!(
                    "sqlite://{}?mode=rwc",
                    home.join(CONFIG_DIR_NAME).join("aura.db").display()
                )
            },
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        8000
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load `~/aura/config.json` and apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'aura init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Replace file values with non-empty values from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(GEMINI_API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            info!("Using Gemini API key from {GEMINI_API_KEY_ENV}");
            self.providers.gemini.api_key = key;
        }
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            info!("Using database URL from {DATABASE_URL_ENV}");
            self.database.url = url;
        }
    }

    /// Build the turn manager configuration.
    #[must_use]
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            persona: self.persona.instruction.clone(),
            history_limit: self.conversation.history_limit,
            generation_timeout: Duration::from_secs(self.conversation.generation_timeout_secs),
            serialize_writes: self.conversation.serialize_writes,
            mood_history_limit: self.conversation.mood_history_limit,
        }
    }

    /// Configuration written by `aura init`.
    #[must_use]
    pub fn template() -> Self {
        Self {
            persona: PersonaConfig::default(),
            conversation: ConversationSettings::default(),
            providers: ProvidersConfig {
                gemini: GeminiConfig {
                    api_key: "your-gemini-api-key-here".to_string(),
                    model: GeminiConfig::default_model(),
                    base_url: None,
                    temperature: None,
                    max_output_tokens: None,
                },
            },
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, serde_json::to_string_pretty(&Self::template())?)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key (or set {GEMINI_API_KEY_ENV})");
        println!("   2. Run 'aura doctor' to check the database and Gemini connection");
        println!("   3. Run 'aura serve' to start the HTTP API, or 'aura chat' to talk in the terminal");
        println!();
        println!("🔧 Configuration options:");
        println!("   - persona.instruction: fixed instruction sent with every reply");
        println!("   - conversation.history_limit: number of past messages replayed as context");
        println!("   - conversation.generation_timeout_secs: upper bound on a Gemini call");
        println!();
        Ok(())
    }
}
