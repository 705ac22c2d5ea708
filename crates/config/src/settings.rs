// Application settings
// Loaded from ~/.config/datacat/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EMAIL_DOMAIN: &str = "asbanc.com.pe";
pub const DEFAULT_OUTPUT_FILE: &str = "catalogo_metadatos_diccionario.xlsx";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// Classification disabled
    None,
    /// Local OpenAI-compatible server (Ollama)
    Local,
    /// OpenAI API
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
}

impl AIProvider {
    /// Returns true if classification is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AIProvider::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AIProvider::None => "none",
            AIProvider::Local => "local",
            AIProvider::OpenAI => "openai",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Local => "llama3:8b",
            AIProvider::OpenAI => "gpt-4o-mini",
        }
    }

    /// Base URL of the chat-completions API
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Local => "http://localhost:11434/v1",
            AIProvider::OpenAI => "https://api.openai.com/v1",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, AIProvider::OpenAI)
    }
}

/// AI-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AISettings {
    /// Selected AI provider
    pub provider: AIProvider,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Custom API base URL
    pub endpoint: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            provider: AIProvider::default(),
            model: String::new(), // Empty = use provider default
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AISettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// Get the effective API base URL, without a trailing slash
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Catalog
    #[serde(rename = "catalog.emailDomain")]
    pub email_domain: String,

    #[serde(rename = "catalog.sampleRows")]
    pub sample_rows: usize,

    #[serde(rename = "catalog.sampleSeed")]
    pub sample_seed: u64,

    #[serde(rename = "catalog.outputFile")]
    pub output_file: String,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AISettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            sample_rows: 10,
            sample_seed: 1,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            ai: AISettings::default(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Steward contacts are edited without this domain and exported with it
    "catalog.emailDomain": "asbanc.com.pe",

    // Rows sent to the classifier per table, and the sampling seed
    "catalog.sampleRows": 10,
    "catalog.sampleSeed": 1,

    // Default export file name
    "catalog.outputFile": "catalogo_metadatos_diccionario.xlsx",

    // Classifier
    // Provider options: "none", "local", "openai"
    // API keys are stored in system keychain or DATACAT_<PROVIDER>_KEY, not in this file
    "ai": {
        "provider": "openai",
        "model": "",
        "timeout_secs": 60
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datacat");
        config_dir.join("settings.json")
    }

    /// Directory for the classification cache
    pub fn cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datacat")
            .join("classifications")
    }

    /// Load settings from the default location, falling back to defaults.
    /// A missing file is created with commented defaults.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path. Errors are returned, not masked.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::parse(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save current settings to disk
    pub fn save(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
