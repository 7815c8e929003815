//! Configuration settings for Folio.

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub chunking: ChunkingSettings,
    pub store: StoreSettings,
    pub retrieval: RetrievalSettings,
    pub loader: LoaderSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.folio".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory holding the store snapshots. Empty means `<data_dir>/store`.
    pub dir: String,
}

/// Retrieval and answer formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Maximum characters of chunk content shown per source.
    pub excerpt_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            excerpt_chars: 100,
        }
    }
}

/// File loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Plain text files are cut into segments of this many characters.
    pub text_segment_chars: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            text_segment_chars: 1000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FolioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
            .join("config.toml")
    }

    /// Set a single value addressed by a dotted key such as `chunking.chunk_size`.
    ///
    /// String fields take the value as-is; other fields parse it as a number
    /// or boolean. The result is round-tripped through the typed settings so
    /// unknown keys and wrong types are rejected.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| FolioError::Config(format!("Key must be 'section.field': {}", key)))?;

        let mut doc = toml::Value::try_from(&*self).map_err(|e| FolioError::Config(e.to_string()))?;

        let table = doc
            .get_mut(section)
            .and_then(|s| s.as_table_mut())
            .ok_or_else(|| FolioError::Config(format!("Unknown section: {}", section)))?;

        let current = table
            .get(field)
            .ok_or_else(|| FolioError::Config(format!("Unknown key: {}", key)))?;

        let parsed = if current.is_str() {
            toml::Value::String(value.to_string())
        } else {
            value
                .parse::<i64>()
                .map(toml::Value::Integer)
                .or_else(|_| value.parse::<bool>().map(toml::Value::Boolean))
                .unwrap_or_else(|_| toml::Value::String(value.to_string()))
        };
        table.insert(field.to_string(), parsed);

        *self = doc
            .try_into()
            .map_err(|e: toml::de::Error| FolioError::Config(format!("Invalid value for {}: {}", key, e)))?;
        Ok(())
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded store directory path.
    pub fn store_dir(&self) -> PathBuf {
        if self.store.dir.trim().is_empty() {
            self.data_dir().join("store")
        } else {
            Self::expand_path(&self.store.dir)
        }
    }
}
