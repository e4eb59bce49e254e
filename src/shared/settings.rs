use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::shared::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "RUNA_API_URL";
const ENV_TIMEOUT_SECS: &str = "RUNA_TIMEOUT_SECS";
const ENV_DATA_DIR: &str = "RUNA_DATA_DIR";

const DATABASE_FILE: &str = "translations.redb";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub timeout_secs: u64,
    /// Overrides the platform data directory for the translation database
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "runasimi", "runa-translate")
        .ok_or_else(|| AppError::Config("Failed to determine project directories".to_string()))
}

impl ClientSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.json"))
    }

    /// Load settings from the platform config directory, then apply env overrides.
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        let settings = Self::load_from(&path).await?;
        Ok(settings.with_env_overrides())
    }

    /// Load from an explicit file. A missing file yields defaults.
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Config(format!("Failed to read settings file: {}", e)))?;

        let mut settings: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?;
        if settings.timeout_secs == 0 {
            tracing::warn!(path = %path.display(), "timeout_secs must be positive, using default");
            settings.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        Ok(settings)
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize settings: {}", e)))?;

        fs::write(path, content)
            .await
            .map_err(|e| AppError::Config(format!("Failed to write settings file: {}", e)))
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::get_settings_path()?;
        self.save_to(&path).await
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Location of the redb file holding history, favorites and preferences.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.data_dir().to_path_buf(),
        };
        Ok(dir.join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ClientSettings::load_from(&dir.path().join("nope.json")).await.unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ClientSettings {
            api_base_url: "http://translator.local/api/v1".to_string(),
            timeout_secs: 5,
            data_dir: Some(dir.path().to_path_buf()),
        };
        settings.save_to(&path).await.unwrap();

        let loaded = ClientSettings::load_from(&path).await.unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.database_path().unwrap(), dir.path().join("translations.redb"));
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, r#"{"timeout_secs": 10}"#).await.unwrap();

        let loaded = ClientSettings::load_from(&path).await.unwrap();
        assert_eq!(loaded.timeout_secs, 10);
        assert_eq!(loaded.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[tokio::test]
    async fn zero_timeout_in_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, r#"{"timeout_secs": 0}"#).await.unwrap();

        let loaded = ClientSettings::load_from(&path).await.unwrap();
        assert_eq!(loaded.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(loaded.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = ClientSettings::load_from(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, " http://example.test/api "),
            (ENV_TIMEOUT_SECS, "12"),
            (ENV_DATA_DIR, "/tmp/runa"),
        ]
        .into_iter()
        .collect();

        let mut settings = ClientSettings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://example.test/api");
        assert_eq!(settings.timeout_secs, 12);
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/runa")));
    }

    #[test]
    fn invalid_timeout_override_is_ignored() {
        let mut settings = ClientSettings::default();
        settings.apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "zero".to_string()));
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
