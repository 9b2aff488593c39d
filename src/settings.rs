use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub const MODEL_PATH_ENV: &str = "MODEL_PATH";
pub const HISTORY_PATH_ENV: &str = "HISTORY_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub model: Model,
    pub storage: Storage,
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub artifact_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub history_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    pub filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: Model {
                artifact_path: PathBuf::from("model/best_model.json"),
            },
            storage: Storage {
                history_path: PathBuf::from("data/predictions.csv"),
            },
            logging: Logging {
                filter: "student_insight=info".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(|| {
            let mut settings = Self::load_from_files(
                Path::new("settings.default.ron"),
                Path::new("settings.ron"),
            );
            settings.apply_env(|key| std::env::var(key).ok());
            settings
        })
    }

    fn load_from_files(default_path: &Path, override_path: &Path) -> Settings {
        let mut settings = read_ron(default_path).unwrap_or_default();
        if let Some(overrides) = read_ron(override_path) {
            settings = overrides;
        }
        settings
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var(MODEL_PATH_ENV).filter(|p| !p.is_empty()) {
            self.model.artifact_path = PathBuf::from(path);
        }
        if let Some(path) = var(HISTORY_PATH_ENV).filter(|p| !p.is_empty()) {
            self.storage.history_path = PathBuf::from(path);
        }
    }
}

fn read_ron(path: &Path) -> Option<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            return None;
        }
    };
    match ron::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unparsable settings file");
            None
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_no_files() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from_files(
            &dir.path().join("settings.default.ron"),
            &dir.path().join("settings.ron"),
        );
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_override_file_wins() {
        let dir = TempDir::new().unwrap();
        let default_path = dir.path().join("settings.default.ron");
        let override_path = dir.path().join("settings.ron");
        fs::write(
            &override_path,
            r#"(
                model: (artifact_path: "models/v2.json"),
                storage: (history_path: "/var/lib/history.csv"),
                logging: (filter: "student_insight=debug"),
            )"#,
        )
        .unwrap();

        let settings = Settings::load_from_files(&default_path, &override_path);
        assert_eq!(settings.model.artifact_path, PathBuf::from("models/v2.json"));
        assert_eq!(settings.logging.filter, "student_insight=debug");
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let default_path = dir.path().join("settings.default.ron");
        fs::write(&default_path, "(model: ").unwrap();

        let settings = Settings::load_from_files(&default_path, &dir.path().join("settings.ron"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let default_path = dir.path().join("settings.default.ron");
        fs::create_dir(&default_path).unwrap();

        let settings = Settings::load_from_files(&default_path, &dir.path().join("settings.ron"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_overrides_paths() {
        let mut settings = Settings::default();
        settings.apply_env(|key| match key {
            MODEL_PATH_ENV => Some("/opt/model.ron".to_string()),
            HISTORY_PATH_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.model.artifact_path, PathBuf::from("/opt/model.ron"));
        assert_eq!(
            settings.storage.history_path,
            Settings::default().storage.history_path
        );
    }
}
