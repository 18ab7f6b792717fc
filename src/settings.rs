use crate::error::{AnalyzerError, Result};
use crate::paths;
use mccrash_core::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Уровни логирования, которые понимает settings.toml
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    // Интерфейс
    /// Язык отчёта: "en" или "zh"
    pub language: Language,

    // База знаний
    /// Директория с persons.json / crash_reasons.json / detection_rules.json.
    /// None = директория данных пользователя
    pub knowledge_base_dir: Option<PathBuf>,

    // Логирование
    pub log_level: String,
    /// Дополнительно писать лог в файл
    pub log_file: Option<PathBuf>,

    // Отчёт
    /// Показывать секцию "--- Detected Crash Reasons ---"
    pub include_detected_reasons: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::English,
            knowledge_base_dir: None,
            log_level: "info".to_string(),
            log_file: None,
            include_detected_reasons: true,
        }
    }
}

impl Settings {
    /// Загрузить настройки.
    ///
    /// Явный путь должен существовать. Без пути читается файл из директории
    /// конфигурации пользователя, а если его нет, используются значения по умолчанию.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AnalyzerError::NotFound(format!(
                        "settings file {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match paths::default_settings_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let settings = Self::from_toml_str(&content)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Разобрать и проверить settings.toml
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let level = self.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "unknown log_level '{}', expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }

    /// Директория базы знаний с учётом значения по умолчанию
    pub fn knowledge_base_dir(&self) -> PathBuf {
        self.knowledge_base_dir
            .clone()
            .unwrap_or_else(paths::default_knowledge_base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::from_toml_str(
            r#"
                language = "zh"
                knowledge_base_dir = "/srv/kb"
                log_level = "DEBUG"
                include_detected_reasons = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.language, Language::Chinese);
        assert_eq!(settings.knowledge_base_dir(), PathBuf::from("/srv/kb"));
        assert_eq!(settings.level_filter(), log::LevelFilter::Debug);
        assert!(!settings.include_detected_reasons);
    }

    #[test]
    fn test_invalid_values() {
        let bad_level = Settings::from_toml_str(r#"log_level = "loud""#);
        assert!(matches!(bad_level, Err(AnalyzerError::InvalidConfig(_))));

        let bad_lang = Settings::from_toml_str(r#"language = "ru""#);
        assert!(matches!(bad_lang, Err(AnalyzerError::Toml(_))));

        let broken = Settings::from_toml_str("language = ");
        assert!(matches!(broken, Err(AnalyzerError::Toml(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(AnalyzerError::NotFound(_))
        ));

        std::fs::write(&path, "language = \"zh\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.language, Language::Chinese);
        assert!(settings.include_detected_reasons);
    }
}
