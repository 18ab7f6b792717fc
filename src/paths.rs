use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Имя файла настроек в директории конфигурации
pub const SETTINGS_FILE: &str = "settings.toml";

/// Расширения, которые считаются логами (без учёта регистра)
const LOG_EXTENSIONS: &[&str] = &["log", "txt"];

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "sibxodev", "mccrash")
}

/// Директория конфигурации пользователя (None, если нет домашней директории)
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Путь к settings.toml по умолчанию
pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// База знаний по умолчанию: <data_dir>/knowledge_base
pub fn default_knowledge_base_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("knowledge_base"))
        .unwrap_or_else(|| PathBuf::from("knowledge_base"))
}

/// Проверка расширения .log / .txt по имени файла
pub fn has_log_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            LOG_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_log_extension() {
        assert!(has_log_extension("latest.log"));
        assert!(has_log_extension("crash-2024-01-01_12.00.00-client.txt"));
        assert!(has_log_extension("HMCL.LOG"));
        assert!(!has_log_extension("mod.jar"));
        assert!(!has_log_extension("log"));
        assert!(!has_log_extension("latest.log.gz"));
    }

    #[test]
    fn test_default_settings_path_name() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with(SETTINGS_FILE));
        }
    }
}
