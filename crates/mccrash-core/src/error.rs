use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::Language;

/// Информация об ошибке с подсказкой для восстановления
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Код ошибки для идентификации
    pub code: String,
    /// Человекочитаемое сообщение
    pub message: String,
    /// Подсказка для исправления
    pub recovery_hint: Option<String>,
    /// Технические детали (для логов)
    pub details: Option<String>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            recovery_hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid regex in rule {rule_id}: {message}")]
    InvalidRegex { rule_id: String, message: String },

    #[error("Keyword index build failed: {0}")]
    KeywordIndex(String),

    #[error("Expected marker missing from log: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalyzerError {
    /// Возвращает локализованную информацию об ошибке
    pub fn localized_error_info(&self, lang: Language) -> ErrorInfo {
        match self {
            AnalyzerError::Io(e) => {
                let hint = match (e.kind(), lang) {
                    (std::io::ErrorKind::PermissionDenied, Language::English) => {
                        "Check read permissions for the log folder"
                    }
                    (std::io::ErrorKind::PermissionDenied, Language::Chinese) => {
                        "请检查日志文件夹的读取权限"
                    }
                    (std::io::ErrorKind::NotFound, Language::English) => {
                        "The file or folder does not exist"
                    }
                    (std::io::ErrorKind::NotFound, Language::Chinese) => "文件或文件夹不存在",
                    (_, Language::English) => {
                        "Make sure the folder is accessible and not locked by another process"
                    }
                    (_, Language::Chinese) => "请确认文件夹可以访问且未被其他程序占用",
                };
                let message = match lang {
                    Language::English => format!("Filesystem error: {}", e.kind()),
                    Language::Chinese => format!("文件系统错误: {}", e.kind()),
                };
                ErrorInfo::new("IO_ERROR", message)
                    .with_hint(hint)
                    .with_details(e.to_string())
            }
            AnalyzerError::Json(e) => match lang {
                Language::English => ErrorInfo::new("JSON_ERROR", "Knowledge base file is not valid JSON")
                    .with_hint("Fix the file by hand or restore it from a backup")
                    .with_details(e.to_string()),
                Language::Chinese => ErrorInfo::new("JSON_ERROR", "知识库文件不是有效的 JSON")
                    .with_hint("请手动修复文件或从备份恢复")
                    .with_details(e.to_string()),
            },
            AnalyzerError::Toml(e) => match lang {
                Language::English => ErrorInfo::new("CONFIG_PARSE_ERROR", "Settings file is not valid TOML")
                    .with_details(e.to_string()),
                Language::Chinese => ErrorInfo::new("CONFIG_PARSE_ERROR", "配置文件不是有效的 TOML")
                    .with_details(e.to_string()),
            },
            AnalyzerError::NotFound(what) => match lang {
                Language::English => ErrorInfo::new("NOT_FOUND", format!("Not found: {}", what)),
                Language::Chinese => ErrorInfo::new("NOT_FOUND", format!("未找到: {}", what)),
            },
            AnalyzerError::InvalidRegex { rule_id, message } => match lang {
                Language::English => ErrorInfo::new("INVALID_REGEX", format!("Detection rule '{}' has an invalid regex", rule_id))
                    .with_hint("Edit the rule in the knowledge base; it is skipped until fixed")
                    .with_details(message.clone()),
                Language::Chinese => ErrorInfo::new("INVALID_REGEX", format!("检测规则 '{}' 的正则表达式无效", rule_id))
                    .with_hint("请在知识库中修改该规则，修复前该规则会被跳过")
                    .with_details(message.clone()),
            },
            AnalyzerError::KeywordIndex(msg) => match lang {
                Language::English => ErrorInfo::new("KEYWORD_INDEX_ERROR", "Failed to build the keyword index")
                    .with_hint("Check the keyword rules in the knowledge base")
                    .with_details(msg.clone()),
                Language::Chinese => ErrorInfo::new("KEYWORD_INDEX_ERROR", "关键字索引构建失败")
                    .with_hint("请检查知识库中的关键字规则")
                    .with_details(msg.clone()),
            },
            AnalyzerError::MissingField(marker) => match lang {
                Language::English => ErrorInfo::new("MISSING_MARKER", "Log is missing an expected marker")
                    .with_details(marker.clone()),
                Language::Chinese => ErrorInfo::new("MISSING_MARKER", "日志缺少预期的标记")
                    .with_details(marker.clone()),
            },
            AnalyzerError::InvalidConfig(msg) => match lang {
                Language::English => ErrorInfo::new("INVALID_CONFIG", "Invalid configuration")
                    .with_hint("Check the settings file")
                    .with_details(msg.clone()),
                Language::Chinese => ErrorInfo::new("INVALID_CONFIG", "配置无效")
                    .with_hint("请检查配置文件")
                    .with_details(msg.clone()),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_info() {
        let err = AnalyzerError::NotFound("/tmp/logs".into());
        let info = err.localized_error_info(Language::English);
        assert_eq!(info.code, "NOT_FOUND");
        assert!(info.message.contains("/tmp/logs"));
    }

    #[test]
    fn test_invalid_regex_localized() {
        let err = AnalyzerError::InvalidRegex {
            rule_id: "rule_1".into(),
            message: "unclosed group".into(),
        };
        let info = err.localized_error_info(Language::Chinese);
        assert_eq!(info.code, "INVALID_REGEX");
        assert!(info.message.contains("rule_1"));
        assert_eq!(info.details.as_deref(), Some("unclosed group"));
    }

    #[test]
    fn test_error_info_serializes() {
        let err = AnalyzerError::InvalidConfig("bad language".into());
        let json = serde_json::to_value(err.localized_error_info(Language::English)).unwrap();
        assert_eq!(json["code"], "INVALID_CONFIG");
        assert_eq!(json["details"], "bad language");
    }

    #[test]
    fn test_json_error_converts() {
        let err: AnalyzerError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, AnalyzerError::Json(_)));
        assert_eq!(err.localized_error_info(Language::Chinese).code, "JSON_ERROR");
    }
}
