use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Язык итогового отчёта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    /// Английский
    #[serde(rename = "en")]
    #[default]
    English,
    /// Китайский (язык сообщества, из которого пришла база знаний)
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Получить язык из строки (используйте Language::from_str() вместо этого метода)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "zh" | "cn" | "chinese" | "中文" => Some(Language::Chinese),
            _ => None,
        }
    }

    /// Получить код языка (для сериализации)
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Получить название языка
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s).ok_or_else(|| format!("Unknown language: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(Language::parse("EN"), Some(Language::English));
        assert_eq!(Language::parse("zh"), Some(Language::Chinese));
        assert_eq!(Language::parse("ru"), None);
        assert_eq!(Language::Chinese.code(), "zh");
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde_codes() {
        let json = serde_json::to_string(&Language::Chinese).unwrap();
        assert_eq!(json, "\"zh\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
