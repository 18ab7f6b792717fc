use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::i18n::Language;

// ========== Логи ==========

/// Категория файла лога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// crash-*.txt
    CrashReport,
    /// latest.log и вывод игры из лаунчера
    MinecraftLog,
    /// debug.log
    DebugLog,
    /// hs_err_pid*.log (фатальная ошибка JVM)
    HsErr,
    /// Прочие логи, в анализ не попадают
    Extra,
    /// Логи лаунчеров, исключаются полностью
    Ignored,
}

impl LogCategory {
    /// Порядок категорий при сборке корпуса
    pub const CORPUS_ORDER: [LogCategory; 4] = [
        LogCategory::CrashReport,
        LogCategory::MinecraftLog,
        LogCategory::DebugLog,
        LogCategory::HsErr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::CrashReport => "crash_report",
            LogCategory::MinecraftLog => "minecraft_log",
            LogCategory::DebugLog => "debug_log",
            LogCategory::HsErr => "hs_err",
            LogCategory::Extra => "extra",
            LogCategory::Ignored => "ignored",
        }
    }
}

/// Собранный файл лога. Живёт только в рамках одного анализа
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub category: LogCategory,
    pub lines: Vec<String>,
}

impl LogFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Полный текст файла (строки через \n)
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

// ========== База знаний ==========

/// Человек, который нашёл причину краша или написал правило
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

/// Известная причина краша из базы знаний
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashReasonRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Шаблон описания с плейсхолдерами [[1]], [[2]], ...
    #[serde(default)]
    pub description: String,
    /// Только для информации, каскад его не использует
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub promoter_id: Option<u64>,
}

/// Тип сопоставления правила (в JSON: match_type 0 / 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchKind {
    Keyword,
    Regex,
}

impl TryFrom<u8> for MatchKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MatchKind::Keyword),
            1 => Ok(MatchKind::Regex),
            other => Err(format!("Unknown match_type: {}", other)),
        }
    }
}

impl From<MatchKind> for u8 {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Keyword => 0,
            MatchKind::Regex => 1,
        }
    }
}

/// Правило обнаружения, принадлежащее причине краша
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRule {
    #[serde(default)]
    pub id: String,
    pub crash_reason_id: String,
    #[serde(rename = "match_type")]
    pub kind: MatchKind,
    #[serde(rename = "match")]
    pub pattern: String,
    /// Кто добавил правило. Только справочно: в отчёте указывается промоутер
    /// причины, а не автор правила.
    #[serde(default)]
    pub contributor_id: Option<u64>,
}

// ========== Встроенные причины ==========

/// Структурные причины, зашитые в анализатор (не редактируются через базу знаний)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinReason {
    // Проблемы модов
    JavaTooHigh,
    JavaVersionError,
    ModMissing,
    ModDuplicate,
    ModIncompatible,
    ModSuspected,
    ModConfirmed,
    ModInitFailed,
    ModMixinFailed,
    ModConfigError,
    ModSpecialChars,
    ModRequiresJava11,
    ModTooMany,

    // Проблемы загрузчика
    FabricError,
    FabricSolution,
    ForgeError,
    ForgeIncomplete,
    ForgeJavaIncompatible,
    MultipleForge,
    MixinBootstrapMissing,

    // Ошибки игры
    BlockError,
    EntityError,
    OptifineForgeIncompatible,
    OptifineWorldLoadError,
    ShadersModOptifineConflict,
    FileValidationError,
    ManualDebugCrash,

    // Прочее
    StackKeywordFound,
    NoAnalysisFiles,
    Unknown,
}

/// Автор эвристик, перенесённых из PCL
const PCL_LOADER: &str = "PCL Loader";

impl BuiltinReason {
    /// Фиксированная пара (название, атрибуция)
    pub fn info(&self, lang: Language) -> (&'static str, Option<&'static str>) {
        let attribution = match self {
            BuiltinReason::NoAnalysisFiles | BuiltinReason::Unknown => None,
            _ => Some(PCL_LOADER),
        };
        (self.display_name(lang), attribution)
    }

    pub fn attribution(&self) -> Option<&'static str> {
        self.info(Language::English).1
    }

    pub fn display_name(&self, lang: Language) -> &'static str {
        use BuiltinReason::*;
        match lang {
            Language::English => match self {
                JavaTooHigh => "Java version too high",
                JavaVersionError => "Wrong Java version",
                ModMissing => "Missing dependency mod",
                ModDuplicate => "Mod installed twice",
                ModIncompatible => "Incompatible mods",
                ModSuspected => "Mod suspected of causing the crash",
                ModConfirmed => "Mod confirmed to cause the crash",
                ModInitFailed => "Mod initialization failed",
                ModMixinFailed => "Mod Mixin injection failed",
                ModConfigError => "Mod configuration file error",
                ModSpecialChars => "Mod name contains special characters",
                ModRequiresJava11 => "Mod requires Java 11 or newer",
                ModTooMany => "Too many mods, ID limit exceeded",
                FabricError => "Fabric error",
                FabricSolution => "Fabric error with suggested solution",
                ForgeError => "Forge error",
                ForgeIncomplete => "Incomplete Forge installation",
                ForgeJavaIncompatible => "Old Forge incompatible with new Java",
                MultipleForge => "Multiple Forge entries in version JSON",
                MixinBootstrapMissing => "MixinBootstrap missing",
                BlockError => "Specific block crashes the game",
                EntityError => "Specific entity crashes the game",
                OptifineForgeIncompatible => "OptiFine incompatible with Forge",
                OptifineWorldLoadError => "OptiFine prevents world loading",
                ShadersModOptifineConflict => "ShadersMod installed together with OptiFine",
                FileValidationError => "File or content validation failed",
                ManualDebugCrash => "Debug crash triggered manually",
                StackKeywordFound => "Stack analysis found keywords",
                NoAnalysisFiles => "No files available for analysis",
                Unknown => "Unknown cause, see the full log",
            },
            Language::Chinese => match self {
                JavaTooHigh => "Java版本过高",
                JavaVersionError => "Java版本错误",
                ModMissing => "缺少依赖Mod",
                ModDuplicate => "Mod重复安装",
                ModIncompatible => "Mod互不兼容",
                ModSuspected => "怀疑Mod导致游戏崩溃",
                ModConfirmed => "确定Mod导致游戏崩溃",
                ModInitFailed => "Mod初始化失败",
                ModMixinFailed => "Mod注入(Mixin)失败",
                ModConfigError => "Mod配置文件错误",
                ModSpecialChars => "Mod名称包含特殊字符",
                ModRequiresJava11 => "Mod需要Java11或更高版本",
                ModTooMany => "Mod过多导致超出ID限制",
                FabricError => "Fabric报错",
                FabricSolution => "Fabric报错并给出解决方案",
                ForgeError => "Forge报错",
                ForgeIncomplete => "Forge安装不完整",
                ForgeJavaIncompatible => "低版本Forge与高版本Java不兼容",
                MultipleForge => "版本Json中存在多个Forge",
                MixinBootstrapMissing => "MixinBootstrap缺失",
                BlockError => "特定方块导致崩溃",
                EntityError => "特定实体导致崩溃",
                OptifineForgeIncompatible => "OptiFine与Forge不兼容",
                OptifineWorldLoadError => "OptiFine导致无法加载世界",
                ShadersModOptifineConflict => "ShadersMod与OptiFine同时安装",
                FileValidationError => "文件或内容校验失败",
                ManualDebugCrash => "玩家手动触发调试崩溃",
                StackKeywordFound => "堆栈分析发现关键字",
                NoAnalysisFiles => "没有可用的分析文件",
                Unknown => "未知原因，请查看完整日志",
            },
        }
    }

    /// Причины, после которых пользователя просят прислать сам файл, а не скриншот
    pub fn asks_for_report_file(&self) -> bool {
        matches!(
            self,
            BuiltinReason::ModMissing
                | BuiltinReason::ForgeIncomplete
                | BuiltinReason::FabricError
                | BuiltinReason::NoAnalysisFiles
        )
    }

    /// Причины, которые не являются диагнозом
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, BuiltinReason::Unknown | BuiltinReason::NoAnalysisFiles)
    }
}

// ========== Результат анализа ==========

/// Ключ причины: запись базы знаний или встроенная причина
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKey {
    Record(String),
    BuiltIn(BuiltinReason),
}

impl From<BuiltinReason> for ReasonKey {
    fn from(reason: BuiltinReason) -> Self {
        ReasonKey::BuiltIn(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingEntry {
    pub reason: ReasonKey,
    pub evidence: Vec<String>,
}

/// Накопитель причин за один анализ (порядок вставки сохраняется)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Finding {
    entries: Vec<FindingEntry>,
}

impl Finding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить причину. Если ключ уже есть, доказательства дописываются
    pub fn append<I, S>(&mut self, reason: impl Into<ReasonKey>, evidence: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reason = reason.into();
        let evidence = evidence
            .into_iter()
            .map(Into::into)
            .filter(|e: &String| !e.is_empty());

        match self.entries.iter_mut().find(|e| e.reason == reason) {
            Some(entry) => entry.evidence.extend(evidence),
            None => self.entries.push(FindingEntry {
                reason,
                evidence: evidence.collect(),
            }),
        }
    }

    /// Причина без доказательств
    pub fn mark(&mut self, reason: impl Into<ReasonKey>) {
        self.append(reason, std::iter::empty::<String>());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, reason: &ReasonKey) -> bool {
        self.entries.iter().any(|e| &e.reason == reason)
    }

    pub fn contains_builtin(&self, reason: BuiltinReason) -> bool {
        self.contains(&ReasonKey::BuiltIn(reason))
    }

    pub fn evidence(&self, reason: &ReasonKey) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| &e.reason == reason)
            .map(|e| e.evidence.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FindingEntry> {
        self.entries.iter()
    }

    /// Нет ничего, кроме "неизвестно" / "нет файлов"
    pub fn is_inconclusive(&self) -> bool {
        self.entries.iter().all(|e| match &e.reason {
            ReasonKey::BuiltIn(b) => b.is_inconclusive(),
            ReasonKey::Record(_) => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_append_extends() {
        let mut finding = Finding::new();
        finding.append(BuiltinReason::ModMissing, ["a"]);
        finding.append(BuiltinReason::ModMissing, ["b"]);
        finding.mark(BuiltinReason::ModMissing);

        assert_eq!(finding.len(), 1);
        let key = ReasonKey::BuiltIn(BuiltinReason::ModMissing);
        assert_eq!(finding.evidence(&key).unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_finding_keeps_insertion_order() {
        let mut finding = Finding::new();
        finding.append(ReasonKey::Record("zeta".into()), ["z"]);
        finding.mark(BuiltinReason::ForgeError);
        finding.append(ReasonKey::Record("alpha".into()), ["a"]);

        let order: Vec<_> = finding.iter().map(|e| e.reason.clone()).collect();
        assert_eq!(
            order,
            vec![
                ReasonKey::Record("zeta".into()),
                ReasonKey::BuiltIn(BuiltinReason::ForgeError),
                ReasonKey::Record("alpha".into()),
            ]
        );
    }

    #[test]
    fn test_inconclusive() {
        let mut finding = Finding::new();
        finding.mark(BuiltinReason::Unknown);
        assert!(finding.is_inconclusive());
        finding.mark(BuiltinReason::FabricError);
        assert!(!finding.is_inconclusive());
    }

    #[test]
    fn test_builtin_attribution() {
        assert_eq!(BuiltinReason::ModMissing.attribution(), Some("PCL Loader"));
        assert_eq!(BuiltinReason::Unknown.attribution(), None);
        let (name, _) = BuiltinReason::JavaTooHigh.info(Language::Chinese);
        assert_eq!(name, "Java版本过高");
    }

    #[test]
    fn test_detection_rule_json_shape() {
        let json = r#"{"id":"r1","crash_reason_id":"c1","match_type":1,"match":"Foo (\\d+)","contributor_id":2}"#;
        let rule: DetectionRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, MatchKind::Regex);
        assert_eq!(rule.pattern, "Foo (\\d+)");
        assert_eq!(rule.contributor_id, Some(2));

        let bad = r#"{"crash_reason_id":"c1","match_type":7,"match":"x"}"#;
        assert!(serde_json::from_str::<DetectionRule>(bad).is_err());
    }
}
