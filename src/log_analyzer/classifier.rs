//! Классификация логов и сборка корпуса для анализа

use mccrash_core::{LogCategory, LogFile};

use super::collector::CollectedLog;

/// Маркер лаунчера: дальше идёт вывод игры
const GAME_OUTPUT_MARKER: &str = "以下为游戏输出的最后一段内容";

/// Префиксы основного лога игры (latest.log, вывод из PCL, raw output)
const MINECRAFT_LOG_PREFIXES: &[&str] = &["latest", "游戏崩溃前的输出", "rawoutput"];

const DEBUG_LOG_NAMES: &[&str] = &["debug.log", "debug log.txt"];

/// Логи самих лаунчеров, в них нет ничего про краш
const IGNORED_NAMES: &[&str] = &["pcl 启动器日志.txt", "hmcl.log"];

/// Определить категорию файла по имени (и содержимому для неизвестных имён)
pub fn classify(file_name: &str, lines: &[String]) -> LogCategory {
    let name = file_name.to_lowercase();

    if name.starts_with("hs_err") {
        LogCategory::HsErr
    } else if name.starts_with("crash-") {
        LogCategory::CrashReport
    } else if MINECRAFT_LOG_PREFIXES.iter().any(|p| name.starts_with(p)) {
        LogCategory::MinecraftLog
    } else if DEBUG_LOG_NAMES.contains(&name.as_str()) {
        LogCategory::DebugLog
    } else if IGNORED_NAMES.contains(&name.as_str()) {
        LogCategory::Ignored
    } else if lines.iter().any(|line| line.contains(GAME_OUTPUT_MARKER)) {
        LogCategory::MinecraftLog
    } else {
        LogCategory::Extra
    }
}

/// Текст, на котором работает каскад.
///
/// По одному представителю на категорию (первый файл в порядке обхода)
/// и их склейка в `all`.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub crash_report: Option<String>,
    pub minecraft_log: Option<String>,
    pub debug_log: Option<String>,
    pub hs_err: Option<String>,
    /// Склейка представителей через \n в порядке LogCategory::CORPUS_ORDER
    pub all: String,
}

impl Corpus {
    /// Классифицировать собранные логи и собрать корпус
    pub fn prepare(collected: Vec<CollectedLog>) -> Self {
        let files: Vec<LogFile> = collected
            .into_iter()
            .map(|log| {
                let name = log
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let category = classify(&name, &log.lines);
                log::debug!("Categorized {} as {}", log.path.display(), category.as_str());
                LogFile {
                    path: log.path,
                    category,
                    lines: log.lines,
                }
            })
            .collect();

        Self::from_files(&files)
    }

    /// Собрать корпус из уже классифицированных файлов
    pub fn from_files(files: &[LogFile]) -> Self {
        let representative = |category: LogCategory| -> Option<String> {
            let file = files
                .iter()
                .find(|f| f.category == category && !f.lines.is_empty())?;
            log::info!("Using {} as {}", file.file_name(), category.as_str());
            Some(file.text())
        };

        let mut corpus = Corpus {
            crash_report: representative(LogCategory::CrashReport),
            minecraft_log: representative(LogCategory::MinecraftLog),
            debug_log: representative(LogCategory::DebugLog),
            hs_err: representative(LogCategory::HsErr),
            all: String::new(),
        };

        let all = LogCategory::CORPUS_ORDER
            .iter()
            .filter_map(|&category| corpus.text_of(category))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        corpus.all = all;

        log::info!(
            "Log preparation complete, {} useful file(s) for analysis",
            corpus.populated()
        );
        corpus
    }

    /// Текст представителя категории
    pub fn text_of(&self, category: LogCategory) -> Option<&str> {
        match category {
            LogCategory::CrashReport => self.crash_report.as_deref(),
            LogCategory::MinecraftLog => self.minecraft_log.as_deref(),
            LogCategory::DebugLog => self.debug_log.as_deref(),
            LogCategory::HsErr => self.hs_err.as_deref(),
            LogCategory::Extra | LogCategory::Ignored => None,
        }
    }

    /// Сколько категорий из CORPUS_ORDER заполнено (0 = анализировать нечего)
    pub fn populated(&self) -> usize {
        LogCategory::CORPUS_ORDER
            .iter()
            .filter(|&&c| self.text_of(c).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Корпус из готового текста (для тестов каскада и CLI-отладки)
    pub fn from_text(crash_report: Option<&str>, minecraft_log: Option<&str>) -> Self {
        let mut files = Vec::new();
        if let Some(text) = crash_report {
            files.push(LogFile {
                path: "crash-report.txt".into(),
                category: LogCategory::CrashReport,
                lines: text.lines().map(str::to_string).collect(),
            });
        }
        if let Some(text) = minecraft_log {
            files.push(LogFile {
                path: "latest.log".into(),
                category: LogCategory::MinecraftLog,
                lines: text.lines().map(str::to_string).collect(),
            });
        }
        Self::from_files(&files)
    }
}
