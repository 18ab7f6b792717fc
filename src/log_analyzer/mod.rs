//! Анализатор крашей Minecraft
//!
//! Конвейер:
//! - Сбор логов из папки (collector)
//! - Классификация и сборка корпуса (classifier)
//! - Каскад стратегий обнаружения (cascade)
//! - Текст отчёта и авторы причин (report, attribution)

mod attribution;
mod cascade;
mod classifier;
mod collector;
mod keywords;
mod mappings;
mod patterns;
mod report;
mod rules;

// Re-export публичных типов
pub use attribution::{contributor_line, contributors, UNKNOWN_CONTRIBUTOR};
pub use cascade::{Cascade, Stage};
pub use classifier::{classify, Corpus};
pub use collector::{collect_logs, CollectedLog};
pub use keywords::KeywordIndex;
pub use mappings::{extract_stack_trace, resolve_mod_names, stack_keywords, IGNORED_STACK_KEYWORDS};
pub use patterns::{class_to_java_version, clean_mod_name};
pub use report::{
    build_report, no_usable_files_message, render, render_builtin, undetermined_message,
    AnalysisReport, DetectedReason,
};
pub use rules::{apply_template, compile_rule, placeholder_count};

use mccrash_core::{ErrorInfo, Finding};
use mccrash_db::KnowledgeBaseReader;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::settings::Settings;

/// Итог одного анализа
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Не нашлось ни одного файла для анализа.
    /// `error` заполнен, если папку не удалось прочитать вовсе.
    NoUsableFiles {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorInfo>,
    },
    /// Найдены только "неизвестно" / "нет файлов"
    Undetermined { finding: Finding, message: String },
    /// Есть диагноз
    Diagnosed(AnalysisReport),
}

impl AnalysisOutcome {
    /// Текст для пользователя
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::NoUsableFiles { message, .. } => message,
            AnalysisOutcome::Undetermined { message, .. } => message,
            AnalysisOutcome::Diagnosed(report) => &report.text,
        }
    }

    pub fn is_diagnosed(&self) -> bool {
        matches!(self, AnalysisOutcome::Diagnosed(_))
    }
}

/// Анализатор крашей.
///
/// База знаний берётся только на чтение, всё состояние анализа живёт внутри
/// одного вызова [`CrashAnalyzer::run`], поэтому один анализатор можно
/// использовать для любого числа папок.
pub struct CrashAnalyzer<'kb> {
    kb: &'kb dyn KnowledgeBaseReader,
    settings: Settings,
}

impl<'kb> CrashAnalyzer<'kb> {
    pub fn new(kb: &'kb dyn KnowledgeBaseReader, settings: Settings) -> Self {
        Self { kb, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Проанализировать папку с логами
    pub fn run(&self, dir: &Path) -> AnalysisOutcome {
        let lang = self.settings.language;
        log::info!("Analyzing {} [{}]", dir.display(), lang.code());

        let collected = match collect_logs(dir) {
            Ok(collected) => collected,
            Err(e) => {
                log::warn!("Failed to collect logs: {}", e);
                return AnalysisOutcome::NoUsableFiles {
                    message: no_usable_files_message(lang).to_string(),
                    error: Some(e.localized_error_info(lang)),
                };
            }
        };

        if collected.is_empty() {
            log::info!("No valid logs found in {}", dir.display());
            return AnalysisOutcome::NoUsableFiles {
                message: no_usable_files_message(lang).to_string(),
                error: None,
            };
        }

        let corpus = Corpus::prepare(collected);
        let finding = self.analyze_corpus(&corpus);

        if finding.is_inconclusive() {
            return AnalysisOutcome::Undetermined {
                finding,
                message: undetermined_message(lang).to_string(),
            };
        }

        AnalysisOutcome::Diagnosed(build_report(
            finding,
            self.kb,
            lang,
            self.settings.include_detected_reasons,
        ))
    }

    /// Текст отчёта (всегда непустой, никогда не паникует)
    pub fn analyze(&self, dir: &Path) -> String {
        self.run(dir).text().to_string()
    }

    /// Каскад по уже собранному корпусу
    pub fn analyze_corpus(&self, corpus: &Corpus) -> Finding {
        Cascade::new(self.kb, self.settings.language).run(corpus)
    }
}
