use chrono::Local;
use std::path::Path;

// Use workspace crates
use mccrash_core as core;
use mccrash_db as db_crate;

// Re-export modules from workspace crates
pub use core::{error, i18n, types};
pub use db_crate::{KnowledgeBase, KnowledgeBaseReader, KnowledgeBaseStats};

pub mod log_analyzer;
pub mod paths;
pub mod settings;

pub use log_analyzer::{AnalysisOutcome, AnalysisReport, CrashAnalyzer};
pub use settings::Settings;

/// Настроить логирование: stderr и (опционально) файл
///
/// Формат строки: `[2024-01-01 12:00:00.000 INFO target] message`
pub fn init_logging(level: log::LevelFilter, log_file: Option<&Path>) -> error::Result<()> {
    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        logger = logger.chain(fern::log_file(path)?);
    }

    if let Err(e) = logger.apply() {
        // Логгер уже установлен (повторный вызов в тестах), не критично
        eprintln!("Failed to initialize logger: {}", e);
    }

    log::debug!("Logging initialized at level {}", level);
    Ok(())
}
