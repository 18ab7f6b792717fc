//! Сбор файлов логов из папки
//!
//! Берём только файлы первого уровня с расширением .log / .txt и ненулевым
//! размером. Порядок: по имени файла, чтобы повторный анализ той же папки
//! давал тот же результат.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{AnalyzerError, Result};
use crate::paths::has_log_extension;

/// Прочитанный файл лога (ещё без категории)
#[derive(Debug, Clone)]
pub struct CollectedLog {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

/// Собрать логи из директории.
///
/// Ошибка только если директории нет. Нечитаемые файлы пропускаются с
/// предупреждением; пустой результат это нормальная ситуация.
pub fn collect_logs(dir: &Path) -> Result<Vec<CollectedLog>> {
    if !dir.is_dir() {
        return Err(AnalyzerError::NotFound(format!(
            "log directory {}",
            dir.display()
        )));
    }

    log::info!("Collecting logs from: {}", dir.display());

    let mut logs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !has_log_extension(&name) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            log::debug!("Skipping empty file: {}", name);
            continue;
        }

        match read_lossy(entry.path()) {
            Ok(content) if !content.is_empty() => {
                log::debug!("Added {} for analysis", entry.path().display());
                logs.push(CollectedLog {
                    path: entry.path().to_path_buf(),
                    lines: content.lines().map(str::to_string).collect(),
                });
            }
            Ok(_) => log::debug!("Skipping file without text: {}", name),
            Err(e) => log::warn!("Error reading file {}: {}", entry.path().display(), e),
        }
    }

    log::info!("Collected {} log file(s)", logs.len());
    Ok(logs)
}

/// Прочитать файл как UTF-8, выбрасывая невалидные байты
fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect())
}
