//! Табличные JSON-файлы базы знаний
//!
//! Каждая таблица хранится отдельным файлом, объектом `{ "<id>": { ... } }`.
//! Редактор базы пишет их с сортировкой ключей, поэтому порядок чтения
//! стабилен между запусками.

use mccrash_core::Result;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

pub const PERSONS_FILE: &str = "persons.json";
pub const CRASH_REASONS_FILE: &str = "crash_reasons.json";
pub const DETECTION_RULES_FILE: &str = "detection_rules.json";

/// Прочитать таблицу из файла.
///
/// Отсутствующий файл или битый JSON дают пустую таблицу
/// (с предупреждением в лог): анализ должен работать и без базы знаний.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> BTreeMap<String, T> {
    if !path.exists() {
        log::info!("Knowledge base table {} not found, using empty table", path.display());
        return BTreeMap::new();
    }

    load_table(path).unwrap_or_else(|e| {
        log::warn!("Failed to load knowledge base table {}: {}", path.display(), e);
        BTreeMap::new()
    })
}

/// Прочитать и разобрать таблицу, ошибки отдаются вызывающему
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    let content = std::fs::read_to_string(path)?;
    parse_table(&content)
}

/// Разобрать таблицу. Записи, которые не удалось разобрать, пропускаются
pub fn parse_table<T: DeserializeOwned>(content: &str) -> Result<BTreeMap<String, T>> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;

    let mut table = BTreeMap::new();
    for (key, value) in raw {
        match serde_json::from_value::<T>(value) {
            Ok(row) => {
                table.insert(key, row);
            }
            Err(e) => log::warn!("Skipping knowledge base entry '{}': {}", key, e),
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mccrash_core::Person;

    #[test]
    fn test_parse_table_skips_bad_rows() {
        let json = r#"{"1": {"id": 1, "name": "Alice"}, "2": {"name": 5}}"#;
        let table: BTreeMap<String, Person> = parse_table(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["1"].name, "Alice");
    }

    #[test]
    fn test_read_table_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing: BTreeMap<String, Person> = read_table(&dir.path().join(PERSONS_FILE));
        assert!(missing.is_empty());

        let bad = dir.path().join(PERSONS_FILE);
        std::fs::write(&bad, "{ not json").unwrap();
        let malformed: BTreeMap<String, Person> = read_table(&bad);
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_load_table_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join(CRASH_REASONS_FILE);
        std::fs::write(&bad, "[1, 2").unwrap();

        let result: Result<BTreeMap<String, Person>> = load_table(&bad);
        assert!(matches!(result, Err(mccrash_core::AnalyzerError::Json(_))));

        let missing: Result<BTreeMap<String, Person>> = load_table(&dir.path().join(PERSONS_FILE));
        assert!(matches!(result_kind(missing), Some(std::io::ErrorKind::NotFound)));
    }

    fn result_kind<T>(result: Result<T>) -> Option<std::io::ErrorKind> {
        match result {
            Err(mccrash_core::AnalyzerError::Io(e)) => Some(e.kind()),
            _ => None,
        }
    }
}
