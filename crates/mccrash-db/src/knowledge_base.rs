//! Knowledge Base - база известных причин крашей
//!
//! Кураторы ведут три таблицы: люди, причины крашей и правила обнаружения.
//! Анализатор только читает их через [`KnowledgeBaseReader`] и никогда
//! ничего не записывает обратно.

use mccrash_core::{CrashReasonRecord, DetectionRule, MatchKind, Person};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::db::{read_table, CRASH_REASONS_FILE, DETECTION_RULES_FILE, PERSONS_FILE};

/// Интерфейс чтения базы знаний, который нужен анализатору
pub trait KnowledgeBaseReader {
    /// Все причины крашей (в стабильном порядке)
    fn list_crash_reasons(&self) -> Vec<CrashReasonRecord>;

    /// Правила обнаружения для причины (пусто, если правил нет)
    fn get_detection_rules(&self, reason_id: &str) -> Vec<DetectionRule>;

    fn get_reason(&self, reason_id: &str) -> Option<CrashReasonRecord>;

    fn get_person(&self, person_id: u64) -> Option<Person>;
}

/// Статистика базы знаний
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseStats {
    pub crash_reasons: usize,
    pub keyword_rules: usize,
    pub regex_rules: usize,
    pub persons: usize,
}

/// База знаний в памяти, загружается из JSON-таблиц
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    persons: BTreeMap<u64, Person>,
    reasons: Vec<CrashReasonRecord>,
    rules: Vec<DetectionRule>,
}

impl KnowledgeBase {
    /// Пустая база: анализ работает только на встроенных эвристиках
    pub fn empty() -> Self {
        Self::default()
    }

    /// Собрать базу из готовых записей
    pub fn from_parts(
        persons: Vec<Person>,
        reasons: Vec<CrashReasonRecord>,
        rules: Vec<DetectionRule>,
    ) -> Self {
        Self {
            persons: persons.into_iter().map(|p| (p.id, p)).collect(),
            reasons,
            rules,
        }
    }

    /// Загрузить таблицы из директории (persons.json, crash_reasons.json, detection_rules.json)
    pub fn load(dir: &Path) -> Self {
        let persons: BTreeMap<String, Person> = read_table(&dir.join(PERSONS_FILE));
        let reasons: BTreeMap<String, CrashReasonRecord> =
            read_table(&dir.join(CRASH_REASONS_FILE));
        let rules: BTreeMap<String, DetectionRule> = read_table(&dir.join(DETECTION_RULES_FILE));

        let kb = Self::from_parts(
            persons.into_values().collect(),
            reasons
                .into_iter()
                .map(|(key, mut reason)| {
                    if reason.id.is_empty() {
                        reason.id = key;
                    }
                    reason
                })
                .collect(),
            rules
                .into_iter()
                .map(|(key, mut rule)| {
                    if rule.id.is_empty() {
                        rule.id = key;
                    }
                    rule
                })
                .collect(),
        );

        let stats = kb.stats();
        log::info!(
            "Loaded knowledge base from {}: {} reasons, {} keyword rules, {} regex rules, {} persons",
            dir.display(),
            stats.crash_reasons,
            stats.keyword_rules,
            stats.regex_rules,
            stats.persons
        );
        kb
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        KnowledgeBaseStats {
            crash_reasons: self.reasons.len(),
            keyword_rules: self
                .rules
                .iter()
                .filter(|r| r.kind == MatchKind::Keyword)
                .count(),
            regex_rules: self
                .rules
                .iter()
                .filter(|r| r.kind == MatchKind::Regex)
                .count(),
            persons: self.persons.len(),
        }
    }
}

impl KnowledgeBaseReader for KnowledgeBase {
    fn list_crash_reasons(&self) -> Vec<CrashReasonRecord> {
        self.reasons.clone()
    }

    fn get_detection_rules(&self, reason_id: &str) -> Vec<DetectionRule> {
        self.rules
            .iter()
            .filter(|r| r.crash_reason_id == reason_id)
            .cloned()
            .collect()
    }

    fn get_reason(&self, reason_id: &str) -> Option<CrashReasonRecord> {
        self.reasons.iter().find(|r| r.id == reason_id).cloned()
    }

    fn get_person(&self, person_id: u64) -> Option<Person> {
        self.persons.get(&person_id).cloned()
    }
}
