//! Поиск ключевых слов базы знаний за один проход (Aho-Corasick)

use aho_corasick::AhoCorasick;
use mccrash_core::MatchKind;
use mccrash_db::KnowledgeBaseReader;

use crate::error::{AnalyzerError, Result};

/// Автомат по всем keyword-правилам базы знаний
pub struct KeywordIndex {
    automaton: Option<AhoCorasick>,
    /// Индекс шаблона -> id причин, которым он принадлежит
    owners: Vec<Vec<String>>,
}

impl KeywordIndex {
    /// Собрать индекс из правил всех причин (пустые шаблоны пропускаются)
    pub fn build(kb: &dyn KnowledgeBaseReader) -> Result<Self> {
        let mut patterns: Vec<String> = Vec::new();
        let mut owners: Vec<Vec<String>> = Vec::new();

        for reason in kb.list_crash_reasons() {
            for rule in kb.get_detection_rules(&reason.id) {
                if rule.kind != MatchKind::Keyword || rule.pattern.is_empty() {
                    continue;
                }
                match patterns.iter().position(|p| *p == rule.pattern) {
                    Some(idx) => {
                        if !owners[idx].contains(&reason.id) {
                            owners[idx].push(reason.id.clone());
                        }
                    }
                    None => {
                        patterns.push(rule.pattern);
                        owners.push(vec![reason.id.clone()]);
                    }
                }
            }
        }

        if patterns.is_empty() {
            return Ok(Self {
                automaton: None,
                owners,
            });
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| AnalyzerError::KeywordIndex(e.to_string()))?;

        log::debug!("Built keyword index with {} pattern(s)", patterns.len());
        Ok(Self {
            automaton: Some(automaton),
            owners,
        })
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Причины, чьи ключевые слова встречаются в тексте.
    /// Порядок: по первому совпадению, без повторов
    pub fn matched_reasons(&self, text: &str) -> Vec<String> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };

        let mut reasons: Vec<String> = Vec::new();
        for m in automaton.find_overlapping_iter(text) {
            for id in &self.owners[m.pattern().as_usize()] {
                if !reasons.contains(id) {
                    reasons.push(id.clone());
                }
            }
        }
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mccrash_core::{CrashReasonRecord, DetectionRule};
    use mccrash_db::KnowledgeBase;

    fn reason(id: &str) -> CrashReasonRecord {
        CrashReasonRecord {
            id: id.into(),
            name: id.into(),
            description: format!("{} description", id),
            priority: 0,
            promoter_id: None,
        }
    }

    fn keyword(reason_id: &str, pattern: &str) -> DetectionRule {
        DetectionRule {
            id: format!("{}_{}", reason_id, pattern),
            crash_reason_id: reason_id.into(),
            kind: MatchKind::Keyword,
            pattern: pattern.into(),
            contributor_id: None,
        }
    }

    #[test]
    fn test_two_reasons_both_found() {
        let kb = KnowledgeBase::from_parts(
            vec![],
            vec![reason("oom"), reason("gl")],
            vec![
                keyword("oom", "OutOfMemoryError"),
                keyword("gl", "Pixel format not accelerated"),
                keyword("gl", ""),
            ],
        );
        let index = KeywordIndex::build(&kb).unwrap();
        assert_eq!(index.len(), 2);

        let text = "org.lwjgl.LWJGLException: Pixel format not accelerated\n\
                    java.lang.OutOfMemoryError: Java heap space";
        assert_eq!(index.matched_reasons(text), vec!["gl", "oom"]);
    }

    #[test]
    fn test_case_insensitive_and_overlapping() {
        let kb = KnowledgeBase::from_parts(
            vec![],
            vec![reason("a"), reason("b")],
            vec![keyword("a", "mixin apply"), keyword("b", "apply failed")],
        );
        let index = KeywordIndex::build(&kb).unwrap();
        assert_eq!(index.matched_reasons("Mixin APPLY FAILED for x"), vec!["a", "b"]);
    }

    #[test]
    fn test_shared_pattern_and_empty_index() {
        let kb = KnowledgeBase::from_parts(
            vec![],
            vec![reason("a"), reason("b")],
            vec![keyword("a", "boom"), keyword("b", "boom")],
        );
        let index = KeywordIndex::build(&kb).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.matched_reasons("boom boom"), vec!["a", "b"]);

        let empty = KeywordIndex::build(&KnowledgeBase::empty()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.matched_reasons("boom").is_empty());
    }
}
