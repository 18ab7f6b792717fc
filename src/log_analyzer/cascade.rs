//! Каскад стратегий обнаружения
//!
//! Этапы идут строго по порядку, первый этап с непустым результатом
//! останавливает каскад. Каждый этап пишет во временный [`Finding`]:
//! если этап упал, его частичные результаты выбрасываются.

use mccrash_core::{BuiltinReason, Finding, Language, ReasonKey};
use mccrash_db::KnowledgeBaseReader;

use super::classifier::Corpus;
use super::keywords::KeywordIndex;
use super::mappings::{extract_stack_trace, resolve_mod_names, stack_keywords};
use super::patterns::{analyze_high_priority, analyze_low_priority};
use super::rules::analyze_regex_rules;
use crate::error::Result;

/// Упоминания загрузчиков, без которых анализ стека не имеет смысла
const LOADER_NAMES: &[&str] = &["forge", "fabric", "quilt", "liteloader"];

/// Этапы каскада в порядке выполнения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    HighPriority,
    Keywords,
    Regex,
    StackTrace,
    LowPriority,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::HighPriority,
        Stage::Keywords,
        Stage::Regex,
        Stage::StackTrace,
        Stage::LowPriority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::HighPriority => "high_priority",
            Stage::Keywords => "keywords",
            Stage::Regex => "regex",
            Stage::StackTrace => "stack_trace",
            Stage::LowPriority => "low_priority",
        }
    }
}

pub struct Cascade<'a> {
    kb: &'a dyn KnowledgeBaseReader,
    lang: Language,
}

impl<'a> Cascade<'a> {
    pub fn new(kb: &'a dyn KnowledgeBaseReader, lang: Language) -> Self {
        Self { kb, lang }
    }

    /// Прогнать каскад. Результат никогда не пустой
    pub fn run(&self, corpus: &Corpus) -> Finding {
        log::info!("Starting crash analysis");

        if corpus.is_empty() {
            let mut finding = Finding::new();
            finding.mark(BuiltinReason::NoAnalysisFiles);
            return finding;
        }

        for stage in Stage::ORDER {
            let mut scratch = Finding::new();
            match self.run_stage(stage, corpus, &mut scratch) {
                Ok(()) if !scratch.is_empty() => {
                    log::info!(
                        "Stage '{}' produced {} reason(s)",
                        stage.as_str(),
                        scratch.len()
                    );
                    return scratch;
                }
                Ok(()) => log::debug!("Stage '{}' found nothing", stage.as_str()),
                Err(e) => log::warn!("Stage '{}' failed: {}", stage.as_str(), e),
            }
        }

        log::info!("No known crash reason found");
        let mut finding = Finding::new();
        finding.mark(BuiltinReason::Unknown);
        finding
    }

    fn run_stage(&self, stage: Stage, corpus: &Corpus, finding: &mut Finding) -> Result<()> {
        match stage {
            Stage::HighPriority => analyze_high_priority(corpus, self.lang, finding),
            Stage::Keywords => self.analyze_keywords(corpus, finding),
            Stage::Regex => {
                analyze_regex_rules(self.kb, &corpus.all, finding);
                Ok(())
            }
            Stage::StackTrace => {
                self.analyze_stack(corpus, finding);
                Ok(())
            }
            Stage::LowPriority => {
                analyze_low_priority(corpus, self.lang, finding);
                Ok(())
            }
        }
    }

    fn analyze_keywords(&self, corpus: &Corpus, finding: &mut Finding) -> Result<()> {
        let index = KeywordIndex::build(self.kb)?;
        if index.is_empty() {
            return Ok(());
        }

        for reason_id in index.matched_reasons(&corpus.all) {
            let Some(record) = self.kb.get_reason(&reason_id) else {
                continue;
            };
            log::info!(
                "[Keyword] Found matching crash reason: {} - {}",
                record.id,
                record.name
            );
            finding.append(ReasonKey::Record(record.id), [record.description]);
        }
        Ok(())
    }

    fn analyze_stack(&self, corpus: &Corpus, finding: &mut Finding) {
        let lower = corpus.all.to_lowercase();
        if !LOADER_NAMES.iter().any(|name| lower.contains(name)) {
            return;
        }

        let Some(stack) = corpus.crash_report.as_deref().and_then(extract_stack_trace) else {
            return;
        };

        let keywords = stack_keywords(&stack);
        if keywords.is_empty() {
            return;
        }
        log::debug!("Stack keywords: {}", keywords.join(", "));

        let mod_names = resolve_mod_names(
            &keywords,
            corpus.crash_report.as_deref(),
            corpus.debug_log.as_deref(),
        );
        if mod_names.is_empty() {
            finding.append(BuiltinReason::StackKeywordFound, keywords);
        } else {
            finding.append(BuiltinReason::ModSuspected, mod_names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mccrash_core::{CrashReasonRecord, DetectionRule, MatchKind};
    use mccrash_db::KnowledgeBase;

    fn oom_kb() -> KnowledgeBase {
        KnowledgeBase::from_parts(
            vec![],
            vec![CrashReasonRecord {
                id: "oom".into(),
                name: "Out of memory".into(),
                description: "Give the game more memory".into(),
                priority: 1,
                promoter_id: None,
            }],
            vec![DetectionRule {
                id: "r1".into(),
                crash_reason_id: "oom".into(),
                kind: MatchKind::Keyword,
                pattern: "OutOfMemoryError".into(),
                contributor_id: None,
            }],
        )
    }

    fn run(kb: &KnowledgeBase, crash: Option<&str>, game: Option<&str>) -> Finding {
        Cascade::new(kb, Language::English).run(&Corpus::from_text(crash, game))
    }

    #[test]
    fn test_empty_corpus() {
        let finding = run(&KnowledgeBase::empty(), None, None);
        assert!(finding.contains_builtin(BuiltinReason::NoAnalysisFiles));
        assert_eq!(finding.len(), 1);
    }

    #[test]
    fn test_high_priority_short_circuits_keywords() {
        let crash = "java.lang.OutOfMemoryError\n\
                     Class file major version 65\n\
                     supports class version 61\n";
        let finding = run(&oom_kb(), Some(crash), None);
        assert_eq!(finding.len(), 1);
        assert!(finding.contains_builtin(BuiltinReason::JavaTooHigh));
        assert!(!finding.contains(&ReasonKey::Record("oom".into())));
    }

    #[test]
    fn test_failed_stage_falls_through() {
        // Высокий приоритет падает (нет "supports class version"), дальше работают ключевые слова
        let crash = "Class file major version 65\njava.lang.OutOfMemoryError";
        let finding = run(&oom_kb(), Some(crash), None);
        let evidence = finding.evidence(&ReasonKey::Record("oom".into())).unwrap();
        assert_eq!(evidence, ["Give the game more memory"]);
        assert!(!finding.contains_builtin(BuiltinReason::JavaTooHigh));
        assert!(!finding.contains_builtin(BuiltinReason::JavaVersionError));
    }

    #[test]
    fn test_stack_inference_needs_loader() {
        let crash = "java.lang.NullPointerException: x\n\
                     \tat coolmod.Thing.tick(Thing.java:1)\n";
        let plain = run(&KnowledgeBase::empty(), Some(crash), None);
        assert!(plain.contains_builtin(BuiltinReason::Unknown));

        let with_forge = format!("{}Is Modded: Definitely; Client brand changed to 'forge'\n", crash);
        let finding = run(&KnowledgeBase::empty(), Some(&with_forge), None);
        let key = ReasonKey::BuiltIn(BuiltinReason::StackKeywordFound);
        assert_eq!(finding.evidence(&key).unwrap(), ["coolmod"]);
    }

    #[test]
    fn test_fallback_unknown() {
        let finding = run(&KnowledgeBase::empty(), Some("nothing to see here"), None);
        assert_eq!(finding.len(), 1);
        assert!(finding.contains_builtin(BuiltinReason::Unknown));
    }
}
