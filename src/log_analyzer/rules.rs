//! Regex-правила базы знаний с подстановкой групп в шаблон описания
//!
//! Правила кураторов пишутся в диалекте с look-around и обратными ссылками,
//! поэтому компилируются через `fancy_regex`. Встроенные шаблоны остаются на `regex`.

use fancy_regex::RegexBuilder;
use lazy_static::lazy_static;
use mccrash_core::{Finding, MatchKind, ReasonKey};
use mccrash_db::KnowledgeBaseReader;
use regex::Regex;
use std::collections::BTreeSet;

use crate::error::AnalyzerError;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\[\[(\d+)\]\]").unwrap();
}

/// Число различных плейсхолдеров [[n]] в шаблоне
pub fn placeholder_count(template: &str) -> usize {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Скомпилировать шаблон правила (точка совпадает с переводом строки)
pub fn compile_rule(rule_id: &str, pattern: &str) -> Result<fancy_regex::Regex, AnalyzerError> {
    RegexBuilder::new(&format!("(?s){}", pattern))
        .build()
        .map_err(|e| AnalyzerError::InvalidRegex {
            rule_id: rule_id.to_string(),
            message: e.to_string(),
        })
}

/// Применить regex к тексту: по строке описания на каждое совпадение.
///
/// Совпадение отбрасывается, если какая-то группа не участвовала или число
/// групп не равно числу плейсхолдеров в шаблоне. Ошибка поиска (например,
/// превышен лимит backtracking) обрывает перебор с предупреждением.
pub fn apply_template(re: &fancy_regex::Regex, text: &str, template: &str) -> Vec<String> {
    let expected = placeholder_count(template);

    re.captures_iter(text)
        .map_while(|caps| match caps {
            Ok(caps) => Some(caps),
            Err(e) => {
                log::warn!("Regex search aborted: {}", e);
                None
            }
        })
        .filter_map(|caps| {
            let values: Option<Vec<&str>> = caps
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str()))
                .collect();
            let values = values?;
            if values.len() != expected {
                return None;
            }

            let mut result = template.to_string();
            for (i, value) in values.iter().enumerate() {
                result = result.replace(&format!("[[{}]]", i + 1), value);
            }
            Some(result)
        })
        .collect()
}

/// Прогнать все regex-правила (порядок причин, затем порядок правил)
pub(super) fn analyze_regex_rules(kb: &dyn KnowledgeBaseReader, text: &str, finding: &mut Finding) {
    for reason in kb.list_crash_reasons() {
        for rule in kb.get_detection_rules(&reason.id) {
            if rule.kind != MatchKind::Regex || rule.pattern.is_empty() {
                continue;
            }

            let re = match compile_rule(&rule.id, &rule.pattern) {
                Ok(re) => re,
                Err(e) => {
                    log::warn!("Skipping detection rule: {}", e);
                    continue;
                }
            };

            let results = apply_template(&re, text, &reason.description);
            if !results.is_empty() {
                log::info!(
                    "[Regex] Found matching crash reason: {} - {}",
                    reason.id,
                    reason.name
                );
                finding.append(ReasonKey::Record(reason.id.clone()), results);
            }
        }
    }
}
