//! Кто автор найденных причин

use mccrash_core::{Finding, ReasonKey};
use mccrash_db::KnowledgeBaseReader;

/// Имя, если автора причины не удалось найти
pub const UNKNOWN_CONTRIBUTOR: &str = "unknown";

/// Авторы причин в порядке первого появления, без повторов.
///
/// Запись базы знаний -> имя промоутера; встроенная причина -> её фиксированная
/// атрибуция (причины без атрибуции пропускаются).
pub fn contributors(finding: &Finding, kb: &dyn KnowledgeBaseReader) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for entry in finding.iter() {
        let name = match &entry.reason {
            ReasonKey::Record(id) => Some(
                kb.get_reason(id)
                    .and_then(|record| record.promoter_id)
                    .and_then(|person_id| kb.get_person(person_id))
                    .map(|person| person.name)
                    .unwrap_or_else(|| UNKNOWN_CONTRIBUTOR.to_string()),
            ),
            ReasonKey::BuiltIn(reason) => reason.attribution().map(str::to_string),
        };

        if let Some(name) = name {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    names
}

pub fn contributor_line(names: &[String]) -> String {
    format!(
        "This analysis item(s) was contributed by: {}",
        names.join(", ")
    )
}
