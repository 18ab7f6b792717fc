//! Структурные эвристики: то, что узнаётся по фиксированным маркерам в логах
//!
//! Высокий приоритет проверяется до базы знаний, низкий после анализа стека.

use lazy_static::lazy_static;
use mccrash_core::{BuiltinReason, Finding, Language};
use regex::Regex;

use super::classifier::Corpus;
use crate::error::{AnalyzerError, Result};

const SUSPECTED_MOD_MARKER: &str = "Suspected Mod: ";
const CLASS_VERSION_MARKER: &str = "Class file major version";
const MISSING_DEPS_MARKER: &str = "Missing or unsupported mandatory dependencies:";

/// Признаки ошибки Mixin
const MIXIN_TRIGGERS: &[&str] = &[
    "Mixin prepare failed ",
    "Mixin apply failed ",
    "MixinApplyError",
    "MixinTransformerError",
    "mixin.injection.throwables.",
    ".json] FAILED during ",
];

/// Таблица загрузчиков: причина и строки, по которым она узнаётся
const LOADER_TABLE: &[(BuiltinReason, &[&str])] = &[
    (
        BuiltinReason::FabricError,
        &["Fabric has crashed!", "Fabric has detected a mod loading error"],
    ),
    (
        BuiltinReason::ForgeError,
        &["Forge mod loading errors have been detected"],
    ),
    (
        BuiltinReason::ModInitFailed,
        &["Failed to initialize mod", "Failed to create mod instance"],
    ),
];

// Статичные паттерны компилируются один раз
lazy_static! {
    static ref SUSPECTED_MOD: Regex = Regex::new(r"(?s)Suspected Mod: \s*(.*?)\n").unwrap();
    static ref CLASS_MAJOR_VERSION: Regex = Regex::new(r"Class file major version (\d+)").unwrap();
    static ref SUPPORTED_CLASS_VERSION: Regex = Regex::new(r"supports class version (\d+)").unwrap();
    static ref MISSING_DEPS_BLOCK: Regex = Regex::new(
        r"Missing or unsupported mandatory dependencies:\n((?:\tMod ID:.*\n?)+)"
    ).unwrap();
    static ref MISSING_DEP_ENTRY: Regex = Regex::new(
        r"\tMod ID: '(.+?)', Requested by: '(.+?)', Expected range: '(.+?)', Actual version: '(.+?)'"
    ).unwrap();

    static ref MIXIN_FROM_MOD: Regex = Regex::new(r"from mod ([^./ \n]+)\] from").unwrap();
    static ref MIXIN_FOR_MOD: Regex = Regex::new(r"for mod ([^./ \n]+) failed").unwrap();
    static ref MIXIN_CONFIG_JSON: Regex = Regex::new(
        r"(?m)^[^\t\n]+?[ \[{(]([^ \[{(\n]+\.[^ \n]+)\.json"
    ).unwrap();
    static ref MOD_NAME_PREFIX: Regex = Regex::new(r"(mods\.|com\.|org\.|net\.|io\.)").unwrap();

    static ref MISSING_CLASS: Regex = Regex::new(
        r"Failed to create mod instance\..*?\njava\.lang\.NoClassDefFoundError: ([^/\s]+/[^/\s]+/[^/\s]+)"
    ).unwrap();

    static ref FABRIC_SOLUTION: [Regex; 2] = [
        Regex::new(r"A potential solution has been determined:\n((?:\t+ - [^\n]+(?:\n|\z))+)").unwrap(),
        Regex::new(
            r"A potential solution has been determined, this may resolve your problem:\n((?:\t+ - [^\n]+(?:\n|\z))+)"
        ).unwrap(),
    ];
}

/// Версия Java по версии class-файла (52 -> 8, 61 -> 17)
pub fn class_to_java_version(class_version: i64) -> i64 {
    class_version - 44
}

// ========== Высокий приоритет ==========

/// Эвристики высокого приоритета. Первая сработавшая завершает этап.
pub(super) fn analyze_high_priority(
    corpus: &Corpus,
    lang: Language,
    finding: &mut Finding,
) -> Result<()> {
    let text = corpus.all.as_str();

    if text.contains(SUSPECTED_MOD_MARKER) {
        let mods = suspected_mods(text, lang);
        if !mods.is_empty() {
            log::info!("Forge reported {} suspected mod(s)", mods.len());
            finding.append(BuiltinReason::ModSuspected, mods);
            return Ok(());
        }
    }

    if text.contains(CLASS_VERSION_MARKER) {
        if let Some(required) = capture_number(&CLASS_MAJOR_VERSION, text) {
            let running = capture_number(&SUPPORTED_CLASS_VERSION, text)
                .ok_or_else(|| AnalyzerError::MissingField("supports class version".into()))?;

            let required = class_to_java_version(required);
            let running = class_to_java_version(running);
            let reason = if required > running {
                BuiltinReason::JavaTooHigh
            } else {
                BuiltinReason::JavaVersionError
            };
            log::info!("Java mismatch: required {}, running {}", required, running);
            finding.append(reason, [java_versions_line(required, running, lang)]);
            return Ok(());
        }
    }

    if text.contains(MISSING_DEPS_MARKER) {
        let Some(block) = MISSING_DEPS_BLOCK.captures(text).and_then(|c| c.get(1)) else {
            log::debug!("Missing dependencies marker found, but no Mod ID lines");
            return Ok(());
        };

        for caps in MISSING_DEP_ENTRY.captures_iter(block.as_str()) {
            let entry = MissingDependency {
                mod_id: &caps[1],
                requested_by: &caps[2],
                expected_range: &caps[3],
                actual_version: &caps[4],
            };
            finding.append(BuiltinReason::ModMissing, [entry.describe(lang)]);
        }
    }

    Ok(())
}

fn capture_number(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// "Suspected Mod:" от Forge: убираем повторы, затем нумеруем и переводим
fn suspected_mods(text: &str, lang: Language) -> Vec<String> {
    let mut unique: Vec<&str> = Vec::new();
    for caps in SUSPECTED_MOD.captures_iter(text) {
        let Some(raw) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !unique.contains(&raw) {
            unique.push(raw);
        }
    }

    unique
        .iter()
        .enumerate()
        .map(|(i, raw)| match lang {
            Language::English => format!(
                "#{}: {}",
                i + 1,
                raw.replace(", Version: ", " mod, in-game version: ")
            ),
            Language::Chinese => format!(
                "第{}个: {}",
                i + 1,
                raw.replace(", Version: ", "模组，其在游戏中的版本号为: ")
            ),
        })
        .collect()
}

fn java_versions_line(required: i64, running: i64, lang: Language) -> String {
    match lang {
        Language::English => format!(
            "Required Java version: {}, current Java version: {}",
            required, running
        ),
        Language::Chinese => format!("需要的Java版本: {}，当前Java版本: {}", required, running),
    }
}

/// Строка блока "Missing or unsupported mandatory dependencies"
struct MissingDependency<'a> {
    mod_id: &'a str,
    requested_by: &'a str,
    expected_range: &'a str,
    actual_version: &'a str,
}

impl MissingDependency<'_> {
    fn describe(&self, lang: Language) -> String {
        let missing = self.actual_version == "[MISSING]";
        match (lang, missing) {
            (Language::English, true) => format!(
                "Install the '{}' dependency mod (requested by '{}')",
                self.mod_id, self.requested_by
            ),
            (Language::English, false) => format!(
                "Change the version of the '{}' dependency mod (requested by '{}'), required version: '{}', current version: '{}'",
                self.mod_id, self.requested_by, self.expected_range, self.actual_version
            ),
            (Language::Chinese, true) => format!(
                "需要安装'{}'前置模组（请求自: '{}'）",
                self.mod_id, self.requested_by
            ),
            (Language::Chinese, false) => format!(
                "需要更换 '{}'前置模组版本（请求自: '{}'），需要的版本：'{}'，当前版本: '{}'",
                self.mod_id, self.requested_by, self.expected_range, self.actual_version
            ),
        }
    }
}

// ========== Низкий приоритет ==========

/// Эвристики низкого приоритета (после анализа стека)
pub(super) fn analyze_low_priority(corpus: &Corpus, lang: Language, finding: &mut Finding) {
    let text = corpus.all.as_str();

    if MIXIN_TRIGGERS.iter().any(|t| text.contains(t)) {
        match mixin_mod_name(text) {
            Some(name) => {
                log::info!("Mixin failure attributed to mod '{}'", name);
                finding.append(BuiltinReason::ModMixinFailed, [name]);
            }
            None => finding.mark(BuiltinReason::ModMixinFailed),
        }
        return;
    }

    let mut loader_error = false;
    for (reason, markers) in LOADER_TABLE {
        if markers.iter().any(|m| text.contains(m)) {
            finding.mark(*reason);
            loader_error |= matches!(
                reason,
                BuiltinReason::ForgeError | BuiltinReason::ModInitFailed
            );
        }
    }

    if loader_error {
        if let Some(caps) = MISSING_CLASS.captures(text) {
            finding.append(BuiltinReason::ForgeError, [missing_class_line(&caps[1], lang)]);
        }
    }

    for re in FABRIC_SOLUTION.iter() {
        let Some(block) = re.captures(text).and_then(|c| c.get(1)) else {
            continue;
        };
        let lines: Vec<&str> = block
            .as_str()
            .lines()
            .map(|line| line.trim_start_matches('\t').trim())
            .filter(|line| !line.is_empty())
            .collect();
        if !lines.is_empty() {
            finding.append(BuiltinReason::FabricSolution, lines);
            return;
        }
    }

    if is_uninformative_short_log(corpus) {
        log::info!("Game log is too short to analyze");
        finding.mark(BuiltinReason::Unknown);
    }
}

fn missing_class_line(class_path: &str, lang: Language) -> String {
    match lang {
        Language::English => format!(
            "File '{}' does not exist. It may be a mod: check that this dependency mod is installed and that both mods are up to date",
            class_path
        ),
        Language::Chinese => format!(
            "检测到文件 '{}'不存在，这可能是一个模组，请检查是否已安装该前置模组，或双方模组版本是否最新",
            class_path
        ),
    }
}

/// Имя мода из ошибки Mixin: явное "from mod X" / "for mod X", иначе имя конфига *.json
fn mixin_mod_name(text: &str) -> Option<String> {
    let explicit = MIXIN_FROM_MOD
        .captures(text)
        .or_else(|| MIXIN_FOR_MOD.captures(text))
        .map(|caps| caps[1].trim().to_string());

    let raw = match explicit {
        Some(name) => name,
        None => MIXIN_CONFIG_JSON
            .captures(text)?
            .get(1)?
            .as_str()
            .replace("mixins", "mixin")
            .replace(".mixin", "")
            .replace("mixin.", ""),
    };

    clean_mod_name(&raw)
}

/// Убрать типичные префиксы пакетов и выбрать осмысленную часть имени
pub fn clean_mod_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let stripped = MOD_NAME_PREFIX.replace_all(text, "");
    let parts: Vec<&str> = stripped.split('.').collect();
    if parts.len() > 1 {
        let candidate = parts
            .iter()
            .find(|p| p.chars().count() > 2 && !p.chars().all(|c| c.is_ascii_digit()));
        if let Some(candidate) = candidate {
            return Some(candidate.to_string());
        }
    }

    Some(stripped.into_owned())
}

/// Лог игры есть, краш-репорта нет, и в логе почти ничего нет
fn is_uninformative_short_log(corpus: &Corpus) -> bool {
    if corpus.crash_report.is_some() {
        return false;
    }
    match corpus.minecraft_log.as_deref() {
        Some(log) => {
            log.chars().count() < 100 && !log.contains("at net.") && !log.contains("INFO]")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mccrash_core::ReasonKey;

    fn high(text: &str, lang: Language) -> Result<Finding> {
        let corpus = Corpus::from_text(Some(text), None);
        let mut finding = Finding::new();
        analyze_high_priority(&corpus, lang, &mut finding)?;
        Ok(finding)
    }

    fn low(crash: Option<&str>, game: Option<&str>) -> Finding {
        let corpus = Corpus::from_text(crash, game);
        let mut finding = Finding::new();
        analyze_low_priority(&corpus, Language::English, &mut finding);
        finding
    }

    fn evidence(finding: &Finding, reason: BuiltinReason) -> Vec<String> {
        finding
            .evidence(&ReasonKey::BuiltIn(reason))
            .map(|e| e.to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_java_too_high() {
        let text = "java.lang.UnsupportedClassVersionError: Class file major version 65\n\
                    this runtime only supports class version 61\n";
        let finding = high(text, Language::English).unwrap();
        assert_eq!(
            evidence(&finding, BuiltinReason::JavaTooHigh),
            vec!["Required Java version: 21, current Java version: 17"]
        );
    }

    #[test]
    fn test_java_equal_versions_is_version_error() {
        let text = "Class file major version 61\nsupports class version 61\n";
        let finding = high(text, Language::Chinese).unwrap();
        assert!(finding.contains_builtin(BuiltinReason::JavaVersionError));
        assert_eq!(
            evidence(&finding, BuiltinReason::JavaVersionError),
            vec!["需要的Java版本: 17，当前Java版本: 17"]
        );
    }

    #[test]
    fn test_java_without_running_version_fails() {
        let text = "Class file major version 65\nnothing else\n";
        assert!(matches!(
            high(text, Language::English),
            Err(AnalyzerError::MissingField(_))
        ));
    }

    #[test]
    fn test_suspected_mods_numbered_and_deduped() {
        let text = "Suspected Mod: \n\tCreate (create), Version: 0.5.1\n\
                    Suspected Mod: \n\tCreate (create), Version: 0.5.1\n\
                    Suspected Mod: \n\tFlywheel (flywheel), Version: 0.6.9\nend";
        let finding = high(text, Language::English).unwrap();
        assert_eq!(
            evidence(&finding, BuiltinReason::ModSuspected),
            vec![
                "#1: Create (create) mod, in-game version: 0.5.1",
                "#2: Flywheel (flywheel) mod, in-game version: 0.6.9",
            ]
        );
    }

    #[test]
    fn test_missing_dependencies_install_vs_upgrade() {
        let text = "Missing or unsupported mandatory dependencies:\n\
            \tMod ID: 'geckolib', Requested by: 'mowziesmobs', Expected range: '[4.2,)', Actual version: '[MISSING]'\n\
            \tMod ID: 'forge', Requested by: 'create', Expected range: '[47.1.3,)', Actual version: '47.0.1'\n\
            next line";
        let finding = high(text, Language::English).unwrap();
        let lines = evidence(&finding, BuiltinReason::ModMissing);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Install the 'geckolib' dependency mod (requested by 'mowziesmobs')"
        );
        assert!(lines[1].starts_with("Change the version of the 'forge' dependency mod"));
        assert!(lines[1].contains("'[47.1.3,)'"));
        assert!(lines[1].contains("'47.0.1'"));
    }

    #[test]
    fn test_high_priority_nothing() {
        let finding = high("[main/INFO]: all good", Language::English).unwrap();
        assert!(finding.is_empty());
    }

    #[test]
    fn test_mixin_with_explicit_mod() {
        let text = "Mixin apply failed sodium.mixins.json:core.MixinWindow from mod sodium] from\n";
        let finding = low(Some(text), None);
        assert_eq!(evidence(&finding, BuiltinReason::ModMixinFailed), vec!["sodium"]);
        assert_eq!(finding.len(), 1);
    }

    #[test]
    fn test_mixin_config_name() {
        let text = "org.spongepowered.asm.mixin.transformer.throwables.MixinTransformerError: error\n\
                    Caused by: [modid.mixins.json:MixinFoo] FAILED during APPLY\n";
        let finding = low(Some(text), None);
        assert_eq!(evidence(&finding, BuiltinReason::ModMixinFailed), vec!["modid"]);
    }

    #[test]
    fn test_clean_mod_name() {
        assert_eq!(clean_mod_name("com.simibubi.create").as_deref(), Some("simibubi"));
        assert_eq!(clean_mod_name("io.12.ab.jei").as_deref(), Some("jei"));
        assert_eq!(clean_mod_name("sodium").as_deref(), Some("sodium"));
        assert_eq!(clean_mod_name(""), None);
    }

    #[test]
    fn test_loader_table_with_missing_class() {
        let text = "Forge mod loading errors have been detected\n\
                    Failed to create mod instance. ModID: foo\n\
                    java.lang.NoClassDefFoundError: net/bar/Baz\n";
        let finding = low(Some(text), None);
        assert!(finding.contains_builtin(BuiltinReason::ModInitFailed));
        let forge = evidence(&finding, BuiltinReason::ForgeError);
        assert_eq!(forge.len(), 1);
        assert!(forge[0].contains("'net/bar/Baz'"));
    }

    #[test]
    fn test_missing_class_stops_at_line_end() {
        let text = "Forge mod loading errors have been detected\n\
                    Failed to create mod instance. ModID: foo\n\
                    java.lang.NoClassDefFoundError: net/bar/Baz\n\
                    \tat a.b.C(C.java:1)\n\
                    \tat d.e.F(x/y.java)\n";
        let finding = low(Some(text), None);
        assert_eq!(
            evidence(&finding, BuiltinReason::ForgeError),
            vec![missing_class_line("net/bar/Baz", Language::English)]
        );
    }

    #[test]
    fn test_mixin_for_mod_fallback() {
        let text = "org.spongepowered.asm.mixin.throwables.MixinApplyError: broken\n\
                    Mixin apply for mod examplemod failed other.mixins.json:MixinFoo\n";
        let finding = low(Some(text), None);
        assert_eq!(evidence(&finding, BuiltinReason::ModMixinFailed), vec!["examplemod"]);
    }

    #[test]
    fn test_mixin_without_name_has_no_evidence() {
        let text = "org.spongepowered.asm.mixin.throwables.MixinApplyError: broken\n";
        let finding = low(Some(text), None);
        assert!(finding.contains_builtin(BuiltinReason::ModMixinFailed));
        assert!(evidence(&finding, BuiltinReason::ModMixinFailed).is_empty());
        assert_eq!(finding.len(), 1);
    }

    #[test]
    fn test_fabric_solution() {
        let text = "Fabric has detected a mod loading error\n\
                    A potential solution has been determined:\n\
                    \t - Install fabric-api, any version.\n\
                    \t - Replace 'Foo' with version 1.2.\n\
                    More details:";
        let finding = low(Some(text), None);
        assert!(finding.contains_builtin(BuiltinReason::FabricError));
        assert_eq!(
            evidence(&finding, BuiltinReason::FabricSolution),
            vec!["- Install fabric-api, any version.", "- Replace 'Foo' with version 1.2."]
        );
    }

    #[test]
    fn test_short_log_is_unknown() {
        let finding = low(None, Some("Exit code 1"));
        assert!(finding.contains_builtin(BuiltinReason::Unknown));

        let informative = low(None, Some("[main/INFO]: Setting user"));
        assert!(informative.is_empty());

        let with_crash = low(Some("crash"), Some("Exit code 1"));
        assert!(!with_crash.contains_builtin(BuiltinReason::Unknown));
    }
}
