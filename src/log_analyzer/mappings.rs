//! Анализ стека: ключевые слова из пакетов и их сопоставление с файлами модов

use lazy_static::lazy_static;
use regex::Regex;

/// Пакеты, которые не могут указывать на мод (JVM, библиотеки, сам Minecraft)
pub const IGNORED_STACK_KEYWORDS: &[&str] = &[
    "java",
    "sun",
    "javax",
    "lwjgl",
    "paulscode",
    "glcontext",
    "native",
    "netty",
    "guava",
    "gson",
    "apache",
    "logging",
    "minecraftforge",
    "fml",
    "minecraft",
];

const WALKTHROUGH_MARKER: &str = "A detailed walkthrough of the error";
const FABRIC_MODS_MARKER: &str = "Fabric Mods";

/// Строки списка модов, которые никогда не являются виновником
const EXCLUDED_MOD_LINES: &[&str] = &["minecraft.jar", " forge-", " mixin-"];

lazy_static! {
    static ref STACK_TRACE_SECTION: Regex =
        Regex::new(r"-- Stack Trace --\s*\n((?:.*\n)*?)(?:\n--|\z)").unwrap();
    static ref EXCEPTION_BLOCK: Regex =
        Regex::new(r"java\.lang\.[A-Za-z]+Exception.*\n(?:\s+at .*\n)*").unwrap();
    static ref STACK_FRAME: Regex = Regex::new(r"\s+at\s+([^(\n]+)").unwrap();
    static ref EXCEPTION_NAME: Regex =
        Regex::new(r"([a-zA-Z0-9_$.]+\.[a-zA-Z0-9_$.]+Exception)").unwrap();

    /// Встроенные модули самого Fabric в списке "Fabric Mods"
    static ref FABRIC_BUILTIN_MOD: Regex = Regex::new(r"\t\tfabric[\w-]*: Fabric").unwrap();
    static ref FABRIC_MOD_LINE: Regex = Regex::new(r": ([^\n]+) [^\n]+").unwrap();
    static ref FORGE_JAR_NAME: Regex =
        Regex::new(r"(?i)\(([^\t]+\.jar)\)|(\t\t|^| \| )([^\t |]+\.jar)").unwrap();
    static ref DEBUG_VALID_MOD: Regex = Regex::new(r"valid mod file (.*) with").unwrap();
}

/// Вырезать стек из краш-репорта: секция "-- Stack Trace --",
/// иначе первый блок java.lang.*Exception с фреймами "at ..."
pub fn extract_stack_trace(crash_report: &str) -> Option<String> {
    // Секция может оказаться последней в файле
    let text = format!("{}\n", crash_report);

    if let Some(section) = STACK_TRACE_SECTION.captures(&text).and_then(|c| c.get(1)) {
        return Some(section.as_str().to_string());
    }

    EXCEPTION_BLOCK
        .find(&text)
        .map(|block| block.as_str().to_string())
}

fn is_ignored_keyword(keyword: &str) -> bool {
    IGNORED_STACK_KEYWORDS.iter().any(|ignored| keyword.contains(ignored))
}

/// Ключевые слова из стека: первый сегмент каждого пакета во фреймах и в
/// именах исключений, без системных пакетов, без повторов
pub fn stack_keywords(stack: &str) -> Vec<String> {
    let frames = STACK_FRAME
        .captures_iter(stack)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim());
    let exceptions = EXCEPTION_NAME
        .captures_iter(stack)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());

    let mut keywords: Vec<String> = Vec::new();
    for qualified in frames.chain(exceptions) {
        let parts: Vec<&str> = qualified.split('.').collect();
        if parts.len() < 2 {
            continue;
        }
        let package = parts[0].to_lowercase();
        if package.is_empty() || is_ignored_keyword(&package) {
            continue;
        }
        if !keywords.contains(&package) {
            keywords.push(package);
        }
    }
    keywords
}

/// Сопоставить ключевые слова с файлами модов.
///
/// Источники: список модов в краш-репорте (формат Forge или "Fabric Mods")
/// и строки "valid mod file ... with {modid}" из debug.log.
pub fn resolve_mod_names(
    keywords: &[String],
    crash_report: Option<&str>,
    debug_log: Option<&str>,
) -> Vec<String> {
    let keywords: Vec<String> = keywords
        .iter()
        .flat_map(|k| k.split('('))
        .map(|k| k.trim_matches(|c| c == ' ' || c == ')').to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let mut names: Vec<String> = Vec::new();

    if let Some(crash) = crash_report {
        names.extend(mod_files_from_crash_report(&keywords, crash));
    }
    if let Some(debug) = debug_log {
        names.extend(mod_files_from_debug_log(&keywords, debug));
    }

    dedup(names)
}

fn mod_files_from_crash_report(keywords: &[String], crash: &str) -> Vec<String> {
    let Some((_, details)) = crash.split_once(WALKTHROUGH_MARKER) else {
        return Vec::new();
    };

    let (details, is_fabric) = match details.split_once(FABRIC_MODS_MARKER) {
        Some((_, fabric_mods)) => {
            log::debug!("Crash report lists mods in Fabric format");
            (fabric_mods, true)
        }
        None => (details, false),
    };

    let mod_lines: Vec<&str> = details
        .split('\n')
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.matches(".jar").count() == 1
                || (is_fabric && line.starts_with("\t\t") && !FABRIC_BUILTIN_MOD.is_match(line))
        })
        .collect();
    log::debug!("Found {} possible mod line(s) in crash report", mod_lines.len());

    let mut hint_lines: Vec<&str> = Vec::new();
    for keyword in keywords {
        let needle = keyword.to_lowercase().replace('_', "");
        let hit = mod_lines.iter().find(|line| {
            let normalized = line.to_lowercase().replace('_', "");
            normalized.contains(&needle)
                && !EXCLUDED_MOD_LINES.iter().any(|ex| normalized.contains(ex))
        });
        if let Some(line) = hit {
            let line = line.trim_matches(|c| c == '\r' || c == '\n' || c == ' ');
            if !hint_lines.contains(&line) {
                hint_lines.push(line);
            }
        }
    }

    hint_lines
        .into_iter()
        .filter_map(|line| {
            if is_fabric {
                FABRIC_MOD_LINE
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
            } else {
                FORGE_JAR_NAME.captures(line).and_then(|caps| {
                    caps.iter()
                        .skip(1)
                        .flatten()
                        .map(|m| m.as_str())
                        .find(|g| !g.trim().is_empty() && g.to_lowercase().contains(".jar"))
                        .map(str::to_string)
                })
            }
        })
        .collect()
}

fn mod_files_from_debug_log(keywords: &[String], debug: &str) -> Vec<String> {
    let mod_lines: Vec<&str> = debug
        .lines()
        .filter(|line| line.contains("valid mod file "))
        .collect();
    log::debug!("Found {} possible mod line(s) in debug log", mod_lines.len());

    let mut names = Vec::new();
    for keyword in keywords {
        let tag = format!("{{{}}}", keyword);
        for line in mod_lines.iter().filter(|line| line.contains(&tag)) {
            if let Some(name) = DEBUG_VALID_MOD.captures(line).and_then(|c| c.get(1)) {
                if !name.as_str().is_empty() {
                    names.push(name.as_str().to_string());
                }
            }
        }
    }
    names
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORGE_CRASH: &str = "---- Minecraft Crash Report ----\n\
Description: Ticking entity\n\
\n\
java.lang.NullPointerException: boom\n\
\tat com.example.Foo.bar(Foo.java:10)\n\
\tat net.minecraft.world.World.tick(World.java:5)\n\
\tat examplemod.core.Thing.run(Thing.java:1)\n\
\n\
A detailed walkthrough of the error, its code path and all known details is as follows:\n\
-- System Details --\n\
\tMod List: \n\
\t\tclient-1.20.1.jar                    |Minecraft    |minecraft |1.20.1\n\
\t\texample_mod-2.0.jar                  |Example Mod  |examplemod|2.0\n\
\t\tforge-47.1.0.jar                     |Forge        |forge     |47.1.0";

    #[test]
    fn test_extract_exception_block() {
        let stack = extract_stack_trace(FORGE_CRASH).unwrap();
        assert!(stack.starts_with("java.lang.NullPointerException"));
        assert!(stack.contains("examplemod.core.Thing.run"));
        assert!(!stack.contains("walkthrough"));
    }

    #[test]
    fn test_extract_stack_trace_section() {
        let crash = "-- Stack Trace --\n\tat foo.Bar.baz(Bar.java:1)\n\n-- Affected level --\nDetails";
        let stack = extract_stack_trace(crash).unwrap();
        assert_eq!(stack, "\tat foo.Bar.baz(Bar.java:1)\n");

        assert!(extract_stack_trace("no stack here").is_none());
    }

    #[test]
    fn test_stack_keywords_drop_system_packages() {
        let stack = "java.lang.IllegalStateException: x\n\
                     \tat com.example.Foo.bar(Foo.java:10)\n\
                     \tat net.minecraftforge.fml.Loader.load(Loader.java:1)\n\
                     \tat examplemod.core.Thing.run(Thing.java:1)\n\
                     \tat com.example.Other.run(Other.java:2)\n\
                     \tat sun.reflect.Method.invoke(Method.java:3)\n\
                     \tat Main(Main.java)\n";
        assert_eq!(stack_keywords(stack), vec!["com", "net", "examplemod"]);
    }

    #[test]
    fn test_resolve_forge_mod_list() {
        let keywords = vec!["examplemod".to_string(), "ghost".to_string()];
        let names = resolve_mod_names(&keywords, Some(FORGE_CRASH), None);
        assert_eq!(names, vec!["example_mod-2.0.jar"]);
    }

    #[test]
    fn test_resolve_fabric_mod_list() {
        let crash = "A detailed walkthrough of the error\n\
                     \tFabric Mods: \n\
                     \t\tfabric-api-base: Fabric API Base 0.4.29\n\
                     \t\tsodium: Sodium 0.5.3\n";
        let names = resolve_mod_names(&["sodium".to_string()], Some(crash), None);
        assert_eq!(names, vec!["Sodium"]);
    }

    #[test]
    fn test_resolve_from_debug_log() {
        let debug = "[main/DEBUG]: Found valid mod file create-1.20.1-0.5.1.jar with {create} mods - versions {0.5.1}\n\
                     [main/DEBUG]: Found valid mod file jei-15.2.jar with {jei} mods - versions {15.2}";
        let names = resolve_mod_names(&["create".to_string()], None, Some(debug));
        assert_eq!(names, vec!["create-1.20.1-0.5.1.jar"]);
    }

    #[test]
    fn test_resolve_nothing() {
        assert!(resolve_mod_names(&["ghost".to_string()], Some(FORGE_CRASH), Some("")).is_empty());
    }
}
