//! Текст отчёта: причины по шаблонам, секция найденных причин и авторы

use mccrash_core::{BuiltinReason, Finding, Language, ReasonKey};
use mccrash_db::KnowledgeBaseReader;
use serde::{Deserialize, Serialize};

use super::attribution::{contributor_line, contributors};

const RESULT_HEADER: &str = "--- Analysis Result ---";
const REASONS_HEADER: &str = "--- Detected Crash Reasons ---";
const CONTRIBUTOR_HEADER: &str = "--- Analysis Contributor ---";
const NO_DETAILS: &str = "No additional details";

/// Найденная причина в готовом к выводу виде
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedReason {
    pub reason: ReasonKey,
    pub name: String,
    pub evidence: Vec<String>,
}

/// Полный отчёт по одному анализу
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub finding: Finding,
    /// Текст причин (без заголовков)
    pub summary: String,
    pub detected_reasons: Vec<DetectedReason>,
    pub contributors: Vec<String>,
    /// Итоговый текст со всеми секциями
    pub text: String,
}

/// Фраза "не удалось определить причину"
pub fn undetermined_message(lang: Language) -> &'static str {
    match lang {
        Language::English => {
            "Unable to determine the cause of the crash. Please check the full log for more information."
        }
        Language::Chinese => "无法确定崩溃原因，请检查完整日志获取更多信息。",
    }
}

/// Фраза "нет файлов для анализа"
pub fn no_usable_files_message(lang: Language) -> &'static str {
    match lang {
        Language::English => "No usable log files were found, so the crash cannot be analyzed.",
        Language::Chinese => "未找到可用的日志文件，无法分析崩溃原因。",
    }
}

fn separator(lang: Language) -> &'static str {
    match lang {
        Language::English => "\n\nAlso, ",
        Language::Chinese => "\n\n此外，",
    }
}

fn send_file_hint(lang: Language) -> &'static str {
    match lang {
        Language::English => {
            "\n\nIf you ask someone for help, send them the crash report file itself, not a photo or screenshot of this window."
        }
        Language::Chinese => {
            "\n\n如果要寻求帮助，请把错误报告文件发给对方，而不是发送这个窗口的照片或者截图。"
        }
    }
}

fn dedup(evidence: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for item in evidence {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

/// В описаниях базы знаний переводы строк хранятся как "\n"
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Превратить найденные причины в связный текст
pub fn render(finding: &Finding, kb: &dyn KnowledgeBaseReader, lang: Language) -> String {
    if finding.is_empty() {
        return undetermined_message(lang).to_string();
    }

    let paragraphs: Vec<String> = finding
        .iter()
        .map(|entry| {
            let evidence = dedup(&entry.evidence);
            match &entry.reason {
                ReasonKey::Record(id) => render_record(id, &evidence, kb),
                ReasonKey::BuiltIn(reason) => render_builtin(*reason, &evidence, lang),
            }
        })
        .filter(|p| !p.is_empty())
        .collect();

    let mut text = paragraphs.join(separator(lang));

    let asks_for_file = finding.iter().any(|entry| {
        matches!(&entry.reason, ReasonKey::BuiltIn(reason) if reason.asks_for_report_file())
    });
    if asks_for_file {
        text.push_str(send_file_hint(lang));
    }

    text
}

fn render_record(id: &str, evidence: &[String], kb: &dyn KnowledgeBaseReader) -> String {
    if !evidence.is_empty() {
        return unescape_newlines(&evidence.join("\n"));
    }
    kb.get_reason(id)
        .map(|record| unescape_newlines(&record.description))
        .unwrap_or_default()
}

/// Шаблон для встроенной причины
pub fn render_builtin(reason: BuiltinReason, evidence: &[String], lang: Language) -> String {
    match lang {
        Language::English => render_builtin_en(reason, evidence),
        Language::Chinese => render_builtin_zh(reason, evidence),
    }
}

fn render_builtin_en(reason: BuiltinReason, d: &[String]) -> String {
    use BuiltinReason::*;

    let lines = d.join("\n");
    let list = d.join(", ");
    let has = !d.is_empty();

    match reason {
        JavaTooHigh if has => format!(
            "A mod or the game requires a newer Java than the one in use:\n{}\n\nInstall the required Java version and select it in the launcher.",
            lines
        ),
        JavaTooHigh => "A mod or the game requires a newer Java than the one in use.\n\nInstall a newer Java and select it in the launcher.".into(),
        JavaVersionError if has => format!(
            "The Java version does not match what the game or a mod expects:\n{}\n\nSwitch to the Java version required by your game version and mods.",
            lines
        ),
        JavaVersionError => "The Java version does not match what the game or a mod expects.\n\nSwitch to the Java version required by your game version and mods.".into(),
        ModMissing if has => format!(
            "The following dependency mods are missing:\n{}\n\nInstall the missing mods listed above.",
            lines
        ),
        ModMissing => "Some dependency mods are missing, so the game crashed.\n\nMake sure all required mods are installed.".into(),
        ModDuplicate if has => format!(
            "The following mods are installed more than once:\n{}\n\nDelete the duplicate files and keep only one version of each mod.",
            list
        ),
        ModDuplicate => "Some mods are installed more than once, so the game crashed.\n\nCheck the mods folder and keep only one version of each mod.".into(),
        ModIncompatible if has => format!(
            "The following mods are incompatible with each other:\n{}\n\nRemove one of them or look for compatible versions.",
            list
        ),
        ModIncompatible => "Some installed mods are incompatible with each other.\n\nRemove recently added mods or look for compatible versions.".into(),
        ModSuspected if has => format!(
            "The following mods may have caused the crash:\n{}\n\nTry temporarily removing these {} mod(s) to see if the problem goes away.",
            list,
            d.len()
        ),
        ModSuspected => "Some mod may have caused the crash, but it is not clear which one.\n\nTry temporarily removing some mods to see if the problem goes away.".into(),
        ModConfirmed if has => format!(
            "The following mods caused the crash:\n{}\n\nUpdate or remove these mods.",
            list
        ),
        ModConfirmed => "A mod caused the crash.\n\nCheck and update your mods.".into(),
        ModInitFailed if has => format!(
            "The following mods failed to initialize:\n{}\n\nTry updating or reinstalling these mods.",
            list
        ),
        ModInitFailed => "Some mods failed to initialize, so the game crashed.\n\nCheck and update your mods.".into(),
        ModMixinFailed if has => format!(
            "Mixin injection failed for the following mods:\n{}\n\nThis is usually caused by conflicts between mods. Try updating or removing them.",
            list
        ),
        ModMixinFailed => "Mixin injection of a mod failed, so the game crashed.\n\nThis is usually caused by conflicts between mods. Try updating or removing recently installed mods.".into(),
        ModConfigError if has => format!(
            "A mod configuration file is broken:\n{}\n\nDelete the file so the mod can regenerate it, or fix it by hand.",
            lines
        ),
        ModConfigError => "A mod configuration file is broken.\n\nDelete the mod's config files so they can be regenerated.".into(),
        ModSpecialChars => "A mod file name contains special characters the game cannot load.\n\nRename the mod files so they only contain plain letters, digits, dashes and dots.".into(),
        ModRequiresJava11 => "Some mods require Java 11 or newer.\n\nInstall Java 11 or newer and select it in the launcher.".into(),
        ModTooMany => "Too many mods are installed and the ID limit was exceeded.\n\nRemove some mods or install a mod that extends the ID limit.".into(),
        FabricError if has => format!(
            "Fabric provided the following error information:\n{}\n\nFollow the instructions above. Use a translator if needed.",
            lines
        ),
        FabricError => "Fabric may have provided error information. Check the log in the crash report and act on it. Use a translator if needed.".into(),
        FabricSolution if has => format!(
            "Fabric suggested the following solution:\n{}\n\nFollow the instructions above. Use a translator if needed.",
            lines
        ),
        FabricSolution => "Fabric may have suggested a solution. Check the log in the crash report and act on it. Use a translator if needed.".into(),
        ForgeError if has => format!(
            "Forge provided the following error information:\n{}\n\nFollow the instructions above. Use a translator if needed.",
            lines
        ),
        ForgeError => "Forge may have provided error information. Check the log in the crash report and act on it. Use a translator if needed.".into(),
        ForgeIncomplete => "The Forge installation is incomplete.\n\nReinstall Forge for this game version.".into(),
        ForgeJavaIncompatible => "This old Forge version does not work with newer Java.\n\nUse Java 8 for this game version, or update Forge.".into(),
        MultipleForge => "The version JSON contains more than one Forge entry.\n\nReinstall the game version with a single Forge installation.".into(),
        MixinBootstrapMissing => "MixinBootstrap is missing, so the game crashed.\n\nThis is usually caused by a broken mod setup. Reinstall Forge or Fabric.".into(),
        BlockError if has => format!(
            "A specific block crashes the game:\n{}\n\nTry entering another area of the world, or remove this block with a world editor such as MCEdit.",
            lines
        ),
        BlockError => "A specific block crashes the game.\n\nTry entering another area of the world, or edit the save with a world editor such as MCEdit.".into(),
        EntityError if has => format!(
            "A specific entity crashes the game:\n{}\n\nTry entering another area of the world, or remove this entity with a world editor such as MCEdit.",
            lines
        ),
        EntityError => "A specific entity crashes the game.\n\nTry entering another area of the world, or edit the save with a world editor such as MCEdit.".into(),
        OptifineForgeIncompatible => "OptiFine is incompatible with the installed Forge version.\n\nUpdate OptiFine or Forge to matching versions, or remove OptiFine.".into(),
        OptifineWorldLoadError => "OptiFine prevents the world from loading.\n\nUpdate or remove OptiFine.".into(),
        ShadersModOptifineConflict => "ShadersMod is installed together with OptiFine.\n\nOptiFine already includes shader support. Remove ShadersMod.".into(),
        FileValidationError => "Some files or content failed validation, so the game did not work correctly.\n\nTry deleting the game (including mods) and downloading it again, or use a VPN while downloading.".into(),
        ManualDebugCrash => "This crash was triggered manually for debugging and is not a real game error.".into(),
        StackKeywordFound if has => format!(
            "Stack analysis found keywords that may point to the problem:\n{}\n\nThese keywords may indicate which mod or component failed.",
            list
        ),
        StackKeywordFound => "Stack analysis found some possible problems, but could not determine the exact cause.".into(),
        NoAnalysisFiles => "Your game ran into a problem, but no log files were found, so it cannot be analyzed.".into(),
        Unknown => "The exact cause of the crash could not be determined. Check the full crash log for more information.".into(),
    }
}

fn render_builtin_zh(reason: BuiltinReason, d: &[String]) -> String {
    use BuiltinReason::*;

    let lines = d.join("\n");
    let list = d.join(", ");
    let has = !d.is_empty();

    match reason {
        JavaTooHigh if has => format!(
            "游戏或Mod需要比当前更高版本的Java:\n{}\n\n请安装所需版本的Java，并在启动器中选择它。",
            lines
        ),
        JavaTooHigh => "游戏或Mod需要比当前更高版本的Java。\n\n请安装更高版本的Java，并在启动器中选择它。".into(),
        JavaVersionError if has => format!(
            "Java版本与游戏或Mod的要求不符:\n{}\n\n请切换到游戏版本和Mod所需的Java版本。",
            lines
        ),
        JavaVersionError => "Java版本与游戏或Mod的要求不符。\n\n请切换到游戏版本和Mod所需的Java版本。".into(),
        ModMissing if has => format!("缺少以下依赖Mod:\n{}\n\n请安装以上缺失的Mod。", lines),
        ModMissing => "缺少某些依赖Mod，导致游戏崩溃。\n\n请确保安装了所有必需的Mod。".into(),
        ModDuplicate if has => format!(
            "以下Mod被重复安装:\n{}\n\n请删除重复的Mod文件，每个Mod只保留一个版本。",
            list
        ),
        ModDuplicate => "某些Mod被重复安装，导致游戏崩溃。\n\n请检查mods文件夹，确保每个Mod只有一个版本。".into(),
        ModIncompatible if has => format!(
            "以下Mod互不兼容:\n{}\n\n请移除其中之一，或寻找相互兼容的版本。",
            list
        ),
        ModIncompatible => "某些Mod互不兼容。\n\n请移除最近安装的Mod，或寻找相互兼容的版本。".into(),
        ModSuspected if has => format!(
            "以下Mod可能导致了游戏崩溃:\n{}\n\n尝试暂时移除以上的{}个Mod，看看是否可以解决问题。",
            list,
            d.len()
        ),
        ModSuspected => "某些Mod可能导致了游戏崩溃，但无法确定具体是哪个Mod。\n\n尝试暂时移除部分Mod，看看是否可以解决问题。".into(),
        ModConfirmed if has => format!("以下Mod导致了游戏崩溃:\n{}\n\n请更新或移除这些Mod。", list),
        ModConfirmed => "某个Mod导致了游戏崩溃。\n\n请检查并更新你的Mod。".into(),
        ModInitFailed if has => format!(
            "以下Mod初始化失败:\n{}\n\n请尝试更新或重新安装这些Mod。",
            list
        ),
        ModInitFailed => "某些Mod初始化失败，导致游戏崩溃。\n\n请检查并更新你的Mod。".into(),
        ModMixinFailed if has => format!(
            "以下Mod的Mixin注入失败:\n{}\n\n这通常是由于Mod间的冲突导致的，请尝试更新或移除这些Mod。",
            list
        ),
        ModMixinFailed => "Mod的Mixin注入失败，导致游戏崩溃。\n\n这通常是由于Mod间的冲突导致的，请尝试更新或移除最近安装的Mod。".into(),
        ModConfigError if has => format!(
            "Mod配置文件出错:\n{}\n\n请删除该文件让Mod重新生成，或手动修复。",
            lines
        ),
        ModConfigError => "Mod配置文件出错。\n\n请删除Mod的配置文件让其重新生成。".into(),
        ModSpecialChars => "Mod文件名包含游戏无法加载的特殊字符。\n\n请重命名Mod文件，只保留字母、数字、横线和点。".into(),
        ModRequiresJava11 => "部分Mod需要Java11或更高版本。\n\n请安装Java11或更高版本，并在启动器中选择它。".into(),
        ModTooMany => "安装的Mod过多，超出了ID限制。\n\n请移除部分Mod，或安装扩展ID上限的Mod。".into(),
        FabricError if has => format!(
            "Fabric提供了以下错误信息:\n{}\n\n请根据上述信息进行对应处理，如果看不懂英文可以使用翻译软件。",
            lines
        ),
        FabricError => "Fabric可能已经提供了错误信息，请根据错误报告中的日志信息进行对应处理，如果看不懂英文可以使用翻译软件。".into(),
        FabricSolution if has => format!(
            "Fabric提供了以下解决方案:\n{}\n\n请根据上述信息进行对应处理，如果看不懂英文可以使用翻译软件。",
            lines
        ),
        FabricSolution => "Fabric可能已经提供了解决方案，请根据错误报告中的日志信息进行对应处理，如果看不懂英文可以使用翻译软件。".into(),
        ForgeError if has => format!(
            "Forge提供了以下错误信息:\n{}\n\n请根据上述信息进行对应处理，如果看不懂英文可以使用翻译软件。",
            lines
        ),
        ForgeError => "Forge可能已经提供了错误信息，请根据错误报告中的日志信息进行对应处理，如果看不懂英文可以使用翻译软件。".into(),
        ForgeIncomplete => "Forge安装不完整。\n\n请为该游戏版本重新安装Forge。".into(),
        ForgeJavaIncompatible => "低版本Forge与高版本Java不兼容。\n\n请为该游戏版本使用Java8，或更新Forge。".into(),
        MultipleForge => "版本Json中存在多个Forge。\n\n请重新安装该游戏版本，只保留一个Forge。".into(),
        MixinBootstrapMissing => "MixinBootstrap缺失，导致游戏崩溃。\n\n这通常是由于Mod配置错误导致的，请重新安装Forge或Fabric。".into(),
        BlockError if has => format!(
            "特定方块导致崩溃:\n{}\n\n请尝试进入游戏世界的其他区域，或者使用MCEdit等工具删除这个位置的方块。",
            lines
        ),
        BlockError => "特定方块导致游戏崩溃。\n\n请尝试进入游戏世界的其他区域，或者使用MCEdit等工具编辑存档。".into(),
        EntityError if has => format!(
            "特定实体导致崩溃:\n{}\n\n请尝试进入游戏世界的其他区域，或者使用MCEdit等工具删除这个实体。",
            lines
        ),
        EntityError => "特定实体导致游戏崩溃。\n\n请尝试进入游戏世界的其他区域，或者使用MCEdit等工具编辑存档。".into(),
        OptifineForgeIncompatible => "OptiFine与当前Forge版本不兼容。\n\n请将OptiFine或Forge更新到相互匹配的版本，或移除OptiFine。".into(),
        OptifineWorldLoadError => "OptiFine导致无法加载世界。\n\n请更新或移除OptiFine。".into(),
        ShadersModOptifineConflict => "ShadersMod与OptiFine同时安装。\n\nOptiFine已自带光影支持，请移除ShadersMod。".into(),
        FileValidationError => "部分文件或内容校验失败，导致游戏出现了问题。\n\n请尝试删除游戏（包括Mod）并重新下载，或尝试在重新下载时使用VPN。".into(),
        ManualDebugCrash => "这是一个手动触发的调试崩溃，不是真正的游戏错误。".into(),
        StackKeywordFound if has => format!(
            "堆栈分析发现潜在问题关键字:\n{}\n\n这些关键字可能表示相关的Mod或组件出现了问题。",
            list
        ),
        StackKeywordFound => "堆栈分析发现了一些潜在的问题，但无法确定具体原因。".into(),
        NoAnalysisFiles => "你的游戏出现了一些问题，但未能找到相关记录文件，因此无法进行分析。".into(),
        Unknown => "未能确定崩溃的具体原因，请查看完整的崩溃日志了解更多信息。".into(),
    }
}

/// Название причины для секции "Detected Crash Reasons"
pub fn reason_name(reason: &ReasonKey, kb: &dyn KnowledgeBaseReader, lang: Language) -> String {
    match reason {
        ReasonKey::Record(id) => kb
            .get_reason(id)
            .map(|record| record.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone()),
        ReasonKey::BuiltIn(builtin) => builtin.display_name(lang).to_string(),
    }
}

/// Собрать отчёт по результату каскада
pub fn build_report(
    finding: Finding,
    kb: &dyn KnowledgeBaseReader,
    lang: Language,
    include_detected_reasons: bool,
) -> AnalysisReport {
    let summary = render(&finding, kb, lang);
    let contributors = contributors(&finding, kb);

    let detected_reasons: Vec<DetectedReason> = finding
        .iter()
        .map(|entry| DetectedReason {
            reason: entry.reason.clone(),
            name: reason_name(&entry.reason, kb, lang),
            evidence: dedup(&entry.evidence),
        })
        .collect();

    let mut text = format!("{}\n{}\n", RESULT_HEADER, summary);
    if include_detected_reasons {
        text.push_str(REASONS_HEADER);
        text.push('\n');
        let lines: Vec<String> = detected_reasons
            .iter()
            .map(|r| {
                let details = if r.evidence.is_empty() {
                    NO_DETAILS.to_string()
                } else {
                    r.evidence.join("; ")
                };
                format!("- {}: {}", r.name, details)
            })
            .collect();
        text.push_str(&lines.join("\n"));
        text.push('\n');
    }
    text.push('\n');
    text.push_str(CONTRIBUTOR_HEADER);
    text.push('\n');
    text.push_str(&contributor_line(&contributors));

    AnalysisReport {
        finding,
        summary,
        detected_reasons,
        contributors,
        text,
    }
}
