use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mccrash_lib::i18n::Language;
use mccrash_lib::{init_logging, CrashAnalyzer, KnowledgeBase, Settings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mccrash", version, about = "Explain Minecraft crashes from their log files")]
struct Cli {
    /// Settings file (default: settings.toml in the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a folder with crash reports and game logs
    Analyze {
        /// Folder with the log files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Knowledge base folder (persons.json, crash_reasons.json, detection_rules.json)
        #[arg(long, value_name = "DIR")]
        kb: Option<PathBuf>,

        /// Report language: en or zh
        #[arg(long, value_name = "LANG")]
        lang: Option<Language>,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show knowledge base statistics
    KbStats {
        #[arg(long, value_name = "DIR")]
        kb: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // В режиме --json ошибка тоже печатается как JSON
            if let Command::Analyze {
                json: true, lang, ..
            } = &cli.command
            {
                let info = e.localized_error_info(lang.unwrap_or_default());
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            return Err(e).context("Failed to load settings");
        }
    };
    let level = match cli.verbose {
        0 => settings.level_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    init_logging(level, settings.log_file.as_deref()).context("Failed to initialize logging")?;

    match cli.command {
        Command::Analyze {
            dir,
            kb,
            lang,
            json,
        } => {
            if let Some(kb) = kb {
                settings.knowledge_base_dir = Some(kb);
            }
            if let Some(lang) = lang {
                settings.language = lang;
            }

            let knowledge_base = KnowledgeBase::load(&settings.knowledge_base_dir());
            let analyzer = CrashAnalyzer::new(&knowledge_base, settings);
            let outcome = analyzer.run(&dir);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
                );
            } else {
                println!("{}", outcome.text());
            }
        }
        Command::KbStats { kb } => {
            let dir = kb.unwrap_or_else(|| settings.knowledge_base_dir());
            let stats = KnowledgeBase::load(&dir).stats();
            println!("Knowledge base: {}", dir.display());
            println!("  crash reasons: {}", stats.crash_reasons);
            println!("  keyword rules: {}", stats.keyword_rules);
            println!("  regex rules:   {}", stats.regex_rules);
            println!("  persons:       {}", stats.persons);
        }
    }

    Ok(())
}
