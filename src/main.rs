// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use locsync::app_config::{self, ConflictBehavior, Config};
use locsync::dnt::FileType;
use locsync::localization::{Message, Notifier};
use locsync::{Controller, Stage};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Stage to implement ValueEnum
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum CliStage {
    Copy,
    Translate,
    Save,
}

impl From<CliStage> for Stage {
    fn from(stage: CliStage) -> Self {
        match stage {
            CliStage::Copy => Stage::Copy,
            CliStage::Translate => Stage::Translate,
            CliStage::Save => Stage::Save,
        }
    }
}

/// CLI Wrapper for ConflictBehavior to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliBehavior {
    Merge,
    Overwrite,
}

impl From<CliBehavior> for ConflictBehavior {
    fn from(behavior: CliBehavior) -> Self {
        match behavior {
            CliBehavior::Merge => ConflictBehavior::Merge,
            CliBehavior::Overwrite => ConflictBehavior::Overwrite,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Protect a document before sending it for translation
    Protect(DocumentArgs),

    /// Restore a translated document
    Restore(DocumentArgs),

    /// Run the localization workflow over a project file
    Run(RunArgs),

    /// Generate shell completions for locsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct DocumentArgs {
    /// Document to read
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Treat the document as JSON (inferred from a .json extension otherwise)
    #[arg(long)]
    json: bool,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Project file (updated in place when the run finishes)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Stages to run (all by default)
    #[arg(short, long, value_enum)]
    stage: Vec<CliStage>,

    /// Translation service name
    #[arg(long)]
    service: Option<String>,

    /// Conflict behavior when saving translations
    #[arg(long, value_enum)]
    translate_behavior: Option<CliBehavior>,

    /// Conflict behavior when copying source content
    #[arg(long, value_enum)]
    copy_behavior: Option<CliBehavior>,

    /// Leave the project file untouched
    #[arg(long)]
    no_write: bool,
}

/// locsync - localization workflow engine
///
/// Prepares, protects and distributes site content across target languages.
#[derive(Parser, Debug)]
#[command(name = "locsync")]
#[command(version = "0.1.0")]
#[command(about = "Localization workflow engine")]
#[command(long_about = "locsync prepares site content for translation, protects non-translatable fragments,
dispatches it to a translation service and writes translations back into language trees.

EXAMPLES:
    locsync protect page.html                      # Protect a document, print to stdout
    locsync restore page.html -o restored.html     # Restore a translated document
    locsync run project.json                       # Copy, translate and save a project
    locsync run project.json -s save               # Only save returned translations
    locsync completions bash > locsync.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in locsync.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "locsync.json", global = true)]
    config_path: String,

    /// Organization (overrides the configuration)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Site (overrides the configuration)
    #[arg(long, global = true)]
    site: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// @struct: Progress messages rendered on a spinner
struct SpinnerNotifier {
    bar: ProgressBar,
}

impl SpinnerNotifier {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Notifier for SpinnerNotifier {
    fn notify(&self, message: Message) {
        self.bar.set_message(message.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "locsync", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_or_create_config(&cli.config_path)?;
    if let Some(org) = &cli.org {
        config.org = org.clone();
    }
    if let Some(site) = &cli.site {
        config.site = site.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Protect(args) => run_document(config, args, true),
        Commands::Restore(args) => run_document(config, args, false),
        Commands::Run(args) => run_project(config, args).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

fn run_document(config: Config, args: DocumentArgs, protect: bool) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read document: {}", args.file.display()))?;
    let file_type = if args.json {
        FileType::Json
    } else {
        FileType::from_path(&args.file.to_string_lossy())
    };

    // Documents are handled locally; no connector is needed
    let config = Config { service: None, ..config };
    let controller = Controller::with_config(config)?;
    let result = if protect {
        controller.protect_document(&content, file_type)?
    } else {
        controller.restore_document(&content, file_type)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, result).with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", result),
    }
    Ok(())
}

async fn run_project(mut config: Config, args: RunArgs) -> Result<()> {
    if let Some(service) = &args.service {
        config.service = Some(service.clone());
    }
    if let Some(behavior) = args.translate_behavior {
        config.options.translate_conflict_behavior = behavior.into();
    }
    if let Some(behavior) = args.copy_behavior {
        config.options.copy_conflict_behavior = behavior.into();
    }
    config.validate().context("Configuration validation failed")?;

    let stages: Vec<Stage> = if args.stage.is_empty() {
        Stage::ALL.to_vec()
    } else {
        Stage::ALL
            .into_iter()
            .filter(|stage| args.stage.iter().any(|s| Stage::from(*s) == *stage))
            .collect()
    };

    let notifier = Arc::new(SpinnerNotifier::new());
    let controller = Controller::with_config(config)?.with_notifier(notifier.clone());
    let mut conf = controller.load_project(&args.project)?;
    info!("Running {:?} for '{}' ({} languages)", stages, conf.title, conf.langs.len());

    let result = controller.run(&mut conf, &stages).await;
    notifier.finish();

    if !args.no_write {
        controller.save_project(&args.project, &conf)?;
    }

    let summary = result?;
    info!(
        "Dispatched: {:?}, promoted: {:?}, complete: {:?}",
        summary.dispatched, summary.promoted, summary.complete
    );
    if !summary.failed.is_empty() {
        warn!("Incomplete languages: {:?}", summary.failed);
    }
    Ok(())
}
