// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};
use std::io::Write;
use std::path::PathBuf;

use capsync::app_config::{Config, LogLevel};
use capsync::app_controller::Controller;
use capsync::language_utils;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Caption a video, or every video in a directory (default command)
    Run(RunArgs),

    /// Translate an existing <name>.<lang>.srt file
    Translate {
        /// Subtitle file to translate
        #[arg(value_name = "SRT_FILE")]
        srt_path: PathBuf,

        /// Target language tag (e.g. 'fr', 'pt-BR')
        #[arg(short, long = "to")]
        target_language: String,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,

        /// Set logging level
        #[arg(short, long, value_enum)]
        log_level: Option<CliLogLevel>,
    },

    /// Generate shell completions for capsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Isolate vocals before transcription
    #[arg(short, long)]
    separate: bool,

    /// Translate captions to this language tag
    #[arg(short, long)]
    translate_to: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// capsync - burned-in, optionally translated captions
///
/// Transcribes the speech of a video, writes an SRT caption track, optionally
/// translates it, and burns the captions into a copy of the video.
#[derive(Parser, Debug)]
#[command(name = "capsync")]
#[command(version)]
#[command(about = "Burn time-synchronized captions into spoken video")]
#[command(long_about = "capsync transcribes a video, writes <name>.<lang>.srt, optionally translates it, and writes <name>_<lang>.<ext> with the captions burned in.

EXAMPLES:
    capsync talk.mp4                         # Caption in the spoken language
    capsync -t fr talk.mp4                   # Caption, translated to French
    capsync -s -t de clip.mkv                # Isolate vocals first, then translate
    capsync translate talk.en.srt --to es    # Translate an existing subtitle file
    capsync /videos/                         # Caption every video in a directory
    capsync completions bash > capsync.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. Command-line flags override file values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Isolate vocals before transcription
    #[arg(short, long)]
    separate: bool,

    /// Translate captions to this language tag
    #[arg(short, long)]
    translate_to: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Colored stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Info until the config or the command line says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = dispatch(CommandLineOptions::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "capsync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run(args).await,
        Some(Commands::Translate { srt_path, target_language, config_path, log_level }) => {
            let mut config = load_config(&config_path, log_level)?;
            config.translate_to = Some(target_language);
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            controller.translate_subtitle(&srt_path).await?;
            Ok(())
        }
        None => {
            // Top-level args behave like `run`
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            run(RunArgs {
                input_path,
                separate: cli.separate,
                translate_to: cli.translate_to,
                force_overwrite: cli.force_overwrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
            })
            .await
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level)?;
    if args.separate {
        config.separate_vocals = true;
    }
    if let Some(target) = args.translate_to {
        language_utils::validate_language_tag(&target)?;
        config.translate_to = Some(target);
    }
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    controller.run(&args.input_path, args.force_overwrite).await?;
    Ok(())
}

// Load the config file and apply the effective log level
fn load_config(config_path: &str, cli_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;
    if let Some(level) = cli_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}
