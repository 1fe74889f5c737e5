// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{error, info, warn};
use std::path::PathBuf;

use revtrans::app_config::{Config, EscalationMode, LogLevel, ProviderConfig, TranslationProvider};
use revtrans::{Controller, dataset, logging};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// CLI Wrapper for EscalationMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEscalation {
    Prompt,
    Backoff,
}

impl From<CliEscalation> for EscalationMode {
    fn from(cli_mode: CliEscalation) -> Self {
        match cli_mode {
            CliEscalation::Prompt => EscalationMode::Prompt,
            CliEscalation::Backoff => EscalationMode::Backoff,
        }
    }
}

/// Options shared by every subcommand that reads the configuration
#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Target language code (e.g., 'en', 'de', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Use the fake translator and the test checkpoint
    #[arg(long)]
    test_mode: bool,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input dataset (.json array or .jsonl)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output dataset (defaults to <input>.translated.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,

    /// DeepL authentication key
    #[arg(long, env = "DEEPL_AUTH_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of retry sweeps after the first pass
    #[arg(long)]
    max_rounds: Option<u32>,

    /// How to resume after repeated failures
    #[arg(long, value_enum)]
    escalation: Option<CliEscalation>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a review dataset
    Translate(TranslateArgs),

    /// Remove checkpointed translations that are not in the target language
    Check(CommonArgs),

    /// Generate shell completions for revtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// revtrans - Checkpointed review translation
///
/// Translates the title and body of every review in a dataset, skipping
/// records already in the target locale and reusing earlier translations.
#[derive(Parser, Debug)]
#[command(name = "revtrans")]
#[command(version)]
#[command(about = "Checkpointed machine translation of review datasets")]
#[command(long_about = "revtrans translates review datasets through the DeepL API.

Progress is checkpointed to a SQLite file and restored on the next run, so an
interrupted or rate-limited run can simply be started again.

EXAMPLES:
    revtrans translate reviews.json                  # Translate to the configured language
    revtrans translate reviews.jsonl -t de           # Translate to German
    revtrans translate reviews.json --test-mode      # Dry run with the fake translator
    revtrans translate reviews.json --escalation backoff
    revtrans check                                   # Drop wrong-language checkpoint entries
    revtrans completions bash > revtrans.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The DeepL key may also be given through the
    DEEPL_AUTH_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "revtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Check(args) => run_check(args),
    }
}

// Load the config file, apply CLI overrides and start logging
fn prepare_config(common: &CommonArgs) -> Result<Config> {
    let created = !common.config_path.exists();
    let mut config = Config::load_or_create(&common.config_path)?;

    if let Some(target_language) = &common.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = common.log_level {
        config.logging.level = log_level.into();
    }
    if common.test_mode {
        config.test_mode = true;
    }

    logging::init(config.logging.level.into(), config.logging.file.as_deref())?;
    if created {
        warn!("Config file not found at {:?}, created default config.", common.config_path);
    }
    Ok(config)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = prepare_config(&args.common)?;

    if let Some(api_key) = &args.api_key {
        config.provider.api_key = api_key.clone();
    }
    if let Some(max_rounds) = args.max_rounds {
        config.pipeline.max_retry_rounds = max_rounds;
    }
    if let Some(escalation) = args.escalation {
        config.pipeline.escalation = escalation.into();
    }

    let controller = Controller::with_config(config)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| dataset::default_output_path(&args.input));

    let mut ctx = controller.open_context()?;
    let handler = ctx.interrupt_handler();

    tokio::select! {
        result = controller.run(&mut ctx, &args.input, &output) => {
            if let Err(e) = &result {
                error!("Translation run failed: {:#}", e);
            }
            log::logger().flush();
            result.map(|_| ())
        }
        signal = handler.wait() => {
            signal.context("Failed to listen for Ctrl-C")?;
            handler.handle()?;
            std::process::exit(0);
        }
    }
}

fn run_check(args: CommonArgs) -> Result<()> {
    let config = prepare_config(&args)?;
    // The check never calls the provider
    let provider = ProviderConfig {
        provider_type: TranslationProvider::Mock,
        ..config.provider.clone()
    };
    let controller = Controller::with_config(Config { provider, ..config })?;

    let removed = controller.check()?;
    info!("{} entries will be retranslated on the next run", removed);
    log::logger().flush();
    Ok(())
}
