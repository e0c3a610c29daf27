use clap::{Parser, Subcommand};
use mongoba::cli::{self, Command, TerminalPrompter};
use mongoba::config::load_config;
use mongoba::logger::configure_logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mongoba", version, about = "Back up, restore and purge MongoDB databases", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML) with prompt defaults")]
    config: Option<PathBuf>,
    #[arg(long, help = "Directory for log files (overrides config)")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: off|error|warn|info|debug|trace (overrides config)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Back up selected collections to a JSON file, optionally encrypted")]
    Backup {
        #[arg(long, help = "Connection string; skips the connection prompts")]
        uri: Option<String>,
    },
    #[command(about = "Insert the contents of a JSON backup file into a server")]
    Restore {
        #[arg(long, help = "Connection string; skips the connection prompts")]
        uri: Option<String>,
    },
    #[command(about = "Drop selected collections (cannot be undone)")]
    Purge {
        #[arg(long, help = "Connection string; skips the connection prompts")]
        uri: Option<String>,
    },
    #[command(about = "Decrypt an encrypted backup file")]
    Decrypt {
        #[arg(long, help = "Encrypted backup file (.json.enc)")]
        input: Option<PathBuf>,
        #[arg(long, help = "Where to write the decrypted JSON")]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::Backup { uri } => Command::Backup { uri },
            Commands::Restore { uri } => Command::Restore { uri },
            Commands::Purge { uri } => Command::Purge { uri },
            Commands::Decrypt { input, output } => Command::Decrypt { input, output },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let loaded = match load_config(args.config.as_deref()) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let config = loaded.config;
    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }

    let log_dir = args.log_dir.or_else(|| config.log_dir.clone());
    let log_level = args.log_level.or_else(|| config.log_level.clone());
    if let Err(e) = configure_logging(log_dir.as_deref(), log_level.as_deref(), config.log_retention) {
        eprintln!("warning: logging disabled: {e}");
    }
    for source in &loaded.sources {
        log::debug!("config loaded from {}", source.display());
    }

    let mut prompter = TerminalPrompter::new();
    if let Err(e) = cli::run(args.command.into(), &mut prompter, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
