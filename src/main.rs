use clap::{Parser, Subcommand};
use hive::core::config::{self, ResolvedConfig};
use hive::tui::{self, Screen};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{self, File};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hive", about = "Terminal screens for managing coding agents")]
struct Args {
    /// Config file to use instead of ~/.hive/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage scheduled agent runs
    Automations,
    /// Browse and edit memory notes
    Memory {
        /// Memory directory (overrides config and HIVE_MEMORY_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Review a worktree's uncommitted changes and leave line comments
    Diff {
        /// Worktree to diff
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Some(parent) = config.log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let raw = config::load_config(args.config.as_deref()).map_err(std::io::Error::other)?;
    let home = config::hive_home().unwrap_or_else(|| PathBuf::from(".hive"));
    let memory_dir = match &args.command {
        Command::Memory { dir } => dir.as_deref(),
        _ => None,
    };
    let resolved = config::resolve(&raw, &home, memory_dir);

    init_logging(&resolved);
    log::info!("Hive starting up, home {}", home.display());
    if let Some(level) = &resolved.unknown_log_level {
        log::warn!(
            "Unknown log level '{}', using {}",
            level,
            config::DEFAULT_LOG_LEVEL
        );
    }

    let screen = match args.command {
        Command::Automations => Screen::Automations,
        Command::Memory { .. } => Screen::Memory,
        Command::Diff { path } => Screen::Diff(path),
    };

    if let Some(prompt) = tui::run(&resolved, screen)? {
        println!("{prompt}");
    }
    Ok(())
}
