use broker::infrastructure::json_file::FileConfig;
use broker::interfaces::csv::table_writer::TableWriter;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the broker configuration file
    #[arg(long, global = true, default_value = "broker.json")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the configuration file with default priorities if it is missing
    Init,
    /// Print the configured handlers as CSV, highest priority first
    Show,
    /// Override a handler's priority
    Priority {
        id: String,
        #[arg(allow_negative_numbers = true)]
        priority: i32,
    },
    /// Disable a handler
    Disable { id: String },
    /// Re-enable a disabled handler
    Enable { id: String },
    /// Mark handlers as generous, or clear the flag with --off
    Generous {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        off: bool,
    },
}

/// Handler ids must be non-empty and free of whitespace, or the entry would
/// be dropped the next time the file is loaded.
fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        miette::bail!("invalid handler id {:?}: ids must be non-empty and contain no whitespace", id);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).into_diagnostic()?;

    let config = FileConfig::open(&cli.config).into_diagnostic()?;

    match cli.command {
        Command::Init => {
            info!(path = %config.path().display(), "configuration ready");
            return Ok(());
        }
        Command::Show => {
            let stdout = io::stdout();
            let mut writer = TableWriter::new(stdout.lock());
            writer.write_rows(config.snapshot().rows()).into_diagnostic()?;
            return Ok(());
        }
        Command::Priority { id, priority } => {
            check_id(&id)?;
            config.set_priority(&id, priority);
        }
        Command::Disable { id } => {
            check_id(&id)?;
            config.set_disabled(&id, true);
        }
        Command::Enable { id } => {
            check_id(&id)?;
            config.set_disabled(&id, false);
        }
        Command::Generous { ids, off } => {
            for id in &ids {
                check_id(id)?;
            }
            for id in &ids {
                config.set_generous(id, !off);
            }
        }
    }

    config.save().into_diagnostic()?;
    info!(path = %config.path().display(), "configuration updated");
    Ok(())
}
