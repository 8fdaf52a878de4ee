use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sw")]
#[command(about = "stockwatch: daily best/worst performer report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Market status for a date and the session a report would cover
    Calendar {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Date to evaluate (YYYY-MM-DD). Defaults to today in schedule.timezone.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Run the report once and print it
    Report {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Date to run for (YYYY-MM-DD). Defaults to today in schedule.timezone.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Also deliver the text (Discord webhook if configured, else the log)
        #[arg(long, default_value_t = false)]
        notify: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlays)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Calendar { config_paths, date } => {
            commands::report::calendar(config_paths, date).await?;
        }

        Commands::Report {
            config_paths,
            date,
            notify,
        } => {
            commands::report::report(config_paths, date, notify).await?;
        }

        Commands::ConfigHash { paths } => {
            let loaded = sw_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
