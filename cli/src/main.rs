//! Command-line driver: loads a YAML config, runs the engine, prints a
//! summary, and optionally writes the per-hand debug trail as CSV.

mod config;

use std::path::{Path, PathBuf};

use blackjack_engine::debug::{DebugLog, CSV_HEADER};
use blackjack_engine::simulate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack-sim.yml";

#[derive(Debug, Parser)]
#[command(author, version, about = "Monte Carlo EV simulator for count-based blackjack play")]
struct CommandLineArgs {
    /// Path to the run config. `~` expands to the home directory.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Write the per-hand debug trail here as CSV (requires `debug: true` in the config).
    #[arg(long)]
    debug_csv: Option<PathBuf>,
}

fn resolve_config_path(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home_dir = home::home_dir().expect("cannot locate home directory");
            home_dir.join(rest)
        }
        None => PathBuf::from(raw),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CommandLineArgs::parse();
    let config_path = resolve_config_path(&args.config);

    let input = match config::parse_config_from_file(&config_path) {
        Ok(input) => input,
        Err(err) => {
            tracing::error!(path = %config_path.display(), error = %err, "failed to load config");
            std::process::exit(1);
        }
    };

    let result = simulate(
        &input,
        |completed| tracing::info!(realities_completed = completed, "progress"),
        || false,
    );

    match result {
        Ok(Some(result)) => {
            println!("ev per hour:          {:.2}", result.ev_per_hour);
            println!("sd per hour:          {:.2}", result.sd_per_hour);
            println!("ev per hand:          {:.4}", result.ev_per_hand);
            println!("sd per hand:          {:.4}", result.sd_per_hand);
            println!("risk of ruin:         {:.4}", result.risk_of_ruin);
            println!("average bet:          {:.2}", result.average_bet);
            println!("median bet:           {:.2}", result.median_bet);
            println!("positive outcome:     {:.4}", result.positive_outcome_fraction);
            println!("best ending bankroll: {:.2}", result.best_ending_bankroll);
            println!("worst ending bankroll:{:.2}", result.worst_ending_bankroll);
            if let Some(hours) = result.hours_to_bust_worst {
                println!("hours to bust worst:  {:.2}", hours);
            }

            if let Some(csv_path) = &args.debug_csv {
                match &result.debug_log {
                    Some(log) => {
                        if let Err(err) = write_debug_csv(csv_path, log) {
                            tracing::error!(path = %csv_path.display(), error = %err, "failed to write debug CSV");
                            std::process::exit(1);
                        }
                    }
                    None => tracing::warn!("--debug-csv given but the config did not request debug output"),
                }
            }
        }
        Ok(None) => tracing::info!("run cancelled"),
        Err(err) => {
            tracing::error!(error = %err, "simulation failed");
            std::process::exit(1);
        }
    }
}

fn write_debug_csv(path: &Path, log: &DebugLog) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in log.records() {
        writer.write_record(record.to_csv_row())?;
    }
    writer.flush().map_err(csv::Error::from)
}
