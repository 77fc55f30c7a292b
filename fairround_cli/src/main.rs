use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use fairround_core::{
    parse_labels,
    payout::{DEFAULT_PRECISION, DEFAULT_RTP},
    seeds::{LABEL_CLIENT_SEED, LABEL_NONCE, LABEL_SERVER_SEED_REVEALED},
    verify, verify_nonce_range, SeedSet, VerificationConfig, VerifyError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod output;

use output::RangeRow;

const EXIT_CANNOT_VERIFY: u8 = 2;
const EXIT_MISMATCH: u8 = 3;

#[derive(Parser)]
#[command(name = "fairround", about = "Verify provably-fair rounds from revealed seeds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log filter, e.g. "debug" (defaults to RUST_LOG, then "warn")
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute one round and print hash, u32, float and multiplier
    Verify {
        #[command(flatten)]
        seeds: SeedArgs,
        #[command(flatten)]
        config: ConfigArgs,
        /// Operator-reported multiplier to check against
        #[arg(long)]
        expect: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute every nonce in FROM..=TO under the same seed pair
    Range {
        #[command(flatten)]
        seeds: SeedArgs,
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
        /// Write rows to a CSV file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show how a seeds file resolves, without computing anything
    Parse {
        /// Seeds JSON file (label -> value)
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SeedArgs {
    /// Seeds JSON file (label -> value), as saved by the seed scraper
    #[arg(long)]
    seeds: Option<PathBuf>,
    /// Revealed server seed; overrides the file
    #[arg(long)]
    server_seed: Option<String>,
    /// Client seed; overrides the file
    #[arg(long)]
    client_seed: Option<String>,
    /// Round nonce; overrides the file
    #[arg(long)]
    nonce: Option<String>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Return-to-player fraction
    #[arg(long, env = "FAIRROUND_RTP", default_value_t = DEFAULT_RTP)]
    rtp: f64,
    /// Decimal digits kept in the multiplier
    #[arg(long, env = "FAIRROUND_PRECISION", default_value_t = DEFAULT_PRECISION)]
    precision: u32,
}

impl ConfigArgs {
    fn to_config(&self) -> anyhow::Result<VerificationConfig> {
        Ok(VerificationConfig::new(self.rtp, self.precision)?)
    }
}

fn read_labels(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading seeds file {}", path.display()))?;
    let labels =
        parse_labels(&text).with_context(|| format!("parsing seeds file {}", path.display()))?;
    Ok(labels)
}

fn load_seeds(args: &SeedArgs) -> anyhow::Result<SeedSet> {
    let mut labels = match &args.seeds {
        Some(path) => read_labels(path)?,
        None => BTreeMap::new(),
    };
    // flags are treated as values the caller vouches for
    let overrides = [
        (LABEL_SERVER_SEED_REVEALED, &args.server_seed),
        (LABEL_CLIENT_SEED, &args.client_seed),
        (LABEL_NONCE, &args.nonce),
    ];
    for (label, value) in overrides {
        if let Some(v) = value {
            labels.insert(label.to_string(), v.clone());
        }
    }
    Ok(SeedSet::from_labels(&labels))
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Verify {
            seeds,
            config,
            expect,
            json,
        } => {
            let seeds = load_seeds(&seeds)?;
            let config = config.to_config()?;
            let result = match verify(&seeds, &config) {
                Ok(r) => r,
                Err(e @ VerifyError::MissingSeed { .. }) => {
                    eprintln!("cannot verify: {e}");
                    return Ok(ExitCode::from(EXIT_CANNOT_VERIFY));
                }
                Err(e) => return Err(e.into()),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", output::format_result(&result));
            }
            if !result.seed_source.is_revealed() {
                warn!("server seed is not revealed; this result proves nothing about the round");
            }
            if let Some(expected) = expect {
                if !result.matches_reported(expected, config.precision) {
                    eprintln!(
                        "MISMATCH: operator reported {expected}, recomputed {}",
                        result.multiplier
                    );
                    return Ok(ExitCode::from(EXIT_MISMATCH));
                }
                info!(expected, "reported multiplier matches");
                eprintln!("MATCH");
            }
        }
        Commands::Range {
            seeds,
            config,
            from,
            to,
            csv: csv_path,
        } => {
            if to < from {
                bail!("empty nonce range {from}..={to}");
            }
            let seeds = load_seeds(&seeds)?;
            let config = config.to_config()?;
            if let Err(e) = seeds.ensure_complete() {
                eprintln!("cannot verify: {e}");
                return Ok(ExitCode::from(EXIT_CANNOT_VERIFY));
            }
            let rows = verify_nonce_range(&seeds, &config, from..=to)
                .map(|(nonce, r)| r.map(|r| RangeRow::new(nonce, r)));
            match csv_path {
                Some(path) => {
                    let mut wtr = csv::Writer::from_path(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    let mut total = 0u64;
                    for row in rows {
                        wtr.serialize(row?)?;
                        total += 1;
                    }
                    wtr.flush()?;
                    println!("Exported {} rows to {}", total, path.display());
                }
                None => {
                    output::print_range_header();
                    for row in rows {
                        println!("{}", output::format_range_row(&row?));
                    }
                }
            }
        }
        Commands::Parse { path, json } => {
            let seeds = SeedSet::from_labels(&read_labels(&path)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&seeds)?);
            } else {
                print!("{}", output::format_seeds(&seeds));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
