use anyhow::{Context, Result};
use blicket_bonus::*;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blicket-bonus")]
#[command(about = "Filter blicket study data, reshape participant rules and compute bonuses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    paths: PathArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct PathArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Data batch suffix (e.g., 00x)
    #[arg(short, long, global = true)]
    batch: Option<String>,
    /// Directory holding the chunk dump and participant ID file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory for filtered chunks and reshaped tables
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Directory for bulk bonus files
    #[arg(long, global = true)]
    bonus_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep ending chunks of real participants who completed the study
    Filter,
    /// Write one row per rule branch
    Branches,
    /// Write one row per teaching example with its rule
    Rules,
    /// Score rules against teaching examples and write bonus files
    Bonus,
    /// Run every stage in order
    Run,
    /// Evaluate a rule on one or more combos
    Eval {
        /// Rule as a JSON array of branches
        #[arg(short, long)]
        rule: String,
        /// Combo of '*' (blicket) and '.' (non-blicket) markers
        #[arg(long, num_args = 1.., required = true)]
        combo: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&cli.paths)?;
    let pipeline = BonusPipeline::new(config);

    match cli.command {
        Commands::Filter => {
            let outcome = pipeline.filter().context("filtering participant data")?;
            println!(
                "{} valid ending chunks saved to {}",
                outcome.endings.len(),
                pipeline.config().paths.valid_endings_file().display()
            );
        }
        Commands::Branches => {
            let endings = pipeline.load_endings().context("loading ending chunks")?;
            let rows = pipeline.reshape_branches(&endings)?;
            println!("{} branch rows", rows.len());
        }
        Commands::Rules => {
            let endings = pipeline.load_endings().context("loading ending chunks")?;
            let rows = pipeline.reshape_rules(&endings)?;
            println!("{} rule rows", rows.len());
        }
        Commands::Bonus => {
            let endings = pipeline.load_endings().context("loading ending chunks")?;
            let rows = pipeline.reshape_rules(&endings)?;
            let report = pipeline.score(&endings, &rows).context("scoring rules")?;
            print_report(&report);
        }
        Commands::Run => {
            let report = pipeline.run()?;
            print_report(&report);
        }
        Commands::Eval { rule, combo } => {
            let rule: Rule = serde_json::from_str(&rule).context("parsing rule JSON")?;
            for combo in &combo {
                let probability = evaluate_rule(&rule.branches, combo)
                    .with_context(|| format!("evaluating combo {combo:?}"))?;
                println!("{combo}\t{probability}");
            }
        }
    }

    Ok(())
}

fn load_config(args: &PathArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(batch) = &args.batch {
        config.paths.batch = batch.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.paths.data_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(dir) = &args.bonus_dir {
        config.paths.bonus_dir = dir.clone();
    }

    info!("Using batch {}", config.paths.batch);
    Ok(config)
}

fn print_report(report: &BonusReport) {
    match &report.summary {
        Some(summary) => {
            println!("Bonus summary:");
            println!("==============");
            println!("count: {}", summary.count);
            println!("mean:  {:.4}", summary.mean);
            println!("std:   {:.4}", summary.std);
            println!("min:   {:.2}", summary.min);
            println!("max:   {:.2}", summary.max);
        }
        None => println!("No payouts"),
    }
}
