//! Linicrypt solver CLI

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linicrypt::{classify_all, CipherMode, PgvCompressionFunction, PgvParams, SolverConfig};

#[derive(Parser)]
#[command(name = "linicrypt_solver")]
#[command(about = "Collision and second-preimage search for Linicrypt programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Field order q of GF(q)
    #[arg(long, global = true, default_value_t = 16)]
    field_order: u32,

    /// Ideal cipher semantics
    #[arg(long, global = true, value_enum, default_value_t = Mode::Permutation)]
    cipher_mode: Mode,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Permutation,
    FixedPoints,
}

impl From<Mode> for CipherMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Permutation => CipherMode::Permutation,
            Mode::FixedPoints => CipherMode::FixedPoints,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify all 64 PGV compression functions
    Classify {
        /// Number of Merkle-Damgard blocks
        #[arg(short, long, default_value_t = 2)]
        blocks: usize,

        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the maximal collision attacks on one PGV construction
    Attacks {
        /// Coefficients as six binary digits `abcdef`
        #[arg(short, long)]
        params: PgvParams,

        /// Number of Merkle-Damgard blocks
        #[arg(short, long, default_value_t = 2)]
        blocks: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SolverConfig::new(cli.field_order).with_cipher_mode(cli.cipher_mode.into());
    let field = config.install()?;
    info!("Working over {field} with {:?} cipher semantics", config.cipher_mode);

    match cli.command {
        Commands::Classify { blocks, json } => cmd_classify(&config, blocks, json)?,
        Commands::Attacks { params, blocks } => cmd_attacks(&config, params, blocks)?,
    }

    Ok(())
}

fn cmd_classify(config: &SolverConfig, blocks: usize, json: bool) -> Result<()> {
    let reports = classify_all(blocks, config.cipher_mode)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{report}");
    }
    let resistant = reports.iter().filter(|r| r.collision_resistant).count();
    let mismatches = reports.iter().filter(|r| !r.matches_syntactic_test()).count();
    println!();
    println!("Collision resistant over {blocks} block(s): {resistant} of {}", reports.len());
    println!("Disagreements with the syntactic test: {mismatches}");
    Ok(())
}

fn cmd_attacks(config: &SolverConfig, params: PgvParams, blocks: usize) -> Result<()> {
    let scheme = PgvCompressionFunction::new(params).with_cipher_mode(config.cipher_mode);
    println!("{scheme}");

    let program = scheme.merkle_damgard(blocks)?;
    let attacks = program.all_maximal_collision_attacks()?;
    if attacks.is_empty() {
        println!("No collision attack over {blocks} block(s)");
        return Ok(());
    }

    for (i, attack) in attacks.iter().enumerate() {
        println!();
        println!("Attack {}:", i + 1);
        println!("{attack}");
    }
    Ok(())
}
