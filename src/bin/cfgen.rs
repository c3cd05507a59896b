//! Generates random sentences from a grammar file.
//!
//! Usage:
//!   cfgen grammar.txt -n 10 --seed 7
//!   `RUST_LOG=debug` cfgen grammar.json --validate --longest --classify
//!
//! Files ending in `.json` are read as JSON objects, anything else in the
//! text notation. Sentences go to stdout, one per line; diagnostics go to
//! stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use cfg_engine::{GenerateOptions, Generator, Grammar, classify, longest_sequence};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// File containing the grammar
    file: PathBuf,

    /// Start symbol (default: first start candidate in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    start: Option<String>,

    /// Amount to generate
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
    amount: usize,

    /// Seed for the random generator (default: from the OS)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Maximum derivation depth per sentence
    #[arg(long, value_name = "D", default_value_t = GenerateOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Check every generated sentence against the grammar
    #[arg(long)]
    validate: bool,

    /// Print the longest possible sentence length
    #[arg(long)]
    longest: bool,

    /// Print the terminal and start symbols
    #[arg(long)]
    classify: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cfgen: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Grammar, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let grammar = if path.extension().is_some_and(|ext| ext == "json") {
        Grammar::from_json(&text)?
    } else {
        text.parse()?
    };
    tracing::info!(rules = grammar.len(), "loaded {}", path.display());
    Ok(grammar)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let grammar = load(&cli.file)?;
    let start = match &cli.start {
        Some(start) => start.clone(),
        None => grammar.start_symbol()?.to_string(),
    };
    tracing::debug!("start symbol {start}");

    if cli.classify {
        let classification = classify(&grammar);
        let mut terminals: Vec<String> = classification
            .terminals
            .iter()
            .map(ToString::to_string)
            .collect();
        terminals.sort();
        let mut starts: Vec<String> = classification
            .starts
            .iter()
            .map(ToString::to_string)
            .collect();
        starts.sort();
        println!("terminals: {}", terminals.join(" "));
        println!("starts: {}", starts.join(" "));
    }

    if cli.longest {
        match longest_sequence(&start, &grammar) {
            Ok(len) => println!("longest: {len}"),
            Err(e) => println!("longest: {e}"),
        }
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let generator = Generator::new(&grammar)
        .with_options(GenerateOptions::default().with_max_depth(cli.max_depth));
    let recognizer = cli.validate.then(|| grammar.build_recognizer());

    for sentence in generator.samples(&start, &mut rng).take(cli.amount) {
        let sentence = sentence?;
        match &recognizer {
            Some(recognizer) => {
                let verdict = match recognizer.recognize(&sentence, &start) {
                    Ok(()) => String::from("valid"),
                    Err(rejection) => format!("invalid: {rejection}"),
                };
                println!("{sentence}\t{verdict}");
            }
            None => println!("{sentence}"),
        }
    }

    Ok(())
}
