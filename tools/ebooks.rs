/// Ebooks — generate texts from a corpus file, one seed per line.
///
/// Usage: ebooks --corpus <file.txt> [--config <gen.ron>] [--count N] [--seed S]
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;

use ebook_chain::core::generator::Generator;
use ebook_chain::schema::config::{GeneratorConfig, UnseenPrefixPolicy};

#[derive(Parser, Debug)]
#[command(name = "ebooks")]
#[command(about = "Generate Markov-chain texts from a line-per-seed corpus")]
struct Args {
    /// Corpus file, one seed text per line
    #[arg(long)]
    corpus: PathBuf,

    /// RON generator config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tokens per chain state
    #[arg(long)]
    prefix_len: Option<usize>,

    /// Character budget per generated text
    #[arg(long)]
    char_limit: Option<usize>,

    /// Merge spellings that differ only in case or punctuation
    #[arg(long)]
    canonical: bool,

    /// Restart from a random opening on dead ends, using the classic 8/11 odds
    #[arg(long)]
    reroll: bool,

    /// Number of texts to generate
    #[arg(long, default_value = "1")]
    count: usize,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Start every text from this prefix instead of a random opening
    #[arg(long)]
    from_prefix: Option<String>,

    /// Log every generation step
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load_from_ron(path).unwrap_or_else(|e| {
            error!("Error loading config '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => GeneratorConfig::default(),
    };
    if let Some(prefix_len) = args.prefix_len {
        config.prefix_len = prefix_len;
    }
    if let Some(char_limit) = args.char_limit {
        config.char_limit = char_limit;
    }
    if args.canonical {
        config.canonical = true;
    }
    if args.reroll {
        config.unseen_prefix = UnseenPrefixPolicy::historical_reroll();
    }

    let mut generator = Generator::from_config(&config).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    let text = std::fs::read_to_string(&args.corpus).unwrap_or_else(|e| {
        error!("Error reading corpus '{}': {}", args.corpus.display(), e);
        process::exit(1);
    });
    let lines = generator.add_corpus(&text);
    info!(
        "Ingested {} lines: {} prefixes, {} openings",
        lines,
        generator.data().len(),
        generator.beginnings().len()
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..args.count {
        let result = match &args.from_prefix {
            Some(prefix) => generator.generate_from_prefix(prefix, &mut rng),
            None => generator.generate_text(&mut rng),
        };
        match result {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Generation failed: {}", e);
                process::exit(1);
            }
        }
    }
}
