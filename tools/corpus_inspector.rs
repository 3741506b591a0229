/// Corpus Inspector — builds a model from a corpus and reports what it learned.
///
/// Usage: corpus_inspector --input <file.txt> [--prefix-len N] [--canonical] [--dump <model.ron>]
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;

use ebook_chain::core::generator::Generator;
use ebook_chain::schema::config::GeneratorConfig;

#[derive(Parser, Debug)]
#[command(name = "corpus_inspector")]
#[command(about = "Report prefix, opening, and representation statistics for a corpus")]
struct Args {
    /// Corpus file, one seed text per line
    #[arg(long)]
    input: PathBuf,

    /// Tokens per chain state
    #[arg(long, default_value = "1")]
    prefix_len: usize,

    /// Merge spellings that differ only in case or punctuation
    #[arg(long)]
    canonical: bool,

    /// How many of the busiest prefixes to list
    #[arg(long, default_value = "10")]
    top: usize,

    /// Write the whole model to this RON file
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = GeneratorConfig {
        prefix_len: args.prefix_len,
        canonical: args.canonical,
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::from_config(&config).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    let text = std::fs::read_to_string(&args.input).unwrap_or_else(|e| {
        error!("Error reading input file '{}': {}", args.input.display(), e);
        process::exit(1);
    });

    info!(
        "Building {}-token prefix model from '{}'...",
        args.prefix_len,
        args.input.display()
    );
    let lines = generator.add_corpus(&text);

    println!(
        "{} lines: {} unique prefixes, {} transitions, {} openings",
        lines,
        generator.data().len(),
        generator.data().pair_count(),
        generator.beginnings().len()
    );
    if generator.is_canonical() {
        println!(
            "{} canonical tokens, {} spellings",
            generator.reps().len(),
            generator.reps().pair_count()
        );
    }

    let mut busiest: Vec<_> = generator.data().iter().collect();
    busiest.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(b.0)));
    for (prefix, list) in busiest.into_iter().take(args.top) {
        let heaviest = list
            .heaviest()
            .map(|e| format!("\"{}\" x{}", e.value, e.hits))
            .unwrap_or_default();
        println!(
            "  \"{}\": {} hits over {} successors, mostly {}",
            prefix,
            list.total(),
            list.len(),
            heaviest
        );
    }

    if let Some(path) = &args.dump {
        let serialized = ron::ser::to_string_pretty(&generator, ron::ser::PrettyConfig::default())
            .unwrap_or_else(|e| {
                error!("Error serializing model: {}", e);
                process::exit(1);
            });
        std::fs::write(path, serialized).unwrap_or_else(|e| {
            error!("Error writing model to '{}': {}", path.display(), e);
            process::exit(1);
        });
        info!("Model written to '{}'", path.display());
    }
}
