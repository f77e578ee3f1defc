// Run from workspace root after `dbnary-align` has filled the cache.
//
// Prints per-language overlap statistics between the aligned Wiktionary
// lemmas and WordNet, and optionally writes a random sample of alignments.
//
// Example usage:
//
// cargo run --release --bin evaluate -- --sample-out data/sample.txt

use dbnary_align::{
    cache::Cache,
    evaluate::{evaluate, load_lang_names, write_report, write_sample},
    wordnet::{load_synset_glosses, SynsetGlosses},
    HashMap,
};

use std::{
    env,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use indicatif::HumanDuration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(short = 'c', long, default_value = "data/cache", value_parser)]
    cache_dir: PathBuf,
    #[clap(
        short = 'a',
        long,
        default_value = "all",
        help = "Alignment table to evaluate: a part of speech, or all",
        value_parser
    )]
    alignments: String,
    #[clap(
        short = 'n',
        long,
        help = "Tab-separated table of language codes to names",
        value_parser
    )]
    lang_names: Option<PathBuf>,
    #[clap(short = 'o', long, value_parser)]
    sample_out: Option<PathBuf>,
    #[clap(long, default_value_t = 100, value_parser)]
    sample_size: usize,
    #[clap(long, default_value_t = 12345, value_parser)]
    seed: u64,
    #[clap(
        short = 'w',
        long,
        help = "WordNet database to take English glosses from for the sample",
        value_parser
    )]
    wordnet: Option<PathBuf>,
}

fn main() -> Result<()> {
    env::set_var("RUST_BACKTRACE", "1");
    let total_time = Instant::now();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?,
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();
    let cache = Cache::new(&args.cache_dir);
    let groups = cache.load_def_groups()?;
    let synsets = cache.load_synsets()?;
    let alignments = cache.load_alignments(&args.alignments)?;

    let names = match &args.lang_names {
        Some(path) => load_lang_names(path).unwrap_or_else(|e| {
            warn!("cannot read language names {}: {e}", path.display());
            HashMap::default()
        }),
        None => HashMap::default(),
    };
    let evaluation = evaluate(&synsets, &groups, &alignments);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &evaluation, &names)?;
    out.flush()?;

    if let Some(path) = &args.sample_out {
        let glosses = args
            .wordnet
            .as_deref()
            .map_or_else(SynsetGlosses::default, |wn| load_synset_glosses(wn, "eng"));
        let mut writer = BufWriter::new(File::create(path)?);
        write_sample(
            &mut writer,
            &alignments,
            &synsets,
            &groups,
            &glosses,
            args.sample_size,
            args.seed,
        )?;
        writer.flush()?;
        eprintln!("Wrote sample to {}.", path.display());
    }
    eprintln!(
        "All done! Took {} overall. Exiting...",
        HumanDuration(total_time.elapsed())
    );
    Ok(())
}
