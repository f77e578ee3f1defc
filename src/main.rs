use dbnary_align::{normalize::ShortPos, run, Config};

use std::{env, fs::File, path::PathBuf, sync::Mutex, time::Instant};

use anyhow::Result;
use clap::Parser;
use indicatif::HumanDuration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(
        short = 'd',
        long,
        default_value = "data/en_dbnary.ttl.bz2",
        help = "Path to DBnary Turtle dump (.bz2, .gz or plain)",
        value_parser
    )]
    dump: PathBuf,
    #[clap(
        short = 'l',
        long,
        default_value = "data/language_codes.txt",
        help = "Tab-separated table of 2-letter to 3-letter language codes",
        value_parser
    )]
    lang_codes: PathBuf,
    #[clap(short = 'w', long, default_value = "data/wn-multix.db", value_parser)]
    wordnet: PathBuf,
    #[clap(short = 'c', long, default_value = "data/cache", value_parser)]
    cache_dir: PathBuf,
    #[clap(long, help = "Stop reading the dump after this many lines", value_parser)]
    line_limit: Option<usize>,
    #[clap(
        short = 'p',
        long,
        help = "Align only this part of speech (n, v, a or r)",
        value_parser
    )]
    pos: Option<ShortPos>,
    #[clap(
        long,
        help = "Load cached dictionaries instead of reading the dump and WordNet",
        action
    )]
    from_cache: bool,
    #[clap(short = 's', long, default_value_t = 10, value_parser)]
    sample: usize,
    #[clap(long, default_value = "warn", help = "Used when RUST_LOG is unset", value_parser)]
    log_level: String,
    #[clap(long, value_parser)]
    log_file: Option<PathBuf>,
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match &args.log_file {
        Some(path) => subscriber
            .with_writer(Mutex::new(File::create(path)?))
            .with_ansi(false)
            .init(),
        None => subscriber.init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    env::set_var("RUST_BACKTRACE", "1");
    let total_time = Instant::now();
    let args = Args::parse();
    init_tracing(&args)?;
    let pos = match args.pos {
        Some(ShortPos::Unknown) => anyhow::bail!("cannot align unknown part of speech"),
        Some(pos) => vec![pos],
        None => ShortPos::ALIGNABLE.to_vec(),
    };
    let config = Config {
        dump_path: args.dump,
        lang_codes_path: args.lang_codes,
        wordnet_path: args.wordnet,
        cache_dir: args.cache_dir,
        line_limit: args.line_limit,
        pos,
        from_cache: args.from_cache,
        sample: args.sample,
    };
    let table = run(&config)?;
    println!(
        "Aligned {} synsets. Took {} overall. Exiting...",
        table.len(),
        HumanDuration(total_time.elapsed())
    );
    Ok(())
}
