//! Aligns DBnary Wiktionary senses with multilingual WordNet synsets by
//! comparing their synonym and translation lemmas.

#![allow(clippy::redundant_closure_for_method_calls)]

pub mod align;
pub mod builders;
pub mod cache;
pub mod defgroups;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod lang;
pub mod normalize;
pub mod reader;
pub mod records;
pub mod report;
pub mod wordnet;

use crate::{
    align::{combine, Aligner, AlignmentTable},
    builders::Builders,
    cache::Cache,
    defgroups::DefGroups,
    lang::SourceLang,
    normalize::ShortPos,
    reader::{dump_lines, RecordReader},
    records::Records,
    wordnet::SynsetGroups,
};

use std::{
    convert::TryFrom,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Result;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use tracing::{error, info};
use xxhash_rust::xxh3::Xxh3Builder;

pub type HashMap<K, V> = std::collections::HashMap<K, V, Xxh3Builder>;
pub type HashSet<T> = std::collections::HashSet<T, Xxh3Builder>;

pub(crate) fn progress_bar(n: usize, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(u64::try_from(n)?);
    let template = format!("{{spinner:.green}} {message}: [{{elapsed}}] [{{bar:.cyan/blue}}] {{human_pos}}/{{human_len}} ({{per_sec}}, {{eta}})");
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&template)?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    let template = format!("{{spinner:.green}} {message}: [{{elapsed}}] {{human_pos}} records ({{per_sec}})");
    pb.set_style(ProgressStyle::default_spinner().template(&template)?);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dump_path: PathBuf,
    pub lang_codes_path: PathBuf,
    pub wordnet_path: PathBuf,
    pub cache_dir: PathBuf,
    pub line_limit: Option<usize>,
    /// Parts of speech to align, in order.
    pub pos: Vec<ShortPos>,
    pub from_cache: bool,
    /// Entries per dictionary dumped at debug level.
    pub sample: usize,
}

/// Reads the dump and collects its records. A line that cannot be read or
/// decoded ends the read; the records collected up to it are kept.
///
/// # Errors
///
/// Will return `Err` if the dump cannot be opened.
pub fn read_records(dump_path: &Path, lang: &SourceLang, line_limit: Option<usize>) -> Result<Records> {
    let t = Instant::now();
    info!("Reading records from {}...", dump_path.display());
    let mut reader = RecordReader::new(dump_lines(dump_path)?, &lang.code3, line_limit);
    let mut builders = Builders::new(&lang.code3)?;
    let pb = spinner("Reading records")?;
    for record in reader.by_ref() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!("dump stream failed, keeping records read so far: {e}");
                break;
            }
        };
        builders.build(&record.reorganized());
        pb.inc(1);
    }
    pb.finish();
    reader.stats().log();
    let (records, stats) = builders.finish();
    stats.log();
    records.log_counts();
    info!("Finished. Took {}.", HumanDuration(t.elapsed()));
    Ok(records)
}

fn extract(config: &Config, lang: &SourceLang, cache: &Cache) -> Result<(SynsetGroups, DefGroups)> {
    let records = read_records(&config.dump_path, lang, config.line_limit)?;
    report::log_records(&records, config.sample);

    let mut t = Instant::now();
    info!("Looking up WordNet {}...", config.wordnet_path.display());
    let synsets = wordnet::load_synset_lemmas(&config.wordnet_path);
    info!(
        "Finished with {} synsets. Took {}.",
        synsets.len(),
        HumanDuration(t.elapsed())
    );
    report::log_synsets(&synsets, config.sample);

    t = Instant::now();
    info!("Grouping lemmas by defkey...");
    let groups = DefGroups::build(&lang.code3, &records);
    groups.log_sizes();
    info!("Finished. Took {}.", HumanDuration(t.elapsed()));
    report::log_def_groups(&groups, config.sample);

    cache.save_def_groups(&groups)?;
    cache.save_synsets(&synsets)?;
    Ok((synsets, groups))
}

/// Runs extraction (or loads its cached output) and aligns every requested
/// part of speech, caching one table per part of speech plus the combined
/// table.
///
/// # Errors
///
/// Will return `Err` if the dump cannot be opened or a cache file cannot be
/// written or loaded.
pub fn run(config: &Config) -> Result<AlignmentTable> {
    let lang = SourceLang::resolve(&config.dump_path, &config.lang_codes_path);
    info!("Source language: {} / {}", lang.code2, lang.code3);
    let cache = Cache::new(&config.cache_dir);
    let (synsets, groups) = if config.from_cache {
        let t = Instant::now();
        info!("Loading cached dictionaries from {}...", config.cache_dir.display());
        let groups = cache.load_def_groups()?;
        let synsets = cache.load_synsets()?;
        info!("Finished. Took {}.", HumanDuration(t.elapsed()));
        (synsets, groups)
    } else {
        extract(config, &lang, &cache)?
    };

    let aligner = Aligner::new(&lang.code3, &synsets, &groups);
    let mut tables = Vec::with_capacity(config.pos.len());
    let mut summaries = Vec::with_capacity(config.pos.len());
    for &pos in &config.pos {
        let t = Instant::now();
        info!("Aligning {pos}...");
        let (table, summary) = aligner.align(pos)?;
        cache.save_alignments(pos.as_ref(), &table)?;
        info!("Finished. Took {}.", HumanDuration(t.elapsed()));
        tables.push(table);
        summaries.push(summary);
    }
    for summary in &summaries {
        summary.log();
    }
    let combined = combine(tables);
    cache.save_alignments("all", &combined)?;
    info!("Combined alignment table size: {}", combined.len());
    Ok(combined)
}
