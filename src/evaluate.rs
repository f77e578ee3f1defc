//! Per-language overlap between aligned Wiktionary lemmas and WordNet, and a
//! reproducible sample of alignments for manual inspection.

use crate::{
    align::AlignmentTable,
    defgroups::{DefGroups, LemmaEntry, LemmaLists},
    normalize::DefKey,
    wordnet::{SynsetGlosses, SynsetGroups},
    HashMap,
};

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::Result;
use itertools::Itertools;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use tracing::warn;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    /// Synsets with at least one lemma in the language.
    pub synsets: usize,
    /// Lemma entries in the language.
    pub senses: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LangStats {
    pub matched_vs_wordnet: usize,
    pub matched_vs_wiktionary: usize,
    pub lower_bound: usize,
    pub lower_bound_ratio: f64,
    pub wordnet_total: usize,
    pub wiktionary_total: usize,
    pub recall: f64,
    pub precision: f64,
    pub defkeys: usize,
    pub lemmas: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Evaluation {
    pub coverage: BTreeMap<String, Coverage>,
    pub langs: BTreeMap<String, LangStats>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn lemmas<'a>(lists: &'a LemmaLists, defkey: &DefKey) -> &'a [LemmaEntry] {
    lists.get(defkey).map_or(&[][..], Vec::as_slice)
}

pub fn wordnet_coverage(synsets: &SynsetGroups) -> BTreeMap<String, Coverage> {
    let mut coverage: BTreeMap<String, Coverage> = BTreeMap::new();
    for lemmas in synsets.values() {
        for lemma in lemmas {
            coverage.entry(lemma.lang.clone()).or_default().senses += 1;
        }
        for lang in lemmas.iter().map(|l| &l.lang).unique() {
            coverage.entry(lang.clone()).or_default().synsets += 1;
        }
    }
    coverage
}

/// Compares, for every aligned synset, the merged source and target lemmas of
/// its aligned defkeys with the synset's own lemmas, and sums the result per
/// language of WordNet.
pub fn evaluate(
    synsets: &SynsetGroups,
    groups: &DefGroups,
    alignments: &AlignmentTable,
) -> Evaluation {
    let mut overlaps: HashMap<&str, usize> = HashMap::default();
    let mut distinct_overlaps: HashMap<&str, usize> = HashMap::default();
    let mut wiktionary: HashMap<&str, usize> = HashMap::default();
    let mut wordnet: HashMap<&str, usize> = HashMap::default();
    let mut by_defkey: BTreeMap<&DefKey, HashMap<&str, usize>> = BTreeMap::new();

    for (wncode, aligned) in alignments {
        let Some(wn_lemmas) = synsets.get(wncode) else {
            warn!("aligned wncode {wncode} has no WordNet lemmas");
            continue;
        };
        let mut merged: Vec<&LemmaEntry> = vec![];
        for candidate in aligned {
            let defkey = &candidate.defkey;
            let own = lemmas(&groups.synonyms, defkey)
                .iter()
                .chain(lemmas(&groups.translations, defkey));
            by_defkey.entry(defkey).or_insert_with(|| {
                let mut counts: HashMap<&str, usize> = HashMap::default();
                for lemma in own.clone() {
                    *counts.entry(lemma.lang.as_str()).or_default() += 1;
                }
                counts
            });
            merged.extend(own);
        }
        for lemma in &merged {
            *wiktionary.entry(lemma.lang.as_str()).or_default() += 1;
            if wn_lemmas.contains(lemma) {
                *overlaps.entry(lemma.lang.as_str()).or_default() += 1;
            }
        }
        for lemma in merged.iter().unique() {
            if wn_lemmas.contains(lemma) {
                *distinct_overlaps.entry(lemma.lang.as_str()).or_default() += 1;
            }
        }
        for lemma in wn_lemmas {
            *wordnet.entry(lemma.lang.as_str()).or_default() += 1;
        }
    }

    let total_overlaps: usize = overlaps.values().sum();
    let total_wiktionary: usize = wiktionary.values().sum();
    let wordnet_langs: BTreeSet<&str> = synsets
        .values()
        .flatten()
        .map(|l| l.lang.as_str())
        .collect();
    let count = |counts: &HashMap<&str, usize>, lang: &str| counts.get(lang).copied().unwrap_or(0);

    let mut langs = BTreeMap::new();
    for lang in wordnet_langs {
        let matched_vs_wordnet = count(&distinct_overlaps, lang);
        let matched_vs_wiktionary = count(&overlaps, lang);
        let wordnet_total = count(&wordnet, lang);
        let wiktionary_total = count(&wiktionary, lang);
        let lower_bound = if total_wiktionary > 0 {
            total_overlaps - matched_vs_wiktionary
        } else {
            0
        };
        let stats = LangStats {
            matched_vs_wordnet,
            matched_vs_wiktionary,
            lower_bound,
            lower_bound_ratio: ratio(lower_bound, total_overlaps),
            wordnet_total,
            wiktionary_total,
            recall: ratio(matched_vs_wordnet, wordnet_total),
            precision: ratio(matched_vs_wiktionary, wiktionary_total),
            defkeys: by_defkey.values().filter(|c| count(c, lang) > 0).count(),
            lemmas: by_defkey.values().map(|c| count(c, lang)).sum(),
        };
        langs.insert(lang.to_string(), stats);
    }
    Evaluation {
        coverage: wordnet_coverage(synsets),
        langs,
    }
}

/// Reads a `code<TAB>name` table. Lines without a tab are ignored.
pub fn load_lang_names(path: &Path) -> Result<HashMap<String, String>> {
    let table = fs::read_to_string(path)?;
    Ok(table
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(code, name)| (code.trim().to_string(), name.trim().to_string()))
        .collect())
}

pub fn write_report<W: Write>(
    w: &mut W,
    evaluation: &Evaluation,
    names: &HashMap<String, String>,
) -> io::Result<()> {
    let name = |lang: &str| names.get(lang).map_or(lang, String::as_str).to_string();
    writeln!(w, "lang, name, wn_synsets, wn_senses")?;
    for (lang, coverage) in &evaluation.coverage {
        writeln!(
            w,
            "{lang}, {}, {}, {}",
            name(lang),
            coverage.synsets,
            coverage.senses
        )?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "lang, name, matched_vs_wn, matched_vs_wk, lower_bound, lower_bound_pct, \
         wn_total, wk_total, recall, precision, defkeys, lemmas"
    )?;
    for (lang, s) in &evaluation.langs {
        writeln!(
            w,
            "{lang}, {}, {}, {}, {}, {:.5}, {}, {}, {:.5}, {:.5}, {}, {}",
            name(lang),
            s.matched_vs_wordnet,
            s.matched_vs_wiktionary,
            s.lower_bound,
            s.lower_bound_ratio,
            s.wordnet_total,
            s.wiktionary_total,
            s.recall,
            s.precision,
            s.defkeys,
            s.lemmas
        )?;
    }
    Ok(())
}

fn write_lemmas<W: Write>(w: &mut W, title: &str, lemmas: Option<&Vec<LemmaEntry>>) -> io::Result<()> {
    writeln!(w, "{title}:")?;
    match lemmas {
        Some(lemmas) if !lemmas.is_empty() => {
            for lemma in lemmas {
                writeln!(w, "  {} ({}, {})", lemma.lemma, lemma.lang, lemma.pos)?;
            }
        }
        _ => writeln!(w, "  none")?,
    }
    Ok(())
}

/// Writes `size` aligned wncodes, drawn with a seeded generator from the
/// sorted table, with everything their alignment was based on.
pub fn write_sample<W: Write>(
    w: &mut W,
    alignments: &AlignmentTable,
    synsets: &SynsetGroups,
    groups: &DefGroups,
    glosses: &SynsetGlosses,
    size: usize,
    seed: u64,
) -> io::Result<()> {
    let wncodes: Vec<&String> = alignments.keys().collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let picked = index::sample(&mut rng, wncodes.len(), size.min(wncodes.len()));
    for (i, k) in picked.into_iter().enumerate() {
        let wncode = wncodes[k];
        writeln!(w, "Record {}  wncode: {wncode}", i + 1)?;
        if let Some(gloss) = glosses.get(wncode) {
            writeln!(w, "Gloss: {gloss}")?;
        }
        write_lemmas(w, "WordNet lemmas", synsets.get(wncode))?;
        for candidate in &alignments[wncode] {
            writeln!(w, "{candidate:?}")?;
            match groups.definitions.get(&candidate.defkey) {
                Some(def) => writeln!(w, "{def:?}")?,
                None => writeln!(w, "no definition for {}", candidate.defkey)?,
            }
            write_lemmas(w, "Synonyms", groups.synonyms.get(&candidate.defkey))?;
            write_lemmas(w, "Translations", groups.translations.get(&candidate.defkey))?;
        }
        writeln!(w)?;
    }
    Ok(())
}
