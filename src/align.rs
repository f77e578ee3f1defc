//! Aligns WordNet synsets with Wiktionary defkey groups of the same part of
//! speech by counting shared lemmas on the source-language side (synonyms)
//! and on the target-language side (translations).

use crate::{
    defgroups::{DefGroups, LemmaEntry, LemmaLists},
    normalize::{normalize_lemma, DefKey, ShortPos},
    progress_bar,
    wordnet::SynsetGroups,
    HashMap, HashSet,
};

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::info;

const TARGET_RATIO_ALONE: f64 = 0.7;
const SRC_RATIO: f64 = 0.5;
const TARGET_RATIO: f64 = 0.5;
const TARGET_RATIO_LOW: f64 = 0.45;
const TARGET_MATCH_LOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Candidacy {
    None,
    /// Lemma overlap passes the thresholds.
    Plausible,
    /// Plausible, and the defkey's headword is itself a lemma of the synset.
    Confirmed,
}

/// Overlap counts between one synset and one defkey group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchStats {
    pub src_match: usize,
    pub target_match: usize,
    pub src_max: usize,
    pub target_max: usize,
}

fn ratio(matched: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        matched as f64 / max as f64
    }
}

impl MatchStats {
    pub fn src_ratio(&self) -> f64 {
        ratio(self.src_match, self.src_max)
    }

    pub fn target_ratio(&self) -> f64 {
        ratio(self.target_match, self.target_max)
    }

    pub fn any(&self) -> bool {
        self.src_match > 0 || self.target_match > 0
    }

    /// Threshold rules only; confirmation needs the synset itself.
    pub fn candidacy(&self) -> Candidacy {
        let src = self.src_ratio();
        let target = self.target_ratio();
        let plausible = target >= TARGET_RATIO_ALONE
            || (src >= SRC_RATIO
                && (target >= TARGET_RATIO
                    || (target >= TARGET_RATIO_LOW && self.target_match > TARGET_MATCH_LOW)));
        if plausible {
            Candidacy::Plausible
        } else {
            Candidacy::None
        }
    }

    pub fn score(&self) -> f64 {
        if self.target_max == 0 {
            0.0
        } else {
            self.target_match as f64 / (self.target_max as f64).sqrt()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCandidate {
    pub defkey: DefKey,
    pub src_match: usize,
    pub target_match: usize,
    pub src_max: usize,
    pub target_max: usize,
    pub src_ratio: f64,
    pub target_ratio: f64,
    pub score: f64,
    pub level: Candidacy,
}

impl AlignmentCandidate {
    fn new(defkey: DefKey, stats: MatchStats, level: Candidacy) -> Self {
        Self {
            defkey,
            src_match: stats.src_match,
            target_match: stats.target_match,
            src_max: stats.src_max,
            target_max: stats.target_max,
            src_ratio: stats.src_ratio(),
            target_ratio: stats.target_ratio(),
            score: stats.score(),
            level,
        }
    }
}

/// Ranked candidates per wncode.
pub type AlignmentTable = BTreeMap<String, Vec<AlignmentCandidate>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignSummary {
    pub pos: ShortPos,
    pub wncodes: usize,
    pub defkeys: usize,
    pub table_size: usize,
    pub aligned_defkeys: usize,
    pub unique_aligned_defkeys: usize,
}

impl AlignSummary {
    pub fn log(&self) {
        info!("[{}] wncodes: {}", self.pos, self.wncodes);
        info!("[{}] defkeys: {}", self.pos, self.defkeys);
        info!("[{}] alignment table size: {}", self.pos, self.table_size);
        info!("[{}] defkeys aligned: {}", self.pos, self.aligned_defkeys);
        info!(
            "[{}] unique defkeys aligned: {}",
            self.pos, self.unique_aligned_defkeys
        );
    }
}

type LemmaIndex<'a> = HashMap<&'a LemmaEntry, Vec<&'a DefKey>>;

fn invert<'a>(lists: &'a LemmaLists, defkeys: &HashSet<&'a DefKey>) -> LemmaIndex<'a> {
    let mut index = LemmaIndex::default();
    for (defkey, lemmas) in lists {
        if !defkeys.contains(defkey) {
            continue;
        }
        for lemma in lemmas {
            index.entry(lemma).or_default().push(defkey);
        }
    }
    index
}

fn lemmas<'a>(lists: &'a LemmaLists, defkey: &DefKey) -> &'a [LemmaEntry] {
    lists.get(defkey).map_or(&[][..], Vec::as_slice)
}

/// Aligns one part of speech. A synset's part of speech is that of its first
/// lemma.
pub struct Aligner<'a> {
    lang: &'a str,
    synsets: &'a SynsetGroups,
    groups: &'a DefGroups,
}

impl<'a> Aligner<'a> {
    pub fn new(lang: &'a str, synsets: &'a SynsetGroups, groups: &'a DefGroups) -> Self {
        Self {
            lang,
            synsets,
            groups,
        }
    }

    /// # Errors
    ///
    /// Only fails if the progress bar cannot be set up.
    pub fn align(&self, pos: ShortPos) -> Result<(AlignmentTable, AlignSummary)> {
        let wncodes: Vec<&String> = self
            .synsets
            .iter()
            .filter(|(_, lemmas)| lemmas.first().map(|l| l.pos) == Some(pos))
            .map(|(wncode, _)| wncode)
            .sorted()
            .collect();
        let defkeys: HashSet<&DefKey> = self
            .groups
            .definitions
            .iter()
            .filter(|(_, def)| def.pos == pos)
            .map(|(defkey, _)| defkey)
            .collect();
        let synonym_index = invert(&self.groups.synonyms, &defkeys);
        let translation_index = invert(&self.groups.translations, &defkeys);

        let pb = progress_bar(wncodes.len(), &format!("Aligning {pos} synsets"))?;
        let mut table = AlignmentTable::new();
        for wncode in &wncodes {
            pb.inc(1);
            let candidates =
                self.align_synset(&self.synsets[*wncode], &synonym_index, &translation_index);
            if !candidates.is_empty() {
                table.insert((*wncode).clone(), candidates);
            }
        }
        pb.finish();

        let aligned = table.values().flatten().map(|c| &c.defkey);
        let summary = AlignSummary {
            pos,
            wncodes: wncodes.len(),
            defkeys: defkeys.len(),
            table_size: table.len(),
            aligned_defkeys: aligned.clone().count(),
            unique_aligned_defkeys: aligned.unique().count(),
        };
        Ok((table, summary))
    }

    fn align_synset(
        &self,
        synset: &[LemmaEntry],
        synonym_index: &LemmaIndex,
        translation_index: &LemmaIndex,
    ) -> Vec<AlignmentCandidate> {
        let (src, others): (HashSet<&LemmaEntry>, HashSet<&LemmaEntry>) =
            synset.iter().partition(|l| l.lang == self.lang);
        let n_src = synset.iter().filter(|l| l.lang == self.lang).count();
        let n_others = synset.len() - n_src;
        // only defkeys sharing at least one lemma can have a non-zero match
        let defkeys: BTreeSet<&DefKey> = src
            .iter()
            .filter_map(|l| synonym_index.get(l))
            .chain(others.iter().filter_map(|l| translation_index.get(l)))
            .flatten()
            .copied()
            .collect();

        let mut candidates = vec![];
        for defkey in defkeys {
            let wk_src = lemmas(&self.groups.synonyms, defkey);
            let wk_target = lemmas(&self.groups.translations, defkey);
            let stats = MatchStats {
                src_match: wk_src.iter().filter(|l| src.contains(l)).count(),
                target_match: wk_target.iter().filter(|l| others.contains(l)).count(),
                src_max: n_src.min(wk_src.len()),
                target_max: n_others.min(wk_target.len()),
            };
            if !stats.any() {
                continue;
            }
            let mut level = stats.candidacy();
            if level == Candidacy::Plausible && self.headword_attested(defkey, synset) {
                level = Candidacy::Confirmed;
            }
            if level > Candidacy::None {
                candidates.push(AlignmentCandidate::new(defkey.clone(), stats, level));
            }
        }
        rank(&mut candidates);
        candidates
    }

    // the probe carries the defkey's own part of speech, even when it is `?`
    fn headword_attested(&self, defkey: &DefKey, synset: &[LemmaEntry]) -> bool {
        let Some(def) = self.groups.definitions.get(defkey) else {
            return false;
        };
        let probe = LemmaEntry::new(&normalize_lemma(&def.word), self.lang, def.pos);
        synset.contains(&probe)
    }
}

/// Sorts by descending (level, score, source matches), then drops plausible
/// candidates if any are confirmed.
fn rank(candidates: &mut Vec<AlignmentCandidate>) {
    candidates.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| b.src_match.cmp(&a.src_match))
    });
    if candidates.first().map(|c| c.level) == Some(Candidacy::Confirmed) {
        candidates.retain(|c| c.level == Candidacy::Confirmed);
    }
}

/// Merges per part of speech tables into one.
pub fn combine<I: IntoIterator<Item = AlignmentTable>>(tables: I) -> AlignmentTable {
    tables.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defgroups::DefSummary;
    use smallvec::smallvec;

    fn entry(lemma: &str, lang: &str) -> LemmaEntry {
        LemmaEntry::new(lemma, lang, ShortPos::Noun)
    }

    /// Adds a noun defkey with the given headword, source lemmas and
    /// translations.
    fn add_group(
        groups: &mut DefGroups,
        headword: &str,
        synonyms: &[&str],
        translations: &[(&str, &str)],
    ) -> DefKey {
        let defkey = DefKey::new("eng", headword, ShortPos::Noun, "");
        groups.definitions.insert(
            defkey.clone(),
            DefSummary {
                source_lang: "eng".into(),
                word: headword.into(),
                pos: ShortPos::Noun,
                long_pos: None,
                gloss: None,
                lines: smallvec![1],
            },
        );
        groups.synonyms.insert(
            defkey.clone(),
            synonyms.iter().map(|s| entry(s, "eng")).collect(),
        );
        if !translations.is_empty() {
            groups.translations.insert(
                defkey.clone(),
                translations.iter().map(|(l, lang)| entry(l, lang)).collect(),
            );
        }
        defkey
    }

    fn synsets(entries: &[(&str, Vec<LemmaEntry>)]) -> SynsetGroups {
        entries
            .iter()
            .map(|(wncode, lemmas)| (wncode.to_string(), lemmas.clone()))
            .collect()
    }

    #[test]
    fn source_overlap_alone_is_not_a_candidate() {
        let mut groups = DefGroups::default();
        add_group(&mut groups, "mouse", &["mouse"], &[]);
        let synsets = synsets(&[("n00015388", vec![entry("mouse", "eng")])]);
        let (table, summary) = Aligner::new("eng", &synsets, &groups)
            .align(ShortPos::Noun)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!((1, 1, 0), (summary.wncodes, summary.defkeys, summary.table_size));

        let stats = MatchStats {
            src_match: 1,
            target_match: 0,
            src_max: 1,
            target_max: 0,
        };
        assert_eq!(1.0, stats.src_ratio());
        assert_eq!(Candidacy::None, stats.candidacy());
    }

    #[test]
    fn confirmed_candidates_displace_plausible_ones() {
        let mut groups = DefGroups::default();
        let mouse = add_group(
            &mut groups,
            "mouse",
            &["mouse"],
            &[("souris", "fra"), ("topo", "ita")],
        );
        add_group(&mut groups, "rat", &["rat"], &[("souris", "fra")]);
        let synsets = synsets(&[(
            "02330245-n",
            vec![entry("mouse", "eng"), entry("souris", "fra"), entry("topo", "ita")],
        )]);
        let (table, summary) = Aligner::new("eng", &synsets, &groups)
            .align(ShortPos::Noun)
            .unwrap();
        let candidates = &table["02330245-n"];
        assert_eq!(1, candidates.len());
        let best = &candidates[0];
        assert_eq!(mouse, best.defkey);
        assert_eq!(Candidacy::Confirmed, best.level);
        assert_eq!(
            (1, 2, 1, 2),
            (best.src_match, best.target_match, best.src_max, best.target_max)
        );
        assert!((best.score - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(1, summary.unique_aligned_defkeys);
    }

    #[test]
    fn plausible_candidates_are_ranked_by_score() {
        let mut groups = DefGroups::default();
        let one = add_group(&mut groups, "vole", &["vole"], &[("souris", "fra")]);
        let two = add_group(
            &mut groups,
            "rat",
            &["rat"],
            &[("souris", "fra"), ("topo", "ita")],
        );
        let synsets = synsets(&[(
            "02330245-n",
            vec![entry("mouse", "eng"), entry("souris", "fra"), entry("topo", "ita")],
        )]);
        let (table, summary) = Aligner::new("eng", &synsets, &groups)
            .align(ShortPos::Noun)
            .unwrap();
        let ranked: Vec<&DefKey> = table["02330245-n"].iter().map(|c| &c.defkey).collect();
        assert_eq!(vec![&two, &one], ranked);
        assert!(table["02330245-n"]
            .iter()
            .all(|c| c.level == Candidacy::Plausible));
        assert_eq!((2, 2), (summary.aligned_defkeys, summary.unique_aligned_defkeys));
    }

    #[test]
    fn other_parts_of_speech_are_left_out() {
        let mut groups = DefGroups::default();
        add_group(&mut groups, "mouse", &["mouse"], &[("souris", "fra")]);
        let verb = LemmaEntry::new("souris", "fra", ShortPos::Verb);
        let synsets = synsets(&[("01234567-v", vec![verb])]);
        let aligner = Aligner::new("eng", &synsets, &groups);
        let (nouns, summary) = aligner.align(ShortPos::Noun).unwrap();
        assert!(nouns.is_empty());
        assert_eq!(0, summary.wncodes);
        let (verbs, summary) = aligner.align(ShortPos::Verb).unwrap();
        assert!(verbs.is_empty());
        assert_eq!(0, summary.defkeys);
    }

    #[test]
    fn threshold_rules() {
        let stats = |src_match, src_max, target_match, target_max| MatchStats {
            src_match,
            target_match,
            src_max,
            target_max,
        };
        assert_eq!(Candidacy::Plausible, stats(0, 0, 7, 10).candidacy());
        assert_eq!(Candidacy::None, stats(0, 0, 6, 10).candidacy());
        assert_eq!(Candidacy::Plausible, stats(1, 2, 5, 10).candidacy());
        assert_eq!(Candidacy::None, stats(1, 3, 5, 10).candidacy());
        // 0.45 is enough only with more than five target matches
        assert_eq!(Candidacy::Plausible, stats(1, 1, 9, 20).candidacy());
        assert_eq!(Candidacy::None, stats(1, 1, 5, 11).candidacy());
        assert_eq!(0.0, stats(1, 1, 0, 0).score());
        assert_eq!(3.0, stats(0, 0, 3, 1).score());
    }

    #[test]
    fn more_target_matches_never_lower_candidacy_or_score() {
        for src_max in 0..4 {
            for src_match in 0..=src_max {
                for target_max in 0..12 {
                    let mut previous = (Candidacy::None, 0.0);
                    for target_match in 0..=target_max {
                        let stats = MatchStats {
                            src_match,
                            target_match,
                            src_max,
                            target_max,
                        };
                        let current = (stats.candidacy(), stats.score());
                        assert!(current.0 >= previous.0, "{stats:?}");
                        assert!(current.1 >= previous.1, "{stats:?}");
                        previous = current;
                    }
                }
            }
        }
    }

    #[test]
    fn combine_merges_tables() {
        let mut n = AlignmentTable::new();
        n.insert("a-n".into(), vec![]);
        let mut v = AlignmentTable::new();
        v.insert("b-v".into(), vec![]);
        let all = combine([n, v]);
        assert_eq!(vec!["a-n", "b-v"], all.keys().collect::<Vec<_>>());
    }
}
