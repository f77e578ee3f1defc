//! Debug-level dumps of a few entries of each dictionary.

use crate::{defgroups::DefGroups, records::Records, wordnet::SynsetGroups};

use std::fmt::{Debug, Display};

use itertools::Itertools;
use tracing::{debug, enabled, Level};

/// The `n` smallest keys with their values.
fn first_sorted<'a, K, V, I>(entries: I, n: usize) -> Vec<(&'a K, &'a V)>
where
    K: Ord + 'a,
    V: 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .take(n)
        .collect()
}

fn sample<'a, K, V, I>(title: &str, len: usize, entries: I, n: usize)
where
    K: Ord + Display + 'a,
    V: Debug + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    if !enabled!(Level::DEBUG) {
        return;
    }
    debug!("{title}: {len} records, first {}", n.min(len));
    for (key, value) in first_sorted(entries, n) {
        debug!("{key}: {value:?}");
    }
}

pub fn log_records(records: &Records, n: usize) {
    sample(
        "translations",
        records.translations.len(),
        records.translations.iter(),
        n,
    );
    sample(
        "lexical entries",
        records.lex_entries.len(),
        records.lex_entries.iter(),
        n,
    );
    sample("lexical senses", records.senses.len(), records.senses.iter(), n);
    sample(
        "synonym relations",
        records.synonyms.len(),
        records.synonyms.iter(),
        n,
    );
}

pub fn log_def_groups(groups: &DefGroups, n: usize) {
    sample(
        "defkey translations",
        groups.translations.len(),
        &groups.translations,
        n,
    );
    sample("defkey synonyms", groups.synonyms.len(), &groups.synonyms, n);
    sample(
        "defkey definitions",
        groups.definitions.len(),
        &groups.definitions,
        n,
    );
}

pub fn log_synsets(synsets: &SynsetGroups, n: usize) {
    sample("wordnet lemmas", synsets.len(), synsets, n);
}
