use std::{io, path::PathBuf, string::FromUtf8Error};

use thiserror::Error;

/// Why a property value did not yield the field its extractor looks for.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MissKind {
    #[error("no double-quoted value")]
    Quoted,
    #[error("no prefixed token")]
    Prefixed,
    #[error("value is a URL reference")]
    Url,
    #[error("token does not split into headword, part of speech and id")]
    Shape,
    #[error("no lemon:value literal")]
    Definition,
    #[error("key does not carry a lemma")]
    Lemma,
}

/// An expected sub-pattern was absent from a property value. Never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} for {property} at line {line}+: {value}")]
pub struct PatternMiss {
    pub kind: MissKind,
    pub property: &'static str,
    pub line: usize,
    pub value: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} key {key} is already stored (line {line}+), discarding the newer record")]
    DuplicateKey {
        store: &'static str,
        key: String,
        line: usize,
    },
    #[error("{store} record at line {line}+ has an empty key")]
    EmptyKey { store: &'static str, line: usize },
}

/// A synonym or translation whose owning lexical entry is not in the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{record} {key} refers to unknown lexical entry {entry:?}")]
pub struct UnresolvedReference {
    pub record: &'static str,
    pub key: String,
    pub entry: Option<String>,
}

/// Failures that end the read pass over the dump.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error reading the dump")]
    Io(#[from] io::Error),
    #[error("line {line} is not valid UTF-8")]
    Decode {
        line: usize,
        #[source]
        source: FromUtf8Error,
    },
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("cannot open WordNet database {}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("WordNet query failed")]
    Query(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on cache file")]
    Io(#[from] io::Error),
    #[error("malformed cache file")]
    Json(#[from] serde_json::Error),
    #[error("{} has format version {found}, expected {expected}", path.display())]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("{} holds {found} data, expected {expected}", path.display())]
    Kind {
        path: PathBuf,
        found: &'static str,
        expected: &'static str,
    },
}
