use dbnary_align::{
    align::Candidacy,
    cache::Cache,
    evaluate::evaluate,
    lang::SourceLang,
    normalize::{DefKey, ShortPos},
    read_records, run, Config,
};

use std::{fs, path::Path};

use rusqlite::Connection;

const DUMP: &str = r#"@prefix eng: <http://kaiko.getalp.org/dbnary/eng/> .
@prefix lexvo: <http://lexvo.org/id/iso639-3/> .

eng:mouse__Noun__1 a lemon:LexicalEntry ;
    dbnary:partOfSpeech "-noun-" ;
    lemon:sense eng:__ws_1_mouse__Noun__1 ;
    lexinfo:partOfSpeech lexinfo:noun .

eng:__ws_1_mouse__Noun__1
    a lemon:LexicalSense ;
    dbnary:senseNumber "1" ;
    lemon:definition [ lemon:value "A small rodent."@en ] .

eng:__tr_fra_1_mouse__Noun__1
    a dbnary:Translation ;
    dbnary:gloss "a small rodent" ;
    dbnary:isTranslationOf eng:mouse__Noun__1 ;
    dbnary:targetLanguage lexvo:fra ;
    dbnary:writtenForm "souris"@fr .

eng:__tr_ita_1_mouse__Noun__1
    a dbnary:Translation ;
    dbnary:gloss "a small rodent" ;
    dbnary:isTranslationOf eng:mouse__Noun__1 ;
    dbnary:targetLanguage lexvo:ita ;
    dbnary:writtenForm "topo"@it .

eng:__sr_1
    a rdf:Statement ;
    rdf:subject eng:mouse__Noun__1 ;
    rdf:predicate dbnary:synonym ;
    rdf:object eng:vole ;
    dbnary:gloss "a small rodent" .

<http://kaiko.getalp.org/dbnary/eng/>
    a owl:Ontology .
"#;

fn wordnet(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE word (wordid INTEGER, lang TEXT, lemma TEXT, pos TEXT);
         CREATE TABLE sense (synset TEXT, wordid INTEGER, lang TEXT, confidence INTEGER);
         CREATE TABLE synset_def (synset TEXT, lang TEXT, def TEXT);
         INSERT INTO word VALUES
             (1, 'eng', 'mouse', 'n'),
             (2, 'fra', 'souris', 'n'),
             (3, 'ita', 'topo', 'n'),
             (4, 'eng', 'scurry', 'v');
         INSERT INTO sense VALUES
             ('02330245-n', 1, 'eng', 1),
             ('02330245-n', 2, 'fra', 1),
             ('02330245-n', 3, 'ita', 1),
             ('01904293-v', 4, 'eng', 1);",
    )
    .unwrap();
}

fn config(dir: &Path, from_cache: bool) -> Config {
    Config {
        dump_path: dir.join("en_dbnary.ttl"),
        lang_codes_path: dir.join("language_codes.txt"),
        wordnet_path: dir.join("wn.db"),
        cache_dir: dir.join("cache"),
        line_limit: None,
        pos: ShortPos::ALIGNABLE.to_vec(),
        from_cache,
        sample: 10,
    }
}

#[test]
fn aligns_dump_with_wordnet() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("en_dbnary.ttl"), DUMP).unwrap();
    fs::write(dir.path().join("language_codes.txt"), "fr\tfra\nen\teng\n").unwrap();
    wordnet(&dir.path().join("wn.db"));

    let table = run(&config(dir.path(), false)).unwrap();
    assert_eq!(1, table.len());
    let candidates = &table["02330245-n"];
    assert_eq!(1, candidates.len());
    let c = &candidates[0];
    assert_eq!(
        DefKey::new("eng", "mouse", ShortPos::Noun, "a small rodent"),
        c.defkey
    );
    assert_eq!(Candidacy::Confirmed, c.level);
    assert_eq!((1, 2, 1, 2), (c.src_match, c.target_match, c.src_max, c.target_max));
    assert_eq!(2.0 / 2.0_f64.sqrt(), c.score);

    let cache = Cache::new(&dir.path().join("cache"));
    for name in ["n", "v", "a", "r", "all"] {
        assert!(dir
            .path()
            .join(format!("cache/align-{name}.json.gz"))
            .exists());
    }
    assert!(cache.load_alignments("v").unwrap().is_empty());
    let groups = cache.load_def_groups().unwrap();
    assert_eq!(1, groups.definitions.len());
    assert_eq!(2, groups.synonyms[&c.defkey].len());

    // a second run from the caches gives the same table
    fs::remove_file(dir.path().join("en_dbnary.ttl")).unwrap();
    assert_eq!(table, run(&config(dir.path(), true)).unwrap());

    let evaluation = evaluate(&cache.load_synsets().unwrap(), &groups, &table);
    let ita = &evaluation.langs["ita"];
    assert_eq!((1, 1, 1.0, 1.0), (ita.matched_vs_wordnet, ita.wordnet_total, ita.recall, ita.precision));
}

#[test]
fn undecodable_line_keeps_records_read_before_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut dump = DUMP.as_bytes().to_vec();
    dump.extend_from_slice(b"\neng:bad\n\xff\xfe\n\neng:after__Noun__1 a lemon:LexicalEntry .\n");
    let dump_path = dir.path().join("en_dbnary.ttl");
    fs::write(&dump_path, dump).unwrap();
    fs::write(dir.path().join("language_codes.txt"), "en\teng\n").unwrap();
    wordnet(&dir.path().join("wn.db"));

    let records = read_records(&dump_path, &SourceLang::default(), None).unwrap();
    assert_eq!(2, records.translations.len());
    assert!(records.lex_entries.get("eng:mouse__Noun__1").is_some());
    assert!(records.lex_entries.get("eng:after__Noun__1").is_none());

    let table = run(&config(dir.path(), false)).unwrap();
    assert_eq!(Candidacy::Confirmed, table["02330245-n"][0].level);
    assert!(dir.path().join("cache/wk-definitions.json.gz").exists());
    assert!(dir.path().join("cache/align-all.json.gz").exists());
}
