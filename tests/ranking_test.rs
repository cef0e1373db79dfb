mod helpers;

use helpers::{catalog_csv, StubProvider};
use ndarray::Array2;
use shortlist::catalog::Catalog;
use shortlist::embedding::EmbeddingProvider;
use shortlist::index::{self, EmbeddingIndex};
use shortlist::rank::Ranker;

/// Build a ranker over an in-memory catalog with a freshly built index.
fn ranker_for(rows: &[(&str, &str)]) -> Ranker {
    let catalog = Catalog::from_csv_bytes(catalog_csv(rows).as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let index = EmbeddingIndex::new(dir.path().join("embeddings.bin"));
    let matrix = index::build(&catalog, &StubProvider, &index).unwrap();
    Ranker::new(catalog, matrix, Box::new(StubProvider)).unwrap()
}

#[test]
fn java_query_ranks_coding_tests_above_leadership() {
    let ranker = ranker_for(&[
        ("a", "java coding test"),
        ("b", "leadership assessment"),
        ("c", "java debugging test"),
    ]);

    let results = ranker.rank("java developer test", 3).unwrap();
    assert_eq!(results.len(), 3);

    let position = |id: &str| {
        results
            .iter()
            .position(|(item, _)| item.assessment_id == id)
            .unwrap()
    };
    let score = |id: &str| results[position(id)].1;

    assert!(position("a") < position("b"), "a must rank above b");
    assert!(position("c") < position("b"), "c must rank above b");
    assert!(score("b") < score("a"), "b's score must be strictly lower than a's");
    assert!(score("b") < score("c"), "b's score must be strictly lower than c's");
}

#[test]
fn returns_exactly_k_results_sorted_descending() {
    let ranker = ranker_for(&[
        ("a", "java coding test"),
        ("b", "numerical reasoning test"),
        ("c", "verbal reasoning test"),
        ("d", "personality assessment"),
        ("e", "sales skills test"),
        ("f", "graduate reasoning assessment"),
    ]);

    let results = ranker.rank("numerical reasoning", 4).unwrap();
    assert_eq!(results.len(), 4);

    for pair in results.windows(2) {
        assert!(
            pair[0].1 >= pair[1].1,
            "scores must be non-increasing: {} then {}",
            pair[0].1,
            pair[1].1
        );
    }
    for (_, score) in &results {
        assert!(
            (-1.0 - 1e-6..=1.0 + 1e-6).contains(score),
            "score out of range: {score}"
        );
    }
}

#[test]
fn top_k_larger_than_catalog_returns_all() {
    let ranker = ranker_for(&[("a", "java test"), ("b", "python test")]);
    let results = ranker.rank("java", 100).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn ranking_is_idempotent() {
    let ranker = ranker_for(&[
        ("a", "java coding test"),
        ("b", "leadership assessment"),
        ("c", "numerical reasoning test"),
    ]);

    let first = ranker.rank("java developer test", 3).unwrap();
    let second = ranker.rank("java developer test", 3).unwrap();

    assert_eq!(first.len(), second.len());
    for (x, y) in first.iter().zip(second.iter()) {
        assert_eq!(x.0.assessment_id, y.0.assessment_id);
        assert_eq!(x.1.to_bits(), y.1.to_bits());
    }
}

#[test]
fn identical_items_keep_catalog_order() {
    let ranker = ranker_for(&[
        ("first", "java coding test"),
        ("second", "java coding test"),
    ]);

    let results = ranker.rank("java", 2).unwrap();
    assert_eq!(results[0].1, results[1].1, "identical vectors score identically");
    assert_eq!(results[0].0.assessment_id, "first");
    assert_eq!(results[1].0.assessment_id, "second");
}

#[test]
fn empty_query_still_produces_results() {
    let ranker = ranker_for(&[("a", "java test"), ("b", "python test")]);
    let results = ranker.rank("", 2).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn empty_catalog_returns_empty() {
    let catalog = Catalog::from_csv_bytes(b"assessment_id,name,url\n").unwrap();
    let matrix = Array2::zeros((0, StubProvider.dimensions()));
    let ranker = Ranker::new(catalog, matrix, Box::new(StubProvider)).unwrap();
    assert!(ranker.rank("anything", 10).unwrap().is_empty());
}

#[test]
fn search_records_carry_catalog_fields_and_ranks() {
    let ranker = ranker_for(&[
        ("a", "java coding test"),
        ("b", "leadership assessment"),
    ]);

    let records = ranker.search("java developer test", 10).unwrap();
    assert_eq!(records.len(), 2);

    let ranks: Vec<usize> = records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2]);

    let top = &records[0];
    assert_eq!(top.assessment_id, "a");
    assert_eq!(top.name, "a assessment");
    assert_eq!(top.url, "https://catalog.test/a");
    assert_eq!(top.duration_minutes, Some(30.0));
    assert_eq!(top.remote_testing, 1);
    assert_eq!(top.adaptive_irt, 0);
    assert!(top.score > records[1].score);
}
