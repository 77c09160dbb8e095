use std::collections::BTreeSet;

use review_core::{build_fuzzy_pattern, generate_candidates, search_queries, SearchQuery};

fn as_set(candidates: Vec<String>) -> BTreeSet<String> {
    candidates.into_iter().collect()
}

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn fifty_expands_over_zero_and_five() {
    assert_eq!(
        as_set(generate_candidates("50")),
        set_of(&["50", "5O", "S0", "SO"])
    );
}

#[test]
fn i5_expands_over_three_way_and_two_way_classes() {
    let candidates = generate_candidates("I5");
    assert_eq!(candidates.len(), 6);
    assert_eq!(
        as_set(candidates),
        set_of(&["I5", "15", "l5", "IS", "1S", "lS"])
    );
}

#[test]
fn candidates_have_no_duplicates() {
    let candidates = generate_candidates("B80");
    let unique = as_set(candidates.clone());
    assert_eq!(unique.len(), candidates.len());
    // 2 * 2 * 2 spellings.
    assert_eq!(candidates.len(), 8);
}

#[test]
fn fallback_pattern_matches_all_confusions_at_once() {
    let pattern = regex::Regex::new(&build_fuzzy_pattern("198")).unwrap();
    assert!(pattern.is_match("Areal: l9B m2"));
    assert!(pattern.is_match("I98"));
    assert!(!pattern.is_match("197"));
}

#[test]
fn queries_try_exact_first() {
    let queries = search_queries("198");
    assert_eq!(queries.first(), Some(&SearchQuery::Literal("198".to_string())));
    assert!(matches!(queries.last(), Some(SearchQuery::Pattern(_))));
}
