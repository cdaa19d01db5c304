//! End-to-end fuzzy searches over the users fixture

mod common;

use common::{names, users};
use pretty_assertions::assert_eq;
use quest_core::{FuzzyConfig, FuzzyQuery, SearchTerm};

fn weighted(field: &str, term: &str, weight: f64) -> SearchTerm {
    SearchTerm::new(field, term).with_weight(weight).unwrap()
}

fn floored(field: &str, term: &str, floor: f64) -> SearchTerm {
    SearchTerm::new(field, term)
        .with_minimum_relevance(floor)
        .unwrap()
}

#[test]
fn test_single_result() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("users.name", "jad")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["Jane Doe"]);
    assert_eq!(rows[0].relevance(), Some(17.0));
}

#[test]
fn test_ties_keep_insertion_order() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("name", "jd")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["John Doe", "Jane Doe"]);
    assert_eq!(rows[0].relevance(), Some(53.0));
    assert_eq!(rows[1].relevance(), Some(53.0));
}

#[test]
fn test_paginate() {
    let store = users();
    let query = FuzzyQuery::table("users").where_fuzzy("name", "jd");

    let first = query.clone().paginate(1, 1).unwrap().get(&store).unwrap();
    assert_eq!(names(&first), vec!["John Doe"]);

    let second = query.clone().paginate(1, 2).unwrap().get(&store).unwrap();
    assert_eq!(names(&second), vec!["Jane Doe"]);

    let third = query.paginate(1, 3).unwrap().get(&store).unwrap();
    assert!(third.is_empty());
}

#[test]
fn test_multiple_fields_are_anded() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("name", "jd")
        .where_fuzzy("country", "uk")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["Jane Doe"]);
    // 53 for the name, acronym 42 + consecutive 6 for the country
    assert_eq!(rows[0].relevance(), Some(101.0));
    assert_eq!(rows[0].number("fuzzy_relevance_country"), Some(48.0));
}

#[test]
fn test_order_by_one_field() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("name", "jd")
        .where_fuzzy("country", "un")
        .order_by_fuzzy("country")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["John Doe", "Jane Doe"]);
    assert_eq!(rows[0].number("fuzzy_relevance_country"), Some(130.0));
    assert_eq!(rows[1].number("fuzzy_relevance_country"), Some(129.0));
}

#[test]
fn test_order_by_multiple_fields() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("name", "jd")
        .where_fuzzy("country", "un")
        .order_by_fuzzy(["name", "country"])
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["John Doe", "Jane Doe"]);
}

#[test]
fn test_or_group() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy("name", "jndoe")
                .or_where_fuzzy("nickname", "jndoe")
        })
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["John Doe", "Jane Doe"]);
    assert_eq!(rows[0].relevance(), Some(292.0));
}

#[test]
fn test_or_group_with_field_order() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy("name", "jad")
                .or_where_fuzzy("nickname", "jndoe")
        })
        .order_by_fuzzy("name")
        .get(&users())
        .unwrap();

    assert_eq!(rows.first().and_then(|r| r.text("name")), Some("Jane Doe"));
}

#[test]
fn test_weighted_or_group() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy_term(weighted("name", "ed", 30.0))
                .or_where_fuzzy_term(weighted("country", "Italy", 10.0))
        })
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["William Doe", "Fred Doe", "Jane Doe"]);
    let scores: Vec<f64> = rows.iter().filter_map(|r| r.relevance()).collect();
    assert_eq!(scores, vec![2630.0, 1470.0, 330.0]);
}

#[test]
fn test_or_group_with_term_floors() {
    // Jane Doe scores 11 on `ed`, under the floor of 30
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy_term(floored("name", "ed", 30.0))
                .or_where_fuzzy_term(floored("country", "Italy", 10.0))
        })
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["William Doe", "Fred Doe"]);
    let scores: Vec<f64> = rows.iter().filter_map(|r| r.relevance()).collect();
    assert_eq!(scores, vec![263.0, 49.0]);
}

#[test]
fn test_term_floor_applies_to_weighted_score() {
    let name = weighted("name", "ed", 30.0)
        .with_minimum_relevance(400.0)
        .unwrap();
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy_term(name)
                .or_where_fuzzy_term(weighted("country", "Italy", 10.0))
        })
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["William Doe", "Fred Doe"]);
    assert_eq!(rows[1].number("fuzzy_relevance_name"), Some(1470.0));
}

#[test]
fn test_custom_relevance_alias() {
    let config = FuzzyConfig {
        relevance_alias: "score".to_string(),
        ..FuzzyConfig::default()
    };
    let rows = FuzzyQuery::with_config("users", config)
        .where_fuzzy("name", "jad")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["Jane Doe"]);
    assert_eq!(rows[0].relevance(), None);
    assert_eq!(rows[0].relevance_as("score"), Some(17.0));
}

#[test]
fn test_and_group_with_field_order() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.where_fuzzy("name", "jad")
                .where_fuzzy("nickname", "jndoe")
        })
        .order_by_fuzzy("name")
        .get(&users())
        .unwrap();

    assert_eq!(names(&rows), vec!["Jane Doe"]);
}

#[test]
fn test_minimum_relevance() {
    let store = users();
    let query = FuzzyQuery::table("users").where_fuzzy("name", "joh Do");

    let kept = query
        .clone()
        .with_minimum_relevance(65.0)
        .unwrap()
        .get(&store)
        .unwrap();
    assert_eq!(names(&kept), vec!["John Doe"]);
    assert_eq!(kept[0].relevance(), Some(69.0));

    let none = query.with_minimum_relevance(70.0).unwrap().get(&store).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_excluding_every_matcher_matches_nothing() {
    let term = SearchTerm::new("name", "jd")
        .without_matchers(quest_core::MatcherKind::ALL.iter().map(|k| k.name()));
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_term(term)
        .get(&users())
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_excluded_term_does_not_block_or() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_group(|q| {
            q.or_where_fuzzy_term(
                SearchTerm::new("name", "jad").without_matcher("consecutive_characters"),
            )
            .or_where_fuzzy("country", "france")
        })
        .get(&users())
        .unwrap();
    assert_eq!(names(&rows), vec!["Fred Doe"]);
}

#[test]
fn test_blank_term_matches_nothing() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy("name", "   ")
        .get(&users())
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_plain_filter_and_order() {
    let rows = FuzzyQuery::table("users")
        .where_fuzzy_term(SearchTerm::new("name", "doe").with_ordering(false))
        .where_eq("nickname", "jndoe")
        .order_by("name", quest_core::Direction::Asc)
        .get(&users())
        .unwrap();
    assert_eq!(names(&rows), vec!["Jane Doe", "John Doe"]);
}

#[test]
fn test_first() {
    let row = FuzzyQuery::table("users")
        .where_fuzzy("name", "william")
        .first(&users())
        .unwrap();
    assert_eq!(
        row.as_ref().and_then(|r| r.text("name")),
        Some("William Doe")
    );
}

#[test]
fn test_unknown_column_is_an_error() {
    let err = FuzzyQuery::table("users")
        .where_fuzzy("email", "jd")
        .get(&users())
        .unwrap_err();
    assert!(matches!(
        err,
        quest_core::FuzzyError::Query(quest_core::QueryError::UnknownColumn(_))
    ));
}
