use std::collections::HashMap;

use criteria_eval as ce;
use criteria_eval::{Builder, Criteria, Error, Truth, Value};

fn record(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect()
}

#[test]
fn empty_build_is_an_error() {
    match Builder::new().done() {
        Err(Error::Construction(_)) => {}
        other => panic!("expected a construction error, got {other:?}"),
    }
}

#[test]
fn stack_grows_and_collapses() {
    let b = Builder::new();
    assert_eq!(b.size(), 0);

    let b = b.eq("Rating", "AA").eq("Country", "US");
    assert_eq!(b.size(), 2);

    let b = b.and();
    assert_eq!(b.size(), 1);

    let c = b.done().unwrap();
    assert!(matches!(c, Criteria::And(_, _)));

    let target = record(&[("Rating", "AA"), ("Country", "US")]);
    let outcome = ce::evaluate(&c, &target, false);
    assert_eq!(outcome.truth, Truth::True);
    assert_eq!(outcome.cause, None);
}

#[test]
fn two_nodes_left_on_the_stack_is_an_error() {
    let result = Builder::new().eq("Rating", "AA").eq("Country", "US").done();
    match result {
        Err(Error::Construction(msg)) => assert!(msg.contains('2'), "{msg}"),
        other => panic!("expected a construction error, got {other:?}"),
    }
}

#[test]
fn connectives_on_a_short_stack_fail_as_values() {
    assert!(Builder::new().eq("Rating", "AA").and().done().is_err());
    assert!(Builder::new().eq("Rating", "AA").or().done().is_err());
    assert!(Builder::new().not().done().is_err());
    assert!(Builder::new().eq("Rating", "AA").all().done().is_err());
    assert!(Builder::new().any().done().is_err());
}

#[test]
fn negation_via_the_builder() {
    let c = Builder::new().eq("Rating", "AA").not().done().unwrap();
    let outcome = ce::evaluate(&c, &record(&[("Rating", "B")]), false);
    assert_eq!(outcome.truth, Truth::True);
    assert_eq!(outcome.cause, None);
}

#[test]
fn all_collapses_the_whole_stack() {
    let c = Builder::new()
        .literal("active")
        .gte("score", 90)
        .not_eq("valid", true)
        .all()
        .done()
        .unwrap();

    assert!(matches!(&c, Criteria::All(many) if many.len() == 3));
    assert_eq!(ce::serialize(&c), "active and score >= 90 and valid != True");
}

#[test]
fn any_collapses_the_whole_stack() {
    let c = Builder::new()
        .literal("active")
        .gte("score", 90)
        .not_eq("valid", true)
        .any()
        .done()
        .unwrap();

    assert!(matches!(&c, Criteria::Any(many) if many.len() == 3));
    assert_eq!(ce::serialize(&c), "active or score >= 90 or valid != True");
}

#[test]
fn membership_via_the_builder() {
    let c = Builder::new()
        .is_in("make", ["Ford", "Chrysler", "Acura"])
        .done()
        .unwrap();
    let outcome = ce::evaluate(&c, &record(&[("make", "Acura")]), false);
    assert_eq!(outcome.truth, Truth::True);

    let c = Builder::new()
        .not_in("make", ["Ford", "Chrysler", "Acura"])
        .done()
        .unwrap();
    let outcome = ce::evaluate(&c, &record(&[("make", "Acura")]), false);
    assert_eq!(outcome.truth, Truth::False);
}

#[test]
fn the_first_failure_wins_and_later_calls_are_inert() {
    // `and` on an empty stack latches; the later valid pushes cannot hide it
    let result = Builder::new()
        .and()
        .eq("Rating", "AA")
        .done();
    match result {
        Err(Error::Construction(msg)) => assert!(msg.contains("and"), "{msg}"),
        other => panic!("expected a construction error, got {other:?}"),
    }
}

#[test]
fn built_trees_match_their_parsed_twins() {
    let built = Builder::new()
        .between(150_000, "price", 450_000)
        .not_eq("price", 400_000)
        .and()
        .done()
        .unwrap();
    let parsed = ce::parse("150000 <= price < 450000 and price != 400000").unwrap();
    assert_eq!(built, parsed);
}
