use criteria_eval as ce;
use criteria_eval::{CmpOp, Criteria, Value};
use proptest::prelude::*;

/// Canonical texts: serialize(parse(text)) must give the text back.
#[test]
fn canonical_texts_round_trip_unchanged() {
    let texts = [
        "active",
        "True",
        "42",
        "18.8",
        "make == 'Acura'",
        "active == True",
        "score >= 90",
        "234 < score <= 456",
        "100 <= price < 200",
        "15 <= maxprice < 20.1",
        "make in ('Acura',)",
        "make in ('Ford','Chrysler','Eagle','Honda','Acura','Mazda',)",
        "score in (90,91,92,)",
        "1 in (4,3,2,1,0,)",
        "True in (False,'False',0,1,)",
        "make not in ('Ford',)",
        "not (active)",
        "(active and score > 90)",
        "(active == True or score > 90)",
        "active and score >= 90 and valid != True",
        "active or score >= 90 or valid != True",
        "((active and score >= 90) or valid != True)",
        "(active and (score >= 90 and valid != True))",
        "not (44.1 < score <= 66.2)",
        "not (active == True)",
        "((a and b and c) and d)",
    ];
    for text in texts {
        let parsed = ce::parse(text).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(ce::serialize(&parsed), text, "not canonical: {text}");
    }
}

/// Accepted spellings that normalize to a canonical form, which is then a
/// fixed point under re-parse/re-serialize.
#[test]
fn accepted_texts_normalize_to_a_fixed_point() {
    let pairs = [
        ("not active", "not (active)"),
        ("not (active)", "not (active)"),
        ("not active == True", "not (active == True)"),
        ("active == True or score > 90", "(active == True or score > 90)"),
        (
            "active and (score >= 90 and valid != True)",
            "(active and (score >= 90 and valid != True))",
        ),
        (
            "(active or score >= 90) or valid != True",
            "((active or score >= 90) or valid != True)",
        ),
        (
            "active and score >= 90 or valid != True",
            "((active and score >= 90) or valid != True)",
        ),
        ("x in ('a')", "x in ('a',)"),
        ("x in 'a'", "x in ('a',)"),
        ("x  in  ( 'a' , 'b' )", "x in ('a','b',)"),
        ("(a and b and c) and d", "((a and b and c) and d)"),
        ("(((active)))", "active"),
        ("(5) > 3", "5 > 3"),
    ];
    for (input, canonical) in pairs {
        let parsed = ce::parse(input).unwrap_or_else(|e| panic!("{input}: {e}"));
        let serialized = ce::serialize(&parsed);
        assert_eq!(serialized, canonical, "for input: {input}");

        let reparsed = ce::parse(&serialized).unwrap();
        assert_eq!(ce::serialize(&reparsed), canonical, "not a fixed point: {input}");
    }
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}".prop_filter("grammar keywords cannot be identifiers", |s| {
        !matches!(s.as_str(), "and" | "or" | "not" | "in")
    })
}

/// Values legal in bare (unquoted) positions: keys and range bounds.
fn bare_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        ident().prop_map(Value::Str),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Int),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
    ]
}

/// Values legal in quoted positions: right-hand sides and candidates.
fn literal_value() -> impl Strategy<Value = Value> {
    prop_oneof![bare_value(), "[ -~]{0,8}".prop_map(Value::Str)]
}

fn cmp_op() -> impl Strategy<Value = CmpOp> {
    prop_oneof![
        Just(CmpOp::Eq),
        Just(CmpOp::Ne),
        Just(CmpOp::Lt),
        Just(CmpOp::Le),
        Just(CmpOp::Gt),
        Just(CmpOp::Ge),
    ]
}

fn leaf() -> impl Strategy<Value = Criteria> {
    prop_oneof![
        bare_value().prop_map(|key| Criteria::literal(key).unwrap()),
        (bare_value(), cmp_op(), literal_value())
            .prop_map(|(key, op, right)| Criteria::cmp(key, op, right).unwrap()),
        (bare_value(), cmp_op(), bare_value(), cmp_op(), bare_value()).prop_map(
            |(lower, lop, key, uop, upper)| {
                Criteria::between_ops(lower, lop, key, uop, upper).unwrap()
            }
        ),
        (
            bare_value(),
            prop::collection::vec(literal_value(), 0..4),
            any::<bool>()
        )
            .prop_map(|(key, candidates, negated)| if negated {
                Criteria::not_in(key, candidates).unwrap()
            } else {
                Criteria::is_in(key, candidates).unwrap()
            }),
    ]
}

fn criteria() -> impl Strategy<Value = Criteria> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Criteria::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Criteria::or(l, r)),
            prop::collection::vec(inner.clone(), 3..5)
                .prop_map(|many| Criteria::all(many).unwrap()),
            prop::collection::vec(inner.clone(), 3..5)
                .prop_map(|many| Criteria::any(many).unwrap()),
            inner.prop_map(Criteria::not),
        ]
    })
}

proptest! {
    /// The serializer emits only text the parser maps back to the same tree.
    #[test]
    fn serialize_then_parse_recovers_the_tree(c in criteria()) {
        let text = ce::serialize(&c);
        let reparsed = ce::parse(&text)
            .unwrap_or_else(|e| panic!("serialized text failed to parse: {text}: {e}"));
        prop_assert_eq!(&reparsed, &c, "text was: {}", text);
        prop_assert_eq!(ce::serialize(&reparsed), text);
    }

    /// Double negation serializes and re-parses cleanly too.
    #[test]
    fn double_negation_round_trips(c in leaf()) {
        let twice = Criteria::not(Criteria::not(c));
        let text = ce::serialize(&twice);
        let reparsed = ce::parse(&text).unwrap();
        prop_assert_eq!(&reparsed, &twice);
        prop_assert_eq!(ce::serialize(&reparsed), text);
    }
}
