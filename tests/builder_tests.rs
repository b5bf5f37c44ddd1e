// tests/builder_tests.rs

use chrono::NaiveDate;
use cql2_lang::ast::{ComparisonOp, Expr, LogicalOp, SpatialOp, TemporalOp};
use cql2_lang::builder::FilterBuilder;
use cql2_lang::geometry::Geometry;
use cql2_lang::output::SerializeError;
use cql2_lang::transform::flatten_conjunction;
use cql2_lang::value::{Instant, Interval, Literal};
use cql2_lang::{parse_json, parse_text};
use serde_json::json;

fn cmp(op: ComparisonOp, name: &str, value: impl Into<Literal>) -> Expr {
    Expr::comparison(op, Expr::property(name), Expr::literal(value))
}

// ============================================================================
// Accumulation
// ============================================================================

#[test]
fn test_empty_builder() {
    let builder = FilterBuilder::new();
    assert!(builder.is_empty());
    assert_eq!(builder.as_expr(), None);
    assert_eq!(builder.to_text(), Err(SerializeError::Empty));
    assert_eq!(builder.to_json(), Err(SerializeError::Empty));
    assert_eq!(builder.build(), None);
}

#[test]
fn test_single_predicate_is_not_wrapped() {
    let expr = FilterBuilder::new().equal("type", "satellite").build().unwrap();
    assert_eq!(expr, cmp(ComparisonOp::Equal, "type", "satellite"));
}

#[test]
fn test_scenario_two_predicates_flatten() {
    let expr = FilterBuilder::new()
        .equal("type", "satellite")
        .less_than("cloud_cover", 20)
        .build()
        .unwrap();

    let predicates = flatten_conjunction(&expr).unwrap();
    assert_eq!(
        predicates,
        vec![
            &cmp(ComparisonOp::Equal, "type", "satellite"),
            &cmp(ComparisonOp::LessThan, "cloud_cover", 20),
        ]
    );
}

#[test]
fn test_successive_calls_extend_one_and() {
    let expr = FilterBuilder::new()
        .equal("a", 1)
        .not_equal("b", 2)
        .greater_than("c", 3)
        .greater_than_or_equal("d", 4)
        .less_than_or_equal("e", 5)
        .build()
        .unwrap();

    match expr {
        Expr::Logical {
            op: LogicalOp::And,
            children,
        } => {
            assert_eq!(children.len(), 5);
            assert!(children.iter().all(Expr::is_terminal_predicate));
        }
        other => panic!("Expected a flat AND, got {:?}", other),
    }
}

#[test]
fn test_matches_parsed_text() {
    let built = FilterBuilder::new()
        .equal("collection", "sentinel-2")
        .between("gsd", 10, 30)
        .like("title", "S2%")
        .in_list("platform", ["sentinel-2a", "sentinel-2b"])
        .is_null("deprecated")
        .is_not_null("datetime")
        .build()
        .unwrap();

    let parsed = parse_text(concat!(
        r#"collection = "sentinel-2" AND gsd BETWEEN 10 AND 30 AND title LIKE "S2%" AND "#,
        r#"platform IN ("sentinel-2a", "sentinel-2b") AND deprecated IS NULL AND "#,
        "datetime IS NOT NULL"
    ))
    .unwrap();

    assert_eq!(built, parsed);
}

#[test]
fn test_in_list_with_numbers() {
    let builder = FilterBuilder::new().in_list("orbit", vec![12, 40, 101]);
    assert_eq!(builder.to_text().unwrap(), "orbit IN (12, 40, 101)");
}

#[test]
fn test_spatial_and_temporal() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let builder = FilterBuilder::new()
        .intersects("geometry", Geometry::Point(vec![7.5, 49.0]))
        .spatial(
            SpatialOp::Within,
            "footprint",
            Geometry::Envelope(vec![-10.0, 40.0, 10.0, 50.0]),
        )
        .during("datetime", Interval::new(Some(Instant::Date(start)), None))
        .temporal(TemporalOp::After, "updated", start);

    assert_eq!(
        builder.to_text().unwrap(),
        concat!(
            "geometry S_INTERSECTS (POINT(7.5 49)) AND footprint S_WITHIN (BBOX(-10, 40, 10, 50)) AND ",
            r#"datetime T_DURING ["2021-01-01" / ".."] AND updated T_AFTER DATE("2021-01-01")"#
        )
    );
}

#[test]
fn test_predicate_accepts_any_expression() {
    let custom = Expr::function("in_region", vec![Expr::property("geometry")]);
    let expr = FilterBuilder::new()
        .equal("a", 1)
        .predicate(custom.clone())
        .build()
        .unwrap();
    assert_eq!(expr, Expr::and(cmp(ComparisonOp::Equal, "a", 1), custom));
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_or_wraps_accumulated() {
    let builder = FilterBuilder::new()
        .equal("a", 1)
        .equal("b", 2)
        .or(FilterBuilder::new().equal("c", 3));
    assert_eq!(builder.to_text().unwrap(), "a = 1 AND b = 2 OR c = 3");

    // Further predicates AND onto the whole disjunction
    let builder = builder.equal("d", 4);
    assert_eq!(builder.to_text().unwrap(), "(a = 1 AND b = 2 OR c = 3) AND d = 4");
}

#[test]
fn test_not_wraps_accumulated() {
    let builder = FilterBuilder::new().equal("a", 1).equal("b", 2).not();
    assert_eq!(builder.to_text().unwrap(), "NOT (a = 1 AND b = 2)");

    let builder = FilterBuilder::new().equal("a", 1).not();
    assert_eq!(builder.to_text().unwrap(), "NOT a = 1");
}

#[test]
fn test_and_splices_other_builder() {
    let left = FilterBuilder::new().equal("a", 1);
    let right = FilterBuilder::new().equal("b", 2).equal("c", 3);
    let expr = left.and(right).build().unwrap();
    assert_eq!(expr, parse_text("a = 1 AND b = 2 AND c = 3").unwrap());
}

#[test]
fn test_combinators_with_empty_sides() {
    let one = || FilterBuilder::new().equal("a", 1);

    assert_eq!(one().and(FilterBuilder::new()).build(), one().build());
    assert_eq!(FilterBuilder::new().and(one()).build(), one().build());
    assert_eq!(one().or(FilterBuilder::new()).build(), one().build());
    assert_eq!(FilterBuilder::new().or(one()).build(), one().build());
    assert!(FilterBuilder::new().not().is_empty());
}

#[test]
fn test_nested_groups() {
    let cloudy = FilterBuilder::new()
        .less_than("eo:cloud_cover", 10)
        .or(FilterBuilder::new().is_null("eo:cloud_cover"));
    let builder = FilterBuilder::new().equal("collection", "landsat").and(cloudy);
    assert_eq!(
        builder.to_text().unwrap(),
        r#"collection = "landsat" AND (eo:cloud_cover < 10 OR eo:cloud_cover IS NULL)"#
    );
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_to_json() {
    let builder = FilterBuilder::new()
        .equal("type", "satellite")
        .less_than("cloud_cover", 20);
    let value = builder.to_json().unwrap();
    assert_eq!(
        value,
        json!({
            "op": "and",
            "args": [
                {"op": "=", "args": [{"property": "type"}, "satellite"]},
                {"op": "<", "args": [{"property": "cloud_cover"}, 20]}
            ]
        })
    );
    assert_eq!(parse_json(&value).unwrap(), builder.build().unwrap());
}

#[test]
fn test_text_round_trip() {
    let expr = FilterBuilder::new()
        .equal("a", "x")
        .or(FilterBuilder::new().between("b", 1.5, 2.5).not())
        .equal("flag", true)
        .build()
        .unwrap();
    let text = cql2_lang::to_text(&expr).unwrap();
    assert_eq!(parse_text(&text).unwrap(), expr);
}
