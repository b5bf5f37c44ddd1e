// tests/parser_tests.rs

use chrono::{NaiveDate, TimeZone, Utc};
use cql2_lang::ast::{ComparisonOp, Expr, LogicalOp, MAX_NESTING, SpatialOp, TemporalOp, Token};
use cql2_lang::geometry::Geometry;
use cql2_lang::lexer::{LexError, Lexer};
use cql2_lang::parser::{ParseError, Parser, parse_text};
use cql2_lang::value::{Instant, Interval, Literal};

fn parse(input: &str) -> Expr {
    parse_text(input).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", input, e))
}

fn parse_err(input: &str) -> ParseError {
    match parse_text(input) {
        Ok(expr) => panic!("Expected {:?} to fail, got {:?}", input, expr),
        Err(e) => e,
    }
}

fn prop(name: &str) -> Expr {
    Expr::property(name)
}

fn lit(value: impl Into<Literal>) -> Expr {
    Expr::literal(value)
}

fn cmp(op: ComparisonOp, name: &str, value: impl Into<Literal>) -> Expr {
    Expr::comparison(op, prop(name), lit(value))
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparison() {
    assert_eq!(
        parse("temperature > 30.5"),
        cmp(ComparisonOp::GreaterThan, "temperature", 30.5)
    );
}

#[test]
fn test_all_comparison_operators() {
    let test_cases = vec![
        ("a = 1", ComparisonOp::Equal),
        ("a <> 1", ComparisonOp::NotEqual),
        ("a != 1", ComparisonOp::NotEqual),
        ("a < 1", ComparisonOp::LessThan),
        ("a <= 1", ComparisonOp::LessEqual),
        ("a > 1", ComparisonOp::GreaterThan),
        ("a >= 1", ComparisonOp::GreaterEqual),
    ];

    for (input, op) in test_cases {
        assert_eq!(parse(input), cmp(op, "a", 1), "Failed for input: {}", input);
    }
}

#[test]
fn test_comparison_operands() {
    assert_eq!(
        parse("start < end"),
        Expr::comparison(ComparisonOp::LessThan, prop("start"), prop("end"))
    );
    assert_eq!(
        parse("5 < cloud_cover"),
        Expr::comparison(ComparisonOp::LessThan, lit(5), prop("cloud_cover"))
    );
    assert_eq!(parse("flag = TRUE"), cmp(ComparisonOp::Equal, "flag", true));
    assert_eq!(
        parse("x = NULL"),
        Expr::comparison(ComparisonOp::Equal, prop("x"), Expr::Literal(Literal::Null))
    );
    assert_eq!(
        parse("platform = 'sentinel-2a'"),
        cmp(ComparisonOp::Equal, "platform", "sentinel-2a")
    );
}

// ============================================================================
// Logical operators and precedence
// ============================================================================

#[test]
fn test_and_chain_is_flat() {
    let expr = parse("a = 1 AND b = 2 AND c = 3");
    match expr {
        Expr::Logical {
            op: LogicalOp::And,
            children,
        } => assert_eq!(children.len(), 3),
        other => panic!("Expected a flat AND, got {:?}", other),
    }
}

#[test]
fn test_parenthesized_and_is_spliced() {
    assert_eq!(
        parse("a = 1 AND (b = 2 AND c = 3)"),
        parse("a = 1 AND b = 2 AND c = 3")
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    // a OR (b AND c)
    let expr = parse("a = 1 OR b = 2 AND c = 3");
    match expr {
        Expr::Logical {
            op: LogicalOp::Or,
            children,
        } => {
            assert_eq!(children.len(), 2);
            assert_eq!(children[0], cmp(ComparisonOp::Equal, "a", 1));
            assert!(matches!(
                &children[1],
                Expr::Logical { op: LogicalOp::And, children } if children.len() == 2
            ));
        }
        other => panic!("Expected OR at the root, got {:?}", other),
    }
}

#[test]
fn test_not_binds_tighter_than_and() {
    let expr = parse("NOT a = 1 AND b = 2");
    assert_eq!(
        expr,
        Expr::and(
            Expr::not(cmp(ComparisonOp::Equal, "a", 1)),
            cmp(ComparisonOp::Equal, "b", 2)
        )
    );
}

#[test]
fn test_double_not() {
    assert_eq!(
        parse("NOT NOT a = 1"),
        Expr::not(Expr::not(cmp(ComparisonOp::Equal, "a", 1)))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = parse("temp > 30 AND (humidity < 50 OR NOT status = \"active\")");
    assert_eq!(
        expr,
        Expr::and(
            cmp(ComparisonOp::GreaterThan, "temp", 30),
            Expr::or(
                cmp(ComparisonOp::LessThan, "humidity", 50),
                Expr::not(cmp(ComparisonOp::Equal, "status", "active"))
            )
        )
    );
}

#[test]
fn test_redundant_parentheses() {
    assert_eq!(parse("((a = 1))"), cmp(ComparisonOp::Equal, "a", 1));
}

#[test]
fn test_keywords_any_case() {
    assert_eq!(parse("a = 1 and not b = 2"), parse("a = 1 AND NOT b = 2"));
}

// ============================================================================
// Set, range, pattern and null predicates
// ============================================================================

#[test]
fn test_between() {
    assert_eq!(
        parse("gsd BETWEEN 10 AND 30"),
        Expr::between(prop("gsd"), lit(10), lit(30))
    );
}

#[test]
fn test_between_inside_conjunction() {
    let expr = parse("gsd BETWEEN 10 AND 30 AND cloud_cover < 5");
    assert_eq!(
        expr,
        Expr::and(
            Expr::between(prop("gsd"), lit(10), lit(30)),
            cmp(ComparisonOp::LessThan, "cloud_cover", 5)
        )
    );
}

#[test]
fn test_not_between() {
    assert_eq!(
        parse("gsd NOT BETWEEN 10 AND 30"),
        Expr::not(Expr::between(prop("gsd"), lit(10), lit(30)))
    );
}

#[test]
fn test_like() {
    assert_eq!(
        parse("title LIKE \"Sentinel%\""),
        Expr::like(prop("title"), lit("Sentinel%"))
    );
    assert_eq!(
        parse("title NOT LIKE '%test_'"),
        Expr::not(Expr::like(prop("title"), lit("%test_")))
    );
}

#[test]
fn test_like_requires_string_pattern() {
    let err = parse_err("title LIKE 5");
    assert!(matches!(
        err,
        ParseError::UnexpectedToken { found: Token::Number(_), .. }
    ));
}

#[test]
fn test_in() {
    assert_eq!(
        parse("platform IN (\"a\", \"b\", 3)"),
        Expr::in_list(prop("platform"), vec![lit("a"), lit("b"), lit(3)])
    );
    assert_eq!(
        parse("platform NOT IN ('x')"),
        Expr::not(Expr::in_list(prop("platform"), vec![lit("x")]))
    );
}

#[test]
fn test_empty_in_list() {
    assert_eq!(parse("platform IN ()"), Expr::in_list(prop("platform"), vec![]));
}

#[test]
fn test_is_null() {
    assert_eq!(parse("description IS NULL"), Expr::is_null(prop("description")));
    assert_eq!(
        parse("description is not null"),
        Expr::not(Expr::is_null(prop("description")))
    );
}

#[test]
fn test_predicates_need_property_subject() {
    for input in ["5 BETWEEN 1 AND 10", "'a' LIKE 'b'", "1 IN (1, 2)", "NULL IS NULL"] {
        let err = parse_err(input);
        assert!(
            matches!(err, ParseError::ExpectedProperty { .. }),
            "Failed for input: {}, got {:?}",
            input,
            err
        );
    }
}

// ============================================================================
// Spatial predicates
// ============================================================================

#[test]
fn test_spatial_point() {
    assert_eq!(
        parse("geometry S_INTERSECTS (POINT(-105.1 40.2))"),
        Expr::spatial(
            SpatialOp::Intersects,
            prop("geometry"),
            lit(Geometry::Point(vec![-105.1, 40.2]))
        )
    );
}

#[test]
fn test_spatial_operators_case_insensitive() {
    let expr = parse("geom s_within (POINT(1 2))");
    assert!(matches!(expr, Expr::Spatial { op: SpatialOp::Within, .. }));
}

#[test]
fn test_all_spatial_operators() {
    for op in SpatialOp::ALL {
        let input = format!("geom {} (POINT(0 0))", op.keyword());
        assert!(
            matches!(parse(&input), Expr::Spatial { op: parsed, .. } if parsed == op),
            "Failed for {}",
            input
        );
    }
}

#[test]
fn test_spatial_polygon() {
    let expr = parse("footprint S_CONTAINS (POLYGON((0 0, 1 0, 1 1, 0 1, 0 0)))");
    let expected = Geometry::Polygon(vec![vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ]]);
    assert_eq!(
        expr,
        Expr::spatial(SpatialOp::Contains, prop("footprint"), lit(expected))
    );
}

#[test]
fn test_wkt_geometry_types() {
    let test_cases = vec![
        (
            "LINESTRING(0 0, 1 1)",
            Geometry::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]),
        ),
        (
            "MULTIPOINT((1 2), (3 4))",
            Geometry::MultiPoint(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        ),
        (
            "MULTIPOINT(1 2, 3 4)",
            Geometry::MultiPoint(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        ),
        (
            "MULTILINESTRING((0 0, 1 1), (2 2, 3 3))",
            Geometry::MultiLineString(vec![
                vec![vec![0.0, 0.0], vec![1.0, 1.0]],
                vec![vec![2.0, 2.0], vec![3.0, 3.0]],
            ]),
        ),
        (
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)))",
            Geometry::MultiPolygon(vec![vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]]]),
        ),
        (
            "GEOMETRYCOLLECTION(POINT(1 2), LINESTRING(0 0, 1 1))",
            Geometry::GeometryCollection(vec![
                Geometry::Point(vec![1.0, 2.0]),
                Geometry::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]),
            ]),
        ),
        ("POINT(1 2 3)", Geometry::Point(vec![1.0, 2.0, 3.0])),
        (
            "BBOX(-106, 39, -104, 41)",
            Geometry::Envelope(vec![-106.0, 39.0, -104.0, 41.0]),
        ),
    ];

    for (wkt, expected) in test_cases {
        let input = format!("geom S_INTERSECTS ({})", wkt);
        assert_eq!(
            parse(&input),
            Expr::spatial(SpatialOp::Intersects, prop("geom"), lit(expected)),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_empty_wkt_geometries() {
    let test_cases = vec![
        ("LINESTRING EMPTY", Geometry::LineString(vec![])),
        ("polygon empty", Geometry::Polygon(vec![])),
        ("MULTIPOINT EMPTY", Geometry::MultiPoint(vec![])),
        ("MULTIPOLYGON EMPTY", Geometry::MultiPolygon(vec![])),
        ("GEOMETRYCOLLECTION EMPTY", Geometry::GeometryCollection(vec![])),
        (
            "GEOMETRYCOLLECTION(POINT(1 2), POLYGON EMPTY)",
            Geometry::GeometryCollection(vec![
                Geometry::Point(vec![1.0, 2.0]),
                Geometry::Polygon(vec![]),
            ]),
        ),
    ];

    for (wkt, expected) in test_cases {
        let input = format!("geom S_INTERSECTS ({})", wkt);
        assert_eq!(
            parse(&input),
            Expr::spatial(SpatialOp::Intersects, prop("geom"), lit(expected)),
            "Failed for input: {}",
            input
        );
    }

    // Points have no empty form
    let err = parse_err("geom S_INTERSECTS (POINT EMPTY)");
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn test_bad_position_arity() {
    let err = parse_err("geom S_INTERSECTS (POINT(1))");
    assert!(matches!(err, ParseError::InvalidLiteral { kind: "geometry", .. }));
}

#[test]
fn test_bad_bbox() {
    let err = parse_err("geom S_INTERSECTS (BBOX(1, 2, 3))");
    assert!(matches!(err, ParseError::InvalidLiteral { kind: "bbox", .. }));
}

#[test]
fn test_wkt_names_are_properties_without_parenthesis() {
    assert_eq!(parse("point = 1"), cmp(ComparisonOp::Equal, "point", 1));
    assert_eq!(parse("date > 3"), cmp(ComparisonOp::GreaterThan, "date", 3));
}

#[test]
fn test_unknown_function_call() {
    let err = parse_err("a = CIRCLE(1 2)");
    assert!(matches!(err, ParseError::UnknownFunction { ref name, .. } if name == "CIRCLE"));
}

// ============================================================================
// Temporal predicates and literals
// ============================================================================

#[test]
fn test_timestamp_literal() {
    let expected = Utc.with_ymd_and_hms(2021, 4, 8, 4, 39, 23).unwrap();
    assert_eq!(
        parse("datetime >= TIMESTAMP(\"2021-04-08T04:39:23Z\")"),
        cmp(ComparisonOp::GreaterEqual, "datetime", expected)
    );
}

#[test]
fn test_timestamp_offset_is_normalized() {
    assert_eq!(
        parse("t = TIMESTAMP('2021-04-08T06:39:23+02:00')"),
        parse("t = TIMESTAMP('2021-04-08T04:39:23Z')")
    );
}

#[test]
fn test_date_literal() {
    let expected = NaiveDate::from_ymd_opt(2020, 6, 30).unwrap();
    assert_eq!(
        parse("updated T_BEFORE DATE(\"2020-06-30\")"),
        Expr::temporal(TemporalOp::Before, prop("updated"), lit(expected))
    );
}

#[test]
fn test_invalid_timestamp() {
    let err = parse_err("t = TIMESTAMP(\"yesterday\")");
    assert!(matches!(err, ParseError::InvalidLiteral { kind: "timestamp", .. }));
}

#[test]
fn test_interval_with_dates() {
    let interval = Interval::new(
        Some(Instant::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())),
        Some(Instant::Date(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap())),
    );
    assert_eq!(
        parse("datetime T_DURING [\"2021-01-01\" / \"2021-12-31\"]"),
        Expr::temporal(TemporalOp::During, prop("datetime"), lit(interval))
    );
}

#[test]
fn test_open_interval() {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let interval = Interval::new(Some(Instant::Timestamp(start)), None);
    assert_eq!(
        parse("datetime T_DURING [TIMESTAMP('2021-01-01T00:00:00Z') / '..']"),
        Expr::temporal(TemporalOp::During, prop("datetime"), lit(interval))
    );
}

#[test]
fn test_all_temporal_operators() {
    for op in TemporalOp::ALL {
        let input = format!("datetime {} DATE('2021-01-01')", op.keyword());
        assert!(
            matches!(parse(&input), Expr::Temporal { op: parsed, .. } if parsed == op),
            "Failed for {}",
            input
        );
    }
}

#[test]
fn test_temporal_camel_case_keyword() {
    let expr = parse("datetime t_metBy DATE('2021-01-01')");
    assert!(matches!(expr, Expr::Temporal { op: TemporalOp::MetBy, .. }));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unclosed_paren() {
    let err = parse_err("(a = 1 AND b = 2");
    match err {
        ParseError::UnclosedGroup { open, position } => {
            assert_eq!(open, '(');
            assert_eq!(position.column, 1);
        }
        other => panic!("Expected UnclosedGroup, got {:?}", other),
    }
}

#[test]
fn test_unclosed_interval() {
    let err = parse_err("d T_DURING ['2021-01-01' / '..'");
    assert!(matches!(err, ParseError::UnclosedGroup { open: '[', .. }));
}

#[test]
fn test_trailing_input() {
    let err = parse_err("a = 1 b = 2");
    match err {
        ParseError::UnexpectedToken {
            expected,
            found,
            position,
        } => {
            assert_eq!(expected, "end of input");
            assert_eq!(found, Token::Identifier("b".into()));
            assert_eq!(position.column, 7);
        }
        other => panic!("Expected UnexpectedToken, got {:?}", other),
    }
}

#[test]
fn test_missing_operand() {
    let err = parse_err("a =");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Eof, .. }));
}

#[test]
fn test_missing_operator() {
    let err = parse_err("a");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Eof, .. }));
}

#[test]
fn test_dangling_and() {
    let err = parse_err("a = 1 AND");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Eof, .. }));
}

#[test]
fn test_between_needs_and() {
    let err = parse_err("gsd BETWEEN 10 OR 30");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Or, .. }));
}

#[test]
fn test_not_must_precede_set_keyword() {
    let err = parse_err("a NOT = 1");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Eq, .. }));
}

#[test]
fn test_is_requires_null() {
    let err = parse_err("a IS 5");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Number(_), .. }));
}

#[test]
fn test_lex_error_surfaces() {
    let err = parse_err("a = \"open");
    assert!(matches!(
        err,
        ParseError::Lex(LexError::UnterminatedString { .. })
    ));
    assert!(err.to_string().contains("Unterminated string"));
}

#[test]
fn test_empty_input() {
    let err = parse_err("");
    assert!(matches!(err, ParseError::UnexpectedToken { found: Token::Eof, .. }));
}

// ============================================================================
// Nesting limits
// ============================================================================

#[test]
fn test_deep_parentheses_are_rejected() {
    let input = format!("{}a = 1{}", "(".repeat(5000), ")".repeat(5000));
    match parse_err(&input) {
        ParseError::NestingTooDeep { limit, position } => {
            assert_eq!(limit, MAX_NESTING);
            assert_eq!(position.column, MAX_NESTING + 1);
        }
        other => panic!("Expected NestingTooDeep, got {:?}", other),
    }
}

#[test]
fn test_long_not_chain_is_rejected() {
    let input = format!("{}a = 1", "NOT ".repeat(200_000));
    let err = parse_err(&input);
    assert!(matches!(err, ParseError::NestingTooDeep { .. }));
    assert!(err.to_string().starts_with("Expression nested deeper than 256 levels"));
}

#[test]
fn test_not_and_parentheses_share_the_limit() {
    let half = MAX_NESTING / 2;
    let input = format!("{}a = 1{}", "NOT (".repeat(half), ")".repeat(half));
    assert!(parse_text(&input).is_ok());

    let input = format!("{}a = 1{}", "NOT (".repeat(half + 1), ")".repeat(half + 1));
    assert!(matches!(parse_err(&input), ParseError::NestingTooDeep { .. }));
}

#[test]
fn test_nesting_at_the_limit_round_trips() {
    let input = format!("{}a = 1", "NOT ".repeat(MAX_NESTING));
    let expr = parse(&input);
    let text = cql2_lang::to_text(&expr).unwrap();
    assert_eq!(text, input);
    assert_eq!(parse(&text), expr);

    let json = cql2_lang::to_json(&expr).unwrap();
    assert_eq!(cql2_lang::parse_json(&json).unwrap(), expr);
}

#[test]
fn test_deep_geometry_collection_is_rejected() {
    let wkt = format!(
        "{}POINT(0 0){}",
        "GEOMETRYCOLLECTION(".repeat(MAX_NESTING + 1),
        ")".repeat(MAX_NESTING + 1)
    );
    let err = parse_err(&format!("geom S_INTERSECTS ({})", wkt));
    assert!(matches!(err, ParseError::NestingTooDeep { .. }));
}

#[test]
fn test_parser_struct_api() {
    let lexer = Lexer::new("eo:cloud_cover <= 20");
    let mut parser = Parser::new(lexer).unwrap();
    let expr = parser.parse().unwrap();
    assert_eq!(expr, cmp(ComparisonOp::LessEqual, "eo:cloud_cover", 20));
}

#[test]
fn test_parser_new_reports_first_token_error() {
    let result = Parser::new(Lexer::new("#"));
    assert!(matches!(
        result,
        Err(ParseError::Lex(LexError::UnexpectedCharacter { ch: '#', .. }))
    ));
}
