// tests/lexer_tests.rs

use cql2_lang::ast::Token;
use cql2_lang::lexer::{LexError, Lexer, is_identifier};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn lex_error(input: &str) -> LexError {
    let mut lexer = Lexer::new(input);
    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => panic!("Expected a lex error for {:?}", input),
            Ok(_) => continue,
            Err(e) => return e,
        }
    }
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        (",", Token::Comma),
        ("/", Token::Slash),
        ("=", Token::Eq),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_two_char_operators() {
    let test_cases = vec![
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("<>", Token::NotEq),
        ("!=", Token::NotEq),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        tokens("a<=5"),
        vec![Token::Identifier("a".into()), Token::LtEq, Token::Number(5.0)]
    );
    assert_eq!(
        tokens("a<>b"),
        vec![
            Token::Identifier("a".into()),
            Token::NotEq,
            Token::Identifier("b".into())
        ]
    );
}

#[test]
fn test_bare_exclamation_is_error() {
    let err = lex_error("a ! b");
    assert!(matches!(err, LexError::BareExclamation { .. }));
    assert!(err.to_string().contains("Unexpected '!'"));
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(
        tokens("AND OR NOT LIKE IN IS BETWEEN NULL"),
        vec![
            Token::And,
            Token::Or,
            Token::Not,
            Token::Like,
            Token::In,
            Token::Is,
            Token::Between,
            Token::Null,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    for input in ["and", "And", "aNd", "AND"] {
        assert_eq!(tokens(input), vec![Token::And], "Failed for input: {}", input);
    }
    assert_eq!(tokens("is not null"), vec![Token::Is, Token::Not, Token::Null]);
}

#[test]
fn test_booleans() {
    assert_eq!(
        tokens("TRUE false True"),
        vec![
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Boolean(true)
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(tokens("android"), vec![Token::Identifier("android".into())]);
    assert_eq!(tokens("nullable"), vec![Token::Identifier("nullable".into())]);
    assert_eq!(tokens("island"), vec![Token::Identifier("island".into())]);
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_identifiers() {
    let test_cases = vec![
        "cloud_cover",
        "eo:cloud_cover",
        "properties.datetime",
        "_private",
        "view:sun_elevation",
        "a1",
    ];

    for input in test_cases {
        assert_eq!(
            tokens(input),
            vec![Token::Identifier(input.to_string())],
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_operator_names_are_identifiers() {
    assert_eq!(
        tokens("S_INTERSECTS t_metBy TIMESTAMP"),
        vec![
            Token::Identifier("S_INTERSECTS".into()),
            Token::Identifier("t_metBy".into()),
            Token::Identifier("TIMESTAMP".into()),
        ]
    );
}

#[test]
fn test_is_identifier() {
    assert!(is_identifier("eo:cloud_cover"));
    assert!(is_identifier("properties.platform"));
    assert!(is_identifier("POINT"));
    assert!(!is_identifier("OR"));
    assert!(!is_identifier("true"));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier("with-dash"));
    assert!(!is_identifier("quote\"d"));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("0", 0.0),
        ("42", 42.0),
        ("3.25", 3.25),
        ("-7", -7.0),
        ("+2.5", 2.5),
        ("1e3", 1000.0),
        ("1.5E-3", 0.0015),
        ("2e+2", 200.0),
        ("-0.5", -0.5),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            tokens(input),
            vec![Token::Number(expected)],
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_sign_only_binds_to_digits() {
    let err = lex_error("a - b");
    assert!(matches!(err, LexError::UnexpectedCharacter { ch: '-', .. }));
}

#[test]
fn test_exponent_without_digits_is_identifier_boundary() {
    // "2e" is the number 2 followed by the identifier "e"
    assert_eq!(
        tokens("2e"),
        vec![Token::Number(2.0), Token::Identifier("e".into())]
    );
}

#[test]
fn test_overflowing_number_is_error() {
    let err = lex_error("1e999");
    assert!(matches!(err, LexError::InvalidNumber { .. }));
}

#[test]
fn test_wkt_coordinates() {
    assert_eq!(
        tokens("POINT(-105.1 40.2)"),
        vec![
            Token::Identifier("POINT".into()),
            Token::LParen,
            Token::Number(-105.1),
            Token::Number(40.2),
            Token::RParen,
        ]
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_strings() {
    assert_eq!(tokens(r#""hello""#), vec![Token::String("hello".into())]);
    assert_eq!(tokens("'single'"), vec![Token::String("single".into())]);
    assert_eq!(tokens(r#""""#), vec![Token::String(String::new())]);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        tokens(r#""say \"hi\"""#),
        vec![Token::String("say \"hi\"".into())]
    );
    assert_eq!(
        tokens(r#""a\\b\nc\td""#),
        vec![Token::String("a\\b\nc\td".into())]
    );
    assert_eq!(tokens(r"'it\'s'"), vec![Token::String("it's".into())]);
}

#[test]
fn test_other_quote_needs_no_escape() {
    assert_eq!(tokens(r#"'say "hi"'"#), vec![Token::String("say \"hi\"".into())]);
}

#[test]
fn test_unterminated_string() {
    let err = lex_error(r#"name = "abc"#);
    assert!(matches!(err, LexError::UnterminatedString { .. }));
    assert!(err.to_string().contains("Unterminated string"));
}

#[test]
fn test_invalid_escape() {
    let err = lex_error(r#""bad \q""#);
    assert!(matches!(err, LexError::InvalidEscape { ch: 'q', .. }));
}

#[test]
fn test_backslash_at_end_of_input() {
    let err = lex_error("\"abc\\");
    assert!(matches!(err, LexError::UnexpectedEof { .. }));
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_spanned_positions() {
    let mut lexer = Lexer::new("a = 1\n  AND b");
    let expected = vec![
        (Token::Identifier("a".into()), 1, 1),
        (Token::Eq, 1, 3),
        (Token::Number(1.0), 1, 5),
        (Token::And, 2, 3),
        (Token::Identifier("b".into()), 2, 7),
        (Token::Eof, 2, 8),
    ];

    for (token, line, column) in expected {
        let (actual, position) = lexer.next_spanned().unwrap();
        assert_eq!(actual, token);
        assert_eq!((position.line, position.column), (line, column), "at {}", token);
    }
}

#[test]
fn test_error_carries_position() {
    let err = lex_error("a = 1 AND\nb = #");
    match err {
        LexError::UnexpectedCharacter { ch, position } => {
            assert_eq!(ch, '#');
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 5);
            assert_eq!(position.offset, 14);
        }
        other => panic!("Expected UnexpectedCharacter, got {:?}", other),
    }
}

#[test]
fn test_unicode_identifiers_and_strings() {
    assert_eq!(
        tokens(r#"région = "Île-de-France""#),
        vec![
            Token::Identifier("région".into()),
            Token::Eq,
            Token::String("Île-de-France".into()),
        ]
    );
}
