use std::mem;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{ComparisonOp, Expr, MAX_NESTING, SpatialOp, TemporalOp, Token},
    geometry::{Geometry, Position as Coordinates, WKT_KEYWORDS},
    lexer::{LexError, Lexer, Position},
    value::{Instant, Interval, Literal, parse_bound},
};

/// Grammar violations in CQL2-Text.
///
/// Every variant names the offending token (or construct) and where it was
/// found; no partial tree is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("Expected {expected}, got {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: Token,
        position: Position,
    },

    #[error("Unclosed '{open}' opened at {position}")]
    UnclosedGroup { open: char, position: Position },

    #[error("{keyword} needs a property name on its left, got {found} at {position}")]
    ExpectedProperty {
        keyword: String,
        found: Token,
        position: Position,
    },

    #[error("Invalid {kind} literal at {position}: {message}")]
    InvalidLiteral {
        kind: &'static str,
        message: String,
        position: Position,
    },

    #[error("Unknown function '{name}' at {position}")]
    UnknownFunction { name: String, position: Position },

    #[error("Expression nested deeper than {limit} levels at {position}")]
    NestingTooDeep { limit: usize, position: Position },
}

/// Parses CQL2-Text into an expression tree.
///
/// ```
/// use cql2_lang::{Expr, parse_text};
/// use cql2_lang::ast::ComparisonOp;
///
/// let expr = parse_text("temperature > 30.5").unwrap();
/// assert_eq!(
///     expr,
///     Expr::comparison(ComparisonOp::GreaterThan, Expr::property("temperature"), Expr::literal(30.5)),
/// );
/// ```
pub fn parse_text(input: &str) -> Result<Expr, ParseError> {
    debug!(input_len = input.len(), "parsing CQL2 text");
    let mut parser = Parser::new(Lexer::new(input))?;
    parser.parse()
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let (current_token, current_position) = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = self.lexer.next_spanned()?;
        trace!(token = %token, %position, "token");
        self.current_token = token;
        self.current_position = position;
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token.clone(),
            position: self.current_position,
        }
    }

    fn expect(&mut self, expected: Token, description: &str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(description));
        }
        self.advance()
    }

    /// Consumes the closing delimiter of a group opened at `opened_at`.
    fn expect_closing(
        &mut self,
        closing: Token,
        open: char,
        opened_at: Position,
    ) -> Result<(), ParseError> {
        if self.check(&closing) {
            return self.advance();
        }
        if self.check(&Token::Eof) {
            return Err(ParseError::UnclosedGroup {
                open,
                position: opened_at,
            });
        }
        Err(self.unexpected(&closing.to_string()))
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Parses one complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            self.descend()?;
            self.advance()?;
            let inner = self.parse_unary(); // Right-associative
            self.depth -= 1;
            return Ok(Expr::not(inner?));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::LParen) {
            self.descend()?;
            let opened_at = self.current_position;
            self.advance()?;
            let expr = self.parse_or();
            self.depth -= 1;
            let expr = expr?;
            self.expect_closing(Token::RParen, '(', opened_at)?;
            return Ok(expr);
        }
        self.parse_predicate()
    }

    /// Enters one NOT, parenthesis or geometry collection level.
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                position: self.current_position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_predicate(&mut self) -> Result<Expr, ParseError> {
        let start_token = self.current_token.clone();
        let start = self.current_position;
        let left = self.parse_operand()?;

        if let Some(op) = comparison_op(&self.current_token) {
            self.advance()?;
            let right = self.parse_operand()?;
            return Ok(Expr::comparison(op, left, right));
        }

        let keyword = self.current_token.clone();
        let subject = |left: Expr| require_subject(left, &keyword, start_token.clone(), start);

        match &keyword {
            Token::Between | Token::Like | Token::In => {
                let subject = subject(left)?;
                self.parse_set_predicate(subject)
            }
            Token::Is => {
                let subject = subject(left)?;
                self.advance()?;
                let negated = self.check(&Token::Not);
                if negated {
                    self.advance()?;
                }
                self.expect(Token::Null, "NULL")?;
                let test = Expr::is_null(subject);
                Ok(if negated { Expr::not(test) } else { test })
            }
            Token::Not => {
                self.advance()?;
                if !matches!(self.current_token, Token::Between | Token::Like | Token::In) {
                    return Err(self.unexpected("BETWEEN, LIKE or IN after NOT"));
                }
                let subject = subject(left)?;
                Ok(Expr::not(self.parse_set_predicate(subject)?))
            }
            Token::Identifier(word) => {
                if let Some(op) = SpatialOp::from_keyword(word) {
                    let subject = subject(left)?;
                    self.advance()?;
                    let opened_at = self.current_position;
                    self.expect(Token::LParen, "'(' after a spatial operator")?;
                    let right = self.parse_operand()?;
                    self.expect_closing(Token::RParen, '(', opened_at)?;
                    Ok(Expr::spatial(op, subject, right))
                } else if let Some(op) = TemporalOp::from_keyword(word) {
                    let subject = subject(left)?;
                    self.advance()?;
                    let right = self.parse_operand()?;
                    Ok(Expr::temporal(op, subject, right))
                } else {
                    Err(self.unexpected("a comparison operator or predicate keyword"))
                }
            }
            _ => Err(self.unexpected("a comparison operator or predicate keyword")),
        }
    }

    /// BETWEEN, LIKE and IN; the current token is the keyword.
    fn parse_set_predicate(&mut self, subject: Expr) -> Result<Expr, ParseError> {
        match self.current_token {
            Token::Between => {
                self.advance()?;
                let lower = self.parse_operand()?;
                self.expect(Token::And, "AND between the BETWEEN bounds")?;
                let upper = self.parse_operand()?;
                Ok(Expr::between(subject, lower, upper))
            }
            Token::Like => {
                self.advance()?;
                let pattern = match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::String(pattern) => pattern,
                    found => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "a string pattern after LIKE".to_string(),
                            found,
                            position: self.current_position,
                        });
                    }
                };
                self.advance()?;
                Ok(Expr::like(subject, Expr::Literal(Literal::String(pattern))))
            }
            Token::In => {
                self.advance()?;
                let opened_at = self.current_position;
                self.expect(Token::LParen, "'(' after IN")?;

                let mut candidates = Vec::new();
                if !self.check(&Token::RParen) {
                    loop {
                        candidates.push(self.parse_operand()?);
                        if !self.check(&Token::Comma) {
                            break;
                        }
                        self.advance()?;
                    }
                }
                self.expect_closing(Token::RParen, '(', opened_at)?;
                Ok(Expr::in_list(subject, candidates))
            }
            _ => Err(self.unexpected("BETWEEN, LIKE or IN")),
        }
    }

    /// Property references and literals.
    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_position;
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::String(s)))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Null))
            }
            Token::LBracket => {
                self.advance()?;
                self.parse_interval(position).map(Expr::Literal)
            }
            Token::Identifier(name) => {
                self.advance()?;
                // TIMESTAMP, DATE, BBOX and WKT names only start a literal
                // when followed by '(' (or EMPTY for WKT); otherwise they
                // are plain properties.
                let empty_geometry = WKT_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
                    && self.at_empty_keyword();
                if self.check(&Token::LParen) || empty_geometry {
                    self.parse_literal_call(&name, position).map(Expr::Literal)
                } else {
                    Ok(Expr::Property(name))
                }
            }
            found => Err(ParseError::UnexpectedToken {
                expected: "a property name or literal".to_string(),
                found,
                position,
            }),
        }
    }

    /// `TIMESTAMP(..)`, `DATE(..)`, `BBOX(..)` or a WKT geometry; the current
    /// token follows the name.
    fn parse_literal_call(&mut self, name: &str, position: Position) -> Result<Literal, ParseError> {
        match name.to_ascii_uppercase().as_str() {
            "TIMESTAMP" => {
                let text = self.parse_call_string()?;
                Literal::timestamp(&text).map_err(|e| invalid("timestamp", e, position))
            }
            "DATE" => {
                let text = self.parse_call_string()?;
                Literal::date(&text).map_err(|e| invalid("date", e, position))
            }
            "BBOX" => {
                let bounds = self.parse_parenthesized(Self::parse_number)?;
                Geometry::envelope(bounds)
                    .map(Literal::Geometry)
                    .map_err(|e| invalid("bbox", e, position))
            }
            keyword if WKT_KEYWORDS.contains(&keyword) => self
                .parse_geometry_body(keyword, position)
                .map(Literal::Geometry),
            _ => Err(ParseError::UnknownFunction {
                name: name.to_string(),
                position,
            }),
        }
    }

    fn parse_call_string(&mut self) -> Result<String, ParseError> {
        let opened_at = self.current_position;
        self.expect(Token::LParen, "'('")?;
        let text = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(text) => text,
            found => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a quoted string".to_string(),
                    found,
                    position: self.current_position,
                });
            }
        };
        self.advance()?;
        self.expect_closing(Token::RParen, '(', opened_at)?;
        Ok(text)
    }

    /// `[start / end]` after the opening bracket.
    fn parse_interval(&mut self, opened_at: Position) -> Result<Literal, ParseError> {
        let start = self.parse_instant()?;
        self.expect(Token::Slash, "'/' between interval bounds")?;
        let end = self.parse_instant()?;
        self.expect_closing(Token::RBracket, '[', opened_at)?;
        Ok(Literal::Interval(Interval::new(start, end)))
    }

    fn parse_instant(&mut self) -> Result<Option<Instant>, ParseError> {
        let position = self.current_position;
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(text) => {
                self.advance()?;
                parse_bound(&text).map_err(|e| invalid("interval", e, position))
            }
            Token::Identifier(name) => {
                self.advance()?;
                match self.parse_literal_call(&name, position)? {
                    Literal::Timestamp(ts) => Ok(Some(Instant::Timestamp(ts))),
                    Literal::Date(date) => Ok(Some(Instant::Date(date))),
                    other => Err(ParseError::InvalidLiteral {
                        kind: "interval",
                        message: format!("bounds must be instants, got a {}", other.kind()),
                        position,
                    }),
                }
            }
            found => Err(ParseError::UnexpectedToken {
                expected: "an interval bound".to_string(),
                found,
                position,
            }),
        }
    }

    /// `'(' item (',' item)* ')'`
    fn parse_parenthesized<T, F>(&mut self, mut item: F) -> Result<Vec<T>, ParseError>
    where
        F: FnMut(&mut Self) -> Result<T, ParseError>,
    {
        let opened_at = self.current_position;
        self.expect(Token::LParen, "'('")?;
        let mut items = vec![item(self)?];
        while self.check(&Token::Comma) {
            self.advance()?;
            items.push(item(self)?);
        }
        self.expect_closing(Token::RParen, '(', opened_at)?;
        Ok(items)
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        match self.current_token {
            Token::Number(n) => {
                self.advance()?;
                Ok(n)
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    /// Space-separated coordinates of one WKT position.
    fn parse_position(&mut self) -> Result<Coordinates, ParseError> {
        let position = self.current_position;
        let mut coords = Vec::new();
        while let Token::Number(n) = self.current_token {
            coords.push(n);
            self.advance()?;
        }
        if !(2..=3).contains(&coords.len()) {
            return Err(ParseError::InvalidLiteral {
                kind: "geometry",
                message: format!("a position needs 2 or 3 numbers, got {}", coords.len()),
                position,
            });
        }
        Ok(coords)
    }

    /// MULTIPOINT members may or may not be parenthesized.
    fn parse_multipoint_member(&mut self) -> Result<Coordinates, ParseError> {
        if self.check(&Token::LParen) {
            let opened_at = self.current_position;
            self.advance()?;
            let point = self.parse_position()?;
            self.expect_closing(Token::RParen, '(', opened_at)?;
            Ok(point)
        } else {
            self.parse_position()
        }
    }

    fn parse_geometry(&mut self) -> Result<Geometry, ParseError> {
        let position = self.current_position;
        let kind = match &self.current_token {
            Token::Identifier(name) => name.to_ascii_uppercase(),
            _ => return Err(self.unexpected("a WKT geometry")),
        };
        self.advance()?;
        self.parse_geometry_body(&kind, position)
    }

    fn at_empty_keyword(&self) -> bool {
        matches!(&self.current_token, Token::Identifier(word) if word.eq_ignore_ascii_case("EMPTY"))
    }

    fn parse_geometry_body(&mut self, kind: &str, position: Position) -> Result<Geometry, ParseError> {
        if self.at_empty_keyword() {
            if let Some(empty) = Geometry::empty(kind) {
                self.advance()?;
                return Ok(empty);
            }
        }
        let geometry = match kind {
            "POINT" => {
                let opened_at = self.current_position;
                self.expect(Token::LParen, "'('")?;
                let point = self.parse_position()?;
                self.expect_closing(Token::RParen, '(', opened_at)?;
                Geometry::Point(point)
            }
            "LINESTRING" => Geometry::LineString(self.parse_parenthesized(Self::parse_position)?),
            "POLYGON" => Geometry::Polygon(
                self.parse_parenthesized(|p| p.parse_parenthesized(Self::parse_position))?,
            ),
            "MULTIPOINT" => {
                Geometry::MultiPoint(self.parse_parenthesized(Self::parse_multipoint_member)?)
            }
            "MULTILINESTRING" => Geometry::MultiLineString(
                self.parse_parenthesized(|p| p.parse_parenthesized(Self::parse_position))?,
            ),
            "MULTIPOLYGON" => Geometry::MultiPolygon(self.parse_parenthesized(|p| {
                p.parse_parenthesized(|q| q.parse_parenthesized(Self::parse_position))
            })?),
            "GEOMETRYCOLLECTION" => {
                self.descend()?;
                let members = self.parse_parenthesized(Self::parse_geometry);
                self.depth -= 1;
                Geometry::GeometryCollection(members?)
            }
            _ => {
                return Err(ParseError::UnknownFunction {
                    name: kind.to_string(),
                    position,
                });
            }
        };
        Ok(geometry)
    }
}

fn comparison_op(token: &Token) -> Option<ComparisonOp> {
    match token {
        Token::Eq => Some(ComparisonOp::Equal),
        Token::NotEq => Some(ComparisonOp::NotEqual),
        Token::Lt => Some(ComparisonOp::LessThan),
        Token::LtEq => Some(ComparisonOp::LessEqual),
        Token::Gt => Some(ComparisonOp::GreaterThan),
        Token::GtEq => Some(ComparisonOp::GreaterEqual),
        _ => None,
    }
}

/// BETWEEN, LIKE, IN, IS and the spatial/temporal operators test a property.
fn require_subject(
    left: Expr,
    keyword: &Token,
    start_token: Token,
    start: Position,
) -> Result<Expr, ParseError> {
    match left {
        Expr::Property(_) => Ok(left),
        _ => Err(ParseError::ExpectedProperty {
            keyword: match keyword {
                Token::Identifier(word) => word.to_ascii_uppercase(),
                other => other.to_string(),
            },
            found: start_token,
            position: start,
        }),
    }
}

fn invalid(kind: &'static str, error: impl std::fmt::Display, position: Position) -> ParseError {
    ParseError::InvalidLiteral {
        kind,
        message: error.to_string(),
        position,
    }
}
