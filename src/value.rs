use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::geometry::Geometry;
use crate::json::SemanticError;

/// Marker for an unbounded interval end in both surface syntaxes.
pub const OPEN_BOUND: &str = "..";

/// A literal value inside a filter expression.
///
/// The set is closed: every serializer and the translator match on it
/// exhaustively.
///
/// # Examples
///
/// ```
/// use cql2_lang::Literal;
///
/// let name = Literal::from("satellite");
/// let cover = Literal::from(20);
/// assert_eq!(cover, Literal::Number(20.0));
/// assert_eq!(name.kind(), "string");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// UTF-8 string
    String(String),

    /// Any number; integers are stored as whole floats
    Number(f64),

    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// `NULL`
    Null,

    /// Instant with time of day, normalized to UTC
    Timestamp(DateTime<Utc>),

    /// Calendar date
    Date(NaiveDate),

    /// Time range with optionally open ends
    Interval(Interval),

    /// GeoJSON-shaped geometry, carried opaquely
    Geometry(Geometry),
}

impl Literal {
    /// Short kind name, also the translator's lookup key for leaves.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Number(_) => "number",
            Literal::Boolean(_) => "boolean",
            Literal::Null => "null",
            Literal::Timestamp(_) => "timestamp",
            Literal::Date(_) => "date",
            Literal::Interval(_) => "interval",
            Literal::Geometry(_) => "geometry",
        }
    }

    /// Parses an RFC 3339 timestamp literal.
    pub fn timestamp(text: &str) -> Result<Literal, SemanticError> {
        parse_timestamp(text).map(Literal::Timestamp)
    }

    /// Parses a `YYYY-MM-DD` date literal.
    pub fn date(text: &str) -> Result<Literal, SemanticError> {
        parse_date(text).map(Literal::Date)
    }

    /// Turns raw user input into a typed literal according to a type hint
    /// from property metadata.
    ///
    /// ```
    /// use cql2_lang::{Literal, TypeHint};
    ///
    /// assert_eq!(Literal::coerce("42", TypeHint::Integer).unwrap(), Literal::Number(42.0));
    /// assert_eq!(Literal::coerce("yes", TypeHint::String).unwrap(), Literal::from("yes"));
    /// assert!(Literal::coerce("4.5", TypeHint::Integer).is_err());
    /// ```
    pub fn coerce(raw: &str, hint: TypeHint) -> Result<Literal, SemanticError> {
        let trimmed = raw.trim();
        match hint {
            TypeHint::String => Ok(Literal::String(raw.to_string())),
            TypeHint::Number => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Literal::Number)
                .ok_or_else(|| invalid(format!("'{}' is not a number", raw))),
            TypeHint::Integer => trimmed
                .parse::<i64>()
                .map(|n| Literal::Number(n as f64))
                .map_err(|_| invalid(format!("'{}' is not an integer", raw))),
            TypeHint::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(Literal::Boolean(true)),
                "false" => Ok(Literal::Boolean(false)),
                _ => Err(invalid(format!("'{}' is not a boolean", raw))),
            },
            TypeHint::Timestamp => Literal::timestamp(trimmed),
            TypeHint::Date => Literal::date(trimmed),
        }
    }
}

/// Value type reported by a property-metadata lookup, used by
/// [`Literal::coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeHint {
    String,
    Number,
    Integer,
    Boolean,
    Timestamp,
    Date,
}

/// One end of an [`Interval`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instant {
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl Instant {
    /// Reads a bare ISO-8601 string: `YYYY-MM-DD` is a date, anything else
    /// must be an RFC 3339 timestamp.
    pub fn parse(text: &str) -> Result<Instant, SemanticError> {
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(Instant::Date(date));
        }
        parse_timestamp(text).map(Instant::Timestamp)
    }

    pub fn to_iso_string(&self) -> String {
        match self {
            Instant::Timestamp(ts) => format_timestamp(ts),
            Instant::Date(date) => format_date(date),
        }
    }
}

/// Time range; `None` marks an open end.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Option<Instant>,
    pub end: Option<Instant>,
}

impl Interval {
    pub fn new(start: Option<Instant>, end: Option<Instant>) -> Self {
        Interval { start, end }
    }

    /// Builds an interval from two ISO strings, `".."` marking an open end.
    pub fn parse(start: &str, end: &str) -> Result<Self, SemanticError> {
        Ok(Interval {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }
}

/// Reads one interval bound, `".."` being open.
pub fn parse_bound(text: &str) -> Result<Option<Instant>, SemanticError> {
    if text == OPEN_BOUND {
        Ok(None)
    } else {
        Instant::parse(text).map(Some)
    }
}

/// Renders one interval bound, `".."` for an open end.
pub fn format_bound(bound: &Option<Instant>) -> String {
    match bound {
        Some(instant) => instant.to_iso_string(),
        None => OPEN_BOUND.to_string(),
    }
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, SemanticError> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| invalid(format!("'{}' is not an RFC 3339 timestamp: {}", text, e)))
}

pub fn parse_date(text: &str) -> Result<NaiveDate, SemanticError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| invalid(format!("'{}' is not a YYYY-MM-DD date: {}", text, e)))
}

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Shortest text form of a finite number that reads back to the same value.
///
/// Whole numbers print without a fraction; very large or very small
/// magnitudes use exponent notation.
pub fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        format!("{:e}", n)
    } else {
        n.to_string()
    }
}

/// JSON form of a number: whole values within the exactly representable
/// integer range become JSON integers. `None` for NaN and infinities.
pub fn number_to_json(n: f64) -> Option<serde_json::Value> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Some(serde_json::Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(serde_json::Value::Number)
    }
}

fn invalid(message: String) -> SemanticError {
    SemanticError::InvalidLiteral(message)
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(n.into())
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(ts: DateTime<Utc>) -> Self {
        Literal::Timestamp(ts)
    }
}

impl From<NaiveDate> for Literal {
    fn from(date: NaiveDate) -> Self {
        Literal::Date(date)
    }
}

impl From<Interval> for Literal {
    fn from(interval: Interval) -> Self {
        Literal::Interval(interval)
    }
}

impl From<Geometry> for Literal {
    fn from(geometry: Geometry) -> Self {
        Literal::Geometry(geometry)
    }
}
