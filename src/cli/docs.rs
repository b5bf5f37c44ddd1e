//! Documentation content for the cql2 CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Comparison,
    Logical,
    Predicates,
    Spatial,
    Temporal,
    Literals,
    Json,
    Dialects,
}

impl DocCategory {
    pub const ALL: [DocCategory; 9] = [
        DocCategory::Syntax,
        DocCategory::Comparison,
        DocCategory::Logical,
        DocCategory::Predicates,
        DocCategory::Spatial,
        DocCategory::Temporal,
        DocCategory::Literals,
        DocCategory::Json,
        DocCategory::Dialects,
    ];

    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "comparison" | "comparisons" | "compare" => Some(Self::Comparison),
            "logical" | "logic" | "boolean" => Some(Self::Logical),
            "predicates" | "predicate" | "between" | "like" | "in" => Some(Self::Predicates),
            "spatial" | "geometry" | "geo" => Some(Self::Spatial),
            "temporal" | "time" | "intervals" => Some(Self::Temporal),
            "literals" | "literal" | "values" | "types" => Some(Self::Literals),
            "json" | "cql2_json" => Some(Self::Json),
            "dialects" | "dialect" | "translate" => Some(Self::Dialects),
            _ => None,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            DocCategory::Syntax => SYNTAX_DOC,
            DocCategory::Comparison => COMPARISON_DOC,
            DocCategory::Logical => LOGICAL_DOC,
            DocCategory::Predicates => PREDICATES_DOC,
            DocCategory::Spatial => SPATIAL_DOC,
            DocCategory::Temporal => TEMPORAL_DOC,
            DocCategory::Literals => LITERALS_DOC,
            DocCategory::Json => JSON_DOC,
            DocCategory::Dialects => DIALECTS_DOC,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"CQL2 DOCUMENTATION

CQL2 (OGC Common Query Language) filters select catalog records with
comparisons, boolean logic, and spatial and temporal predicates. Every filter
can be written as CQL2-Text or as CQL2-JSON; cql2 converts between them.

DOCUMENTATION CATEGORIES

  syntax        Overall grammar, precedence, and parentheses
  comparison    = <> < <= > >=
  logical       AND, OR, NOT
  predicates    BETWEEN, LIKE, IN, IS NULL and their negations
  spatial       S_INTERSECTS and the other geometry relations
  temporal      T_AFTER, T_DURING and the other time relations
  literals      Strings, numbers, booleans, timestamps, dates, intervals, geometries
  json          The CQL2-JSON tree form
  dialects      Template tables used by 'cql2 translate'

QUICK REFERENCE

  eo:cloud_cover < 20                         Comparison
  platform IN ("sentinel-2a", "sentinel-2b")  Set membership
  a = 1 AND (b = 2 OR NOT c = 3)              Boolean logic
  geometry S_INTERSECTS (POINT(1 2))          Spatial
  datetime T_DURING ["2021-01-01" / ".."]     Temporal

COMMANDS

  cql2 check <filter>                  Validate a filter
  cql2 convert <filter> --to json      Convert between syntaxes
  cql2 flatten <filter>                List the predicates of a conjunction
  cql2 translate <filter> --dialect f  Render in another query language

Run 'cql2 doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    DocCategory::from_name(name)
        .map(DocCategory::content)
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

const SYNTAX_DOC: &str = r#"SYNTAX - CQL2-Text Grammar

STRUCTURE
  A filter is one or more predicates joined by AND / OR, optionally negated
  with NOT and grouped with parentheses.

    Or        := And ('OR' And)*
    And       := Unary ('AND' Unary)*
    Unary     := 'NOT' Unary | Primary
    Primary   := '(' Or ')' | Predicate

PRECEDENCE (loosest first)
  OR  <  AND  <  NOT  <  predicates

  Examples:
    a = 1 OR b = 2 AND c = 3       means  a = 1 OR (b = 2 AND c = 3)
    NOT a = 1 AND b = 2            means  (NOT a = 1) AND b = 2

  Parentheses are only needed to loosen binding:
    temp > 30 AND (humidity < 50 OR NOT status = "active")

PROPERTY NAMES
  Bare identifiers: letters, digits, '_', ':' and '.', not starting with a
  digit. Keywords cannot be used as property names.

    eo:cloud_cover
    properties.platform
    _internal

KEYWORDS
  AND OR NOT LIKE IN IS NULL BETWEEN TRUE FALSE
  Keywords and operator names are case-insensitive.

  Constraints:
    - Trailing input after a complete filter is an error
    - Every '(' and '[' must be closed
"#;

const COMPARISON_DOC: &str = r#"COMPARISON - Binary Comparisons

OPERATORS
  =     Equal
  <>    Not equal ('!=' is accepted as an alias)
  <     Less than
  <=    Less than or equal
  >     Greater than
  >=    Greater than or equal

  Examples:
    eo:cloud_cover <= 20
    platform = "sentinel-2a"
    datetime >= TIMESTAMP("2021-04-08T04:39:23Z")
    start_date < end_date

  Either side may be a property or a literal.

  JSON form:
    {"op": "<=", "args": [{"property": "eo:cloud_cover"}, 20]}
"#;

const LOGICAL_DOC: &str = r#"LOGICAL - AND, OR, NOT

  a = 1 AND b = 2          Both must hold
  a = 1 OR b = 2           Either may hold
  NOT a = 1                Negation

  Chains of the same operator are one n-ary node:
    a = 1 AND b = 2 AND c = 3
  is a single "and" with three arguments in CQL2-JSON.

  JSON form:
    {"op": "and", "args": [<expr>, <expr>, ...]}
    {"op": "not", "args": [<expr>]}

  Constraints:
    - 'and' / 'or' take at least one argument
    - 'not' takes exactly one
"#;

const PREDICATES_DOC: &str = r#"PREDICATES - BETWEEN, LIKE, IN, IS NULL

BETWEEN
  gsd BETWEEN 10 AND 30
  gsd NOT BETWEEN 10 AND 30

  JSON: {"op": "between", "args": [{"property": "gsd"}, 10, 30]}

LIKE
  Pattern matching with '%' (any run) and '_' (one character).

  title LIKE "Sentinel%"
  title NOT LIKE "%test%"

  JSON: {"op": "like", "args": [{"property": "title"}, "Sentinel%"]}

IN
  platform IN ("sentinel-2a", "sentinel-2b")
  platform NOT IN ("landsat-8")
  platform IN ()

  JSON: {"op": "in", "args": [{"property": "platform"}, ["sentinel-2a", "sentinel-2b"]]}

IS NULL
  description IS NULL
  description IS NOT NULL

  JSON: {"op": "isNull", "args": [{"property": "description"}]}

  Constraints:
    - The left side of these predicates must be a property name
    - The negated forms are NOT applied to the positive predicate
"#;

const SPATIAL_DOC: &str = r#"SPATIAL - Geometry Relations

OPERATORS
  S_INTERSECTS  S_CONTAINS  S_WITHIN   S_EQUALS
  S_DISJOINT    S_TOUCHES   S_OVERLAPS S_CROSSES

FORM
  <property> S_<OP> (<geometry>)

  Examples:
    geometry S_INTERSECTS (POINT(-105.1 40.2))
    geometry S_WITHIN (BBOX(-106, 39, -104, 41))
    footprint S_CONTAINS (POLYGON((0 0, 1 0, 1 1, 0 1, 0 0)))

  JSON form:
    {"op": "s_intersects", "args": [{"property": "geometry"},
                                    {"type": "Point", "coordinates": [-105.1, 40.2]}]}

  Geometries are carried as opaque values; cql2 never computes spatial
  relationships.
"#;

const TEMPORAL_DOC: &str = r#"TEMPORAL - Time Relations

OPERATORS
  T_AFTER      T_BEFORE     T_DURING       T_CONTAINS    T_DISJOINT
  T_EQUALS     T_MEETS      T_METBY        T_OVERLAPS    T_OVERLAPPEDBY
  T_STARTEDBY  T_STARTS     T_FINISHEDBY   T_FINISHES    T_INTERSECTS

FORM
  <property> T_<OP> <instant-or-interval>

  Examples:
    datetime T_AFTER TIMESTAMP("2021-01-01T00:00:00Z")
    updated T_BEFORE DATE("2020-06-30")
    datetime T_DURING ["2021-01-01" / "2021-12-31"]
    datetime T_DURING [TIMESTAMP("2021-01-01T00:00:00Z") / ".."]

  JSON form:
    {"op": "t_during", "args": [{"property": "datetime"},
                                {"interval": ["2021-01-01", ".."]}]}

  The compound relations are camel-cased in JSON: t_metBy, t_overlappedBy,
  t_startedBy, t_finishedBy.
"#;

const LITERALS_DOC: &str = r#"LITERALS - Values

STRINGS
  "double quoted" or 'single quoted'
  Escapes: \" \' \\ \n \t \r

NUMBERS
  42   -7   3.25   1e-6   +2.5E10

BOOLEANS AND NULL
  TRUE  FALSE  NULL   (case-insensitive)

TIMESTAMPS AND DATES
  TIMESTAMP("2021-04-08T04:39:23Z")    RFC 3339, normalized to UTC
  DATE("2021-04-08")                   YYYY-MM-DD

INTERVALS
  ["2021-01-01" / "2021-12-31"]
  ["2021-01-01T00:00:00Z" / ".."]      ".." is an open end

  A bound written as YYYY-MM-DD is a date, anything else a timestamp.

GEOMETRIES (WKT)
  POINT(1 2)
  LINESTRING(0 0, 1 1)
  POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))
  MULTIPOINT((1 2), (3 4))
  MULTILINESTRING((0 0, 1 1), (2 2, 3 3))
  MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)))
  GEOMETRYCOLLECTION(POINT(1 2), LINESTRING(0 0, 1 1))
  BBOX(minx, miny, maxx, maxy)

  TIMESTAMP, DATE, BBOX and the WKT names only start a literal when followed
  by '('; on their own they are ordinary property names.
"#;

const JSON_DOC: &str = r#"JSON - CQL2-JSON Tree Form

NODES
  {"op": "<name>", "args": [...]}

  Operator names: and or not = <> < <= > >= like between in isNull
                  s_intersects ... t_after ... (case-sensitive)

OPERANDS
  {"property": "name"}                 Property reference
  "text"  42  true  null               Plain literals
  {"timestamp": "2021-04-08T04:39:23Z"}
  {"date": "2021-04-08"}
  {"interval": ["2021-01-01", ".."]}   ".." or null is an open end
  {"bbox": [-106, 39, -104, 41]}
  {"type": "Point", "coordinates": [1, 2]}   Any GeoJSON geometry
  {"function": {"name": "f", "args": [...]}} Extension function
  {"op": ..., "args": ...}             Nested expression

  Constraints:
    - Each operator checks its argument count
    - The first argument of like, between, in, isNull and the spatial and
      temporal operators must be a property or a nested expression
    - 'in' takes its candidates as an array in the second argument
"#;

const DIALECTS_DOC: &str = r#"DIALECTS - Template Tables for 'cql2 translate'

A dialect is a JSON file mapping node kinds to string templates:

  {
    "name": "sql",
    "operators": {
      "and": "({args: AND })",
      "or": "({args: OR })",
      "not": "NOT ({0})",
      "=": "{0} = {1}",
      "<": "{0} < {1}",
      "in": "{0} IN ({rest})",
      "like": "{0} LIKE {1}",
      "isNull": "{0} IS NULL",
      "s_intersects": "ST_Intersects({0}, {1})",
      "property": "\"{0}\"",
      "string": "'{0}'",
      "number": "{0}",
      "boolean": "{0}",
      "null": "NULL",
      "timestamp": "TIMESTAMP '{0}'",
      "geometry": "ST_GeomFromText('{0}')"
    },
    "escapes": { "'": "''" },
    "identifier_escapes": { "\"": "\"\"" }
  }

KEYS
  Operators use their CQL2-JSON names. Leaves use: property string number
  boolean null timestamp date interval open geometry. Extension functions
  use their own name.

PLACEHOLDERS
  {0} {1} ...       One operand by position
  {args}            All operands, comma-separated
  {rest}            All operands after the first
  {args:SEP}        All operands joined with SEP

  Geometries expose WKT as {0} and GeoJSON as {1}. Intervals expose their
  two bounds, each rendered with the timestamp, date or open template.

  Constraints:
    - A node with no template fails the translation
    - String contents pass through the escapes table character by character
    - Property names pass through identifier_escapes the same way
"#;
