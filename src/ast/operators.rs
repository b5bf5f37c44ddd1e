/// Binding strength of `OR` when rendering text.
pub const PRECEDENCE_OR: u8 = 1;
/// Binding strength of `AND`.
pub const PRECEDENCE_AND: u8 = 2;
/// Binding strength of `NOT`.
pub const PRECEDENCE_NOT: u8 = 3;
/// Predicates and operands never need parentheses.
pub const PRECEDENCE_ATOM: u8 = 4;

/// Comparison operators.
///
/// The symbol is identical in CQL2-Text and CQL2-JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 6] = [
        ComparisonOp::Equal,
        ComparisonOp::NotEqual,
        ComparisonOp::LessThan,
        ComparisonOp::LessEqual,
        ComparisonOp::GreaterThan,
        ComparisonOp::GreaterEqual,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl LogicalOp {
    /// Upper-case CQL2-Text keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    /// CQL2-JSON `op` value.
    pub fn json_name(self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            LogicalOp::And => PRECEDENCE_AND,
            LogicalOp::Or => PRECEDENCE_OR,
        }
    }
}

/// Spatial relationship operators (`S_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOp {
    Intersects,
    Contains,
    Within,
    Equals,
    Disjoint,
    Touches,
    Overlaps,
    Crosses,
}

impl SpatialOp {
    pub const ALL: [SpatialOp; 8] = [
        SpatialOp::Intersects,
        SpatialOp::Contains,
        SpatialOp::Within,
        SpatialOp::Equals,
        SpatialOp::Disjoint,
        SpatialOp::Touches,
        SpatialOp::Overlaps,
        SpatialOp::Crosses,
    ];

    pub fn json_name(self) -> &'static str {
        match self {
            SpatialOp::Intersects => "s_intersects",
            SpatialOp::Contains => "s_contains",
            SpatialOp::Within => "s_within",
            SpatialOp::Equals => "s_equals",
            SpatialOp::Disjoint => "s_disjoint",
            SpatialOp::Touches => "s_touches",
            SpatialOp::Overlaps => "s_overlaps",
            SpatialOp::Crosses => "s_crosses",
        }
    }

    /// Upper-case text keyword, e.g. `S_INTERSECTS`.
    pub fn keyword(self) -> String {
        self.json_name().to_ascii_uppercase()
    }

    /// Case-sensitive lookup used by the JSON parser.
    pub fn from_json_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.json_name() == name)
    }

    /// Case-insensitive lookup used by the text parser.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.json_name().eq_ignore_ascii_case(word))
    }
}

/// Temporal relationship operators (`T_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalOp {
    After,
    Before,
    During,
    Contains,
    Disjoint,
    Equals,
    Meets,
    MetBy,
    Overlaps,
    OverlappedBy,
    StartedBy,
    Starts,
    FinishedBy,
    Finishes,
    Intersects,
}

impl TemporalOp {
    pub const ALL: [TemporalOp; 15] = [
        TemporalOp::After,
        TemporalOp::Before,
        TemporalOp::During,
        TemporalOp::Contains,
        TemporalOp::Disjoint,
        TemporalOp::Equals,
        TemporalOp::Meets,
        TemporalOp::MetBy,
        TemporalOp::Overlaps,
        TemporalOp::OverlappedBy,
        TemporalOp::StartedBy,
        TemporalOp::Starts,
        TemporalOp::FinishedBy,
        TemporalOp::Finishes,
        TemporalOp::Intersects,
    ];

    /// CQL2-JSON name; the compound relations are camel-cased (`t_metBy`).
    pub fn json_name(self) -> &'static str {
        match self {
            TemporalOp::After => "t_after",
            TemporalOp::Before => "t_before",
            TemporalOp::During => "t_during",
            TemporalOp::Contains => "t_contains",
            TemporalOp::Disjoint => "t_disjoint",
            TemporalOp::Equals => "t_equals",
            TemporalOp::Meets => "t_meets",
            TemporalOp::MetBy => "t_metBy",
            TemporalOp::Overlaps => "t_overlaps",
            TemporalOp::OverlappedBy => "t_overlappedBy",
            TemporalOp::StartedBy => "t_startedBy",
            TemporalOp::Starts => "t_starts",
            TemporalOp::FinishedBy => "t_finishedBy",
            TemporalOp::Finishes => "t_finishes",
            TemporalOp::Intersects => "t_intersects",
        }
    }

    /// Upper-case text keyword, e.g. `T_METBY`.
    pub fn keyword(self) -> String {
        self.json_name().to_ascii_uppercase()
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.json_name() == name)
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.json_name().eq_ignore_ascii_case(word))
    }
}
