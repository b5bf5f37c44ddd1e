use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Number with optional sign, fraction and exponent
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3.5
    /// 1.2e-3
    /// ```
    Number(f64),

    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "satellite"
    /// "say \"hi\""
    /// ```
    String(String),

    /// `TRUE` / `FALSE`, any case
    Boolean(bool),

    /// `NULL`
    Null,

    /// Property name
    ///
    /// Starts with a letter or underscore; may continue with letters, digits,
    /// underscores, colons and dots.
    ///
    /// # Examples
    /// ```text
    /// cloud_cover
    /// eo:cloud_cover
    /// properties.datetime
    /// ```
    Identifier(String),

    // Keywords
    And,
    Or,
    Not,
    Like,
    In,
    Is,
    Between,

    // Comparison
    /// `=`
    Eq,
    /// `<>` (or `!=`)
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// Separates interval bounds: `[a / b]`
    Slash,

    /// End of input
    Eof,
}

impl Token {
    /// Reserved words, matched case-insensitively.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "LIKE" => Token::Like,
            "IN" => Token::In,
            "IS" => Token::Is,
            "BETWEEN" => Token::Between,
            "NULL" => Token::Null,
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Boolean(true) => write!(f, "TRUE"),
            Token::Boolean(false) => write!(f, "FALSE"),
            Token::Null => write!(f, "NULL"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::In => write!(f, "IN"),
            Token::Is => write!(f, "IS"),
            Token::Between => write!(f, "BETWEEN"),
            Token::Eq => write!(f, "'='"),
            Token::NotEq => write!(f, "'<>'"),
            Token::Lt => write!(f, "'<'"),
            Token::LtEq => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::GtEq => write!(f, "'>='"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Slash => write!(f, "'/'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
