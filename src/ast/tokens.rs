use std::fmt;

/// Byte range of a token or node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Source text covered by this span, or `""` if it falls outside `source`.
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer number
    ///
    /// # Examples
    /// ```text
    /// 0
    /// 42
    /// ```
    Integer(i64),

    /// Number with a fractional part
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    /// String literal in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    /// Identifier, following JavaScript rules (`$` and `_` allowed)
    ///
    /// # Examples
    /// ```text
    /// this
    /// arr2
    /// $addFields
    /// ```
    Identifier(String),

    // Keywords
    Function,
    Return,
    Const,
    Let,
    Var,

    // Punctuation
    Dot,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Question,
    /// `=>`
    Arrow,
    /// `=`
    Assign,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `==`
    LooseEq,
    /// `!=`
    LooseNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical
    /// `!`
    Exclamation,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Integer(n) => return write!(f, "number {}", n),
            Token::Float(n) => return write!(f, "number {}", n),
            Token::String(s) => return write!(f, "string {:?}", s),
            Token::Boolean(b) => return write!(f, "`{}`", b),
            Token::Identifier(name) => return write!(f, "identifier `{}`", name),
            Token::Null => "null",
            Token::Function => "function",
            Token::Return => "return",
            Token::Const => "const",
            Token::Let => "let",
            Token::Var => "var",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Question => "?",
            Token::Arrow => "=>",
            Token::Assign => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StrictEq => "===",
            Token::StrictNotEq => "!==",
            Token::LooseEq => "==",
            Token::LooseNotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Exclamation => "!",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Eof => return write!(f, "end of input"),
        };
        write!(f, "`{}`", text)
    }
}

/// A token together with the source range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}
