use std::fmt;

use crate::ast::{Span, SpannedToken, Token};

/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Locate `offset` in `source`. Offsets past the end map to the last position.
    pub fn of(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{ch}' at {position}")]
    InvalidEscape { ch: char, position: Position },

    #[error("invalid number `{text}` at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("unterminated block comment starting at {position}")]
    UnterminatedComment { position: Position },
}

pub struct Lexer<'a> {
    source: &'a str,
    input: Vec<(usize, char)>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            input: source.char_indices().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).map(|&(_, ch)| ch)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|&(_, ch)| ch)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Byte offset of the current character.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|&(idx, _)| idx)
            .unwrap_or(self.source.len())
    }

    fn here(&self) -> Position {
        Position::of(self.source, self.offset())
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let position = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => return Err(LexError::UnterminatedComment { position }),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('0') => result.push('\0'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                position: self.here(),
                            });
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let position = self.here();
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if matches!(ch, 'e' | 'E') {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        if self.current_char().is_some_and(is_identifier_start) {
            number.push_str(&self.read_identifier());
            return Err(LexError::InvalidNumber {
                text: number,
                position,
            });
        }

        if !is_float {
            if let Ok(n) = number.parse::<i64>() {
                return Ok(Token::Integer(n));
            }
        }
        number
            .parse::<f64>()
            .map(Token::Float)
            .map_err(|_| LexError::InvalidNumber {
                text: number,
                position,
            })
    }

    /// Consume `len` characters and produce `token`.
    fn single(&mut self, len: usize, token: Token) -> Token {
        for _ in 0..len {
            self.advance();
        }
        token
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_trivia()?;
        let start = self.offset();

        let token = match (self.current_char(), self.peek_char(1), self.peek_char(2)) {
            (None, _, _) => Token::Eof,
            (Some('.'), _, _) => self.single(1, Token::Dot),
            (Some(','), _, _) => self.single(1, Token::Comma),
            (Some(':'), _, _) => self.single(1, Token::Colon),
            (Some(';'), _, _) => self.single(1, Token::Semicolon),
            (Some('('), _, _) => self.single(1, Token::LParen),
            (Some(')'), _, _) => self.single(1, Token::RParen),
            (Some('{'), _, _) => self.single(1, Token::LBrace),
            (Some('}'), _, _) => self.single(1, Token::RBrace),
            (Some('['), _, _) => self.single(1, Token::LBracket),
            (Some(']'), _, _) => self.single(1, Token::RBracket),
            (Some('?'), _, _) => self.single(1, Token::Question),
            (Some('+'), _, _) => self.single(1, Token::Plus),
            (Some('-'), _, _) => self.single(1, Token::Minus),
            (Some('*'), _, _) => self.single(1, Token::Star),
            (Some('/'), _, _) => self.single(1, Token::Slash),
            (Some('%'), _, _) => self.single(1, Token::Percent),
            (Some('='), Some('='), Some('=')) => self.single(3, Token::StrictEq),
            (Some('='), Some('='), _) => self.single(2, Token::LooseEq),
            (Some('='), Some('>'), _) => self.single(2, Token::Arrow),
            (Some('='), _, _) => self.single(1, Token::Assign),
            (Some('!'), Some('='), Some('=')) => self.single(3, Token::StrictNotEq),
            (Some('!'), Some('='), _) => self.single(2, Token::LooseNotEq),
            (Some('!'), _, _) => self.single(1, Token::Exclamation),
            (Some('>'), Some('='), _) => self.single(2, Token::GtEq),
            (Some('>'), _, _) => self.single(1, Token::Gt),
            (Some('<'), Some('='), _) => self.single(2, Token::LtEq),
            (Some('<'), _, _) => self.single(1, Token::Lt),
            (Some('&'), Some('&'), _) => self.single(2, Token::AndAnd),
            (Some('|'), Some('|'), _) => self.single(2, Token::OrOr),
            (Some(quote @ ('"' | '\'')), _, _) => Token::String(self.read_string(quote)?),
            (Some(ch), _, _) if ch.is_ascii_digit() => self.read_number()?,
            (Some(ch), _, _) if is_identifier_start(ch) => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "function" => Token::Function,
                    "return" => Token::Return,
                    "const" => Token::Const,
                    "let" => Token::Let,
                    "var" => Token::Var,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Identifier(ident),
                }
            }
            (Some(ch), _, _) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.here(),
                });
            }
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.offset()),
        })
    }

    /// Lex the whole input. The last token is always [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let next = self.next_token()?;
            let done = next.token == Token::Eof;
            tokens.push(next);
            if done {
                return Ok(tokens);
            }
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
