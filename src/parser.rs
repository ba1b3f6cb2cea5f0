use crate::{
    ast::{
        BinOp, Expr, ExprKind, Function, FunctionBody, FunctionStyle, Literal, NodeId, Param,
        Program, Property, PropertyKey, Span, SpannedToken, Statement, StatementKind, Token,
        TypeExpr, UnaryOp,
    },
    lexer::{LexError, Lexer, Position},
};
use std::mem;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {position}")]
    Expected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("unexpected {found} at {position}")]
    Unexpected { found: String, position: Position },
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    position: usize,
    /// End offset of the last consumed token
    prev_end: usize,
    next_id: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Parser {
            source,
            tokens,
            position: 0,
            prev_end: 0,
            next_id: 0,
        })
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.source.len(), self.source.len()))
    }

    fn advance(&mut self) -> Token {
        let span = self.current_span();
        match self.tokens.get_mut(self.position) {
            Some(spanned) if spanned.token != Token::Eof => {
                self.position += 1;
                self.prev_end = span.end;
                mem::replace(&mut spanned.token, Token::Eof)
            }
            _ => Token::Eof,
        }
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(expected.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.current() {
            Token::Identifier(_) => match self.advance() {
                Token::Identifier(name) => Ok(name),
                _ => unreachable!("checked above"),
            },
            _ => Err(self.expected("identifier".to_string())),
        }
    }

    fn expected(&self, expected: String) -> ParseError {
        ParseError::Expected {
            expected,
            found: self.current().to_string(),
            position: Position::of(self.source, self.current_span().start),
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::Unexpected {
            found: self.current().to_string(),
            position: Position::of(self.source, self.current_span().start),
        }
    }

    fn node(&mut self, start: usize, kind: ExprKind) -> Expr {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Expr {
            id,
            span: Span::new(start, self.prev_end),
            kind,
        }
    }

    fn binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        let start = left.span.start;
        self.node(
            start,
            ExprKind::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    /// Parse primary expressions (atoms): literals, identifiers, groups,
    /// object literals and `function` expressions
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span().start;
        let kind = match self.current() {
            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Boolean(_)
            | Token::Null => {
                let literal = match self.advance() {
                    Token::Integer(n) => Literal::Integer(n),
                    Token::Float(n) => Literal::Float(n),
                    Token::String(s) => Literal::String(s),
                    Token::Boolean(b) => Literal::Boolean(b),
                    _ => Literal::Null,
                };
                ExprKind::Literal(literal)
            }
            Token::Identifier(_) => ExprKind::Identifier(self.expect_identifier()?),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            Token::LBrace => {
                self.advance();
                ExprKind::Object(self.parse_object_literal()?)
            }
            Token::Function => {
                self.advance();
                ExprKind::Function(self.parse_function_expression()?)
            }
            _ => return Err(self.unexpected()),
        };
        Ok(self.node(start, kind))
    }

    fn parse_object_literal(&mut self) -> Result<Vec<Property>, ParseError> {
        let mut properties = vec![];

        while !self.check(&Token::RBrace) {
            let start = self.current_span().start;
            let (key, shorthand_name) = match self.current() {
                Token::Identifier(_) => {
                    let name = self.expect_identifier()?;
                    (PropertyKey::Identifier(name.clone()), Some(name))
                }
                Token::String(_) => match self.advance() {
                    Token::String(s) => (PropertyKey::String(s), None),
                    _ => unreachable!("checked above"),
                },
                Token::Integer(_) => match self.advance() {
                    Token::Integer(n) => (PropertyKey::String(n.to_string()), None),
                    _ => unreachable!("checked above"),
                },
                Token::LBracket => {
                    self.advance();
                    let computed = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    (PropertyKey::Computed(Box::new(computed)), None)
                }
                _ => return Err(self.expected("property name".to_string())),
            };

            let (value, shorthand) = match shorthand_name {
                Some(name) if self.check(&Token::Comma) || self.check(&Token::RBrace) => {
                    (self.node(start, ExprKind::Identifier(name)), true)
                }
                _ => {
                    self.expect(Token::Colon)?;
                    (self.parse_expression()?, false)
                }
            };

            properties.push(Property {
                key,
                value,
                span: Span::new(start, self.prev_end),
                shorthand,
            });

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(properties)
    }

    fn parse_function_expression(&mut self) -> Result<Function, ParseError> {
        // Optional name, ignored
        if matches!(self.current(), Token::Identifier(_)) {
            self.advance();
        }
        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        if self.eat(&Token::Colon) {
            self.parse_type()?;
        }
        self.expect(Token::LBrace)?;
        let body = self.parse_block()?;
        Ok(Function {
            style: FunctionStyle::Expression,
            params,
            body: FunctionBody::Block(body),
        })
    }

    /// Parameters after the opening `(`, through the closing `)`.
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = vec![];
        while !self.check(&Token::RParen) {
            let start = self.current_span().start;
            let name = self.expect_identifier()?;
            let span = Span::new(start, self.prev_end);
            let ty = if self.eat(&Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param { name, span, ty });

            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    /// Statements after the opening `{`, through the closing `}`.
    fn parse_block(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                return Err(self.expected(Token::RBrace.to_string()));
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(statements)
    }

    /// True when the tokens at the cursor start an arrow function.
    fn at_arrow_function(&self) -> bool {
        match self.current() {
            Token::Identifier(_) => matches!(self.peek(1), Token::Arrow),
            Token::LParen => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.peek(offset) {
                        Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                        Token::RParen | Token::RBracket | Token::RBrace => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.peek(offset + 1), Token::Arrow);
                            }
                        }
                        Token::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span().start;
        let params = if self.eat(&Token::LParen) {
            self.parse_params()?
        } else {
            let span = self.current_span();
            let name = self.expect_identifier()?;
            vec![Param {
                name,
                span,
                ty: None,
            }]
        };
        self.expect(Token::Arrow)?;

        let body = if self.eat(&Token::LBrace) {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expr(Box::new(self.parse_expression()?))
        };

        Ok(self.node(
            start,
            ExprKind::Function(Function {
                style: FunctionStyle::Arrow,
                params,
                body,
            }),
        ))
    }

    /// Parse member access, element access and calls
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let start = expr.span.start;
            if self.eat(&Token::Dot) {
                let name = self.expect_identifier()?;
                expr = self.node(
                    start,
                    ExprKind::PropertyAccess {
                        object: Box::new(expr),
                        name,
                    },
                );
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expression()?;
                self.expect(Token::RBracket)?;
                expr = self.node(
                    start,
                    ExprKind::ElementAccess {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                );
            } else if self.eat(&Token::LParen) {
                let mut args = vec![];
                while !self.check(&Token::RParen) {
                    args.push(self.parse_expression()?);
                    if !self.check(&Token::RParen) {
                        self.expect(Token::Comma)?;
                    }
                }
                self.expect(Token::RParen)?;
                expr = self.node(
                    start,
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span().start;
        let op = match self.current() {
            Token::Exclamation => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };
        self.advance();

        // `-3` is a literal, not a negation
        if op == UnaryOp::Negate {
            let literal = match self.current() {
                Token::Integer(n) => Some(Literal::Integer(-n)),
                Token::Float(n) => Some(Literal::Float(-n)),
                _ => None,
            };
            if let Some(literal) = literal {
                if !matches!(self.peek(1), Token::Dot | Token::LBracket | Token::LParen) {
                    self.advance();
                    return Ok(self.node(start, ExprKind::Literal(literal)));
                }
            }
        }

        let operand = self.parse_unary()?;
        Ok(self.node(
            start,
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
        ))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current() {
                Token::Lt => BinOp::LessThan,
                Token::Gt => BinOp::GreaterThan,
                Token::LtEq => BinOp::LessEqual,
                Token::GtEq => BinOp::GreaterEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.current() {
                Token::StrictEq => BinOp::StrictEqual,
                Token::StrictNotEq => BinOp::StrictNotEqual,
                Token::LooseEq => BinOp::LooseEqual,
                Token::LooseNotEq => BinOp::LooseNotEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_relational()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.eat(&Token::AndAnd) {
            let right = self.parse_equality()?;
            left = self.binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.eat(&Token::OrOr) {
            let right = self.parse_and()?;
            left = self.binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }

        let then = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_expression()?;

        let start = condition.span.start;
        Ok(self.node(
            start,
            ExprKind::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
        ))
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        if self.at_arrow_function() {
            self.parse_arrow_function()
        } else {
            self.parse_conditional()
        }
    }

    /// Parse one expression spanning the whole input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.eat(&Token::Semicolon);
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

impl Parser<'_> {
    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = vec![];
        while !self.check(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_span().start;
        let kind = match self.current() {
            Token::Const | Token::Let | Token::Var => {
                self.advance();
                let name = self.expect_identifier()?;
                if self.eat(&Token::Colon) {
                    self.parse_type()?;
                }
                let init = if self.eat(&Token::Assign) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                StatementKind::Declaration { name, init }
            }
            Token::Return => {
                self.advance();
                if self.check(&Token::Semicolon)
                    || self.check(&Token::RBrace)
                    || self.check(&Token::Eof)
                {
                    StatementKind::Return(None)
                } else {
                    StatementKind::Return(Some(self.parse_expression()?))
                }
            }
            _ => StatementKind::Expression(self.parse_expression()?),
        };
        self.eat(&Token::Semicolon);
        Ok(Statement {
            kind,
            span: Span::new(start, self.prev_end),
        })
    }

    /// Parse a type annotation
    pub fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let mut ty = match self.current() {
            Token::LBrace => {
                self.advance();
                self.parse_object_type()?
            }
            Token::Identifier(_) => {
                let name = self.expect_identifier()?;
                let mut args = vec![];
                if self.eat(&Token::Lt) {
                    loop {
                        args.push(self.parse_type()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(Token::Gt)?;
                }
                match (name.as_str(), args.len()) {
                    ("number", 0) => TypeExpr::Number,
                    ("boolean", 0) => TypeExpr::Boolean,
                    ("string", 0) => TypeExpr::String,
                    ("any" | "unknown", 0) => TypeExpr::Any,
                    ("Array", 1) => TypeExpr::Array(Box::new(args.remove(0))),
                    _ => TypeExpr::Named { name, args },
                }
            }
            Token::Null => {
                self.advance();
                TypeExpr::Named {
                    name: "null".to_string(),
                    args: vec![],
                }
            }
            _ => return Err(self.expected("type".to_string())),
        };

        while matches!(self.current(), Token::LBracket) && matches!(self.peek(1), Token::RBracket) {
            self.advance();
            self.advance();
            ty = TypeExpr::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_object_type(&mut self) -> Result<TypeExpr, ParseError> {
        let mut fields = vec![];
        while !self.check(&Token::RBrace) {
            let name = match self.current() {
                Token::String(_) => match self.advance() {
                    Token::String(s) => s,
                    _ => unreachable!("checked above"),
                },
                _ => self.expect_identifier()?,
            };
            // Optional members classify like required ones
            self.eat(&Token::Question);
            self.expect(Token::Colon)?;
            fields.push((name, self.parse_type()?));

            if !self.eat(&Token::Semicolon) && !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(TypeExpr::Object(fields))
    }
}

/// Parse `source` as a single expression.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source)?.parse()
}

/// Parse `source` as a program.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

/// Parse `source` as a type annotation.
pub fn parse_type(source: &str) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new(source)?;
    let ty = parser.parse_type()?;
    parser.expect(Token::Eof)?;
    Ok(ty)
}
