use crate::ast::{BinOp, Span, Statement, TypeExpr, UnaryOp};

/// Identity of a node within one parse. Oracles key their answers on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Expression node: the parsed shape plus where it came from.
///
/// The parser hands these out and nothing downstream mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Bare name, including `this`
    ///
    /// # Examples
    /// ```text
    /// this
    /// va
    /// Array
    /// ```
    Identifier(String),

    /// Scalar literal
    Literal(Literal),

    /// Parenthesized expression, kept so diagnostics can point at it
    Paren(Box<Expr>),

    /// `object.name`
    ///
    /// # Examples
    /// ```text
    /// this.foo
    /// this.arr.length
    /// ```
    PropertyAccess { object: Box<Expr>, name: String },

    /// `object[index]`
    ///
    /// # Examples
    /// ```text
    /// this.arr[2]
    /// this["foo"]
    /// ```
    ElementAccess { object: Box<Expr>, index: Box<Expr> },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix unary operation
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// `condition ? then : otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// Call of any callee
    ///
    /// # Examples
    /// ```text
    /// this.arr.includes(3)
    /// Array.isArray(this.arr)
    /// this.$addFields({ bar: this.foo })
    /// ```
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// Arrow function or `function` expression
    Function(Function),

    /// Object literal
    ///
    /// # Example
    /// ```text
    /// { bar: this.foo, "total": this.na + this.nb }
    /// ```
    Object(Vec<Property>),
}

impl Expr {
    /// Syntactic kind, named the way diagnostics report it.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Identifier(_) => "Identifier",
            ExprKind::Literal(lit) => lit.kind_name(),
            ExprKind::Paren(_) => "ParenthesizedExpression",
            ExprKind::PropertyAccess { .. } => "PropertyAccessExpression",
            ExprKind::ElementAccess { .. } => "ElementAccessExpression",
            ExprKind::BinaryOp { .. } => "BinaryExpression",
            ExprKind::UnaryOp { .. } => "PrefixUnaryExpression",
            ExprKind::Conditional { .. } => "ConditionalExpression",
            ExprKind::Call { .. } => "CallExpression",
            ExprKind::Function(f) => match f.style {
                FunctionStyle::Arrow => "ArrowFunction",
                FunctionStyle::Expression => "FunctionExpression",
            },
            ExprKind::Object(_) => "ObjectLiteralExpression",
        }
    }

    /// Strips any number of grouping parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// Scalar literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Literal {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) | Literal::Float(_) => "NumericLiteral",
            Literal::String(_) => "StringLiteral",
            Literal::Boolean(true) => "TrueKeyword",
            Literal::Boolean(false) => "FalseKeyword",
            Literal::Null => "NullKeyword",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionStyle {
    /// `(v) => body`
    Arrow,
    /// `function (this: T) { ... }`
    Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub style: FunctionStyle,
    pub params: Vec<Param>,
    pub body: FunctionBody,
}

impl Function {
    /// The expression returned by a body that is exactly `return e;`
    /// or an arrow expression body.
    pub fn single_return(&self) -> Option<&Expr> {
        match &self.body {
            FunctionBody::Expr(expr) => Some(expr),
            FunctionBody::Block(statements) => match statements.as_slice() {
                [stmt] => stmt.returned(),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub span: Span,
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// Arrow function expression body
    Expr(Box<Expr>),
    /// `{ statements }`
    Block(Vec<Statement>),
}

/// One entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub span: Span,
    /// `{ foo }` rather than `{ foo: foo }`
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Computed(Box<Expr>),
}
