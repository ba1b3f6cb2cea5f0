use std::collections::HashMap;

use tracing::trace;

use crate::{
    ast::{
        BinOp, Expr, ExprKind, Function, FunctionBody, Literal, NodeId, PropertyKey, TypeExpr,
        UnaryOp,
    },
    oracle::{TypeClass, TypeOracle},
};

/// Structural type of a node, as far as the placeholder annotation tells.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Number,
    Boolean,
    String,
    Array(Box<Ty>),
    Object(Vec<(String, Ty)>),
    Unknown,
}

impl Ty {
    fn class(&self) -> TypeClass {
        match self {
            Ty::Number => TypeClass::Numeric,
            Ty::Boolean => TypeClass::Boolean,
            Ty::Array(_) => TypeClass::ArrayLike,
            Ty::String | Ty::Object(_) | Ty::Unknown => TypeClass::Unknown,
        }
    }

    fn field(&self, name: &str) -> Ty {
        match self {
            Ty::Object(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, ty)| ty.clone())
                .unwrap_or(Ty::Unknown),
            _ => Ty::Unknown,
        }
    }

    fn element(&self) -> Ty {
        match self {
            Ty::Array(element) => (**element).clone(),
            _ => Ty::Unknown,
        }
    }
}

impl From<&TypeExpr> for Ty {
    fn from(ty: &TypeExpr) -> Self {
        match ty {
            TypeExpr::Number => Ty::Number,
            TypeExpr::Boolean => Ty::Boolean,
            TypeExpr::String => Ty::String,
            TypeExpr::Any => Ty::Unknown,
            TypeExpr::Array(element) => Ty::Array(Box::new(Ty::from(element.as_ref()))),
            TypeExpr::Object(fields) => Ty::Object(
                fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), Ty::from(ty)))
                    .collect(),
            ),
            // Wrappers such as `Aggregate<T>` describe the document `T`
            TypeExpr::Named { args, .. } => args.first().map(Ty::from).unwrap_or(Ty::Unknown),
        }
    }
}

/// Oracle deriving classifications from the placeholder's type annotation.
///
/// Built once per entry point by walking the returned expression; lookups
/// are by [`NodeId`], so it only answers for nodes of that walk.
#[derive(Debug, Clone, Default)]
pub struct DeclaredTypes {
    types: HashMap<NodeId, Ty>,
}

impl DeclaredTypes {
    /// Types every node under `root`, with `placeholder` bound to `context`.
    pub fn infer(root: &Expr, placeholder: &str, context: Option<&TypeExpr>) -> Self {
        let context = context.map(Ty::from).unwrap_or(Ty::Unknown);
        let mut walker = Walker {
            placeholder,
            context,
            locals: Vec::new(),
            types: HashMap::new(),
        };
        walker.visit(root);
        DeclaredTypes {
            types: walker.types,
        }
    }

    pub fn type_of(&self, node: &Expr) -> Option<&Ty> {
        self.types.get(&node.id)
    }
}

impl TypeOracle for DeclaredTypes {
    fn classify(&self, node: &Expr) -> TypeClass {
        self.type_of(node).map(Ty::class).unwrap_or(TypeClass::Unknown)
    }
}

struct Walker<'a> {
    placeholder: &'a str,
    context: Ty,
    /// Inline-function parameters in scope, innermost last
    locals: Vec<(String, Ty)>,
    types: HashMap<NodeId, Ty>,
}

impl Walker<'_> {
    fn visit(&mut self, expr: &Expr) -> Ty {
        let ty = self.infer(expr);
        self.types.insert(expr.id, ty.clone());
        ty
    }

    fn infer(&mut self, expr: &Expr) -> Ty {
        match &expr.kind {
            ExprKind::Identifier(name) => self.lookup(name),
            ExprKind::Literal(literal) => match literal {
                Literal::Integer(_) | Literal::Float(_) => Ty::Number,
                Literal::String(_) => Ty::String,
                Literal::Boolean(_) => Ty::Boolean,
                Literal::Null => Ty::Unknown,
            },
            ExprKind::Paren(inner) => self.visit(inner),
            ExprKind::PropertyAccess { object, name } => {
                let object = self.visit(object);
                match (&object, name.as_str()) {
                    (Ty::Array(_) | Ty::String, "length") => Ty::Number,
                    _ => object.field(name),
                }
            }
            ExprKind::ElementAccess { object, index } => {
                let object = self.visit(object);
                self.visit(index);
                match (&object, &index.kind) {
                    (Ty::Array(_), _) => object.element(),
                    (Ty::Object(_), ExprKind::Literal(Literal::String(key))) => object.field(key),
                    _ => Ty::Unknown,
                }
            }
            ExprKind::BinaryOp { op, left, right } => {
                let left = self.visit(left);
                let right = self.visit(right);
                match op {
                    BinOp::Add if left == Ty::String || right == Ty::String => Ty::String,
                    op if op.is_arithmetic() && left == Ty::Number && right == Ty::Number => {
                        Ty::Number
                    }
                    op if op.is_comparison() => Ty::Boolean,
                    BinOp::And | BinOp::Or if left == Ty::Boolean && right == Ty::Boolean => {
                        Ty::Boolean
                    }
                    _ => Ty::Unknown,
                }
            }
            ExprKind::UnaryOp { op, operand } => {
                let operand = self.visit(operand);
                match op {
                    UnaryOp::Not => Ty::Boolean,
                    UnaryOp::Negate if operand == Ty::Number => Ty::Number,
                    UnaryOp::Negate => Ty::Unknown,
                }
            }
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                self.visit(condition);
                let then = self.visit(then);
                let otherwise = self.visit(otherwise);
                if then == otherwise { then } else { Ty::Unknown }
            }
            ExprKind::Call { callee, args } => self.infer_call(callee, args),
            ExprKind::Function(function) => {
                self.visit_function(function, Ty::Unknown);
                Ty::Unknown
            }
            ExprKind::Object(properties) => {
                let mut fields = Vec::new();
                for property in properties {
                    if let PropertyKey::Computed(key) = &property.key {
                        self.visit(key);
                    }
                    let ty = self.visit(&property.value);
                    match &property.key {
                        PropertyKey::Identifier(name) | PropertyKey::String(name) => {
                            fields.push((name.clone(), ty));
                        }
                        PropertyKey::Computed(_) => {}
                    }
                }
                Ty::Object(fields)
            }
        }
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr]) -> Ty {
        let ExprKind::PropertyAccess { object, name } = &callee.kind else {
            self.visit(callee);
            self.visit_all(args);
            return Ty::Unknown;
        };
        self.types.insert(callee.id, Ty::Unknown);

        if object.as_identifier() == Some("Array") && self.is_free("Array") && name == "isArray" {
            self.types.insert(object.id, Ty::Unknown);
            self.visit_all(args);
            return Ty::Boolean;
        }

        let receiver = self.visit(object);
        if !matches!(receiver, Ty::Array(_)) {
            self.visit_all(args);
            return Ty::Unknown;
        }

        let element = receiver.element();
        match (name.as_str(), args) {
            ("filter", [callback]) => {
                self.visit_callback(callback, element);
                receiver
            }
            ("map", [callback]) => {
                let body = self.visit_callback(callback, element);
                Ty::Array(Box::new(body))
            }
            ("concat" | "reverse", _) => {
                self.visit_all(args);
                receiver
            }
            ("includes", _) => {
                self.visit_all(args);
                Ty::Boolean
            }
            ("indexOf", _) => {
                self.visit_all(args);
                Ty::Number
            }
            _ => {
                self.visit_all(args);
                Ty::Unknown
            }
        }
    }

    /// Types a `.filter`/`.map` callback; returns its body type.
    fn visit_callback(&mut self, callback: &Expr, element: Ty) -> Ty {
        let target = callback.unparenthesized();
        let ExprKind::Function(function) = &target.kind else {
            self.visit(callback);
            return Ty::Unknown;
        };
        if !std::ptr::eq(target, callback) {
            self.types.insert(callback.id, Ty::Unknown);
        }
        self.types.insert(target.id, Ty::Unknown);
        self.visit_function(function, element)
    }

    /// Binds the first parameter to `first` and types the body.
    fn visit_function(&mut self, function: &Function, first: Ty) -> Ty {
        let depth = self.locals.len();
        let mut first = Some(first);
        for param in &function.params {
            let ty = param
                .ty
                .as_ref()
                .map(Ty::from)
                .or_else(|| first.take())
                .unwrap_or(Ty::Unknown);
            first = None;
            self.locals.push((param.name.clone(), ty));
        }

        let ty = match &function.body {
            FunctionBody::Expr(body) => self.visit(body),
            FunctionBody::Block(_) => match function.single_return() {
                Some(body) => self.visit(body),
                None => Ty::Unknown,
            },
        };
        self.locals.truncate(depth);
        trace!(?ty, "typed inline function body");
        ty
    }

    fn visit_all(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit(expr);
        }
    }

    fn lookup(&self, name: &str) -> Ty {
        if let Some((_, ty)) = self.locals.iter().rev().find(|(local, _)| local == name) {
            return ty.clone();
        }
        if name == self.placeholder {
            return self.context.clone();
        }
        Ty::Unknown
    }

    fn is_free(&self, name: &str) -> bool {
        name != self.placeholder && !self.locals.iter().any(|(local, _)| local == name)
    }
}
