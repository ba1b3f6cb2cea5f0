use tracing::trace;

use crate::{
    ast::{BinOp, Expr, ExprKind, UnaryOp},
    compiler::{
        Binding, Compiler, Scope,
        reference::{self, ContextField},
    },
    error::{CompileError, CompileResult},
    oracle::TypeClass,
    value::Value,
};

impl Compiler<'_> {
    /// Compiles one expression subtree under `scope`.
    ///
    /// Rules are tried in a fixed order and the first that matches wins.
    /// Operands are compiled left to right before their operator is built.
    pub fn compile_in(&self, node: &Expr, scope: &Scope<'_>) -> CompileResult<Value> {
        // Grouping emits nothing of its own
        if let ExprKind::Paren(inner) = &node.kind {
            return self.compile_in(inner, scope);
        }

        if let Some(field) = reference::context_field(node, scope) {
            return match field {
                ContextField::Named(name) => {
                    trace!(field = name, "field reference");
                    reference::field_ref(name, node, self.source)
                }
                ContextField::Computed(_) => Err(CompileError::unsupported(
                    self.snippet(node),
                    "fields of the current document must be named with `.name` or a string literal",
                )),
            };
        }

        match &node.kind {
            ExprKind::BinaryOp { op, left, right } => {
                self.compile_binary(node, *op, left, right, scope)
            }
            ExprKind::UnaryOp { op, operand } => self.compile_unary(node, *op, operand, scope),
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                trace!("$cond");
                let condition = self.compile_in(condition, scope)?;
                let then = self.compile_in(then, scope)?;
                let otherwise = self.compile_in(otherwise, scope)?;
                Ok(Value::named(
                    "$cond",
                    vec![("if", condition), ("then", then), ("else", otherwise)],
                ))
            }
            ExprKind::Literal(literal) => Ok(Value::literal(reference::scalar(literal))),
            ExprKind::PropertyAccess { object, name } => {
                self.compile_property(node, object, name, scope)
            }
            ExprKind::ElementAccess { object, index } => {
                if self.classify(object) != TypeClass::ArrayLike {
                    return Err(self.unsupported_receiver(node, object, "element access"));
                }
                trace!("$arrayElemAt");
                let array = self.compile_in(object, scope)?;
                let index = self.compile_in(index, scope)?;
                Ok(Value::list("$arrayElemAt", vec![array, index]))
            }
            ExprKind::Call { callee, args } => self.compile_call(node, callee, args, scope),
            ExprKind::Identifier(name) => match scope.resolve(name) {
                Some(Binding::Local) => Ok(reference::local_ref(name)),
                Some(Binding::Context) => Err(CompileError::unsupported(
                    self.snippet(node),
                    format!(
                        "the whole document `{}` cannot be used as a value; read one of its fields",
                        name
                    ),
                )),
                None => Err(CompileError::unsupported(
                    self.snippet(node),
                    format!(
                        "`{}` is neither the placeholder nor a filter/map callback parameter",
                        name
                    ),
                )),
            },
            ExprKind::Function(_) => Err(CompileError::unsupported(
                self.snippet(node),
                "functions are only allowed as the callback of `.filter` or `.map`",
            )),
            ExprKind::Object(_) => Err(CompileError::unsupported(
                self.snippet(node),
                "object literals are only allowed as stage arguments",
            )),
            ExprKind::Paren(_) => unreachable!("unwrapped above"),
        }
    }

    fn compile_binary(
        &self,
        node: &Expr,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        let classes = (self.classify(left), self.classify(right));
        let numeric = classes == (TypeClass::Numeric, TypeClass::Numeric);
        let boolean = classes == (TypeClass::Boolean, TypeClass::Boolean);

        let name = match op {
            BinOp::Add if numeric => "$add",
            BinOp::Subtract if numeric => "$subtract",
            BinOp::Multiply if numeric => "$multiply",
            BinOp::Divide if numeric => "$divide",
            BinOp::And if boolean => "$and",
            BinOp::Or if boolean => "$or",
            BinOp::StrictEqual => "$eq",
            BinOp::StrictNotEqual => "$ne",
            BinOp::GreaterThan => "$gt",
            BinOp::GreaterEqual => "$gte",
            BinOp::LessThan => "$lt",
            BinOp::LessEqual => "$lte",
            BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide => {
                return Err(self.operand_mismatch(node, op, "numeric", classes));
            }
            BinOp::And | BinOp::Or => {
                return Err(self.operand_mismatch(node, op, "boolean", classes));
            }
            BinOp::LooseEqual | BinOp::LooseNotEqual => {
                return Err(CompileError::unsupported(
                    self.snippet(node),
                    format!("loose `{}` has no aggregation equivalent; use `{}=`", op, op),
                ));
            }
            BinOp::Modulo => {
                return Err(CompileError::unsupported(
                    self.snippet(node),
                    "`%` is not supported",
                ));
            }
        };

        trace!(operator = name, "binary");
        let left = self.compile_in(left, scope)?;
        let right = self.compile_in(right, scope)?;
        Ok(Value::list(name, vec![left, right]))
    }

    fn compile_unary(
        &self,
        node: &Expr,
        op: UnaryOp,
        operand: &Expr,
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        match op {
            UnaryOp::Not => {
                let class = self.classify(operand);
                if class != TypeClass::Boolean {
                    return Err(CompileError::unsupported(
                        self.snippet(node),
                        format!("`!` requires a boolean operand, found {}", class),
                    ));
                }
                trace!("$not");
                Ok(Value::list("$not", vec![self.compile_in(operand, scope)?]))
            }
            UnaryOp::Negate => Err(CompileError::unsupported(
                self.snippet(node),
                "unary `-` is only supported on numeric literals",
            )),
        }
    }

    fn compile_property(
        &self,
        node: &Expr,
        object: &Expr,
        name: &str,
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        if name != "length" {
            return Err(CompileError::unsupported(
                self.snippet(node),
                format!(
                    "only fields of `{}` and `.length` of arrays can be read",
                    scope.placeholder()
                ),
            ));
        }
        if self.classify(object) != TypeClass::ArrayLike {
            return Err(self.unsupported_receiver(node, object, "`.length`"));
        }
        trace!("$size");
        Ok(Value::single("$size", self.compile_in(object, scope)?))
    }

    fn compile_call(
        &self,
        node: &Expr,
        callee: &Expr,
        args: &[Expr],
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        let ExprKind::PropertyAccess { object, name } = &callee.unparenthesized().kind else {
            return Err(CompileError::unsupported(
                self.snippet(node),
                "only array methods and `Array.isArray` can be called",
            ));
        };

        if object.as_identifier() == Some("Array") && scope.is_free("Array") {
            return self.compile_static_array(node, name, args, scope);
        }

        if scope.is_context(object) {
            return Err(CompileError::unsupported(
                self.snippet(node),
                format!("stage `{}` can only be called in a pipeline builder", name),
            ));
        }

        if self.classify(object) != TypeClass::ArrayLike {
            return Err(self.unsupported_receiver(node, object, &format!("`.{}()`", name)));
        }

        match name.as_str() {
            "concat" => {
                let other = self.single_arg(node, name, args)?;
                if self.classify(other) != TypeClass::ArrayLike {
                    return Err(CompileError::unsupported(
                        self.snippet(node),
                        format!(
                            "`.concat()` requires an array argument, found {}",
                            self.classify(other)
                        ),
                    ));
                }
                trace!("$concatArrays");
                let array = self.compile_in(object, scope)?;
                let other = self.compile_in(other, scope)?;
                Ok(Value::list("$concatArrays", vec![array, other]))
            }
            "filter" => self.compile_iteration(node, "$filter", "cond", object, args, scope),
            "map" => self.compile_iteration(node, "$map", "in", object, args, scope),
            "includes" => {
                let needle = self.single_arg(node, name, args)?;
                trace!("$in");
                // `$in` takes the needle first
                let array = self.compile_in(object, scope)?;
                let needle = self.compile_in(needle, scope)?;
                Ok(Value::list("$in", vec![needle, array]))
            }
            "indexOf" => {
                let needle = self.single_arg(node, name, args)?;
                trace!("$indexOfArray");
                let array = self.compile_in(object, scope)?;
                let needle = self.compile_in(needle, scope)?;
                Ok(Value::list("$indexOfArray", vec![array, needle]))
            }
            "reverse" => {
                if !args.is_empty() {
                    return Err(CompileError::shape(
                        self.snippet(node),
                        format!("`.reverse()` takes no arguments, found {}", args.len()),
                    ));
                }
                trace!("$reverseArray");
                Ok(Value::single("$reverseArray", self.compile_in(object, scope)?))
            }
            _ => Err(CompileError::unsupported(
                self.snippet(node),
                format!("array method `.{}()` is not supported", name),
            )),
        }
    }

    fn compile_static_array(
        &self,
        node: &Expr,
        name: &str,
        args: &[Expr],
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        if name != "isArray" {
            return Err(CompileError::unsupported(
                self.snippet(node),
                format!("`Array.{}` is not supported", name),
            ));
        }
        let candidate = self.single_arg(node, "Array.isArray", args)?;
        let class = self.classify(candidate);
        if class != TypeClass::ArrayLike {
            return Err(CompileError::unsupported(
                self.snippet(node),
                format!("`Array.isArray` requires an array operand, found {}", class),
            ));
        }
        trace!("$isArray");
        Ok(Value::list("$isArray", vec![self.compile_in(candidate, scope)?]))
    }

    /// `$filter` / `$map`: the callback parameter is bound as a local only
    /// while its body compiles.
    fn compile_iteration(
        &self,
        node: &Expr,
        operator: &'static str,
        body_key: &'static str,
        array: &Expr,
        args: &[Expr],
        scope: &Scope<'_>,
    ) -> CompileResult<Value> {
        let method = &operator[1..];
        let callback = self.single_arg(node, method, args)?.unparenthesized();
        let ExprKind::Function(function) = &callback.kind else {
            return Err(CompileError::shape(
                self.snippet(callback),
                format!("`.{}()` expects an inline function such as `(v) => ...`", method),
            ));
        };
        let [param] = function.params.as_slice() else {
            return Err(CompileError::shape(
                self.snippet(callback),
                format!(
                    "`.{}()` callback must take exactly one parameter, found {}",
                    method,
                    function.params.len()
                ),
            ));
        };
        let Some(body) = function.single_return() else {
            return Err(CompileError::shape(
                self.snippet(callback),
                "callback body must be an expression or a single `return` statement",
            ));
        };

        trace!(operator, param = %param.name, "iteration");
        let input = self.compile_in(array, scope)?;
        let local = scope.bind_local(&param.name);
        let body = self.compile_in(body, &local)?;
        Ok(Value::named(
            operator,
            vec![
                ("input", input),
                ("as", Value::Name(param.name.clone())),
                (body_key, body),
            ],
        ))
    }

    fn single_arg<'e>(
        &self,
        node: &Expr,
        method: &str,
        args: &'e [Expr],
    ) -> CompileResult<&'e Expr> {
        match args {
            [arg] => Ok(arg),
            _ => Err(CompileError::shape(
                self.snippet(node),
                format!("`{}` takes exactly one argument, found {}", method, args.len()),
            )),
        }
    }

    fn operand_mismatch(
        &self,
        node: &Expr,
        op: BinOp,
        required: &str,
        (left, right): (TypeClass, TypeClass),
    ) -> CompileError {
        CompileError::unsupported(
            self.snippet(node),
            format!(
                "`{}` requires {} operands, found {} and {}",
                op, required, left, right
            ),
        )
    }

    fn unsupported_receiver(&self, node: &Expr, receiver: &Expr, what: &str) -> CompileError {
        CompileError::unsupported(
            self.snippet(node),
            format!(
                "{} requires an array receiver, found {}",
                what,
                self.classify(receiver)
            ),
        )
    }
}
