/// Type annotation on a function parameter.
///
/// Only what is needed to classify placeholder fields is kept; anything
/// else parses into [`TypeExpr::Named`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Number,
    Boolean,
    String,
    /// `any`, `unknown`
    Any,
    /// `T[]` or `Array<T>`
    Array(Box<TypeExpr>),
    /// `{ a: T; b: U }`
    Object(Vec<(String, TypeExpr)>),
    /// Any other named type, with its generic arguments
    ///
    /// # Example
    /// ```text
    /// Aggregate<{ foo: string }>
    /// ```
    Named { name: String, args: Vec<TypeExpr> },
}
