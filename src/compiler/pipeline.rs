use tracing::debug;

use crate::{
    ast::{Expr, ExprKind},
    compiler::{Compiler, Scope, stages},
    error::{CompileError, CompileResult},
    value::{Pipeline, Stage},
};

impl Compiler<'_> {
    /// Assembles `this.$a(..).$b(..)` into `[$a, $b]`.
    ///
    /// The chain is walked down its receivers to the placeholder, then each
    /// call's stage is appended on the way back out, so the stage nearest
    /// the placeholder comes first.
    pub fn assemble_in(&self, root: &Expr, scope: &Scope<'_>) -> CompileResult<Pipeline> {
        let root = root.unparenthesized();
        if scope.is_context(root) {
            return Err(CompileError::malformed_chain(
                self.snippet(root),
                format!(
                    "a pipeline needs at least one stage call, such as `{}.$addFields({{ ... }})`",
                    scope.placeholder()
                ),
            ));
        }
        self.unwind(root, scope).map(Pipeline::from)
    }

    fn unwind(&self, link: &Expr, scope: &Scope<'_>) -> CompileResult<Vec<Stage>> {
        let link = link.unparenthesized();
        let ExprKind::Call { callee, args } = &link.kind else {
            return Err(CompileError::malformed_chain(
                self.snippet(link),
                "expected a stage call",
            ));
        };
        let ExprKind::PropertyAccess { object, name } = &callee.unparenthesized().kind else {
            return Err(CompileError::malformed_chain(
                self.snippet(link),
                "stages must be called as methods, as in `.$addFields(...)`",
            ));
        };

        let receiver = object.unparenthesized();
        let mut stages = if scope.is_context(receiver) {
            Vec::new()
        } else if matches!(receiver.kind, ExprKind::Call { .. }) {
            self.unwind(receiver, scope)?
        } else {
            return Err(CompileError::malformed_chain(
                self.snippet(receiver),
                format!("the chain must start at `{}`", scope.placeholder()),
            ));
        };

        let stage = stages::compile_stage(self, name, link, args, scope)?;
        debug!(stage = stage.name, position = stages.len(), "assembled stage");
        stages.push(stage);
        Ok(stages)
    }
}
