//! Failures of the desugaring passes.

use swc_common::Span;

/// A construct that cannot be lowered.
///
/// Every variant carries the span of the offending function or expression so
/// front ends can point at it. The passes consume their input, so a failed run
/// never hands back a partially rewritten tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesugarError {
    /// `function f(a = 1, ...rest)`: moving `rest` into the body would need
    /// rest-parameter lowering.
    #[error("rest parameter at position {index} follows a default parameter")]
    RestAfterDefault { span: Span, index: usize },

    /// A function declares defaults but has no body to put them in.
    #[error("function with default parameters has no body")]
    MissingBody { span: Span },

    /// `set x({ a } = {})`: a setter keeps its single parameter, so the
    /// default needs a plain name to rebind.
    #[error("setter parameter with a default must be a plain identifier")]
    SetterPattern { span: Span },

    /// A parameter slot that is not a binding pattern.
    #[error("parameter at position {index} is not a binding pattern")]
    InvalidParam { span: Span, index: usize },

    /// A derived constructor whose arrows use `this`, but whose `super(...)`
    /// call is not a top-level statement of the body. `var _this = this;`
    /// would have to run before `this` is initialized.
    #[error("`this` in an arrow needs a top-level super() call in this constructor")]
    CaptureBeforeSuper { span: Span },

    /// `super` and `new.target` inside an arrow refer to the enclosing
    /// method; a plain function cannot see them.
    #[error("arrow function uses `super` or `new.target`")]
    ArrowSuper { span: Span },
}

impl DesugarError {
    pub fn span(&self) -> Span {
        match self {
            DesugarError::RestAfterDefault { span, .. }
            | DesugarError::MissingBody { span }
            | DesugarError::SetterPattern { span }
            | DesugarError::InvalidParam { span, .. }
            | DesugarError::CaptureBeforeSuper { span }
            | DesugarError::ArrowSuper { span } => *span,
        }
    }
}
