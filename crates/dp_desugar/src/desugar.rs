//! Top-level desugaring entry point.
//!
//! Arrow functions are normalized first: the default-parameter pass only
//! recognizes ordinary functions, and an arrow's `arguments` must be captured
//! before `arguments[i]` reads are introduced. [`ArrowFree`] makes the order
//! part of the types.

use swc_ecma_ast as ast;

use crate::arrow::{normalize_arrows, ArrowFree};
use crate::defaults::desugar_defaults;
use crate::error::DesugarError;

/// Lower arrow functions and default parameters in a parsed program.
pub fn transform(program: ast::Program) -> Result<ast::Program, DesugarError> {
    let normalized: ArrowFree = normalize_arrows(program)?;
    desugar_defaults(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_program, parse};

    #[test]
    fn arrows_with_defaults_are_fully_lowered() {
        let program = transform(parse("var inc = (n, by = 1) => n + by;")).unwrap();
        assert_program(
            &program,
            "var inc = function (n) {
                var by = arguments[1] !== void 0 ? arguments[1] : 1;
                return n + by;
            };",
        );
    }

    #[test]
    fn modules_are_lowered_in_place() {
        let program = transform(parse("export default function (a = 1) { return a; }")).unwrap();
        assert_program(
            &program,
            "export default function () {
                var a = arguments[0] !== void 0 ? arguments[0] : 1;
                return a;
            }",
        );
    }

    #[test]
    fn errors_carry_the_function_span() {
        let err = transform(parse("function f(a = 1, ...b) {}")).unwrap_err();
        assert!(!err.span().is_dummy());
        assert_eq!(
            err.to_string(),
            "rest parameter at position 1 follows a default parameter"
        );
    }

    #[test]
    fn arrow_errors_stop_the_pipeline() {
        let err = transform(parse("class A extends B { m(a = 1) { return () => super.m(a); } }"))
            .unwrap_err();
        assert_eq!(err.to_string(), "arrow function uses `super` or `new.target`");
    }
}
