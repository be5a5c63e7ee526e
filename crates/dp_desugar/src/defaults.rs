//! Default-parameter lowering.
//!
//! ```js
//! function add(a = 0, b = 0) { return a + b; }
//! // becomes
//! function add() {
//!     var a = arguments[0] !== void 0 ? arguments[0] : 0;
//!     var b = arguments[1] !== void 0 ? arguments[1] : 0;
//!     return a + b;
//! }
//! ```
//!
//! The declared list is cut at the first defaulted parameter. Any plain
//! parameter after that point is rebound as `var p = arguments[i];`, so the
//! function keeps the ES2015 `length` (the count of parameters before the
//! first default). Each default is evaluated only when its argument is
//! missing or `undefined`, in parameter order, after earlier parameters are
//! already bound.
//!
//! Generators are lowered the same way, so their defaults run at the first
//! `.next()` rather than when the generator function is called:
//!
//! ```js
//! function* g(a = f()) { yield a; }
//! g();        // ES2015 calls f() here
//! g().next(); // the lowered form calls it here
//! ```

use swc_common::{Span, Spanned};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::arrow::ArrowFree;
use crate::builders::{argument_at, argument_or, directive_len, prepend, var_stmt};
use crate::error::DesugarError;
use crate::names::Captures;

/// Replace every default parameter in the program with a guarded `var`.
///
/// The input is consumed; on error nothing of the partially rewritten tree is
/// returned.
pub fn desugar_defaults(input: ArrowFree) -> Result<ast::Program, DesugarError> {
    let (mut program, captures) = input.into_parts();

    let mut pass = DefaultParams {
        captures: &captures,
        error: None,
        lowered: 0,
    };
    program.visit_mut_with(&mut pass);

    if let Some(err) = pass.error {
        return Err(err);
    }
    tracing::debug!(functions = pass.lowered, "desugared default parameters");
    Ok(program)
}

struct DefaultParams<'a> {
    captures: &'a Captures,
    error: Option<DesugarError>,
    lowered: usize,
}

impl DefaultParams<'_> {
    fn record(&mut self, result: Result<bool, DesugarError>) {
        match result {
            Ok(true) => self.lowered += 1,
            Ok(false) => {}
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }

    fn lower_setter_function(&mut self, node: &mut ast::Function) {
        node.visit_mut_children_with(self);
        let result = match node.params.as_mut_slice() {
            [param] => lower_setter(&mut param.pat, node.body.as_mut(), node.span, self.captures),
            _ => Ok(false),
        };
        self.record(result);
    }
}

impl VisitMut for DefaultParams<'_> {
    fn visit_mut_function(&mut self, node: &mut ast::Function) {
        if self.failed() {
            return;
        }
        node.visit_mut_children_with(self);
        let result = lower_params(&mut node.params, node.body.as_mut(), node.span, self.captures);
        self.record(result);
    }

    fn visit_mut_constructor(&mut self, node: &mut ast::Constructor) {
        if self.failed() {
            return;
        }
        node.visit_mut_children_with(self);

        // TypeScript parameter properties have no ES5 counterpart here.
        if !node
            .params
            .iter()
            .all(|p| matches!(p, ast::ParamOrTsParamProp::Param(_)))
        {
            return;
        }
        let mut params: Vec<ast::Param> = std::mem::take(&mut node.params)
            .into_iter()
            .filter_map(|p| match p {
                ast::ParamOrTsParamProp::Param(param) => Some(param),
                ast::ParamOrTsParamProp::TsParamProp(_) => None,
            })
            .collect();
        let result = lower_params(&mut params, node.body.as_mut(), node.span, self.captures);
        node.params = params.into_iter().map(ast::ParamOrTsParamProp::Param).collect();
        self.record(result);
    }

    fn visit_mut_class_method(&mut self, node: &mut ast::ClassMethod) {
        if self.failed() {
            return;
        }
        if node.kind != ast::MethodKind::Setter {
            node.visit_mut_children_with(self);
            return;
        }
        node.key.visit_mut_with(self);
        self.lower_setter_function(&mut node.function);
    }

    fn visit_mut_private_method(&mut self, node: &mut ast::PrivateMethod) {
        if self.failed() {
            return;
        }
        if node.kind != ast::MethodKind::Setter {
            node.visit_mut_children_with(self);
            return;
        }
        self.lower_setter_function(&mut node.function);
    }

    fn visit_mut_setter_prop(&mut self, node: &mut ast::SetterProp) {
        if self.failed() {
            return;
        }
        node.visit_mut_children_with(self);
        let result = lower_setter(&mut node.param, node.body.as_mut(), node.span, self.captures);
        self.record(result);
    }
}

/// Lower the defaults of one parameter list into `body`.
///
/// Returns whether anything was rewritten. Every check runs before the
/// parameter list or body is touched.
fn lower_params(
    params: &mut Vec<ast::Param>,
    body: Option<&mut ast::BlockStmt>,
    span: Span,
    captures: &Captures,
) -> Result<bool, DesugarError> {
    let Some(first) = params.iter().position(|p| matches!(p.pat, ast::Pat::Assign(_))) else {
        return Ok(false);
    };
    let Some(body) = body else {
        return Err(DesugarError::MissingBody { span });
    };

    for (index, param) in params.iter().enumerate().skip(first) {
        match &param.pat {
            ast::Pat::Rest(_) => return Err(DesugarError::RestAfterDefault { span, index }),
            pat if !is_binding(pat) => return Err(DesugarError::InvalidParam { span, index }),
            _ => {}
        }
    }

    let decls: Vec<ast::Stmt> = params
        .drain(first..)
        .enumerate()
        .map(|(offset, param)| bind_argument(first + offset, param.pat))
        .collect();

    tracing::debug!(?span, arity = first, generated = decls.len(), "lowered default parameters");

    let at = capture_prologue_len(&body.stmts, captures);
    prepend(&mut body.stmts, at, decls);
    Ok(true)
}

/// A setter must keep exactly one parameter, so `set x(v = d)` becomes
/// `set x(v) { var v = arguments[0] !== void 0 ? arguments[0] : d; ... }`.
fn lower_setter(
    pat: &mut ast::Pat,
    body: Option<&mut ast::BlockStmt>,
    span: Span,
    captures: &Captures,
) -> Result<bool, DesugarError> {
    let ast::Pat::Assign(assign) = pat else {
        return Ok(false);
    };
    let ast::Pat::Ident(name) = &*assign.left else {
        return Err(DesugarError::SetterPattern { span });
    };
    let Some(body) = body else {
        return Err(DesugarError::MissingBody { span });
    };

    let name = name.clone();
    let decl = var_stmt(
        ast::Pat::Ident(name.clone()),
        argument_or(0, assign.right.clone(), assign.span),
        assign.span,
    );
    *pat = ast::Pat::Ident(name);

    let at = capture_prologue_len(&body.stmts, captures);
    prepend(&mut body.stmts, at, [decl]);
    Ok(true)
}

/// `var p = arguments[i] !== void 0 ? arguments[i] : d;` for `p = d`,
/// `var p = arguments[i];` for a plain `p`.
fn bind_argument(index: usize, pat: ast::Pat) -> ast::Stmt {
    match pat {
        ast::Pat::Assign(ast::AssignPat {
            span, left, right, ..
        }) => var_stmt(*left, argument_or(index, right, span), span),
        other => {
            let span = other.span();
            var_stmt(other, argument_at(index, span), span)
        }
    }
}

fn is_binding(pat: &ast::Pat) -> bool {
    match pat {
        ast::Pat::Ident(_) | ast::Pat::Array(_) | ast::Pat::Object(_) => true,
        ast::Pat::Assign(assign) => is_binding(&assign.left),
        _ => false,
    }
}

/// Number of leading directives plus the `var _this = this;` /
/// `var _arguments = arguments;` statements after them. Defaults go after
/// both so captured values are bound first.
fn capture_prologue_len(stmts: &[ast::Stmt], captures: &Captures) -> usize {
    let directives = directive_len(stmts);
    directives
        + stmts[directives..]
            .iter()
            .take_while(|stmt| is_capture(stmt, captures))
            .count()
}

fn is_capture(stmt: &ast::Stmt, captures: &Captures) -> bool {
    let ast::Stmt::Decl(ast::Decl::Var(var)) = stmt else {
        return false;
    };
    let [ast::VarDeclarator {
        name: ast::Pat::Ident(binding),
        init: Some(init),
        ..
    }] = var.decls.as_slice()
    else {
        return false;
    };
    captures.contains(&binding.id.sym)
        && match &**init {
            ast::Expr::This(_) => true,
            ast::Expr::Ident(id) => &*id.sym == "arguments",
            _ => false,
        }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrow::normalize_arrows;
    use crate::test_util::{assert_program, parse};
    use pretty_assertions::assert_eq;

    fn lower(source: &str) -> Result<ast::Program, DesugarError> {
        desugar_defaults(normalize_arrows(parse(source))?)
    }

    #[test]
    fn functions_without_defaults_are_unchanged() {
        let source = "function f(a, b) { return a + b; } var g = function (x, { y }) { return x; };";
        assert_eq!(lower(source).unwrap(), parse(source));
    }

    #[test]
    fn trailing_defaults_move_into_the_body() {
        let program = lower("function add(a = 0, b = 0) { return a + b; }").unwrap();
        assert_program(
            &program,
            "function add() {
                var a = arguments[0] !== void 0 ? arguments[0] : 0;
                var b = arguments[1] !== void 0 ? arguments[1] : 0;
                return a + b;
            }",
        );
    }

    #[test]
    fn leading_plain_params_are_kept() {
        let program = lower("function f(a, b = 2) { return a * b; }").unwrap();
        assert_program(
            &program,
            "function f(a) {
                var b = arguments[1] !== void 0 ? arguments[1] : 2;
                return a * b;
            }",
        );
    }

    #[test]
    fn later_defaults_see_earlier_bindings() {
        let program = lower("function f(a = 1, b = a + 1) { return b; }").unwrap();
        assert_program(
            &program,
            "function f() {
                var a = arguments[0] !== void 0 ? arguments[0] : 1;
                var b = arguments[1] !== void 0 ? arguments[1] : a + 1;
                return b;
            }",
        );
    }

    #[test]
    fn default_is_only_in_the_fallback_branch() {
        let program = lower("function f(a = tick()) {}").unwrap();
        let ast::Program::Script(script) = &program else {
            panic!("expected a script");
        };
        let ast::Stmt::Decl(ast::Decl::Fn(decl)) = &script.body[0] else {
            panic!("expected a function declaration");
        };
        let body = decl.function.body.as_ref().unwrap();
        let ast::Stmt::Decl(ast::Decl::Var(var)) = &body.stmts[0] else {
            panic!("expected a var declaration");
        };
        let init = var.decls[0].init.as_deref().unwrap();
        let ast::Expr::Cond(cond) = init else {
            panic!("expected a conditional, got {init:?}");
        };
        assert!(matches!(&*cond.alt, ast::Expr::Call(_)));
        assert!(matches!(&*cond.cons, ast::Expr::Member(_)));
    }

    #[test]
    fn plain_params_after_a_default_are_rebound() {
        let program = lower("function f(a = 1, b) { return [a, b]; }").unwrap();
        assert_program(
            &program,
            "function f() {
                var a = arguments[0] !== void 0 ? arguments[0] : 1;
                var b = arguments[1];
                return [a, b];
            }",
        );
    }

    #[test]
    fn nested_functions_are_desugared() {
        let program =
            lower("function outer(x = 1) { function inner(y = x) { return y; } return inner(); }")
                .unwrap();
        assert_program(
            &program,
            "function outer() {
                var x = arguments[0] !== void 0 ? arguments[0] : 1;
                function inner() {
                    var y = arguments[0] !== void 0 ? arguments[0] : x;
                    return y;
                }
                return inner();
            }",
        );
    }

    #[test]
    fn functions_inside_defaults_are_desugared() {
        let program = lower("function f(g = function (n = 0) { return n; }) { return g(); }").unwrap();
        assert_program(
            &program,
            "function f() {
                var g = arguments[0] !== void 0 ? arguments[0] : function () {
                    var n = arguments[0] !== void 0 ? arguments[0] : 0;
                    return n;
                };
                return g();
            }",
        );
    }

    #[test]
    fn arrow_defaults_read_their_own_arguments() {
        let program = lower("function f() { return (a = arguments.length) => a; }").unwrap();
        assert_program(
            &program,
            "function f() {
                var _arguments = arguments;
                return function () {
                    var a = arguments[0] !== void 0 ? arguments[0] : _arguments.length;
                    return a;
                };
            }",
        );
    }

    #[test]
    fn defaults_follow_the_capture_prologue() {
        let program = lower("function f(a = 1) { return () => this; }").unwrap();
        assert_program(
            &program,
            "function f() {
                var _this = this;
                var a = arguments[0] !== void 0 ? arguments[0] : 1;
                return function () { return _this; };
            }",
        );
    }

    #[test]
    fn defaults_follow_directives_and_captures() {
        let program =
            lower("var o = { m(a = 1) { 'use asm'; return () => this; } };").unwrap();
        assert_program(
            &program,
            "var o = {
                m() {
                    'use asm';
                    var _this = this;
                    var a = arguments[0] !== void 0 ? arguments[0] : 1;
                    return function () { return _this; };
                }
            };",
        );
    }

    #[test]
    fn generator_defaults_move_into_the_body() {
        let program = lower("function* g(a = f()) { yield a; }").unwrap();
        assert_program(
            &program,
            "function* g() {
                var a = arguments[0] !== void 0 ? arguments[0] : f();
                yield a;
            }",
        );
    }

    #[test]
    fn destructuring_default_binds_the_pattern() {
        let program = lower("function f({ a } = {}) { return a; }").unwrap();
        assert_program(
            &program,
            "function f() {
                var { a } = arguments[0] !== void 0 ? arguments[0] : {};
                return a;
            }",
        );
    }

    #[test]
    fn methods_and_constructors_are_desugared() {
        let program = lower(
            "class P { constructor(x = 0) { this.x = x; } move(dx = 1) { this.x += dx; } }",
        )
        .unwrap();
        assert_program(
            &program,
            "class P {
                constructor() {
                    var x = arguments[0] !== void 0 ? arguments[0] : 0;
                    this.x = x;
                }
                move() {
                    var dx = arguments[0] !== void 0 ? arguments[0] : 1;
                    this.x += dx;
                }
            }",
        );
    }

    #[test]
    fn setters_keep_their_parameter() {
        let program =
            lower("var o = { set v(x = 1) { this._v = x; } }; class C { set v(y = 2) { this._v = y; } }")
                .unwrap();
        assert_program(
            &program,
            "var o = { set v(x) { var x = arguments[0] !== void 0 ? arguments[0] : 1; this._v = x; } };
             class C { set v(y) { var y = arguments[0] !== void 0 ? arguments[0] : 2; this._v = y; } }",
        );
    }

    #[test]
    fn rest_after_default_is_rejected() {
        let err = lower("function f(a = 1, ...rest) {}").unwrap_err();
        assert!(
            matches!(err, DesugarError::RestAfterDefault { index: 1, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn rest_without_defaults_is_untouched() {
        let source = "function f(a, ...rest) { return rest; }";
        assert_eq!(lower(source).unwrap(), parse(source));
    }

    #[test]
    fn setter_pattern_default_is_rejected() {
        let err = lower("var o = { set v({ a } = {}) {} };").unwrap_err();
        assert!(matches!(err, DesugarError::SetterPattern { .. }), "{err:?}");
    }
}
