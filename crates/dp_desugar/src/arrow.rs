//! Arrow-function normalization.
//!
//! `(a) => e` → `function (a) { return e; }`. Arrows see the `this` and
//! `arguments` of their enclosing scope, so uses of either inside an arrow are
//! rewritten to a capture variable declared at the top of that scope, after
//! any `"use strict"` directives:
//!
//! ```js
//! function f() { return () => this.x; }
//! // becomes
//! function f() { var _this = this; return function () { return _this.x; }; }
//! ```
//!
//! `super` and `new.target` have no capture variable, so arrows that use them
//! are rejected.

use swc_common::{Span, Spanned, DUMMY_SP};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::builders::{
    directive_len, ident, ident_expr, is_directive, prepend, return_block, var_stmt,
};
use crate::error::DesugarError;
use crate::names::Captures;

/// A program with every arrow function converted to a function expression.
///
/// Only [`normalize_arrows`] builds one, which is what lets the
/// default-parameter pass require arrow-free input in its signature.
#[derive(Debug, Clone)]
pub struct ArrowFree {
    program: ast::Program,
    captures: Captures,
}

impl ArrowFree {
    pub fn program(&self) -> &ast::Program {
        &self.program
    }

    /// Names bound to captured `this` and `arguments`.
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_parts(self) -> (ast::Program, Captures) {
        (self.program, self.captures)
    }
}

/// Convert every arrow function in `program` into an ordinary function.
pub fn normalize_arrows(mut program: ast::Program) -> Result<ArrowFree, DesugarError> {
    let captures = Captures::fresh_for(&program);

    let mut normalizer = ArrowNormalizer::new(&captures);
    program.visit_mut_with(&mut normalizer);
    if let Some(err) = normalizer.error {
        return Err(err);
    }

    let prologue = normalizer.current.prologue(&captures);
    match &mut program {
        ast::Program::Module(module) => {
            let at = module
                .body
                .iter()
                .take_while(|item| {
                    matches!(item, ast::ModuleItem::Stmt(stmt) if is_directive(stmt))
                })
                .count();
            prepend(&mut module.body, at, prologue.into_iter().map(ast::ModuleItem::Stmt));
        }
        ast::Program::Script(script) => {
            let at = directive_len(&script.body);
            prepend(&mut script.body, at, prologue);
        }
    }

    tracing::debug!(converted = normalizer.converted, "normalized arrow functions");

    Ok(ArrowFree { program, captures })
}

/// What a capture declaration can be hoisted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Program,
    /// Functions, constructors, getters and setters.
    Function,
    StaticBlock,
    /// A class field initializer; it has no body, so captures wrap the value.
    ClassField,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    uses_this: bool,
    uses_arguments: bool,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            uses_this: false,
            uses_arguments: false,
        }
    }

    /// Only real functions have an `arguments` object to capture.
    fn binds_arguments(&self) -> bool {
        self.kind == ScopeKind::Function
    }

    /// `var _this = this; var _arguments = arguments;`, as needed.
    fn prologue(&self, captures: &Captures) -> Vec<ast::Stmt> {
        let mut stmts = Vec::new();
        if self.uses_this {
            stmts.push(var_stmt(
                ast::Pat::Ident(ident(&captures.this, DUMMY_SP).into()),
                Box::new(ast::Expr::This(ast::ThisExpr { span: DUMMY_SP })),
                DUMMY_SP,
            ));
        }
        if self.uses_arguments {
            stmts.push(var_stmt(
                ast::Pat::Ident(ident(&captures.arguments, DUMMY_SP).into()),
                Box::new(ident_expr("arguments", DUMMY_SP)),
                DUMMY_SP,
            ));
        }
        stmts
    }
}

struct ArrowNormalizer<'a> {
    captures: &'a Captures,
    current: Scope,
    /// Innermost arrow entered since `current` began.
    arrow: Option<Span>,
    /// Whether the innermost enclosing class has an `extends` clause.
    derived: bool,
    error: Option<DesugarError>,
    converted: usize,
}

impl<'a> ArrowNormalizer<'a> {
    fn new(captures: &'a Captures) -> Self {
        Self {
            captures,
            current: Scope::new(ScopeKind::Program),
            arrow: None,
            derived: false,
            error: None,
            converted: 0,
        }
    }

    fn fail(&mut self, err: DesugarError) {
        self.error.get_or_insert(err);
    }

    /// Run `f` inside a fresh capture scope and return what it captured.
    fn scoped(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self)) -> Scope {
        let outer_arrow = self.arrow.take();
        let outer = std::mem::replace(&mut self.current, Scope::new(kind));
        f(self);
        self.arrow = outer_arrow;
        std::mem::replace(&mut self.current, outer)
    }

    fn captures_arguments(&self, id: &ast::Ident) -> bool {
        self.arrow.is_some() && self.current.binds_arguments() && &*id.sym == "arguments"
    }

    /// `(function () { var _this = this; return value; }).call(this)`
    fn class_field_value(&mut self, mut value: Box<ast::Expr>) -> Box<ast::Expr> {
        let scope = self.scoped(ScopeKind::ClassField, |this| value.visit_mut_with(this));
        if !scope.uses_this {
            return value;
        }

        let span = value.span();
        let mut body = return_block(value);
        prepend(&mut body.stmts, 0, scope.prologue(self.captures));

        let function = ast::Expr::Fn(ast::FnExpr {
            ident: None,
            function: Box::new(ast::Function {
                span,
                body: Some(body),
                ..Default::default()
            }),
        });
        Box::new(ast::Expr::Call(ast::CallExpr {
            span,
            callee: ast::Callee::Expr(Box::new(ast::Expr::Member(ast::MemberExpr {
                span,
                obj: Box::new(ast::Expr::Paren(ast::ParenExpr {
                    span,
                    expr: Box::new(function),
                })),
                prop: ast::MemberProp::Ident(ast::IdentName::new("call".into(), span)),
            }))),
            args: vec![ast::ExprOrSpread {
                spread: None,
                expr: Box::new(ast::Expr::This(ast::ThisExpr { span })),
            }],
            type_args: None,
            ..Default::default()
        }))
    }
}

impl VisitMut for ArrowNormalizer<'_> {
    fn visit_mut_expr(&mut self, node: &mut ast::Expr) {
        if let Some(arrow) = self.arrow {
            if uses_enclosing_method(node) {
                self.fail(DesugarError::ArrowSuper { span: arrow });
            }
        }

        match node {
            ast::Expr::This(this) if self.arrow.is_some() => {
                let span = this.span;
                self.current.uses_this = true;
                *node = ident_expr(&self.captures.this, span);
            }
            ast::Expr::Ident(id) if self.captures_arguments(&*id) => {
                let span = id.span;
                self.current.uses_arguments = true;
                *node = ident_expr(&self.captures.arguments, span);
            }
            ast::Expr::Arrow(arrow) => {
                let span = arrow.span;
                let outer = self.arrow.replace(span);
                arrow.visit_mut_children_with(self);
                self.arrow = outer;

                let taken = std::mem::replace(node, ast::Expr::Invalid(ast::Invalid { span }));
                if let ast::Expr::Arrow(arrow) = taken {
                    tracing::trace!(?span, "converted arrow function");
                    self.converted += 1;
                    *node = ast::Expr::Fn(into_fn_expr(arrow));
                }
            }
            _ => node.visit_mut_children_with(self),
        }
    }

    fn visit_mut_prop(&mut self, node: &mut ast::Prop) {
        if let ast::Prop::Shorthand(id) = node {
            if self.captures_arguments(id) {
                self.current.uses_arguments = true;
                let key = ast::PropName::Ident(ast::IdentName::new(id.sym.clone(), id.span));
                let value = Box::new(ident_expr(&self.captures.arguments, id.span));
                *node = ast::Prop::KeyValue(ast::KeyValueProp { key, value });
                return;
            }
        }
        node.visit_mut_children_with(self);
    }

    fn visit_mut_expr_stmt(&mut self, node: &mut ast::ExprStmt) {
        node.visit_mut_children_with(self);

        // A statement may not start with `function`.
        if starts_with_function(&node.expr) {
            let span = node.span;
            let expr = std::mem::replace(
                &mut node.expr,
                Box::new(ast::Expr::Invalid(ast::Invalid { span })),
            );
            node.expr = Box::new(ast::Expr::Paren(ast::ParenExpr { span, expr }));
        }
    }

    fn visit_mut_class(&mut self, node: &mut ast::Class) {
        let outer = std::mem::replace(&mut self.derived, node.super_class.is_some());
        node.visit_mut_children_with(self);
        self.derived = outer;
    }

    fn visit_mut_function(&mut self, node: &mut ast::Function) {
        let scope = self.scoped(ScopeKind::Function, |this| {
            node.visit_mut_children_with(this)
        });
        if let Some(body) = &mut node.body {
            let at = directive_len(&body.stmts);
            prepend(&mut body.stmts, at, scope.prologue(self.captures));
        }
    }

    fn visit_mut_constructor(&mut self, node: &mut ast::Constructor) {
        let scope = self.scoped(ScopeKind::Function, |this| {
            node.visit_mut_children_with(this)
        });
        let prologue = scope.prologue(self.captures);
        let Some(body) = &mut node.body else {
            return;
        };
        if prologue.is_empty() {
            return;
        }

        // `this` is unusable before `super()` in a derived class.
        let at = if self.derived {
            match after_super_call(&body.stmts) {
                Some(at) => at,
                None => {
                    self.fail(DesugarError::CaptureBeforeSuper { span: node.span });
                    return;
                }
            }
        } else {
            directive_len(&body.stmts)
        };
        prepend(&mut body.stmts, at, prologue);
    }

    fn visit_mut_getter_prop(&mut self, node: &mut ast::GetterProp) {
        let scope = self.scoped(ScopeKind::Function, |this| {
            node.visit_mut_children_with(this)
        });
        if let Some(body) = &mut node.body {
            let at = directive_len(&body.stmts);
            prepend(&mut body.stmts, at, scope.prologue(self.captures));
        }
    }

    fn visit_mut_setter_prop(&mut self, node: &mut ast::SetterProp) {
        let scope = self.scoped(ScopeKind::Function, |this| {
            node.visit_mut_children_with(this)
        });
        if let Some(body) = &mut node.body {
            let at = directive_len(&body.stmts);
            prepend(&mut body.stmts, at, scope.prologue(self.captures));
        }
    }

    fn visit_mut_static_block(&mut self, node: &mut ast::StaticBlock) {
        let scope = self.scoped(ScopeKind::StaticBlock, |this| {
            node.visit_mut_children_with(this)
        });
        prepend(&mut node.body.stmts, 0, scope.prologue(self.captures));
    }

    fn visit_mut_class_prop(&mut self, node: &mut ast::ClassProp) {
        node.key.visit_mut_with(self);
        node.decorators.visit_mut_with(self);
        if let Some(value) = node.value.take() {
            node.value = Some(self.class_field_value(value));
        }
    }

    fn visit_mut_private_prop(&mut self, node: &mut ast::PrivateProp) {
        node.decorators.visit_mut_with(self);
        if let Some(value) = node.value.take() {
            node.value = Some(self.class_field_value(value));
        }
    }
}

fn into_fn_expr(arrow: ast::ArrowExpr) -> ast::FnExpr {
    let ast::ArrowExpr {
        span,
        params,
        body,
        is_async,
        is_generator,
        type_params,
        return_type,
        ..
    } = arrow;

    let body = match *body {
        ast::BlockStmtOrExpr::BlockStmt(block) => block,
        ast::BlockStmtOrExpr::Expr(expr) => return_block(expr),
    };

    ast::FnExpr {
        ident: None,
        function: Box::new(ast::Function {
            params: params
                .into_iter()
                .map(|pat| ast::Param {
                    span: pat.span(),
                    decorators: vec![],
                    pat,
                })
                .collect(),
            span,
            body: Some(body),
            is_async,
            is_generator,
            type_params,
            return_type,
            ..Default::default()
        }),
    }
}

/// `super.x`, `super[x]`, `super(...)` and `new.target`.
fn uses_enclosing_method(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::SuperProp(_) => true,
        ast::Expr::Call(call) => matches!(call.callee, ast::Callee::Super(_)),
        ast::Expr::MetaProp(meta) => meta.kind == ast::MetaPropKind::NewTarget,
        _ => false,
    }
}

/// Whether printing `expr` as a statement would begin with `function`.
fn starts_with_function(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Fn(_) => true,
        ast::Expr::Seq(seq) => seq.exprs.first().is_some_and(|first| starts_with_function(first)),
        ast::Expr::Bin(bin) => starts_with_function(&bin.left),
        ast::Expr::Cond(cond) => starts_with_function(&cond.test),
        ast::Expr::Member(member) => starts_with_function(&member.obj),
        ast::Expr::Call(ast::CallExpr {
            callee: ast::Callee::Expr(callee),
            ..
        }) => starts_with_function(callee),
        ast::Expr::Update(update) => !update.prefix && starts_with_function(&update.arg),
        ast::Expr::TaggedTpl(tagged) => starts_with_function(&tagged.tag),
        ast::Expr::Assign(ast::AssignExpr {
            left: ast::AssignTarget::Simple(ast::SimpleAssignTarget::Member(member)),
            ..
        }) => starts_with_function(&member.obj),
        _ => false,
    }
}

/// Index just past the first top-level `super(...)` statement.
fn after_super_call(stmts: &[ast::Stmt]) -> Option<usize> {
    stmts
        .iter()
        .position(|stmt| match stmt {
            ast::Stmt::Expr(ast::ExprStmt { expr, .. }) => matches!(
                &**expr,
                ast::Expr::Call(ast::CallExpr {
                    callee: ast::Callee::Super(_),
                    ..
                })
            ),
            _ => false,
        })
        .map(|index| index + 1)
}
