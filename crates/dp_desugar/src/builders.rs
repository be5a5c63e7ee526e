//! Constructors for the small AST fragments the passes synthesize.

use swc_common::{Span, Spanned, SyntaxContext, DUMMY_SP};
use swc_ecma_ast as ast;

pub(crate) fn ident(name: &str, span: Span) -> ast::Ident {
    ast::Ident::new_no_ctxt(name.into(), span)
}

pub(crate) fn ident_expr(name: &str, span: Span) -> ast::Expr {
    ast::Expr::Ident(ident(name, span))
}

fn num(value: usize) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Num(ast::Number {
        span: DUMMY_SP,
        value: value as f64,
        raw: Some(value.to_string().into()),
    })))
}

/// `void 0`, the undefined sentinel.
pub(crate) fn undefined() -> Box<ast::Expr> {
    Box::new(ast::Expr::Unary(ast::UnaryExpr {
        span: DUMMY_SP,
        op: ast::UnaryOp::Void,
        arg: num(0),
    }))
}

/// `arguments[index]`, the runtime argument at `index`.
pub(crate) fn argument_at(index: usize, span: Span) -> Box<ast::Expr> {
    Box::new(ast::Expr::Member(ast::MemberExpr {
        span,
        obj: Box::new(ident_expr("arguments", span)),
        prop: ast::MemberProp::Computed(ast::ComputedPropName {
            span,
            expr: num(index),
        }),
    }))
}

/// `arguments[index] !== void 0 ? arguments[index] : fallback`.
pub(crate) fn argument_or(index: usize, fallback: Box<ast::Expr>, span: Span) -> Box<ast::Expr> {
    Box::new(ast::Expr::Cond(ast::CondExpr {
        span,
        test: Box::new(ast::Expr::Bin(ast::BinExpr {
            span,
            op: ast::BinaryOp::NotEqEq,
            left: argument_at(index, span),
            right: undefined(),
        })),
        cons: argument_at(index, span),
        alt: fallback,
    }))
}

/// `var name = init;`
pub(crate) fn var_stmt(name: ast::Pat, init: Box<ast::Expr>, span: Span) -> ast::Stmt {
    ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
        span,
        ctxt: SyntaxContext::empty(),
        kind: ast::VarDeclKind::Var,
        declare: false,
        decls: vec![ast::VarDeclarator {
            span,
            name,
            init: Some(init),
            definite: false,
        }],
    })))
}

/// `{ return expr; }`
pub(crate) fn return_block(expr: Box<ast::Expr>) -> ast::BlockStmt {
    let span = expr.span();
    ast::BlockStmt {
        span,
        stmts: vec![ast::Stmt::Return(ast::ReturnStmt {
            span,
            arg: Some(expr),
        })],
        ..Default::default()
    }
}

/// `"use strict";` and other string-literal statements at the start of a body.
pub(crate) fn is_directive(stmt: &ast::Stmt) -> bool {
    match stmt {
        ast::Stmt::Expr(ast::ExprStmt { expr, .. }) => {
            matches!(&**expr, ast::Expr::Lit(ast::Lit::Str(_)))
        }
        _ => false,
    }
}

/// Length of the directive prologue; nothing may be inserted before it.
pub(crate) fn directive_len(stmts: &[ast::Stmt]) -> usize {
    stmts.iter().take_while(|stmt| is_directive(stmt)).count()
}

/// Insert `items` into `stmts` at `at`, keeping their order.
pub(crate) fn prepend<T>(stmts: &mut Vec<T>, at: usize, items: impl IntoIterator<Item = T>) {
    stmts.splice(at..at, items);
}
