use dp_parser::parse_program;
use swc_common::EqIgnoreSpan;
use swc_ecma_ast as ast;

pub(crate) fn parse(source: &str) -> ast::Program {
    parse_program(source, "test.js").unwrap().program
}

/// Assert that `actual` has the same shape as `expected` parsed, ignoring spans.
#[track_caller]
pub(crate) fn assert_program(actual: &ast::Program, expected: &str) {
    let expected = parse(expected);
    assert!(
        actual.eq_ignore_span(&expected),
        "program mismatch:\n{}",
        pretty_assertions::Comparison::new(actual, &expected)
    );
}
