#![cfg(test)]

use insta::assert_snapshot;

use crate::expr::Expression;
use crate::scope::Scope;

const DECLS: &str = "float a; float b; vec3 v; mat3 m; int i; uint u; ";

#[track_caller]
fn parse(source: &str) -> Expression {
    let mut scope = Scope::new();
    let (expr, diagnostics) = crate::parser::parse_program(&format!("{DECLS}{source}"), &mut scope);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
    expr.unwrap()
}

/// Printing and parsing again produces the same source.
#[track_caller]
fn round_trip(source: &str) -> String {
    let printed = parse(source).print();
    assert_eq!(parse(&printed).print(), printed);
    printed
}

#[test]
fn minimal_parentheses() {
    assert_snapshot!(round_trip("((a)) + ((b * a))"), @"a + b * a");
    assert_snapshot!(round_trip("(a + b) * (a - b)"), @"(a + b) * (a - b)");
    assert_snapshot!(round_trip("a / (b / a)"), @"a / (b / a)");
    assert_snapshot!(round_trip("(i << 2) & 7 | 1"), @"i << 2 & 7 | 1");
    assert_snapshot!(round_trip("i < 2 == (u > 3u)"), @"i < 2 == u > 3u");
    assert_snapshot!(round_trip("a < b && (b < a || a == b)"), @"a < b && (b < a || a == b)");
}

#[test]
fn negation() {
    assert_snapshot!(round_trip("-(a + b)"), @"-(a + b)");
    assert_snapshot!(round_trip("- -a"), @"-(-a)");
    assert_snapshot!(round_trip("-(-1.0)"), @"-(-1.0)");
    assert_snapshot!(round_trip("(-a).x"), @"(-a).x");
}

#[test]
fn postfix() {
    assert_snapshot!(round_trip("(m * v).zyx"), @"(m * v).zyx");
    assert_snapshot!(round_trip("v.xy.y"), @"v.xy.y");
    assert_snapshot!(round_trip("v.st"), @"v.st");
}

#[test]
fn assignments() {
    assert_snapshot!(round_trip("v.x = a = b"), @"v.x = a = b");
    assert_snapshot!(round_trip("v *= m"), @"v *= m");
    assert_snapshot!(round_trip("a = (b += 1.0) * 2.0"), @"a = (b += 1.0) * 2.0");
}

#[test]
fn calls_and_constants() {
    assert_snapshot!(round_trip("mat2(1.0, 2.0, 3.0, 4.0)"), @"mat2(1.0, 2.0, 3.0, 4.0)");
    assert_snapshot!(round_trip("max(a, b + 1.0)"), @"max(a, b + 1.0)");
    assert_snapshot!(round_trip("dvec2(0.5lf, true)"), @"dvec2(0.5lf, true)");
}
