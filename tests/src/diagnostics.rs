use insta::assert_snapshot;
use itertools::Itertools;
use spvsl_compiler::error::Error;

#[track_caller]
fn _errors(source: &str) -> String {
    crate::init_logger();

    let Err(Error::Compile { diagnostics }) = spvsl_compiler::parse(source) else {
        panic!("expected diagnostics");
    };
    diagnostics
        .iter()
        .map(|d| {
            let location = d.location().unwrap();
            format!(
                "{}:{} [{}] {}",
                location.start.0 + 1,
                location.start.1 + 1,
                d.code(),
                d.message()
            )
        })
        .join("\n")
}

#[test]
fn locations() {
    assert_snapshot!(_errors("float a;\nbool b;\na + b"), @"3:3 [E0004] Operand types float and bool are booleans, which do not support arithmetic.");
    assert_snapshot!(_errors("vec2 v;\n\n  v.xyz"), @"3:5 [E0004] Swizzle index 'z' not allowed for type vec2.");
}

#[test]
fn many_errors_in_one_pass() {
    assert_snapshot!(_errors(r#"
    const float k;
    int i = 1.5;
    undefined + k.x
    "#), @r#"
    2:17 [E0009] Constant "k" must be initialized.
    3:13 [E0004] Cannot initialize variable of type int with value of type float.
    4:5 [E0007] No variable named "undefined".
    4:17 [E0007] No variable named "k".
    "#);
}

#[test]
fn lexer_errors() {
    let (_, diagnostics) = spvsl_compiler::_lexer::lex("1 + 4294967296");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Overflow in integer constant.");

    let tokens = spvsl_compiler::_lexer::lex_source("a.xy += 2u").unwrap();
    assert_eq!(tokens.len(), 5);
}

#[test]
fn rendered_report() {
    let Err(err) = spvsl_compiler::parse("1 + true") else {
        panic!("expected diagnostics");
    };
    let rendered = err.to_string();
    assert!(rendered.contains("[E0004]"), "{rendered}");
    assert!(rendered.contains("1 + true"), "{rendered}");
}
