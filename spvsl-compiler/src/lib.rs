//! Compiler of single GLSL expressions to SPIR-V modules.
//!
//! A source consists of global declarations followed by one expression.
//! [parse] checks it into a typed [expr::Expression], [compile] emits a
//! module whose body function evaluates that expression.

mod compile;
mod diagnostic;
mod parser;
mod printer;
mod span;
mod utils;

pub mod check;
pub mod error;
pub mod expr;
pub mod function;
pub mod scope;
pub mod spirv;
pub mod variable;

pub use compile::{
    compile, compile_source, parse, parse_in_scope, CompileParams, ExecutionModel, Program,
};
pub use span::Span;

type Result<T, E = diagnostic::Diagnostic> = core::result::Result<T, E>;

pub mod _lexer {
    pub use crate::diagnostic::Diagnostic;
    pub use crate::parser::lexer::{Token, TokenKind};

    pub use crate::parser::lexer::lex_source;
    pub use crate::parser::lexer::lex_source_recovery as lex;
}
