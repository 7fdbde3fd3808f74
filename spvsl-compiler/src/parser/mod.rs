//! Recursive descent over the token stream.
//!
//! Checking happens while parsing: every node is typed when it is built.
//! Problems are reported as diagnostics and the parser continues with a
//! placeholder node ([Expression::error]), so one pass finds as many errors
//! as possible.

mod decl;
mod expr;
pub(crate) mod lexer;
mod types;

use self::lexer::{Token, TokenKind};
use crate::diagnostic::{Diagnostic, DiagnosticCode, WithErrorInfo};
use crate::expr::Expression;
use crate::scope::Scope;
use crate::Span;

/// Parses global declarations into `scope`, followed by one expression.
///
/// Returns `None` only when the source could not be split into tokens.
pub fn parse_program(source: &str, scope: &mut Scope) -> (Option<Expression>, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = lexer::lex_source_recovery(source);
    let Some(tokens) = tokens else {
        return (None, diagnostics);
    };

    let mut parser = Parser::new(tokens.semantic, source.len() as u32, scope);
    let expression = parser.parse_program();
    diagnostics.extend(parser.diagnostics);

    tracing::debug!("parsed expression of type {}", expression.return_type());
    (Some(expression), diagnostics)
}

/// Token stream with a diagnostics sink.
pub(crate) struct Parser<'a> {
    /// Always ends with [TokenKind::End].
    tokens: Vec<Token>,
    pos: usize,

    scope: &'a mut Scope,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(mut tokens: Vec<Token>, source_len: u32, scope: &'a mut Scope) -> Self {
        tokens.push(Token {
            kind: TokenKind::End,
            span: Span::new(source_len, source_len),
        });
        Parser {
            tokens,
            pos: 0,
            scope,
            diagnostics: Vec::new(),
        }
    }

    fn get(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> &TokenKind {
        &self.get().kind
    }

    /// Kind of the token `n` positions after the current one.
    fn peek(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn span(&self) -> Span {
        self.get().span
    }

    /// Span of the last consumed token.
    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    /// Advances to the next token and returns the current one. The end
    /// token is never consumed.
    fn consume(&mut self) -> Token {
        let token = self.get().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn is_control(&self, c: char) -> bool {
        self.kind() == &TokenKind::Control(c)
    }

    fn is_end(&self) -> bool {
        self.kind() == &TokenKind::End
    }

    /// Reports a problem at the current token.
    fn error(&mut self, code: DiagnosticCode, message: impl ToString) {
        let span = self.span();
        self.error_at(span, code, message);
    }

    fn error_at(&mut self, span: Span, code: DiagnosticCode, message: impl ToString) {
        let diagnostic = Diagnostic::new(message, code).with_span(Some(span));
        tracing::trace!("{}: {}", diagnostic.code.get(), diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Number of reported problems, to find out whether parsing a part of
    /// the source produced any.
    fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Skips to the next control token `c` and consumes it.
    fn sync(&mut self, c: char) {
        while !self.is_control(c) && !self.is_end() {
            self.consume();
        }
        self.consume();
    }

    /// Expects control token `c`. On failure reports `message` and skips
    /// past the next `c`.
    fn expect_control(&mut self, c: char, message: &str) {
        if self.is_control(c) {
            self.consume();
        } else {
            self.error(DiagnosticCode::SYNTAX, message);
            self.sync(c);
        }
    }

    fn parse_program(&mut self) -> Expression {
        while self.is_declaration() {
            self.parse_declaration();
        }

        let expression = self.parse_expression();

        if self.is_control(';') {
            self.consume();
        }
        if !self.is_end() {
            let found = self.kind().to_string();
            self.error(
                DiagnosticCode::SYNTAX,
                format!("Expected end of input, but found {found}."),
            );
        }
        expression
    }
}
