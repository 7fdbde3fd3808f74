mod token;

pub use token::{Token, TokenKind, KEYWORDS};

use chumsky::error::Cheap;
use chumsky::prelude::*;
use spvsl_bin::Scalar;

use crate::diagnostic::{Diagnostic, DiagnosticCode, WithErrorInfo};
use crate::Span;

type LError = Cheap<char, Span>;

#[derive(Debug, Default)]
pub struct Tokens {
    pub semantic: Vec<Token>,
    pub trivia: Vec<Token>,
}

/// An integer literal that cannot be represented. The lexer keeps a
/// truncated value so parsing can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BadLiteral {
    Overflow,
    OctalOverflow,
    OctalDigit,
}

impl BadLiteral {
    fn message(self) -> &'static str {
        match self {
            BadLiteral::Overflow => "Overflow in integer constant.",
            BadLiteral::OctalOverflow => "Overflow in octal constant.",
            BadLiteral::OctalDigit => "Invalid digit in octal constant.",
        }
    }
}

/// Split source into tokens.
pub fn lex_source_recovery(source: &str) -> (Option<Tokens>, Vec<Diagnostic>) {
    let stream = prepare_stream(source);

    let (tokens, lex_errors) = lexer().parse_recovery(stream);

    let mut errors: Vec<_> = lex_errors
        .into_iter()
        .map(|e| convert_lexer_error(source, e))
        .collect();

    let tokens = tokens.map(|tok_vec| {
        let mut res = Tokens::default();
        for (token, bad) in tok_vec {
            if let Some(bad) = bad {
                errors.push(
                    Diagnostic::new(bad.message(), DiagnosticCode::LEXER)
                        .with_span(Some(token.span)),
                );
            }
            if is_semantic(&token) {
                res.semantic.push(token);
            } else {
                res.trivia.push(token);
            }
        }
        res
    });

    tracing::debug!("lex errors: {:?}", errors);
    (tokens, errors)
}

fn is_semantic(t: &Token) -> bool {
    !matches!(t.kind, TokenKind::Comment(_))
}

/// Split source into semantic tokens, failing on any lexer error.
pub fn lex_source(source: &str) -> crate::Result<Vec<Token>, Vec<Diagnostic>> {
    let (tokens, errors) = lex_source_recovery(source);
    match tokens {
        Some(tokens) if errors.is_empty() => Ok(tokens.semantic),
        _ => Err(errors),
    }
}

pub fn prepare_stream(source: &str) -> chumsky::Stream<'_, char, Span, CharIterator<'_>> {
    let eoi = Span {
        start: source.len() as u32,
        len: 0,
    };
    chumsky::Stream::from_iter(eoi, CharIterator::new(source))
}

pub(crate) struct CharIterator<'a> {
    last_start: u32,
    chars: std::str::Chars<'a>,
}

impl<'a> CharIterator<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            last_start: 0,
            chars: string.chars(),
        }
    }
}

impl Iterator for CharIterator<'_> {
    type Item = (char, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        let span = Span {
            start: self.last_start,
            len: c.len_utf8() as u32,
        };
        self.last_start += span.len;
        Some((c, span))
    }
}

fn convert_lexer_error(source: &str, e: LError) -> Diagnostic {
    let range = std::ops::Range::from(e.span());

    let found = source.get(range).unwrap_or_default();
    let message = if found.is_empty() {
        "unexpected end of input".to_string()
    } else {
        format!("unexpected {found}")
    };

    Diagnostic::new(message, DiagnosticCode::LEXER).with_span(Some(e.span()))
}

/// Lex chars to tokens until the end of the input
fn lexer() -> impl Parser<char, Vec<(Token, Option<BadLiteral>)>, Error = LError> {
    let assign_multi = choice((
        just("<<=").to(TokenKind::LeftAssign),
        just(">>=").to(TokenKind::RightAssign),
        just("*=").to(TokenKind::MulAssign),
        just("/=").to(TokenKind::DivAssign),
        just("%=").to(TokenKind::ModAssign),
        just("+=").to(TokenKind::AddAssign),
        just("-=").to(TokenKind::SubAssign),
        just("&=").to(TokenKind::AndAssign),
        just("^=").to(TokenKind::XorAssign),
        just("|=").to(TokenKind::OrAssign),
    ));

    let control_multi = choice((
        just("<<").to(TokenKind::LeftOp),
        just(">>").to(TokenKind::RightOp),
        just("<=").to(TokenKind::LeOp),
        just(">=").to(TokenKind::GeOp),
        just("==").to(TokenKind::EqOp),
        just("!=").to(TokenKind::NeOp),
        just("&&").to(TokenKind::AndOp),
        just("||").to(TokenKind::OrOp),
        just("^^").to(TokenKind::XorOp),
        just("++").to(TokenKind::IncOp),
        just("--").to(TokenKind::DecOp),
    ));

    let control = one_of("()[]{}.,;:?=+-*/%<>!~&|^").map(TokenKind::Control);

    let literal = literal().map(|(lit, bad)| (TokenKind::Literal(lit), bad));

    let ident = ident_part().map(|ident| match token::keyword(&ident) {
        Some(kw) => TokenKind::Keyword(kw),
        None => TokenKind::Ident(ident),
    });

    let token = choice((
        comment().map(|c| (c, None)),
        literal,
        assign_multi.map(|t| (t, None)),
        control_multi.map(|t| (t, None)),
        ident.map(|t| (t, None)),
        control.map(|t| (t, None)),
    ))
    .recover_with(skip_then_retry_until([]).skip_start())
    .map_with_span(|(kind, bad), span| (Token { kind, span }, bad));

    let tokens = whitespace().ignore_then(token.then_ignore(whitespace()).repeated());

    just('\u{feff}')
        .or_not()
        .ignore_then(tokens)
        .then_ignore(end())
}

fn whitespace() -> impl Parser<char, (), Error = LError> {
    filter(|c: &char| c.is_whitespace()).repeated().ignored()
}

fn comment() -> impl Parser<char, TokenKind, Error = LError> {
    let line = just("//")
        .ignore_then(filter(|c: &char| *c != '\n').repeated())
        .collect::<String>();

    let block = just("/*")
        .ignore_then(take_until(just("*/")))
        .map(|(text, _)| text.into_iter().collect::<String>());

    line.or(block).map(|text| TokenKind::Comment(text.trim().to_string()))
}

pub(crate) fn ident_part() -> impl Parser<char, String, Error = LError> + Clone {
    filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .chain(filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_').repeated())
        .collect()
}

fn literal() -> impl Parser<char, (Scalar, Option<BadLiteral>), Error = LError> {
    let digits = || filter(|c: &char| c.is_ascii_digit()).repeated();

    let exp = one_of("eE")
        .chain(one_of("+-").or_not())
        .chain::<char, _, _>(digits().at_least(1));

    // 1.5 | 1. | .5 | 1e3, each with an optional exponent
    let float_body = choice((
        digits()
            .at_least(1)
            .chain(just('.'))
            .chain::<char, _, _>(digits())
            .chain::<char, _, _>(exp.clone().or_not().map(Option::unwrap_or_default)),
        just('.')
            .chain(digits().at_least(1))
            .chain::<char, _, _>(exp.clone().or_not().map(Option::unwrap_or_default)),
        digits().at_least(1).chain::<char, _, _>(exp),
    ));

    let float_suffix = choice((just("lf").to(true), just("LF").to(true), one_of("fF").to(false)));

    let float = float_body
        .collect::<String>()
        .then(float_suffix.or_not())
        .try_map(|(digits, is_double), span| {
            let res = if is_double == Some(true) {
                digits.parse::<f64>().map(Scalar::Double)
            } else {
                digits.parse::<f32>().map(Scalar::Float)
            };
            res.map(|lit| (lit, None))
                .map_err(|_| Cheap::expected_input_found(span, None, None))
        })
        .labelled("number");

    let hexadecimal = just('0')
        .ignore_then(one_of("xX"))
        .ignore_then(
            filter(|c: &char| c.is_ascii_hexdigit())
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .map(|digits| (digits, 16));

    // digits 8 and 9 are consumed here and reported
    let octal = just('0')
        .ignore_then(digits().at_least(1).collect::<String>())
        .map(|digits| (digits, 8));

    let decimal = digits().at_least(1).collect::<String>().map(|d| (d, 10));

    let integer = choice((hexadecimal, octal, decimal))
        .then(one_of("uU").or_not())
        .then_ignore(non_ident())
        .map(|((digits, radix), unsigned)| {
            let overflow = match radix {
                8 => BadLiteral::OctalOverflow,
                _ => BadLiteral::Overflow,
            };
            let (value, bad) = match u64::from_str_radix(&digits, radix) {
                Ok(v) if v <= u32::MAX as u64 => (v as u32, None),
                Ok(v) => (v as u32, Some(overflow)),
                Err(_) if radix == 8 && digits.contains(['8', '9']) => {
                    (0, Some(BadLiteral::OctalDigit))
                }
                Err(_) => (u32::MAX, Some(overflow)),
            };
            let lit = if unsigned.is_some() {
                Scalar::Uint(value)
            } else {
                Scalar::Int(value as i32)
            };
            (lit, bad)
        })
        .labelled("number");

    let bool = (just("true").to(true))
        .or(just("false").to(false))
        .then_ignore(non_ident())
        .map(|b| (Scalar::Bool(b), None));

    choice((float, integer, bool))
}

fn non_ident() -> impl Parser<char, (), Error = LError> {
    filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .not()
        .ignored()
        .or(end())
        .rewind()
}
