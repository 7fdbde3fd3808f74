use spvsl_bin::Scalar;

use crate::Span;

#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    Ident(String),
    Keyword(&'static str),
    Literal(Scalar),

    /// single-char control tokens
    Control(char),

    LeftOp,  // <<
    RightOp, // >>
    LeOp,    // <=
    GeOp,    // >=
    EqOp,    // ==
    NeOp,    // !=
    AndOp,   // &&
    OrOp,    // ||
    XorOp,   // ^^
    IncOp,   // ++
    DecOp,   // --

    MulAssign,   // *=
    DivAssign,   // /=
    ModAssign,   // %=
    AddAssign,   // +=
    SubAssign,   // -=
    LeftAssign,  // <<=
    RightAssign, // >>=
    AndAssign,   // &=
    XorAssign,   // ^=
    OrAssign,    // |=

    Comment(String),

    /// Only present in the token stream that the parser sees, never
    /// produced by the lexer.
    End,
}

/// Reserved words that cannot be used as identifiers.
#[rustfmt::skip]
pub const KEYWORDS: &[&str] = &[
    "void", "float", "double", "int", "uint", "bool",
    "vec2", "vec3", "vec4", "dvec2", "dvec3", "dvec4",
    "ivec2", "ivec3", "ivec4", "uvec2", "uvec3", "uvec4",
    "bvec2", "bvec3", "bvec4",
    "mat2", "mat3", "mat4", "mat2x2", "mat2x3", "mat2x4",
    "mat3x2", "mat3x3", "mat3x4", "mat4x2", "mat4x3", "mat4x4",
    "dmat2", "dmat3", "dmat4", "dmat2x2", "dmat2x3", "dmat2x4",
    "dmat3x2", "dmat3x3", "dmat3x4", "dmat4x2", "dmat4x3", "dmat4x4",
    "struct",
    "const", "in", "out", "inout", "uniform", "invariant",
    "coherent", "volatile", "restrict", "readonly", "writeonly",
];

pub fn keyword(ident: &str) -> Option<&'static str> {
    KEYWORDS.iter().find(|kw| **kw == ident).copied()
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Keyword(s) => write!(f, "keyword {s}"),
            TokenKind::Literal(lit) => write!(f, "{lit}"),
            TokenKind::Control(c) => write!(f, "{c}"),

            TokenKind::LeftOp => f.write_str("<<"),
            TokenKind::RightOp => f.write_str(">>"),
            TokenKind::LeOp => f.write_str("<="),
            TokenKind::GeOp => f.write_str(">="),
            TokenKind::EqOp => f.write_str("=="),
            TokenKind::NeOp => f.write_str("!="),
            TokenKind::AndOp => f.write_str("&&"),
            TokenKind::OrOp => f.write_str("||"),
            TokenKind::XorOp => f.write_str("^^"),
            TokenKind::IncOp => f.write_str("++"),
            TokenKind::DecOp => f.write_str("--"),

            TokenKind::MulAssign => f.write_str("*="),
            TokenKind::DivAssign => f.write_str("/="),
            TokenKind::ModAssign => f.write_str("%="),
            TokenKind::AddAssign => f.write_str("+="),
            TokenKind::SubAssign => f.write_str("-="),
            TokenKind::LeftAssign => f.write_str("<<="),
            TokenKind::RightAssign => f.write_str(">>="),
            TokenKind::AndAssign => f.write_str("&="),
            TokenKind::XorAssign => f.write_str("^="),
            TokenKind::OrAssign => f.write_str("|="),

            TokenKind::Comment(text) => write!(f, "/* {text} */"),
            TokenKind::End => f.write_str("end of input"),
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}: {:?}", self.span, self.kind)
    }
}
