use spvsl_bin::{Member, ScalarType, Type};

use super::lexer::TokenKind;
use super::Parser;
use crate::diagnostic::DiagnosticCode;

/// The type a builtin type keyword names.
pub(super) fn builtin_type(name: &str) -> Option<Type> {
    let scalar = match name {
        "void" => Some(ScalarType::void),
        "float" => Some(ScalarType::float),
        "double" => Some(ScalarType::double),
        "int" => Some(ScalarType::int),
        "uint" => Some(ScalarType::uint),
        "bool" => Some(ScalarType::bool),
        _ => None,
    };
    if let Some(scalar) = scalar {
        return Some(Type::Scalar(scalar));
    }

    let (scalar, rest) = match name.split_at(1) {
        ("d", rest) => (ScalarType::double, rest),
        ("i", rest) => (ScalarType::int, rest),
        ("u", rest) => (ScalarType::uint, rest),
        ("b", rest) => (ScalarType::bool, rest),
        _ => (ScalarType::float, name),
    };

    if let Some(length) = rest.strip_prefix("vec") {
        return Some(Type::vector(scalar, dimension(length)?));
    }

    let dims = rest.strip_prefix("mat")?;
    if !scalar.is_floating() {
        return None;
    }
    let (columns, rows) = match dims.split_once('x') {
        Some((columns, rows)) => (dimension(columns)?, dimension(rows)?),
        None => (dimension(dims)?, dimension(dims)?),
    };
    Some(Type::matrix(scalar, columns, rows))
}

fn dimension(s: &str) -> Option<u8> {
    match s {
        "2" => Some(2),
        "3" => Some(3),
        "4" => Some(4),
        _ => None,
    }
}

impl Parser<'_> {
    /// Is the current token the start of a type?
    pub(super) fn is_type(&self) -> bool {
        match self.kind() {
            TokenKind::Keyword("struct") => true,
            TokenKind::Keyword(keyword) => builtin_type(keyword).is_some(),
            TokenKind::Ident(name) => self.scope.lookup_type(name).is_some(),
            _ => false,
        }
    }

    /// Parses a type name or a struct definition. Returns `None` without
    /// consuming anything when there is no type.
    pub(super) fn parse_type(&mut self) -> Option<Type> {
        let ty = match self.kind() {
            TokenKind::Keyword("struct") => return self.parse_struct(),
            TokenKind::Keyword(keyword) => builtin_type(keyword)?,
            TokenKind::Ident(name) => self.scope.lookup_type(name)?.clone(),
            _ => return None,
        };
        self.consume();
        Some(ty)
    }

    /// `struct [name] { type member; ... }`. A named struct is added to the
    /// scope.
    pub(super) fn parse_struct(&mut self) -> Option<Type> {
        self.consume();

        let name_span = self.span();
        let name = match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.consume();
                Some(name)
            }
            _ => None,
        };

        if !self.is_control('{') {
            self.error(
                DiagnosticCode::SYNTAX,
                "Expected opening \"{\" after struct declaration.",
            );
            return None;
        }
        self.consume();

        let mut members: Vec<Member> = Vec::new();
        while !self.is_control('}') && !self.is_end() {
            let Some(ty) = self.parse_type() else {
                self.error(DiagnosticCode::SYNTAX, "Expected a type for struct member.");
                self.sync(';');
                continue;
            };
            if !ty.is_basic() && !ty.is_struct() {
                self.error(
                    DiagnosticCode::TYPE_MISMATCH,
                    format!("Struct members cannot have type {ty}."),
                );
            }

            loop {
                let TokenKind::Ident(member) = self.kind().clone() else {
                    self.error(DiagnosticCode::SYNTAX, "Expected a name for struct member.");
                    break;
                };
                if members.iter().any(|m| m.name == member) {
                    self.error(
                        DiagnosticCode::DECLARATION,
                        format!("struct already has a member named \"{member}\"."),
                    );
                } else {
                    members.push(Member {
                        name: member,
                        ty: ty.clone(),
                    });
                }
                self.consume();

                if !self.is_control(',') {
                    break;
                }
                self.consume();
            }

            self.expect_control(';', "Expected semicolon after struct member declaration.");
        }
        self.expect_control('}', "Expected closing \"}\" after struct declaration.");

        let ty = Type::new_struct(name.clone(), members);
        if let Some(name) = name {
            tracing::trace!("declared struct {name}");
            if !self.scope.add_type(name.clone(), ty.clone()) {
                self.error_at(
                    name_span,
                    DiagnosticCode::DECLARATION,
                    format!("Redefinition of struct \"{name}\"."),
                );
            }
        }
        Some(ty)
    }
}
