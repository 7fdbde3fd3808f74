use spvsl_bin::Type;

use super::lexer::TokenKind;
use super::Parser;
use crate::diagnostic::DiagnosticCode;
use crate::variable::{Qualifier, QualifierFlags, StorageClass};

const QUALIFIERS: &[&str] = &[
    "const",
    "in",
    "out",
    "inout",
    "uniform",
    "invariant",
    "coherent",
    "volatile",
    "restrict",
    "readonly",
    "writeonly",
];

impl Parser<'_> {
    /// Does a global declaration start here, rather than the expression?
    ///
    /// `struct` followed by a name starts a declaration. An anonymous
    /// struct starts a constructor expression.
    pub(super) fn is_declaration(&self) -> bool {
        match self.kind() {
            TokenKind::Keyword(keyword) if QUALIFIERS.contains(keyword) => true,
            TokenKind::Keyword("struct") => matches!(self.peek(1), TokenKind::Ident(_)),
            _ => self.is_type() && matches!(self.peek(1), TokenKind::Ident(_)),
        }
    }

    /// `[qualifiers] type [name [= initializer]];`
    pub(super) fn parse_declaration(&mut self) {
        let qualifier = self.parse_qualifier();

        let Some(ty) = self.parse_type() else {
            self.error(DiagnosticCode::SYNTAX, "Expected a type.");
            self.sync(';');
            return;
        };

        // struct definitions can stand alone
        if self.is_control(';') {
            self.consume();
            return;
        }

        let TokenKind::Ident(name) = self.kind().clone() else {
            self.error(DiagnosticCode::SYNTAX, "Expected a variable name.");
            self.sync(';');
            return;
        };
        let name_span = self.consume().span;

        let mut valid = true;
        if ty.is_void() {
            self.error_at(
                name_span,
                DiagnosticCode::TYPE_MISMATCH,
                format!("Variable \"{name}\" cannot have type void."),
            );
            valid = false;
        }
        if self.scope.lookup_variable(&name).is_some() {
            self.error_at(
                name_span,
                DiagnosticCode::DECLARATION,
                format!("Redefinition of variable \"{name}\"."),
            );
            valid = false;
        }

        let mut initial_value = None;
        if self.is_control('=') {
            self.consume();
            let span = self.span();
            let errors = self.error_count();
            let initializer = self.parse_expression();
            let init_ty = initializer.return_type();

            if self.error_count() > errors {
                valid = false;
            } else if !qualifier.storage.can_initialize() {
                self.error_at(
                    span,
                    DiagnosticCode::DECLARATION,
                    format!("Variables with {} storage cannot be initialized.", qualifier.storage),
                );
                valid = false;
            } else if !Type::can_convert(&init_ty, &ty) {
                self.error_at(
                    span,
                    DiagnosticCode::TYPE_MISMATCH,
                    format!("Cannot initialize variable of type {ty} with value of type {init_ty}."),
                );
                valid = false;
            } else {
                match initializer.get_constant() {
                    Some(value) => initial_value = value.convert(&ty).ok(),
                    None if qualifier.is_constant() => {
                        self.error_at(
                            span,
                            DiagnosticCode::CONSTANT,
                            format!("Initializer for constant \"{name}\" is not constant."),
                        );
                        valid = false;
                    }
                    None => {
                        self.error_at(
                            span,
                            DiagnosticCode::UNSUPPORTED,
                            format!("Initializer for global variable \"{name}\" must be constant."),
                        );
                        valid = false;
                    }
                }
            }
        } else if qualifier.is_constant() {
            self.error_at(
                name_span,
                DiagnosticCode::CONSTANT,
                format!("Constant \"{name}\" must be initialized."),
            );
            valid = false;
        }

        self.expect_control(';', "Expected semicolon at end of declaration.");

        if valid {
            self.scope.add_variable(name, ty, qualifier, initial_value);
        }
    }

    fn parse_qualifier(&mut self) -> Qualifier {
        let mut qualifier = Qualifier::default();

        while let TokenKind::Keyword(keyword) = *self.kind() {
            let storage = match keyword {
                "in" => Some(StorageClass::In),
                "out" => Some(StorageClass::Out),
                "uniform" => Some(StorageClass::Uniform),
                _ => None,
            };
            let flags = match keyword {
                "const" => QualifierFlags::CONST,
                "invariant" => QualifierFlags::INVARIANT,
                "coherent" => QualifierFlags::COHERENT,
                "volatile" => QualifierFlags::VOLATILE,
                "restrict" => QualifierFlags::RESTRICT,
                "readonly" => QualifierFlags::READONLY,
                "writeonly" => QualifierFlags::WRITEONLY,
                _ => QualifierFlags::empty(),
            };

            if let Some(storage) = storage {
                if qualifier.storage != StorageClass::Global {
                    self.error(
                        DiagnosticCode::SYNTAX,
                        "Only one storage qualifier is allowed.",
                    );
                }
                qualifier.storage = storage;
            } else if !flags.is_empty() {
                if qualifier.flags.contains(flags) {
                    let message = format!("Duplicate qualifier \"{keyword}\".");
                    self.error(DiagnosticCode::SYNTAX, message);
                }
                qualifier.flags |= flags;
            } else if keyword == "inout" {
                self.error(
                    DiagnosticCode::UNSUPPORTED,
                    "\"inout\" is only allowed for function parameters.",
                );
            } else {
                break;
            }
            self.consume();
        }

        if qualifier.is_constant() && qualifier.storage != StorageClass::Global {
            self.error(
                DiagnosticCode::SYNTAX,
                format!("Constants cannot have {} storage.", qualifier.storage),
            );
        }
        qualifier
    }
}
