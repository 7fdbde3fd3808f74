use std::rc::Rc;

use spvsl_bin::{ScalarType, Type, Value};

use super::lexer::TokenKind;
use super::Parser;
use crate::check::BinaryOp;
use crate::diagnostic::DiagnosticCode;
use crate::expr::{Assignment, Expression, Swizzle, SwizzleNames};
use crate::function::{Function, FunctionMatcher};
use crate::Span;

/// Precedence of the loosest binary operator, `||`.
const MIN_PRECEDENCE: u8 = 2;
/// Precedence of the tightest binary operators, `*`, `/` and `%`.
const MAX_PRECEDENCE: u8 = 12;

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Control('*') => BinaryOp::Mul,
        TokenKind::Control('/') => BinaryOp::Div,
        TokenKind::Control('%') => BinaryOp::Mod,
        TokenKind::Control('+') => BinaryOp::Add,
        TokenKind::Control('-') => BinaryOp::Sub,
        TokenKind::LeftOp => BinaryOp::Shl,
        TokenKind::RightOp => BinaryOp::Shr,
        TokenKind::Control('<') => BinaryOp::Lt,
        TokenKind::Control('>') => BinaryOp::Gt,
        TokenKind::LeOp => BinaryOp::Le,
        TokenKind::GeOp => BinaryOp::Ge,
        TokenKind::EqOp => BinaryOp::Eq,
        TokenKind::NeOp => BinaryOp::Ne,
        TokenKind::Control('&') => BinaryOp::BitAnd,
        TokenKind::Control('^') => BinaryOp::BitXor,
        TokenKind::Control('|') => BinaryOp::BitOr,
        TokenKind::AndOp => BinaryOp::And,
        TokenKind::XorOp => BinaryOp::Xor,
        TokenKind::OrOp => BinaryOp::Or,
        _ => return None,
    })
}

/// `Some(None)` for `=`, `Some(Some(op))` for compound assignments.
fn assignment_op(kind: &TokenKind) -> Option<Option<BinaryOp>> {
    Some(match kind {
        TokenKind::Control('=') => None,
        TokenKind::MulAssign => Some(BinaryOp::Mul),
        TokenKind::DivAssign => Some(BinaryOp::Div),
        TokenKind::ModAssign => Some(BinaryOp::Mod),
        TokenKind::AddAssign => Some(BinaryOp::Add),
        TokenKind::SubAssign => Some(BinaryOp::Sub),
        TokenKind::LeftAssign => Some(BinaryOp::Shl),
        TokenKind::RightAssign => Some(BinaryOp::Shr),
        TokenKind::AndAssign => Some(BinaryOp::BitAnd),
        TokenKind::XorAssign => Some(BinaryOp::BitXor),
        TokenKind::OrAssign => Some(BinaryOp::BitOr),
        _ => return None,
    })
}

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> Expression {
        self.parse_assignment()
    }

    /// Right associative: `a = b = c` assigns `c` to `b` first.
    fn parse_assignment(&mut self) -> Expression {
        let lvalue = self.parse_conditional();

        let Some(op) = assignment_op(self.kind()) else {
            return lvalue;
        };
        let span = self.span();

        if !lvalue.is_assignable() {
            self.error(DiagnosticCode::SYNTAX, "Assignment requires l-value.");
            self.consume();
            return self.parse_assignment();
        }
        if let Some(var) = lvalue.assigned_variable() {
            if var.qualifier.is_readonly() {
                let message = format!("Cannot assign constant \"{}\".", var.name);
                self.error(DiagnosticCode::CONSTANT, message);
                self.consume();
                self.parse_assignment();
                return lvalue;
            }
        }
        self.consume();

        let rvalue = self.parse_assignment();
        let lty = lvalue.return_type();
        let rty = rvalue.return_type();

        let ty = match op {
            Some(op) => match op.check(&lty, &rty) {
                Ok(ty) => ty,
                Err(message) => {
                    self.error_at(span, DiagnosticCode::TYPE_MISMATCH, message);
                    return lvalue;
                }
            },
            None => rty,
        };
        if !Type::can_convert(&ty, &lty) {
            self.error_at(
                span,
                DiagnosticCode::TYPE_MISMATCH,
                format!("Cannot assign value of type {ty} to variable of type {lty}."),
            );
            return lvalue;
        }

        Expression::Assignment(Box::new(Assignment {
            lvalue,
            op,
            rvalue,
            ty,
        }))
    }

    /// The ternary operator is not supported, so this is the binary
    /// operators.
    fn parse_conditional(&mut self) -> Expression {
        self.parse_binary(MIN_PRECEDENCE)
    }

    /// Operators of one precedence level, left associative.
    fn parse_binary(&mut self, precedence: u8) -> Expression {
        if precedence > MAX_PRECEDENCE {
            return self.parse_unary();
        }

        let mut left = self.parse_binary(precedence + 1);
        while let Some(op) = binary_op(self.kind()).filter(|op| op.precedence() == precedence) {
            let span = self.consume().span;
            let right = self.parse_binary(precedence + 1);

            left = match op.check(&left.return_type(), &right.return_type()) {
                Ok(ty) => Expression::new_binary(op, left, right, ty),
                Err(message) => {
                    self.error_at(span, DiagnosticCode::TYPE_MISMATCH, message);
                    left
                }
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expression {
        match self.kind() {
            TokenKind::Control('+') => {
                self.consume();
                self.parse_unary()
            }
            TokenKind::Control('-') => {
                let span = self.consume().span;
                let expr = self.parse_unary();

                let ty = expr.return_type();
                if !ty.is_basic() {
                    self.error_at(
                        span,
                        DiagnosticCode::TYPE_MISMATCH,
                        format!("Negation only works on scalars, vectors and matrices, not on {ty}."),
                    );
                    return Expression::error();
                }
                if ty.scalar_type() == ScalarType::bool {
                    self.error_at(
                        span,
                        DiagnosticCode::TYPE_MISMATCH,
                        format!("Negation does not work on boolean types like {ty}."),
                    );
                    return Expression::error();
                }
                Expression::Negation(Box::new(expr))
            }
            TokenKind::Control('!' | '~') | TokenKind::IncOp | TokenKind::DecOp => {
                let op = self.kind().to_string();
                self.error(
                    DiagnosticCode::UNSUPPORTED,
                    format!("Unary operator \"{op}\" is not implemented yet."),
                );
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Expression {
        let mut expr = self.parse_primary();

        loop {
            match self.kind() {
                TokenKind::Control('.') => {
                    self.consume();
                    expr = self.parse_field(expr);
                }
                TokenKind::Control('[') => {
                    self.error(
                        DiagnosticCode::UNSUPPORTED,
                        "Array subscripts are not implemented yet.",
                    );
                    self.sync(']');
                }
                TokenKind::IncOp | TokenKind::DecOp => {
                    let op = self.kind().to_string();
                    self.error(
                        DiagnosticCode::UNSUPPORTED,
                        format!("Postfix operator \"{op}\" is not implemented yet."),
                    );
                    self.consume();
                }
                _ => return expr,
            }
        }
    }

    /// After a `.`: a swizzle of a scalar or vector, or a struct member.
    fn parse_field(&mut self, expr: Expression) -> Expression {
        let TokenKind::Ident(name) = self.kind().clone() else {
            self.error(
                DiagnosticCode::SYNTAX,
                "Expected an identifier to select a field.",
            );
            return expr;
        };
        let span = self.consume().span;

        if name == "length" && self.is_control('(') {
            self.error_at(
                span,
                DiagnosticCode::UNSUPPORTED,
                ".length() is not implemented yet.",
            );
            self.sync(')');
            return Expression::error();
        }

        let ty = expr.return_type();
        match &ty {
            Type::Scalar(_) | Type::Vector { .. } if ty.is_basic() => {
                self.parse_swizzle(expr, &name, span)
            }
            Type::Struct(_) => match ty.member(&name) {
                Some((index, _)) => Expression::Member {
                    expr: Box::new(expr),
                    index,
                },
                None => {
                    self.error_at(
                        span,
                        DiagnosticCode::DECLARATION,
                        format!("Type {ty} has no member named \"{name}\"."),
                    );
                    Expression::error()
                }
            },
            _ => {
                self.error_at(
                    span,
                    DiagnosticCode::SYNTAX,
                    format!("Type {ty} has no fields to select."),
                );
                Expression::error()
            }
        }
    }

    /// The letter set is chosen by the first letter. All others must be of
    /// the same set.
    fn parse_swizzle(&mut self, expr: Expression, name: &str, span: Span) -> Expression {
        let ty = expr.return_type();

        let first = name.chars().next().unwrap_or_default();
        let Some(names) = SwizzleNames::for_letter(first) else {
            self.error_at(
                span,
                DiagnosticCode::DECLARATION,
                format!("Type {ty} has no member named \"{name}\"."),
            );
            return Expression::error();
        };

        let length = ty.length().max(1);
        let mut indexes = Vec::with_capacity(name.len());
        for c in name.chars() {
            let Some(index) = names.index_of(c) else {
                self.error_at(
                    span,
                    DiagnosticCode::SYNTAX,
                    format!(
                        "Character '{c}' is not valid for swizzle. Must be one of \"{}\".",
                        names.letters()
                    ),
                );
                return Expression::error();
            };
            if index as usize >= length {
                self.error_at(
                    span,
                    DiagnosticCode::TYPE_MISMATCH,
                    format!("Swizzle index '{c}' not allowed for type {ty}."),
                );
                return Expression::error();
            }
            indexes.push(index);
        }

        if indexes.len() > 4 {
            self.error_at(
                span,
                DiagnosticCode::SYNTAX,
                "Too many swizzle options. A maximum of 4 characters are allowed.",
            );
            indexes.truncate(4);
        }

        Expression::Swizzle(Box::new(Swizzle {
            expr,
            names,
            indexes,
        }))
    }

    fn parse_primary(&mut self) -> Expression {
        let token = self.get().clone();

        match &token.kind {
            TokenKind::Ident(name) => {
                self.consume();

                if let Some(ty) = self.scope.lookup_type(name).cloned() {
                    return self.parse_constructor(ty, token.span);
                }
                if self.scope.has_function(name) {
                    let matcher = self.scope.match_function(name);
                    return self.parse_function_call(matcher, token.span);
                }
                if let Some(var) = self.scope.lookup_variable(name) {
                    return Expression::Reference(var.clone());
                }

                if self.is_control('(') {
                    self.error_at(
                        token.span,
                        DiagnosticCode::DECLARATION,
                        format!("No function named \"{name}\"."),
                    );
                    self.sync(')');
                } else {
                    self.error_at(
                        token.span,
                        DiagnosticCode::DECLARATION,
                        format!("No variable named \"{name}\"."),
                    );
                }
                Expression::error()
            }
            TokenKind::Literal(scalar) => {
                self.consume();
                Expression::Constant(Value::from_scalar(*scalar))
            }
            TokenKind::Control('(') => {
                self.consume();
                let expr = self.parse_expression();
                self.expect_control(')', "Expected closing \")\".");
                expr
            }
            TokenKind::Keyword("struct") => match self.parse_struct() {
                Some(ty) => self.parse_constructor(ty, token.span),
                None => Expression::error(),
            },
            TokenKind::Keyword(keyword) => match super::types::builtin_type(keyword) {
                Some(ty) if ty.is_basic() => {
                    self.consume();
                    self.parse_constructor(ty, token.span)
                }
                _ => {
                    self.error(
                        DiagnosticCode::SYNTAX,
                        format!("Expected an expression, but found {}.", token.kind),
                    );
                    self.consume();
                    Expression::error()
                }
            },
            _ => {
                self.error(DiagnosticCode::SYNTAX, "Expected an expression.");
                self.consume();
                Expression::error()
            }
        }
    }

    fn parse_constructor(&mut self, ty: Type, span: Span) -> Expression {
        if ty.is_struct() {
            let matcher = FunctionMatcher::new([Rc::new(Function::new_constructor(ty))]);
            self.parse_function_call(matcher, span)
        } else {
            self.parse_builtin_constructor(ty)
        }
    }

    fn parse_builtin_constructor(&mut self, ty: Type) -> Expression {
        if !self.is_control('(') {
            self.error(
                DiagnosticCode::SYNTAX,
                format!("Expected opening \"(\" when calling constructor of {ty}."),
            );
            return Expression::error();
        }
        let open = self.consume().span;
        let errors = self.error_count();

        let mut arguments: Vec<Expression> = Vec::new();
        let mut missing = ty.n_components() as isize;
        if !self.is_control(')') {
            loop {
                let span = self.span();
                let argument = self.parse_assignment();
                let arg_ty = argument.return_type();

                if missing <= 0 {
                    self.error_at(
                        span,
                        DiagnosticCode::ARGUMENT_COUNT,
                        format!(
                            "Too many arguments given to builtin constructor, need only {}.",
                            arguments.len()
                        ),
                    );
                } else if !arg_ty.is_basic() {
                    self.error_at(
                        span,
                        DiagnosticCode::TYPE_MISMATCH,
                        format!("Invalid type {arg_ty} for builtin constructor."),
                    );
                } else if arg_ty.is_matrix() && ty.is_matrix() {
                    if arguments.is_empty() {
                        // a matrix from a matrix takes nothing else
                        missing = 0;
                    } else {
                        self.error_at(
                            span,
                            DiagnosticCode::TYPE_MISMATCH,
                            format!("Matrix type {arg_ty} only valid as first argument for {ty}."),
                        );
                    }
                    arguments.push(argument);
                } else {
                    missing -= arg_ty.n_components() as isize;
                    arguments.push(argument);
                }

                if !self.is_control(',') {
                    break;
                }
                self.consume();
            }
        }
        self.expect_control(')', "Expected closing \")\" after arguments.");
        let call_span = open.merge(self.previous_span());

        let single_scalar = arguments.len() == 1 && arguments[0].is_scalar_valued();
        if missing > 0 && !single_scalar {
            self.error_at(
                call_span,
                DiagnosticCode::ARGUMENT_COUNT,
                format!("Not enough arguments given to builtin constructor, {missing} are missing."),
            );
        }

        if self.error_count() > errors {
            return Expression::error();
        }
        Expression::Constructor { ty, arguments }
    }

    /// Arguments of a call, narrowing `matcher` down to one function.
    fn parse_function_call(&mut self, mut matcher: FunctionMatcher, span: Span) -> Expression {
        if !self.is_control('(') {
            self.error(
                DiagnosticCode::SYNTAX,
                "Expected opening \"(\" when calling function.",
            );
            return Expression::error();
        }
        self.consume();
        let errors = self.error_count();

        let mut arguments = Vec::new();
        if !self.is_control(')') {
            loop {
                let arg_span = self.span();
                let argument = self.parse_assignment();

                if matcher.has_matches() {
                    matcher.match_argument(arguments.len(), &argument.return_type());
                    if !matcher.has_matches() {
                        self.error_at(
                            arg_span,
                            DiagnosticCode::TYPE_MISMATCH,
                            format!(
                                "No overloaded function available that matches the first {} arguments.",
                                arguments.len() + 1
                            ),
                        );
                    }
                }
                arguments.push(argument);

                if !self.is_control(',') {
                    break;
                }
                self.consume();
            }
        }
        self.expect_control(')', "Expected closing \")\" after arguments.");

        if self.error_count() > errors {
            return Expression::error();
        }

        matcher.match_n_arguments(arguments.len());
        if !matcher.has_matches() {
            self.error_at(
                span,
                DiagnosticCode::ARGUMENT_COUNT,
                format!(
                    "No overloaded function available with {} arguments.",
                    arguments.len()
                ),
            );
            return Expression::error();
        }
        let Some(function) = matcher.get_match() else {
            self.error_at(
                span,
                DiagnosticCode::UNIQUENESS,
                "Cannot find unique match for overloaded function.",
            );
            return Expression::error();
        };

        Expression::FunctionCall {
            function,
            arguments,
        }
    }
}
