//! Printer that converts expression trees back to GLSL source.
//!
//! Parentheses are only added where a child binds weaker than its position
//! in the parent requires, so printed source parses back into the same
//! tree. The [PrintSource] trait is implemented for the tree nodes and
//! writes into the buffer of a [Printer].

mod test;

use itertools::Itertools;

use crate::expr::{Assignment, Binary, Expression, Swizzle};

/// Binding strength of assignments. Binary operators bind with their
/// precedence, which is above this.
const ASSIGNMENT: u8 = 1;
const UNARY: u8 = 13;
const POSTFIX: u8 = 14;

impl Expression {
    /// GLSL source of this expression.
    pub fn print(&self) -> String {
        let mut printer = Printer::default();
        self.print_source(&mut printer);
        printer.buffer
    }

    /// How tightly this expression holds together when printed.
    fn binding(&self) -> u8 {
        match self {
            Expression::Assignment(_) => ASSIGNMENT,
            Expression::Multiplication(binary)
            | Expression::Arithmetic(binary)
            | Expression::Operation(binary) => binary.op.precedence(),
            Expression::Negation(_) => UNARY,
            Expression::Constant(value) if value.to_string().starts_with('-') => UNARY,
            _ => POSTFIX,
        }
    }
}

trait PrintSource {
    fn print_source(&self, p: &mut Printer);
}

#[derive(Default)]
struct Printer {
    /// Generated source code.
    buffer: String,
}

impl Printer {
    fn push(&mut self, snippet: impl AsRef<str>) {
        self.buffer.push_str(snippet.as_ref());
    }

    /// Prints `expr`, in parentheses if it binds weaker than `binding`.
    fn push_operand(&mut self, expr: &Expression, binding: u8) {
        if expr.binding() < binding {
            self.push("(");
            expr.print_source(self);
            self.push(")");
        } else {
            expr.print_source(self);
        }
    }

    fn push_arguments(&mut self, arguments: &[Expression]) {
        self.push("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_operand(argument, ASSIGNMENT);
        }
        self.push(")");
    }
}

impl PrintSource for Expression {
    fn print_source(&self, p: &mut Printer) {
        match self {
            Expression::Assignment(assignment) => assignment.print_source(p),
            Expression::Multiplication(binary)
            | Expression::Arithmetic(binary)
            | Expression::Operation(binary) => binary.print_source(p),
            Expression::Reference(var) => p.push(&var.name),
            Expression::Constructor { ty, arguments } => {
                p.push(ty.to_string());
                p.push_arguments(arguments);
            }
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                p.push(function.name());
                p.push_arguments(arguments);
            }
            Expression::Member { expr, index } => {
                p.push_operand(expr, POSTFIX);
                p.push(".");
                p.push(&expr.return_type().members()[*index].name);
            }
            Expression::Swizzle(swizzle) => swizzle.print_source(p),
            Expression::Negation(expr) => {
                p.push("-");
                // `--` would be a decrement
                if expr.binding() == UNARY {
                    p.push("(");
                    expr.print_source(p);
                    p.push(")");
                } else {
                    p.push_operand(expr, UNARY);
                }
            }
            Expression::Constant(value) => p.push(value.to_string()),
        }
    }
}

impl PrintSource for Binary {
    fn print_source(&self, p: &mut Printer) {
        let precedence = self.op.precedence();

        p.push_operand(&self.left, precedence);
        p.push(format!(" {} ", self.op));
        p.push_operand(&self.right, precedence + 1);
    }
}

impl PrintSource for Assignment {
    fn print_source(&self, p: &mut Printer) {
        p.push_operand(&self.lvalue, POSTFIX);
        match self.op {
            Some(op) => p.push(format!(" {op}= ")),
            None => p.push(" = "),
        }
        p.push_operand(&self.rvalue, ASSIGNMENT);
    }
}

impl PrintSource for Swizzle {
    fn print_source(&self, p: &mut Printer) {
        p.push_operand(&self.expr, POSTFIX);
        p.push(".");
        p.push(self.indexes.iter().map(|i| self.names.letter(*i)).join(""));
    }
}
