use std::fmt::{self, Write};

use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bin(#[from] spvsl_bin::Error),

    #[error("{}", DisplayMessages(.diagnostics))]
    Compile { diagnostics: Vec<DiagnosticMessage> },
}

impl Error {
    pub(crate) fn from_diagnostics(diagnostics: Vec<Diagnostic>, source: &str) -> Self {
        let source = ariadne::Source::from(source);

        let diagnostics = diagnostics
            .into_iter()
            .map(|diagnostic| {
                let location = compose_location(&diagnostic, &source);
                let display = compose_display(&diagnostic, &source);
                DiagnosticMessage {
                    diagnostic,
                    display,
                    location,
                }
            })
            .collect();
        Error::Compile { diagnostics }
    }
}

#[derive(Debug)]
pub struct DiagnosticMessage {
    diagnostic: Diagnostic,

    display: String,

    location: Option<SourceLocation>,
}

impl DiagnosticMessage {
    pub fn code(&self) -> &'static str {
        self.diagnostic.code.get()
    }

    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }

    pub fn span(&self) -> &Option<crate::Span> {
        &self.diagnostic.span
    }

    /// Rendered report, with the source line and a label under the span.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

/// Location within the source.
/// Tuples contain:
/// - line number (0-based),
/// - column number within that line (0-based),
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: (usize, usize),

    pub end: (usize, usize),
}

fn compose_display(diagnostic: &Diagnostic, source: &ariadne::Source<&str>) -> String {
    use ariadne::{Config, Label, Report, ReportKind};

    let kind = match diagnostic.code.get_severity() {
        Severity::Warning => ReportKind::Warning,
        Severity::Error => ReportKind::Error,
    };

    let Some(span) = diagnostic.span else {
        // nothing to point at
        let mut out = format!("{kind}");
        if diagnostic.code != DiagnosticCode::CUSTOM {
            let _ = write!(out, " [{}]", diagnostic.code.get());
        }
        let _ = write!(out, ": {}", diagnostic.message);
        return out;
    };
    let span = std::ops::Range::from(span);

    let config = Config::default().with_color(false);
    let mut report = Report::build(kind, (), span.start)
        .with_config(config)
        .with_message(&diagnostic.message)
        .with_label(Label::new(span).with_message(&diagnostic.message));

    if diagnostic.code != DiagnosticCode::CUSTOM {
        report = report.with_code(diagnostic.code.get());
    }

    let mut notes = String::new();
    for additional in &diagnostic.additional {
        if let Some(span) = additional.span {
            report.add_label(Label::new(std::ops::Range::from(span)).with_message(&additional.message))
        } else {
            notes += &additional.message;
            notes += "\n";
        }
    }
    if !notes.is_empty() {
        report.set_note(notes);
    }

    let mut out = Vec::new();
    if report.finish().write(source.clone(), &mut out).is_err() {
        return diagnostic.message.clone();
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn compose_location(diagnostic: &Diagnostic, source: &ariadne::Source<&str>) -> Option<SourceLocation> {
    let span = diagnostic.span?;

    let start = source.get_offset_line(span.start as usize)?;
    let end = source.get_offset_line(span.end() as usize)?;
    Some(SourceLocation {
        start: (start.1, start.2),
        end: (end.1, end.2),
    })
}

struct DisplayMessages<'a>(&'a Vec<DiagnosticMessage>);

impl std::fmt::Display for DisplayMessages<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.0 {
            f.write_str(&d.display)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnostic::WithErrorInfo;
    use crate::Span;

    #[test]
    fn location_and_display() {
        let source = "float a;\na + true";
        let diagnostic = Diagnostic::new("Operands do not match.", DiagnosticCode::TYPE_MISMATCH)
            .with_span(Some(Span::new(11, 12)));

        let Error::Compile { diagnostics } = Error::from_diagnostics(vec![diagnostic], source) else {
            unreachable!()
        };
        let message = &diagnostics[0];

        assert_eq!(message.code(), "E0004");
        assert_eq!(
            message.location(),
            Some(&SourceLocation {
                start: (1, 2),
                end: (1, 3)
            })
        );
        assert!(message.display().contains("[E0004]"), "{}", message.display());
        assert!(message.display().contains("a + true"), "{}", message.display());
    }

    #[test]
    fn without_span() {
        let diagnostic = Diagnostic::new("Something went wrong.", DiagnosticCode::BUG);
        let error = Error::from_diagnostics(vec![diagnostic], "");

        assert_eq!(error.to_string(), "Error [E0001]: Something went wrong.\n");
    }
}
