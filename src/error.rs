use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Lexical Error")]
    LexError,
    #[error("Syntax Error")]
    ParseError,
    #[error("Name Error")]
    NameError,
    #[error("Type Error")]
    TypeError,
    #[error("Runtime Error")]
    RuntimeError,
}

impl ErrorKind {
    fn color(&self) -> Color {
        match self {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::NameError => Color::Blue,
            ErrorKind::TypeError => Color::Cyan,
            ErrorKind::RuntimeError => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BisayaError {
    pub kind: ErrorKind,
    pub span: Span,
    pub line: usize,
    pub message: String,
    pub help: Option<String>,
}

impl BisayaError {
    pub fn new(kind: ErrorKind, span: Span, line: usize, message: String) -> Self {
        Self {
            kind,
            span,
            line,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn lex_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, line, message)
    }

    pub fn parse_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, line, message)
    }

    pub fn parse_error_with_help(span: Span, line: usize, message: String, help: String) -> Self {
        Self::parse_error(span, line, message).with_help(help)
    }

    pub fn name_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::NameError, span, line, message)
    }

    pub fn type_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::TypeError, span, line, message)
    }

    pub fn runtime_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, span, line, message)
    }

    pub fn runtime_error_with_help(span: Span, line: usize, message: String, help: String) -> Self {
        Self::runtime_error(span, line, message).with_help(help)
    }

    /// Render the error as a labelled diagnostic on stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<source>");
        let color = self.kind.color();

        // Keep the label inside the source so ariadne never indexes past the end.
        let end = self.span.end.min(source.len());
        let start = self.span.start.min(end);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!(
                "{} at line {}: {}",
                self.kind.fg(color),
                self.line,
                self.message
            ))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            // Fall back to the plain form if the terminal rejects the write.
            eprintln!("{} (report failed: {})", self, error);
        }
    }
}

impl fmt::Display for BisayaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.kind, self.line, self.message)
    }
}

impl std::error::Error for BisayaError {}
