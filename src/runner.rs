use crate::ast::Program;
use crate::error::BisayaError;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::io::{BufRead, Write};
use tracing::info;

/// Lex and parse without running anything.
pub fn check(source: &str) -> Result<Program, BisayaError> {
    let tokens = Lexer::new(source).scan_tokens()?;
    Parser::new(tokens).parse()
}

/// Run a program against the given console collaborators.
///
/// Lexical and syntax errors abort before any statement executes. Runtime
/// errors abort at the failing statement, after earlier output was written.
pub fn interpret<R: BufRead, W: Write>(
    source: &str,
    input: R,
    output: W,
) -> Result<W, BisayaError> {
    let program = check(source)?;
    let mut evaluator = Evaluator::new(input, output);
    evaluator.evaluate_program(&program)?;
    Ok(evaluator.into_output())
}

/// Run a program on stdin/stdout, reporting any failure as a diagnostic.
/// Returns whether the run succeeded.
pub fn run(source: &str, filename: Option<&str>) -> bool {
    info!(file = filename.unwrap_or("<source>"), "starting run");

    let program = match check(source) {
        Ok(program) => program,
        Err(error) => {
            error.report(source, filename);
            return false;
        }
    };

    let mut evaluator = Evaluator::stdio();
    if let Err(error) = evaluator.evaluate_program(&program) {
        error.report(source, filename);
        return false;
    }
    true
}
