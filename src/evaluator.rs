use crate::ast::{
    Assignment, BinaryOp, Block, ConditionalBranch, DataType, Declarator, Expr, Program, Stmt,
    UnaryOp,
};
use crate::environment::{Environment, NameError};
use crate::error::{BisayaError, Span};
use crate::value::{CoercionError, Value};
use std::cmp::Ordering;
use std::io::{self, BufRead, Stdout, StdinLock, Write};
use tracing::{debug, trace};

/// Walks a parsed program against one flat variable store.
///
/// `R` supplies one line per `DAWAT` statement and `W` receives one finished
/// line per `IPAKITA` statement.
pub struct Evaluator<R, W> {
    environment: Environment,
    input: R,
    output: W,
}

impl Evaluator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            environment: Environment::new(),
            input,
            output,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn evaluate_program(&mut self, program: &Program) -> Result<(), BisayaError> {
        debug!(statements = program.statements.len(), "running program");
        for statement in &program.statements {
            self.execute_statement(statement)?;
        }
        debug!("program finished");
        Ok(())
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), BisayaError> {
        match stmt {
            Stmt::Declaration {
                data_type,
                declarators,
                ..
            } => {
                for declarator in declarators {
                    self.execute_declarator(*data_type, declarator)?;
                }
                Ok(())
            }
            Stmt::Assignment(assignment) => self.execute_assignment(assignment),
            Stmt::Output { values, span } => self.execute_output(values, span),
            Stmt::Input {
                targets,
                span,
                line,
            } => self.execute_input(targets, span, *line),
            Stmt::Conditional {
                branch,
                else_ifs,
                else_branch,
                ..
            } => self.execute_conditional(branch, else_ifs, else_branch.as_ref()),
            Stmt::Loop {
                initializer,
                condition,
                increment,
                body,
                ..
            } => {
                self.execute_statement(initializer)?;

                let mut iterations: u64 = 0;
                while self.evaluate_condition(condition)? {
                    self.execute_block(body)?;
                    self.execute_assignment(increment)?;
                    iterations += 1;
                }
                trace!(iterations, "loop finished");
                Ok(())
            }
        }
    }

    // No new scope: declarations inside a block land in the program's store.
    fn execute_block(&mut self, block: &Block) -> Result<(), BisayaError> {
        for statement in &block.statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_declarator(
        &mut self,
        data_type: DataType,
        declarator: &Declarator,
    ) -> Result<(), BisayaError> {
        let value = match &declarator.initializer {
            Some(value) => coerce_initializer(data_type, value.clone(), declarator)?,
            None => data_type.zero_value(),
        };
        trace!(name = %declarator.name, %data_type, %value, "declare");

        self.environment
            .declare(&declarator.name, value)
            .map_err(|error| name_error(error, &declarator.span, declarator.line))
    }

    fn execute_assignment(&mut self, assignment: &Assignment) -> Result<(), BisayaError> {
        let value = self.evaluate_expression(&assignment.value)?;
        for target in &assignment.targets {
            self.environment
                .assign(target, value.clone())
                .map_err(|error| name_error(error, &assignment.span, assignment.line))?;
        }
        Ok(())
    }

    fn execute_output(&mut self, values: &[Expr], span: &Span) -> Result<(), BisayaError> {
        let mut line = String::new();
        for expr in values {
            line.push_str(&self.evaluate_expression(expr)?.to_display());
        }
        line.push('\n');

        let result = self
            .output
            .write_all(line.as_bytes())
            .and_then(|()| self.output.flush());
        result.map_err(|error| {
            let line_number = values.first().map(Expr::line).unwrap_or_default();
            BisayaError::runtime_error(
                span.clone(),
                line_number,
                format!("Failed to write output: {}", error),
            )
        })
    }

    fn execute_input(
        &mut self,
        targets: &[String],
        span: &Span,
        line: usize,
    ) -> Result<(), BisayaError> {
        // Fail on unknown names before consuming any input.
        for target in targets {
            if !self.environment.contains(target) {
                return Err(name_error(NameError::Undeclared(target.clone()), span, line));
            }
        }

        let mut raw = String::new();
        let read = self.input.read_line(&mut raw).map_err(|error| {
            BisayaError::runtime_error(span.clone(), line, format!("Failed to read input: {}", error))
        })?;
        if read == 0 {
            return Err(BisayaError::runtime_error_with_help(
                span.clone(),
                line,
                format!(
                    "Unexpected end of input while reading values for {}",
                    targets.join(", ")
                ),
                "DAWAT reads one line of comma-separated values.".to_string(),
            ));
        }
        debug!(line = raw.trim_end(), "read input");

        let pieces: Vec<&str> = raw.trim_end_matches(['\r', '\n']).split(',').map(str::trim).collect();
        if pieces.len() < targets.len() {
            return Err(BisayaError::runtime_error_with_help(
                span.clone(),
                line,
                format!(
                    "Expected {} input value(s) for {}, got {}",
                    targets.len(),
                    targets.join(", "),
                    pieces.len()
                ),
                "Separate the values with commas, e.g. 1, 2".to_string(),
            ));
        }

        for (target, piece) in targets.iter().zip(pieces) {
            let value = parse_input_value(piece);
            self.environment
                .assign(target, value)
                .map_err(|error| name_error(error, span, line))?;
        }
        Ok(())
    }

    fn execute_conditional(
        &mut self,
        branch: &ConditionalBranch,
        else_ifs: &[ConditionalBranch],
        else_branch: Option<&Block>,
    ) -> Result<(), BisayaError> {
        for candidate in std::iter::once(branch).chain(else_ifs) {
            if self.evaluate_condition(&candidate.condition)? {
                return self.execute_block(&candidate.body);
            }
        }

        match else_branch {
            Some(block) => self.execute_block(block),
            None => Ok(()),
        }
    }

    fn evaluate_condition(&mut self, condition: &Expr) -> Result<bool, BisayaError> {
        let value = self.evaluate_expression(condition)?;
        value.to_boolean().map_err(|error| {
            BisayaError::type_error(
                condition.span().clone(),
                condition.line(),
                format!("Condition must be OO or DILI: {}", error),
            )
        })
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, BisayaError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Variable { name, span, line } => self
                .environment
                .get(name)
                .cloned()
                .map_err(|error| name_error(error, span, *line)),
            Expr::Unary {
                operator,
                operand,
                span,
                line,
            } => {
                let operand_val = self.evaluate_expression(operand)?;
                evaluate_unary_op(*operator, operand_val, span, *line)
            }
            Expr::Binary {
                left,
                operator,
                right,
                span,
                line,
            } => {
                // Both sides are always evaluated; UG and O do not short-circuit.
                let left_val = self.evaluate_expression(left)?;
                let right_val = self.evaluate_expression(right)?;
                evaluate_binary_op(*operator, left_val, right_val, span, *line)
            }
        }
    }
}

fn evaluate_unary_op(
    operator: UnaryOp,
    operand: Value,
    span: &Span,
    line: usize,
) -> Result<Value, BisayaError> {
    let coerced = |error: CoercionError| {
        BisayaError::type_error(
            span.clone(),
            line,
            format!("Operator '{}': {}", operator, error),
        )
    };

    match operator {
        UnaryOp::Negate => Ok(Value::Number(-operand.to_number().map_err(coerced)?)),
        UnaryOp::Plus => Ok(Value::Number(operand.to_number().map_err(coerced)?)),
        UnaryOp::Not => Ok(Value::Boolean(!operand.to_boolean().map_err(coerced)?)),
    }
}

fn evaluate_binary_op(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
    line: usize,
) -> Result<Value, BisayaError> {
    let coerced = |error: CoercionError| {
        BisayaError::type_error(
            span.clone(),
            line,
            format!("Operator '{}': {}", operator, error),
        )
    };

    match operator {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => {
            let l = left.to_number().map_err(coerced)?;
            let r = right.to_number().map_err(coerced)?;
            let result = match operator {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                _ if r == 0.0 => {
                    return Err(BisayaError::runtime_error_with_help(
                        span.clone(),
                        line,
                        "Division by zero".to_string(),
                        format!("The right-hand side of '{}' evaluated to 0.", operator),
                    ))
                }
                BinaryOp::Divide => l / r,
                _ => l % r,
            };
            if !result.is_finite() {
                return Err(BisayaError::runtime_error_with_help(
                    span.clone(),
                    line,
                    "Numeric overflow".to_string(),
                    format!("The result of '{}' is too large to represent.", operator),
                ));
            }
            Ok(Value::Number(result))
        }
        BinaryOp::Equal => Ok(Value::Boolean(left.loose_eq(&right))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!left.loose_eq(&right))),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            let ordering = match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
                (l, r) if l.is_textual() && r.is_textual() => {
                    Some(l.to_display().cmp(&r.to_display()))
                }
                (l, r) => {
                    let l = l.to_number().map_err(coerced)?;
                    let r = r.to_number().map_err(coerced)?;
                    l.partial_cmp(&r)
                }
            };

            let result = ordering.is_some_and(|ordering| match operator {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::LessEqual => ordering != Ordering::Greater,
                BinaryOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            Ok(Value::Boolean(result))
        }
        BinaryOp::And => {
            let l = left.to_boolean().map_err(coerced)?;
            let r = right.to_boolean().map_err(coerced)?;
            Ok(Value::Boolean(l && r))
        }
        BinaryOp::Or => {
            let l = left.to_boolean().map_err(coerced)?;
            let r = right.to_boolean().map_err(coerced)?;
            Ok(Value::Boolean(l || r))
        }
    }
}

/// Checks a declaration's literal against its declared type.
fn coerce_initializer(
    data_type: DataType,
    value: Value,
    declarator: &Declarator,
) -> Result<Value, BisayaError> {
    let mismatch = |value: &Value| {
        BisayaError::type_error(
            declarator.span.clone(),
            declarator.line,
            format!(
                "Cannot initialize {} variable '{}' with {} '{}'",
                data_type,
                declarator.name,
                value.type_name(),
                value
            ),
        )
    };

    match (data_type, value) {
        (DataType::Numero, Value::Number(n)) if n.fract() != 0.0 => Err(mismatch(&Value::Number(n))
            .with_help("NUMERO holds whole numbers; use TIPIK for decimals.")),
        (DataType::Numero | DataType::Tipik, value @ Value::Number(_)) => Ok(value),
        (DataType::Letra, value @ (Value::Character(_) | Value::Text(_))) => Ok(value),
        (DataType::Tinuod, value) => match value.to_boolean() {
            Ok(b) => Ok(Value::Boolean(b)),
            Err(_) => Err(mismatch(&value)),
        },
        (_, value) => Err(mismatch(&value)),
    }
}

fn parse_input_value(piece: &str) -> Value {
    if !piece.is_empty() && piece.chars().all(|c| c.is_ascii_digit()) {
        if let Some(number) = piece.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return Value::Number(number);
        }
    }
    Value::Text(piece.to_string())
}

fn name_error(error: NameError, span: &Span, line: usize) -> BisayaError {
    BisayaError::name_error(span.clone(), line, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run_with_input(source: &str, input: &str) -> Result<String, BisayaError> {
        let tokens = Lexer::new(source).scan_tokens()?;
        let program = Parser::new(tokens).parse()?;
        let mut evaluator = Evaluator::new(Cursor::new(input.to_string()), Vec::new());
        evaluator.evaluate_program(&program)?;
        Ok(String::from_utf8(evaluator.into_output()).unwrap())
    }

    fn run(source: &str) -> Result<String, BisayaError> {
        run_with_input(source, "")
    }

    #[test]
    fn zero_values_for_every_type() {
        let output = run(
            "SUGOD
                MUGNA NUMERO n MUGNA LETRA l MUGNA TINUOD t MUGNA TIPIK f
                IPAKITA: n & [[] & l & []] & t & f
            KATAPUSAN",
        )
        .unwrap();
        assert_eq!(output, "0[]DILI0\n");
    }

    #[test]
    fn redeclaration_is_a_name_error() {
        let error = run("SUGOD MUGNA NUMERO x MUGNA TIPIK x KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::NameError);
        assert!(error.message.contains("already declared"));
    }

    #[test]
    fn output_emitted_before_a_failure_is_kept() {
        let tokens = Lexer::new("SUGOD IPAKITA: \"before\" y = 1 KATAPUSAN")
            .scan_tokens()
            .unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let mut evaluator = Evaluator::new(Cursor::new(String::new()), Vec::new());
        let error = evaluator.evaluate_program(&program).unwrap_err();
        assert_eq!(error.kind, ErrorKind::NameError);
        assert_eq!(error.message, "Undefined variable 'y'");
        assert_eq!(String::from_utf8(evaluator.into_output()).unwrap(), "before\n");
    }

    #[test]
    fn division_and_modulo_by_zero_fail() {
        let error = run("SUGOD MUGNA NUMERO a=1 a = a / 0 KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeError);
        assert_eq!(error.message, "Division by zero");

        let error = run("SUGOD MUGNA NUMERO a=1 a = a % 0 KATAPUSAN").unwrap_err();
        assert_eq!(error.message, "Division by zero");
    }

    #[test]
    fn modulo_keeps_sign_of_dividend() {
        assert_eq!(
            run("SUGOD IPAKITA: 7 % 3 & \" \" & -7 % 3 KATAPUSAN").unwrap(),
            "1 -1\n"
        );
    }

    #[test]
    fn arithmetic_on_text_is_a_type_error() {
        let error = run("SUGOD MUGNA LETRA c='x' IPAKITA: c + 1 KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert_eq!(
            error.message,
            "Operator '+': Expected a number, found character 'x'"
        );
    }

    #[test]
    fn logical_operators_require_booleans() {
        let error = run("SUGOD IPAKITA: 1 UG OO KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeError);

        let error = run("SUGOD IPAKITA: DILI 5 KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeError);
    }

    #[test]
    fn conditions_must_be_boolean() {
        let error = run("SUGOD KUNG (1) PUNDOK { } KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert!(error.message.starts_with("Condition must be OO or DILI"));
    }

    #[test]
    fn numero_rejects_decimal_initializer() {
        let error = run("SUGOD MUGNA NUMERO x = 2.5 KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert_eq!(
            error.message,
            "Cannot initialize NUMERO variable 'x' with number '2.5'"
        );
    }

    #[test]
    fn relational_operators_on_text_compare_lexicographically() {
        assert_eq!(
            run("SUGOD IPAKITA: \"abc\" < \"abd\" & 'b' > 'a' & \"10\" < 9 KATAPUSAN").unwrap(),
            "OOOODILI\n"
        );
    }

    #[test]
    fn input_assigns_numbers_and_text() {
        let output = run_with_input(
            "SUGOD
                MUGNA NUMERO a, b MUGNA LETRA name
                DAWAT: a, b, name
                IPAKITA: a + b & \" \" & name
            KATAPUSAN",
            " 3 , 4,Maria \n",
        )
        .unwrap();
        assert_eq!(output, "7 Maria\n");
    }

    #[test]
    fn input_at_end_of_stream_names_targets() {
        let error = run("SUGOD MUGNA NUMERO a, b DAWAT: a, b KATAPUSAN").unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeError);
        assert_eq!(
            error.message,
            "Unexpected end of input while reading values for a, b"
        );
    }

    #[test]
    fn input_with_too_few_values_fails() {
        let error =
            run_with_input("SUGOD MUGNA NUMERO a, b DAWAT: a, b KATAPUSAN", "1\n").unwrap_err();
        assert_eq!(error.message, "Expected 2 input value(s) for a, b, got 1");
    }

    #[test]
    fn overflowing_arithmetic_is_a_runtime_error() {
        let error = run(
            "SUGOD
                MUGNA TIPIK x = 1
                ALANG SA (x = 1, x > 0, x = x * 1000000) PUNDOK { }
            KATAPUSAN",
        )
        .unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeError);
        assert_eq!(error.message, "Numeric overflow");
    }

    #[test]
    fn extra_input_values_are_ignored() {
        let output =
            run_with_input("SUGOD MUGNA NUMERO a DAWAT: a IPAKITA: a KATAPUSAN", "1, 2, 3\n")
                .unwrap();
        assert_eq!(output, "1\n");
    }

    #[test]
    fn input_into_undeclared_variable_fails() {
        let error = run_with_input("SUGOD DAWAT: q KATAPUSAN", "1\n").unwrap_err();
        assert_eq!(error.kind, ErrorKind::NameError);
    }

    #[test]
    fn loop_variable_is_visible_after_loop() {
        let output = run(
            "SUGOD
                MUGNA NUMERO i
                ALANG SA (i = 0, i < 4, i++) PUNDOK { }
                IPAKITA: i
            KATAPUSAN",
        )
        .unwrap();
        assert_eq!(output, "4\n");
    }

    #[test]
    fn declaration_inside_loop_body_fails_on_second_iteration() {
        let error = run(
            "SUGOD
                MUGNA NUMERO i
                ALANG SA (i = 0, i < 2, i++) PUNDOK { MUGNA NUMERO inner = 1 }
            KATAPUSAN",
        )
        .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NameError);
        assert_eq!(error.message, "Variable 'inner' is already declared");
    }
}
