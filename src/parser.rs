use crate::ast::{
    Assignment, BinaryOp, Block, ConditionalBranch, DataType, Declarator, Expr, Program, Stmt,
    UnaryOp,
};
use crate::error::{BisayaError, Span};
use crate::lexer::{Keyword, Symbol, Token, TokenType};
use crate::value::{Value, FALSE_WORD, TRUE_WORD};
use tracing::debug;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, BisayaError> {
        self.consume_keyword(
            Keyword::Sugod,
            "Expected 'SUGOD' at the start of the program",
            "Every program is written between SUGOD and KATAPUSAN.",
        )?;

        let mut statements = Vec::new();
        while !self.check_keyword(Keyword::Katapusan) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        self.consume_keyword(
            Keyword::Katapusan,
            "Expected 'KATAPUSAN' at the end of the program",
            "Close the program with KATAPUSAN after its last statement.",
        )?;

        // Anything after KATAPUSAN is outside the program.
        if !self.is_at_end() {
            debug!(line = self.peek().line, "ignoring text after KATAPUSAN");
        }

        debug!(statements = statements.len(), "parsing finished");
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, BisayaError> {
        let token = self.peek().clone();

        match token.token_type {
            TokenType::Keyword(Keyword::Mugna) => {
                self.advance();
                self.declaration(true)
            }
            TokenType::Identifier => Ok(Stmt::Assignment(self.assignment()?)),
            TokenType::Keyword(Keyword::Ipakita) => {
                self.advance();
                self.output_statement()
            }
            TokenType::Keyword(Keyword::Dawat) => {
                self.advance();
                self.input_statement()
            }
            TokenType::Keyword(Keyword::Kung) => {
                self.advance();
                self.conditional_statement()
            }
            TokenType::Keyword(Keyword::Alang) => {
                self.advance();
                self.loop_statement()
            }
            TokenType::Keyword(keyword @ (Keyword::KungDili | Keyword::KungWala)) => {
                Err(BisayaError::parse_error_with_help(
                    token.span,
                    token.line,
                    format!("'{}' without a preceding KUNG", keyword),
                    "KUNG DILI and KUNG WALA clauses must follow a KUNG block.".to_string(),
                ))
            }
            TokenType::Eof => Err(BisayaError::parse_error_with_help(
                token.span,
                token.line,
                "Unexpected end of input".to_string(),
                "The program or block is missing its closing keyword.".to_string(),
            )),
            _ => Err(BisayaError::parse_error_with_help(
                token.span,
                token.line,
                format!("Expected a statement, found '{}'", token.lexeme),
                "Statements start with MUGNA, IPAKITA, DAWAT, KUNG, ALANG SA, or a variable name."
                    .to_string(),
            )),
        }
    }

    /// `MUGNA` type name [= literal] (, name [= literal])*
    ///
    /// A loop header allows exactly one declarator, since its commas separate
    /// the header clauses.
    fn declaration(&mut self, allow_multiple: bool) -> Result<Stmt, BisayaError> {
        let start = self.previous().span.clone();
        let type_token = self.advance().clone();
        let data_type = match type_token.token_type {
            TokenType::Keyword(Keyword::Numero) => DataType::Numero,
            TokenType::Keyword(Keyword::Letra) => DataType::Letra,
            TokenType::Keyword(Keyword::Tinuod) => DataType::Tinuod,
            TokenType::Keyword(Keyword::Tipik) => DataType::Tipik,
            _ => {
                return Err(BisayaError::parse_error_with_help(
                    type_token.span,
                    type_token.line,
                    format!("Expected a data type after MUGNA, found '{}'", type_token.lexeme),
                    "The data types are NUMERO, LETRA, TINUOD, and TIPIK.".to_string(),
                ))
            }
        };

        let mut declarators = Vec::new();
        loop {
            let name_token = self
                .consume_with_help(
                    TokenType::Identifier,
                    "Expected variable name in declaration",
                    format!("Example: MUGNA {} x, y = ...", data_type),
                )?
                .clone();

            let initializer = if self.match_symbol(Symbol::Equal) {
                Some(self.literal_value()?)
            } else {
                None
            };

            declarators.push(Declarator {
                name: name_token.lexeme,
                initializer,
                span: name_token.span.to(&self.previous().span),
                line: name_token.line,
            });

            if !allow_multiple || !self.match_symbol(Symbol::Comma) {
                break;
            }
        }

        Ok(Stmt::Declaration {
            data_type,
            declarators,
            span: start.to(&self.previous().span),
        })
    }

    /// Declaration initializers are literals only, with an optional sign on numbers.
    fn literal_value(&mut self) -> Result<Value, BisayaError> {
        let sign = if self.match_symbol(Symbol::Minus) {
            Some(-1.0)
        } else if self.match_symbol(Symbol::Plus) {
            Some(1.0)
        } else {
            None
        };

        let token = self.advance().clone();
        match (token.token_type, sign) {
            (TokenType::Number, sign) => {
                let number = self.parse_number(&token)?;
                Ok(Value::Number(number * sign.unwrap_or(1.0)))
            }
            (TokenType::String, None) => Ok(Value::Text(token.lexeme)),
            (TokenType::Character, None) => match token.lexeme.chars().next() {
                Some(c) => Ok(Value::Character(c)),
                None => Err(BisayaError::parse_error(
                    token.span,
                    token.line,
                    "Empty character literal".to_string(),
                )),
            },
            (TokenType::Boolean, None) => Ok(Value::Boolean(token.lexeme == TRUE_WORD)),
            _ => Err(BisayaError::parse_error_with_help(
                token.span,
                token.line,
                format!("Expected a literal value after '=', found '{}'", token.lexeme),
                "Declarations may only be initialized with a number, \"text\", 'c', OO, or DILI."
                    .to_string(),
            )),
        }
    }

    /// name = (name =)* expression
    fn assignment(&mut self) -> Result<Assignment, BisayaError> {
        let first = self
            .consume(TokenType::Identifier, "Expected variable name")?
            .clone();
        self.consume_with_help(
            TokenType::Symbol(Symbol::Equal),
            &format!("Expected '=' after '{}'", first.lexeme),
            "Assignments look like: x = 1 or x = y = 4".to_string(),
        )?;

        let mut targets = vec![first.lexeme.clone()];
        while self.check(&TokenType::Identifier)
            && self.peek_next().is_some_and(|next| next.is_symbol(Symbol::Equal))
        {
            targets.push(self.advance().lexeme.clone());
            self.advance();
        }

        let value = self.expression()?;
        Ok(Assignment {
            targets,
            span: first.span.to(value.span()),
            line: first.line,
            value,
        })
    }

    fn output_statement(&mut self) -> Result<Stmt, BisayaError> {
        let start = self.previous().span.clone();
        self.consume_with_help(
            TokenType::Symbol(Symbol::Colon),
            "Expected ':' after IPAKITA",
            "Output statements look like: IPAKITA: x & \"text\" & $".to_string(),
        )?;

        let mut values = vec![self.expression()?];
        while self.match_symbol(Symbol::Ampersand) {
            values.push(self.expression()?);
        }

        Ok(Stmt::Output {
            values,
            span: start.to(&self.previous().span),
        })
    }

    fn input_statement(&mut self) -> Result<Stmt, BisayaError> {
        let start = self.previous().clone();
        self.consume_with_help(
            TokenType::Symbol(Symbol::Colon),
            "Expected ':' after DAWAT",
            "Input statements look like: DAWAT: x, y".to_string(),
        )?;

        let mut targets = Vec::new();
        loop {
            let name = self.consume(TokenType::Identifier, "Expected variable name in DAWAT")?;
            targets.push(name.lexeme.clone());
            if !self.match_symbol(Symbol::Comma) {
                break;
            }
        }

        Ok(Stmt::Input {
            targets,
            span: start.span.to(&self.previous().span),
            line: start.line,
        })
    }

    fn conditional_statement(&mut self) -> Result<Stmt, BisayaError> {
        let start = self.previous().span.clone();
        let branch = self.conditional_branch("KUNG")?;

        let mut else_ifs = Vec::new();
        while self.match_keyword(Keyword::KungDili) {
            else_ifs.push(self.conditional_branch("KUNG DILI")?);
        }

        let else_branch = if self.match_keyword(Keyword::KungWala) {
            Some(self.block("KUNG WALA")?)
        } else {
            None
        };

        Ok(Stmt::Conditional {
            branch,
            else_ifs,
            else_branch,
            span: start.to(&self.previous().span),
        })
    }

    fn conditional_branch(&mut self, keyword: &str) -> Result<ConditionalBranch, BisayaError> {
        // The condition starts with a parenthesised group but may continue past
        // it, as in KUNG (a < b) UG (c > d).
        if !self.check_symbol(Symbol::LeftParen) {
            let token = self.peek();
            return Err(BisayaError::parse_error_with_help(
                token.span.clone(),
                token.line,
                format!("Expected '(' after '{}'", keyword),
                format!("Conditions are parenthesised: {} (x > 0) PUNDOK {{ ... }}", keyword),
            ));
        }
        let condition = self.expression()?;
        let body = self.block(keyword)?;
        Ok(ConditionalBranch { condition, body })
    }

    /// `ALANG SA (init, condition, increment) PUNDOK { ... }`
    fn loop_statement(&mut self) -> Result<Stmt, BisayaError> {
        let start = self.previous().span.clone();
        self.consume_keyword(
            Keyword::Sa,
            "Expected 'SA' after 'ALANG'",
            "Loops start with ALANG SA.",
        )?;
        self.consume_with_help(
            TokenType::Symbol(Symbol::LeftParen),
            "Expected '(' after 'ALANG SA'",
            "Loops look like: ALANG SA (i = 1, i <= 3, i++) PUNDOK { ... }".to_string(),
        )?;

        let initializer = if self.match_keyword(Keyword::Mugna) {
            self.declaration(false)?
        } else if self.check(&TokenType::Identifier) {
            Stmt::Assignment(self.assignment()?)
        } else {
            let token = self.peek();
            return Err(BisayaError::parse_error(
                token.span.clone(),
                token.line,
                format!("Expected loop initializer, found '{}'", token.lexeme),
            ));
        };
        self.consume(
            TokenType::Symbol(Symbol::Comma),
            "Expected ',' after loop initializer",
        )?;

        let condition = self.expression()?;
        self.consume(
            TokenType::Symbol(Symbol::Comma),
            "Expected ',' after loop condition",
        )?;

        let increment = self.loop_increment()?;
        self.consume_with_help(
            TokenType::Symbol(Symbol::RightParen),
            "Expected ')' after loop clauses",
            "The loop header holds exactly three clauses separated by commas.".to_string(),
        )?;

        let body = self.block("ALANG SA")?;
        Ok(Stmt::Loop {
            initializer: Box::new(initializer),
            condition,
            increment,
            span: start.to(&body.span),
            body,
        })
    }

    /// `i++` desugars to `i = i + 1`.
    fn loop_increment(&mut self) -> Result<Assignment, BisayaError> {
        let increments = self.check(&TokenType::Identifier)
            && self
                .peek_next()
                .is_some_and(|next| next.is_symbol(Symbol::Increment));

        if !increments {
            return self.assignment();
        }

        let target = self.advance().clone();
        let op_token = self.advance().clone();
        let span = target.span.to(&op_token.span);
        let variable = Expr::Variable {
            name: target.lexeme.clone(),
            span: target.span.clone(),
            line: target.line,
        };
        let one = Expr::Literal {
            value: Value::Number(1.0),
            span: op_token.span.clone(),
            line: op_token.line,
        };
        Ok(Assignment {
            targets: vec![target.lexeme],
            value: Expr::Binary {
                left: Box::new(variable),
                operator: BinaryOp::Add,
                right: Box::new(one),
                span: span.clone(),
                line: op_token.line,
            },
            span,
            line: target.line,
        })
    }

    fn block(&mut self, owner: &str) -> Result<Block, BisayaError> {
        let start = self
            .consume_keyword(
                Keyword::Pundok,
                &format!("Expected 'PUNDOK' to open the {} block", owner),
                "Blocks look like: PUNDOK { ... }",
            )?
            .span
            .clone();
        self.consume_with_help(
            TokenType::Symbol(Symbol::LeftBrace),
            "Expected '{' after 'PUNDOK'",
            "Blocks look like: PUNDOK { ... }".to_string(),
        )?;

        let mut statements = Vec::new();
        while !self.check_symbol(Symbol::RightBrace)
            && !self.check_keyword(Keyword::Katapusan)
            && !self.is_at_end()
        {
            statements.push(self.statement()?);
        }

        let end = self
            .consume_with_help(
                TokenType::Symbol(Symbol::RightBrace),
                "Expected '}' after block",
                format!("The {} block opened with 'PUNDOK {{' must be closed with '}}'.", owner),
            )?
            .span
            .clone();

        Ok(Block {
            statements,
            span: start.to(&end),
        })
    }

    fn expression(&mut self) -> Result<Expr, BisayaError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.and()?;

        while self.match_keyword(Keyword::O) {
            let operator_token = self.previous().clone();
            self.expect_operand(&operator_token)?;
            let right = self.and()?;
            expr = binary(expr, BinaryOp::Or, right, operator_token.line);
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.equality()?;

        while self.match_keyword(Keyword::Ug) {
            let operator_token = self.previous().clone();
            self.expect_operand(&operator_token)?;
            let right = self.equality()?;
            expr = binary(expr, BinaryOp::And, right, operator_token.line);
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.comparison()?;

        while self.match_symbols(&[Symbol::EqualEqual, Symbol::LessGreater]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Symbol(Symbol::EqualEqual) => BinaryOp::Equal,
                _ => BinaryOp::NotEqual,
            };
            self.expect_operand(&operator_token)?;
            let right = self.comparison()?;
            expr = binary(expr, operator, right, operator_token.line);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.term()?;

        while self.match_symbols(&[
            Symbol::Greater,
            Symbol::GreaterEqual,
            Symbol::Less,
            Symbol::LessEqual,
        ]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Symbol(Symbol::Greater) => BinaryOp::Greater,
                TokenType::Symbol(Symbol::GreaterEqual) => BinaryOp::GreaterEqual,
                TokenType::Symbol(Symbol::Less) => BinaryOp::Less,
                _ => BinaryOp::LessEqual,
            };
            self.expect_operand(&operator_token)?;
            let right = self.term()?;
            expr = binary(expr, operator, right, operator_token.line);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.factor()?;

        while self.match_symbols(&[Symbol::Minus, Symbol::Plus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Symbol(Symbol::Minus) => BinaryOp::Subtract,
                _ => BinaryOp::Add,
            };
            self.expect_operand(&operator_token)?;
            let right = self.factor()?;
            expr = binary(expr, operator, right, operator_token.line);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, BisayaError> {
        let mut expr = self.unary()?;

        while self.match_symbols(&[Symbol::Slash, Symbol::Star, Symbol::Percent]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Symbol(Symbol::Slash) => BinaryOp::Divide,
                TokenType::Symbol(Symbol::Star) => BinaryOp::Multiply,
                _ => BinaryOp::Modulo,
            };
            self.expect_operand(&operator_token)?;
            let right = self.unary()?;
            expr = binary(expr, operator, right, operator_token.line);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, BisayaError> {
        let operator = if self.match_symbols(&[Symbol::Minus, Symbol::Plus]) {
            Some(match self.previous().token_type {
                TokenType::Symbol(Symbol::Minus) => UnaryOp::Negate,
                _ => UnaryOp::Plus,
            })
        } else if self.is_not_operator() {
            self.advance();
            Some(UnaryOp::Not)
        } else {
            None
        };

        if let Some(operator) = operator {
            let operator_token = self.previous().clone();
            self.expect_operand(&operator_token)?;
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                span: operator_token.span.to(operand.span()),
                line: operator_token.line,
                operator,
                operand: Box::new(operand),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, BisayaError> {
        if self.is_at_end() {
            let token = self.peek();
            return Err(BisayaError::parse_error_with_help(
                token.span.clone(),
                token.line,
                "Unexpected end of input".to_string(),
                "Expected an expression here. Check for unmatched parentheses or incomplete statements."
                    .to_string(),
            ));
        }

        let token = self.advance().clone();
        let literal = |value: Value| Expr::Literal {
            value,
            span: token.span.clone(),
            line: token.line,
        };

        match token.token_type {
            TokenType::Number => {
                let number = self.parse_number(&token)?;
                Ok(literal(Value::Number(number)))
            }
            TokenType::String => Ok(literal(Value::Text(token.lexeme.clone()))),
            TokenType::Character => match token.lexeme.chars().next() {
                Some(c) => Ok(literal(Value::Character(c))),
                None => Err(BisayaError::parse_error(
                    token.span.clone(),
                    token.line,
                    "Empty character literal".to_string(),
                )),
            },
            TokenType::Boolean => Ok(literal(Value::Boolean(token.lexeme == TRUE_WORD))),
            TokenType::Symbol(Symbol::Dollar) => Ok(literal(Value::Text("\n".to_string()))),
            TokenType::Symbol(Symbol::EscapeOpenBracket) => Ok(literal(Value::Text("[".to_string()))),
            TokenType::Symbol(Symbol::EscapeCloseBracket) => {
                Ok(literal(Value::Text("]".to_string())))
            }
            TokenType::Symbol(Symbol::EscapeHash) => Ok(literal(Value::Text("#".to_string()))),
            TokenType::Identifier => Ok(Expr::Variable {
                name: token.lexeme,
                span: token.span,
                line: token.line,
            }),
            TokenType::Symbol(Symbol::LeftParen) => {
                if self.check_symbol(Symbol::RightParen) {
                    return Err(BisayaError::parse_error_with_help(
                        token.span.to(&self.peek().span),
                        token.line,
                        "Empty parentheses are not allowed".to_string(),
                        "Parentheses must contain an expression, e.g. (x + 1)".to_string(),
                    ));
                }

                let expr = self.expression()?;
                self.consume_with_help(
                    TokenType::Symbol(Symbol::RightParen),
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(expr)
            }
            _ => {
                let help_msg = match token.token_type {
                    TokenType::Symbol(Symbol::RightParen) => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    TokenType::Symbol(Symbol::LeftBracket | Symbol::RightBracket) => {
                        "Brackets are only valid as the escapes [[], []], and [#]."
                    }
                    TokenType::Keyword(_) => "Keywords cannot be used as values.",
                    _ => "Expected a literal value, variable, or parenthesized expression here.",
                };

                Err(BisayaError::parse_error_with_help(
                    token.span,
                    token.line,
                    format!("Expected expression, found '{}'", token.lexeme),
                    help_msg.to_string(),
                ))
            }
        }
    }

    fn parse_number(&self, token: &Token) -> Result<f64, BisayaError> {
        match token.lexeme.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            Ok(_) => Err(BisayaError::parse_error(
                token.span.clone(),
                token.line,
                "Number literal is too large".to_string(),
            )),
            Err(_) => Err(BisayaError::parse_error(
                token.span.clone(),
                token.line,
                format!("Invalid number '{}'", token.lexeme),
            )),
        }
    }

    /// `DILI` is the false literal unless an operand follows it, in which
    /// case it negates that operand.
    fn is_not_operator(&self) -> bool {
        let token = self.peek();
        token.token_type == TokenType::Boolean
            && token.lexeme == FALSE_WORD
            && self.starts_operand_at(self.current + 1)
    }

    fn expect_operand(&self, operator_token: &Token) -> Result<(), BisayaError> {
        if self.starts_operand_at(self.current) {
            return Ok(());
        }

        let token = self.peek();
        Err(BisayaError::parse_error_with_help(
            token.span.clone(),
            token.line,
            format!("Expected expression after '{}'", operator_token.lexeme),
            "Operators require an expression on both sides.".to_string(),
        ))
    }

    fn starts_operand_at(&self, index: usize) -> bool {
        let Some(token) = self.tokens.get(index) else {
            return false;
        };

        match token.token_type {
            TokenType::Number | TokenType::String | TokenType::Character | TokenType::Boolean => {
                true
            }
            // `name =` begins the next statement, not an operand.
            TokenType::Identifier => !self
                .tokens
                .get(index + 1)
                .is_some_and(|next| next.is_symbol(Symbol::Equal)),
            TokenType::Symbol(symbol) => matches!(
                symbol,
                Symbol::LeftParen
                    | Symbol::Plus
                    | Symbol::Minus
                    | Symbol::Dollar
                    | Symbol::EscapeOpenBracket
                    | Symbol::EscapeCloseBracket
                    | Symbol::EscapeHash
            ),
            _ => false,
        }
    }

    fn match_symbol(&mut self, symbol: Symbol) -> bool {
        self.match_symbols(&[symbol])
    }

    fn match_symbols(&mut self, symbols: &[Symbol]) -> bool {
        for symbol in symbols {
            if self.check_symbol(*symbol) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn check_symbol(&self, symbol: Symbol) -> bool {
        self.check(&TokenType::Symbol(symbol))
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(&TokenType::Keyword(keyword))
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, BisayaError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            let found = if token.token_type == TokenType::Eof {
                "end of input".to_string()
            } else {
                format!("'{}'", token.lexeme)
            };
            Err(BisayaError::parse_error(
                self.error_span(),
                token.line,
                format!("{}, found {}", message, found),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, BisayaError> {
        self.consume(token_type, message)
            .map_err(|error| error.with_help(help))
    }

    fn consume_keyword(
        &mut self,
        keyword: Keyword,
        message: &str,
        help: &str,
    ) -> Result<&Token, BisayaError> {
        self.consume_with_help(TokenType::Keyword(keyword), message, help.to_string())
    }

    fn error_span(&self) -> Span {
        if self.is_at_end() && self.current > 0 {
            // At EOF, point just past the last real token.
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            self.peek().span.clone()
        }
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr, line: usize) -> Expr {
    Expr::Binary {
        span: left.span().to(right.span()),
        left: Box::new(left),
        operator,
        right: Box::new(right),
        line,
    }
}
