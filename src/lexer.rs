use crate::error::{BisayaError, Span};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Sugod,
    Katapusan,
    Mugna,
    Numero,
    Letra,
    Tinuod,
    Tipik,
    Ipakita,
    Dawat,
    Kung,
    KungWala,
    KungDili,
    Pundok,
    Alang,
    Sa,
    Ug,
    O,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Sugod => "SUGOD",
            Keyword::Katapusan => "KATAPUSAN",
            Keyword::Mugna => "MUGNA",
            Keyword::Numero => "NUMERO",
            Keyword::Letra => "LETRA",
            Keyword::Tinuod => "TINUOD",
            Keyword::Tipik => "TIPIK",
            Keyword::Ipakita => "IPAKITA",
            Keyword::Dawat => "DAWAT",
            Keyword::Kung => "KUNG",
            Keyword::KungWala => "KUNG WALA",
            Keyword::KungDili => "KUNG DILI",
            Keyword::Pundok => "PUNDOK",
            Keyword::Alang => "ALANG",
            Keyword::Sa => "SA",
            Keyword::Ug => "UG",
            Keyword::O => "O",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand,
    Dollar,
    Increment,

    // One or two character tokens
    Equal,
    EqualEqual,
    LessGreater,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Bracket escapes: [[] []] [#]
    EscapeOpenBracket,
    EscapeCloseBracket,
    EscapeHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword(Keyword),
    Identifier,
    Number,
    String,
    Character,
    Boolean,
    Symbol(Symbol),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span, line: usize) -> Self {
        Self {
            token_type,
            lexeme,
            span,
            line,
        }
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.token_type == TokenType::Symbol(symbol)
    }
}

/// Keywords spelled as two words. Adjacent tokens spelling one of these are
/// merged into a single keyword token.
const TWO_WORD_KEYWORDS: &[(&str, &str, Keyword)] = &[
    ("KUNG", "WALA", Keyword::KungWala),
    ("KUNG", "DILI", Keyword::KungDili),
];

const BOOLEAN_LITERALS: &[&str] = &["OO", "DILI"];

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    // Byte offsets of `start`/`current`, for spans.
    start_byte: usize,
    current_byte: usize,
    // Line of the token being scanned; literals may span lines.
    start_line: usize,
    line: usize,
    keywords: HashMap<&'static str, Keyword>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        for keyword in [
            Keyword::Sugod,
            Keyword::Katapusan,
            Keyword::Mugna,
            Keyword::Numero,
            Keyword::Letra,
            Keyword::Tinuod,
            Keyword::Tipik,
            Keyword::Ipakita,
            Keyword::Dawat,
            Keyword::Kung,
            Keyword::Pundok,
            Keyword::Alang,
            Keyword::Sa,
            Keyword::Ug,
            Keyword::O,
        ] {
            keywords.insert(keyword.as_str(), keyword);
        }

        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            start_byte: 0,
            current_byte: 0,
            start_line: 1,
            line: 1,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, BisayaError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_byte = self.current_byte;
            self.start_line = self.line;
            self.scan_token()?;
        }

        let mut tokens = merge_two_word_keywords(self.tokens);

        tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            Span::new(self.current_byte, self.current_byte),
            self.line,
        ));

        debug!(tokens = tokens.len(), lines = self.line, "lexing finished");
        Ok(tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), BisayaError> {
        let c = self.advance();

        match c {
            '\n' => self.line += 1,
            c if c.is_whitespace() => {}
            '-' if self.peek() == '-' => {
                // Comment goes until end of line
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
            }
            c if c.is_ascii_digit() => self.number(),
            '"' => self.string(),
            '\'' => self.character()?,
            '[' => self.bracket_escape(),
            ']' => self.add_token(TokenType::Symbol(Symbol::RightBracket)),
            '+' => {
                let symbol = if self.match_char('+') {
                    Symbol::Increment
                } else {
                    Symbol::Plus
                };
                self.add_token(TokenType::Symbol(symbol));
            }
            '-' => self.add_token(TokenType::Symbol(Symbol::Minus)),
            '(' => self.add_token(TokenType::Symbol(Symbol::LeftParen)),
            ')' => self.add_token(TokenType::Symbol(Symbol::RightParen)),
            '{' => self.add_token(TokenType::Symbol(Symbol::LeftBrace)),
            '}' => self.add_token(TokenType::Symbol(Symbol::RightBrace)),
            '*' => self.add_token(TokenType::Symbol(Symbol::Star)),
            '/' => self.add_token(TokenType::Symbol(Symbol::Slash)),
            '%' => self.add_token(TokenType::Symbol(Symbol::Percent)),
            '&' => self.add_token(TokenType::Symbol(Symbol::Ampersand)),
            '$' => self.add_token(TokenType::Symbol(Symbol::Dollar)),
            ',' => self.add_token(TokenType::Symbol(Symbol::Comma)),
            ':' => self.add_token(TokenType::Symbol(Symbol::Colon)),
            '=' => {
                let symbol = if self.match_char('=') {
                    Symbol::EqualEqual
                } else {
                    Symbol::Equal
                };
                self.add_token(TokenType::Symbol(symbol));
            }
            '<' => {
                let symbol = if self.match_char('=') {
                    Symbol::LessEqual
                } else if self.match_char('>') {
                    Symbol::LessGreater
                } else {
                    Symbol::Less
                };
                self.add_token(TokenType::Symbol(symbol));
            }
            '>' => {
                let symbol = if self.match_char('=') {
                    Symbol::GreaterEqual
                } else {
                    Symbol::Greater
                };
                self.add_token(TokenType::Symbol(symbol));
            }
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(BisayaError::lex_error(
                    Span::new(self.start_byte, self.current_byte),
                    self.line,
                    format!("Unexpected character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        match self.source.get(self.current) {
            Some(&c) => {
                self.current += 1;
                self.current_byte += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.source.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Look for fractional part
        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.add_token(TokenType::Number);
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        // An unterminated string runs to end of input.
        let content_end = self.current;
        if !self.is_at_end() {
            self.advance();
        }

        let content: String = self.source[self.start + 1..content_end].iter().collect();
        self.add_token_with_content(TokenType::String, content);
    }

    fn character(&mut self) -> Result<(), BisayaError> {
        if self.is_at_end() {
            return Err(BisayaError::lex_error(
                Span::new(self.start_byte, self.current_byte),
                self.line,
                "Unterminated character literal".to_string(),
            ));
        }

        let value = self.advance();
        if value == '\n' {
            self.line += 1;
        }
        if !self.match_char('\'') {
            return Err(BisayaError::lex_error(
                Span::new(self.start_byte, self.current_byte),
                self.line,
                format!("Expected closing ' after character literal '{}", value),
            )
            .with_help("Character literals hold exactly one character, e.g. 'a'."));
        }

        self.add_token_with_content(TokenType::Character, value.to_string());
        Ok(())
    }

    fn bracket_escape(&mut self) {
        // The opening '[' is already consumed.
        let escape = match (self.peek(), self.peek_at(1)) {
            ('[', ']') => Some(Symbol::EscapeOpenBracket),
            (']', ']') => Some(Symbol::EscapeCloseBracket),
            ('#', ']') => Some(Symbol::EscapeHash),
            _ => None,
        };

        match escape {
            Some(symbol) => {
                self.advance();
                self.advance();
                self.add_token(TokenType::Symbol(symbol));
            }
            None => self.add_token(TokenType::Symbol(Symbol::LeftBracket)),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.lexeme();
        let upper = text.to_uppercase();

        if BOOLEAN_LITERALS.contains(&upper.as_str()) {
            self.add_token_with_content(TokenType::Boolean, upper);
        } else if let Some(&keyword) = self.keywords.get(upper.as_str()) {
            self.add_token_with_content(TokenType::Keyword(keyword), upper);
        } else {
            self.add_token_with_content(TokenType::Identifier, text);
        }
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.lexeme();
        self.add_token_with_content(token_type, text);
    }

    fn add_token_with_content(&mut self, token_type: TokenType, lexeme: String) {
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start_byte, self.current_byte),
            self.start_line,
        ));
    }
}

/// Fold `KUNG` followed by `WALA` or `DILI` into one keyword token. Any other
/// pair is left as scanned.
fn merge_two_word_keywords(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        let keyword = match (&token.token_type, tokens.peek()) {
            (TokenType::Keyword(head), Some(next))
                if matches!(next.token_type, TokenType::Identifier | TokenType::Boolean) =>
            {
                let tail = next.lexeme.to_uppercase();
                TWO_WORD_KEYWORDS
                    .iter()
                    .find(|(first, second, _)| *first == head.as_str() && *second == tail)
                    .map(|(_, _, keyword)| *keyword)
            }
            _ => None,
        };

        match (keyword, tokens.next_if(|_| keyword.is_some())) {
            (Some(keyword), Some(second)) => {
                trace!(keyword = %keyword, line = token.line, "merged two-word keyword");
                merged.push(Token::new(
                    TokenType::Keyword(keyword),
                    keyword.as_str().to_string(),
                    token.span.to(&second.span),
                    token.line,
                ));
            }
            _ => merged.push(token),
        }
    }

    merged
}
