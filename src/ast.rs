use crate::error::Span;
use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// The four primitive types a `MUGNA` declaration can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Numero,
    Letra,
    Tinuod,
    Tipik,
}

impl DataType {
    pub fn zero_value(&self) -> Value {
        match self {
            DataType::Numero | DataType::Tipik => Value::Number(0.0),
            DataType::Letra => Value::Text(String::new()),
            DataType::Tinuod => Value::Boolean(false),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DataType::Numero => "NUMERO",
            DataType::Letra => "LETRA",
            DataType::Tinuod => "TINUOD",
            DataType::Tipik => "TIPIK",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub initializer: Option<Value>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub targets: Vec<String>,
    pub value: Expr,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct ConditionalBranch {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Declaration {
        data_type: DataType,
        declarators: Vec<Declarator>,
        span: Span,
    },
    Assignment(Assignment),
    Output {
        values: Vec<Expr>,
        span: Span,
    },
    Input {
        targets: Vec<String>,
        span: Span,
        line: usize,
    },
    /// `KUNG` with zero or more `KUNG DILI` clauses and an optional `KUNG WALA`.
    Conditional {
        branch: ConditionalBranch,
        else_ifs: Vec<ConditionalBranch>,
        else_branch: Option<Block>,
        span: Span,
    },
    Loop {
        initializer: Box<Stmt>,
        condition: Expr,
        increment: Assignment,
        body: Block,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Value,
        span: Span,
        line: usize,
    },
    Variable {
        name: String,
        span: Span,
        line: usize,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
        line: usize,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
        line: usize,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Binary { span, .. } => span,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Expr::Literal { line, .. }
            | Expr::Variable { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Binary { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "UG",
            BinaryOp::Or => "O",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "DILI",
        };
        f.write_str(symbol)
    }
}
