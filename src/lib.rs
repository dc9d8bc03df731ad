// Bisaya++ Interpreter Library
//
// Lexer, recursive-descent parser and tree-walking evaluator for a small
// teaching language with Cebuano keywords (SUGOD ... KATAPUSAN).

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use environment::Environment;
pub use error::{BisayaError, ErrorKind, Span};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::Value;

// Re-export main functions
pub use runner::{check, interpret, run};
