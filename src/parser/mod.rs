// Consumes the next token, which must match `$pattern`, or fails with a
// syntax error describing what was expected
macro_rules! expect {
    ($self:ident, $pattern:pat, $($context:tt)+) => {{
        let token = $self.next()?;
        match token.token() {
            $pattern => token,
            _ => {
                return Err(crate::error!(
                    Syntax,
                    token.offset(),
                    "expected {}, got {}",
                    format!($($context)+),
                    token
                ))
            }
        }
    }};
}

mod parse_delimiters;
mod parse_expression;
mod parse_global;
mod parse_statement;

use crate::backend::{Backend, DataEntry};
use crate::error::{CompileResult, Diagnostic};
use crate::lexer::Lexer;
use crate::table::{ControlStack, LabelTable, SymbolTable};
use crate::token::{Token, TokenType};

/// Single pass compiler: every construct is translated through the backend
/// the moment it has been parsed. The only state kept between constructs
/// lives in the tables below.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    backend: Box<dyn Backend>,
    symbols: SymbolTable,
    controls: ControlStack,
    labels: LabelTable,
    externs: Vec<String>,
    data: Vec<DataEntry>,
    next_label: usize,
    warnings: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, backend: Box<dyn Backend>) -> Parser<'a> {
        Parser {
            lexer: Lexer::new(source),
            backend,
            symbols: SymbolTable::new(),
            controls: ControlStack::new(),
            labels: LabelTable::new(),
            externs: Vec::new(),
            data: Vec::new(),
            next_label: 0,
            warnings: Vec::new(),
        }
    }

    fn next(&mut self) -> CompileResult<Token> {
        self.lexer.scan()
    }

    fn peek(&mut self) -> CompileResult<Token> {
        self.lexer.peek()
    }

    fn peek_type(&mut self) -> CompileResult<TokenType> {
        Ok(self.peek()?.token().clone())
    }

    // Consumes the next token if it is `expected`
    fn accept(&mut self, expected: TokenType) -> CompileResult<Option<Token>> {
        if self.peek_type()? == expected {
            Ok(Some(self.next()?))
        } else {
            Ok(None)
        }
    }

    fn new_label(&mut self) -> usize {
        self.next_label += 1;
        self.next_label
    }

    fn alloc_slot(&mut self) -> usize {
        self.symbols.alloc_stack_slot()
    }

    fn warn(&mut self, warning: Diagnostic) {
        log::warn!(target: "parser", "{}", warning.message);
        self.warnings.push(warning);
    }
}
