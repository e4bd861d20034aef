use super::Parser;
use crate::backend::{DataEntry, DataValue};
use crate::error;
use crate::error::{CompileResult, Diagnostic};
use crate::table::{Symbol, SymbolKind};
use crate::token::{Token, TokenType};

impl<'a> Parser<'a> {
    /// Compiles the whole program and returns the assembly text together
    /// with the warnings raised on the way.
    // <program> ::= <definition>*
    pub fn parse(mut self) -> CompileResult<(String, Vec<Diagnostic>)> {
        self.backend.generate_global_prologue();
        loop {
            let token = self.next()?;
            match token.token() {
                TokenType::Eof => break,
                TokenType::Ident(_) => self.parse_definition(&token)?,
                _ => {
                    return Err(error!(
                        Semantic,
                        token.offset(),
                        "stray {} at the end of the program",
                        token
                    ))
                }
            }
        }
        self.backend.generate_globals(&self.data);
        self.backend.generate_strings(self.lexer.strings());
        self.backend.generate_global_epilogue();
        Ok((self.backend.take_output(), self.warnings))
    }

    // <definition> ::= <function> | <global>
    fn parse_definition(&mut self, name: &Token) -> CompileResult<()> {
        let callable = self.peek_type()? == TokenType::LParenthesis;
        let ident = name.ident().unwrap_or_default();
        let symbol = match self.symbols.define(ident, SymbolKind::Global, 0, callable) {
            Ok(symbol) => symbol,
            Err(_) => return Err(error!(Semantic, name.offset(), "redefinition of '{}'", ident)),
        };
        if callable {
            self.parse_function(name, &symbol)
        } else {
            self.parse_global(&symbol)
        }
    }

    // <function> ::= <identifier> '(' (<identifier> (',' <identifier>)*)? ')' <statement>
    fn parse_function(&mut self, name: &Token, symbol: &Symbol) -> CompileResult<()> {
        log::info!(target: "parser", "compiling function {}", symbol.name);
        self.symbols.begin_function();
        self.labels.reset();
        self.controls.clear();
        self.backend.begin_function(&symbol.name, symbol.id);
        self.enter_function_scope(name)?;

        let open = self.next()?;
        if self.accept(TokenType::RParenthesis)?.is_none() {
            let mut index = 0;
            loop {
                let parameter = expect!(self, TokenType::Ident(_), "parameter name");
                let ident = parameter.ident().unwrap_or_default().to_string();
                if index == self.backend.argument_count() {
                    return Err(error!(
                        Semantic,
                        parameter.offset(),
                        "too many parameters, at most {} are supported",
                        self.backend.argument_count()
                    ));
                }
                let offset = self.alloc_slot();
                if self
                    .symbols
                    .define(&ident, SymbolKind::Local, offset, false)
                    .is_err()
                {
                    return Err(error!(
                        Semantic,
                        parameter.offset(),
                        "redefinition of '{}'",
                        ident
                    ));
                }
                self.backend.store_argument(index, offset);
                index += 1;
                if self.accept(TokenType::Comma)?.is_none() {
                    break;
                }
            }
            self.expect_closing(&open, TokenType::RParenthesis)?;
        }

        self.parse_statement()?;
        self.symbols.leave_scope();

        if let Some(label) = self.labels.first_undefined() {
            return Err(error!(
                Semantic,
                label.first_use,
                "label '{}' is used but never defined",
                label.name
            ));
        }
        self.backend
            .end_function(self.symbols.frame_size(), symbol.name == "main");
        Ok(())
    }

    fn enter_function_scope(&mut self, name: &Token) -> CompileResult<()> {
        self.symbols
            .enter_scope()
            .map_err(|_| error!(Semantic, name.offset(), "scope nesting too deep"))
    }

    // <global> ::= <identifier> ('[' <integer>? ']')? (<initializer> (',' <initializer>)*)? ';'
    fn parse_global(&mut self, symbol: &Symbol) -> CompileResult<()> {
        let mut entry = DataEntry {
            id: symbol.id,
            vector: false,
            size: None,
            values: Vec::new(),
        };
        if let Some(open) = self.accept(TokenType::LSquare)? {
            entry.vector = true;
            if let TokenType::ConstI(size) = self.peek_type()? {
                self.next()?;
                entry.size = Some(size as usize);
            }
            self.expect_closing(&open, TokenType::RSquare)?;
        }
        if self.accept(TokenType::Semicolon)?.is_none() {
            loop {
                entry.values.push(self.parse_initializer()?);
                if self.accept(TokenType::Comma)?.is_none() {
                    break;
                }
            }
            expect!(self, TokenType::Semicolon, "';' after global {}", symbol.name);
        }
        log::debug!(target: "parser", "global {} with {} cells", symbol.name, entry.cells());
        self.data.push(entry);
        Ok(())
    }

    // <initializer> ::= '-'? <integer> | <character> | <string>
    fn parse_initializer(&mut self) -> CompileResult<DataValue> {
        let token = self.next()?;
        match token.token() {
            TokenType::ConstI(value) | TokenType::ConstC(value) => {
                Ok(DataValue::Integer(*value as i64))
            }
            TokenType::CString(string) => {
                Ok(DataValue::String(self.lexer.strings().offset_of(*string)))
            }
            TokenType::Minus => {
                let literal = expect!(self, TokenType::ConstI(_), "integer literal after '-'");
                match literal.token() {
                    TokenType::ConstI(value) => Ok(DataValue::Integer((*value as i64).wrapping_neg())),
                    _ => unreachable!(),
                }
            }
            _ => Err(error!(
                Syntax,
                token.offset(),
                "expected initializer, got {}",
                token
            )),
        }
    }
}
