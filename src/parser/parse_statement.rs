use super::Parser;
use crate::backend::Value;
use crate::error;
use crate::error::CompileResult;
use crate::table::{ControlEntry, SymbolKind};
use crate::token::{Token, TokenType};

impl<'a> Parser<'a> {
    // Temporaries of a statement are released once it is complete.
    // Locals declared by `auto` stay until their scope is left.
    pub(super) fn parse_statement(&mut self) -> CompileResult<()> {
        if let TokenType::Auto = self.peek_type()? {
            return self.parse_auto();
        }
        let cursor = self.symbols.stack_offset();
        self.parse_statement_inner()?;
        self.symbols.set_stack_offset(cursor);
        Ok(())
    }

    // <statement> ::= ';' | <extrn> | <block> | <if> | <while> | <switch> | <case>
    //               | <goto> | <label> | 'break' ';' | 'continue' ';' | <return>
    //               | <expression> ';'
    fn parse_statement_inner(&mut self) -> CompileResult<()> {
        use TokenType::*;
        match self.peek_type()? {
            Semicolon => {
                self.next()?;
                Ok(())
            }
            Extrn => self.parse_extrn(),
            LBrace => self.parse_block(),
            If => self.parse_if(),
            While => self.parse_while(),
            Switch => self.parse_switch(),
            Case => self.parse_case(),
            Goto => self.parse_goto(),
            Break => self.parse_break(),
            Continue => self.parse_continue(),
            Return => self.parse_return(),
            Ident(_) => {
                let cursor = self.lexer.save();
                let name = self.next()?;
                if let Colon = self.peek_type()? {
                    self.next()?;
                    return self.parse_label(&name);
                }
                self.lexer.restore(cursor);
                self.parse_expression_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> CompileResult<()> {
        self.parse_expression()?;
        expect!(self, TokenType::Semicolon, "';' after expression");
        Ok(())
    }

    fn enter_scope(&mut self, at: &Token) -> CompileResult<()> {
        self.symbols
            .enter_scope()
            .map_err(|_| error!(Semantic, at.offset(), "scope nesting too deep"))
    }

    // <auto> ::= 'auto' <identifier> (',' <identifier>)* ';'
    fn parse_auto(&mut self) -> CompileResult<()> {
        self.next()?;
        loop {
            let name = expect!(self, TokenType::Ident(_), "identifier after auto");
            let ident = name.ident().unwrap_or_default().to_string();
            let offset = self.alloc_slot();
            if self
                .symbols
                .define(&ident, SymbolKind::Local, offset, false)
                .is_err()
            {
                return Err(error!(Semantic, name.offset(), "redefinition of '{}'", ident));
            }
            self.backend
                .comment(&format!("auto [rbp-{}] = {}", offset, ident));
            if self.accept(TokenType::Comma)?.is_none() {
                break;
            }
        }
        expect!(self, TokenType::Semicolon, "';' or ',' after auto");
        Ok(())
    }

    // <extrn> ::= 'extrn' <identifier> (',' <identifier>)* ';'
    fn parse_extrn(&mut self) -> CompileResult<()> {
        self.next()?;
        loop {
            let name = expect!(self, TokenType::Ident(_), "identifier after extrn");
            let ident = name.ident().unwrap_or_default().to_string();
            if let Err(previous) = self.symbols.define(&ident, SymbolKind::External, 0, false) {
                if previous.kind != SymbolKind::External {
                    return Err(error!(Semantic, name.offset(), "redefinition of '{}'", ident));
                }
            }
            if !self.externs.contains(&ident) {
                log::debug!(target: "parser", "import {}", ident);
                self.backend.declare_extern(&ident);
                self.externs.push(ident);
            }
            if self.accept(TokenType::Comma)?.is_none() {
                break;
            }
        }
        expect!(self, TokenType::Semicolon, "';' or ',' after extrn");
        Ok(())
    }

    // <block> ::= '{' <statement>* '}'
    fn parse_block(&mut self) -> CompileResult<()> {
        let open = self.next()?;
        self.enter_scope(&open)?;
        loop {
            match self.peek_type()? {
                TokenType::RBrace => {
                    self.next()?;
                    break;
                }
                TokenType::Eof => {
                    self.expect_closing(&open, TokenType::RBrace)?;
                }
                _ => self.parse_statement()?,
            }
        }
        self.symbols.leave_scope();
        Ok(())
    }

    // '(' <expression> ')'
    fn parse_condition(&mut self) -> CompileResult<Value> {
        let open = expect!(self, TokenType::LParenthesis, "'(' before condition");
        let condition = self.parse_expression()?;
        self.expect_closing(&open, TokenType::RParenthesis)?;
        Ok(condition)
    }

    // <if> ::= 'if' '(' <expression> ')' <statement> ('else' <statement>)?
    fn parse_if(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        self.enter_scope(&keyword)?;
        let condition = self.parse_condition()?;
        let otherwise = self.new_label();
        self.backend.jump_if_zero(condition, otherwise);
        self.parse_statement()?;

        if self.accept(TokenType::Else)?.is_some() {
            let end = self.new_label();
            self.backend.jump(end);
            self.backend.label(otherwise);
            self.parse_statement()?;
            self.backend.label(end);
        } else {
            self.backend.label(otherwise);
        }
        self.symbols.leave_scope();
        Ok(())
    }

    // <while> ::= 'while' '(' <expression> ')' <statement>
    fn parse_while(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        self.enter_scope(&keyword)?;
        let again = self.new_label();
        let exit = self.new_label();
        self.backend.label(again);
        let condition = self.parse_condition()?;
        self.backend.jump_if_zero(condition, exit);

        self.controls.push(ControlEntry::new_while(again, exit));
        self.parse_statement()?;
        self.controls.pop();

        self.backend.jump(again);
        self.backend.label(exit);
        self.symbols.leave_scope();
        Ok(())
    }

    // <switch> ::= 'switch' '(' <expression> ')' <statement>
    // Every case tests the scrutinee and chains to the next test on a mismatch
    fn parse_switch(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        self.enter_scope(&keyword)?;
        let value = self.parse_condition()?;
        let scrutinee = self.alloc_slot();
        self.backend.copy(scrutinee, value);

        let next_case = self.new_label();
        let exit = self.new_label();
        self.backend.jump(next_case);
        self.controls
            .push(ControlEntry::new_switch(Value::RValue(scrutinee), next_case, exit));
        self.parse_statement()?;
        if let Some(entry) = self.controls.pop() {
            self.backend.label(entry.next_case);
        }
        self.backend.label(exit);
        self.symbols.leave_scope();
        Ok(())
    }

    // <case> ::= 'case' (<integer> | <character>) ':'
    fn parse_case(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        let constant = self.next()?;
        let value = match constant.token() {
            TokenType::ConstI(value) | TokenType::ConstC(value) => *value as i64,
            _ => {
                return Err(error!(
                    Syntax,
                    constant.offset(),
                    "expected integer or character literal after case, got {}",
                    constant
                ))
            }
        };
        expect!(self, TokenType::Colon, "':' after case {}", value);

        let matched = self.new_label();
        let next_case = self.new_label();
        let entry = match self.controls.innermost_switch_mut() {
            Some(entry) => entry,
            None => return Err(error!(Semantic, keyword.offset(), "case outside of switch")),
        };
        let test = std::mem::replace(&mut entry.next_case, next_case);
        let scrutinee = entry.scrutinee;

        // falling into a case skips its test
        self.backend.jump(matched);
        self.backend.label(test);
        self.backend.jump_if_not_equal(scrutinee, value, next_case);
        self.backend.label(matched);
        Ok(())
    }

    // <goto> ::= 'goto' <identifier> ';'
    fn parse_goto(&mut self) -> CompileResult<()> {
        self.next()?;
        let name = expect!(self, TokenType::Ident(_), "label after goto");
        let ident = name.ident().unwrap_or_default();
        self.labels.reference(ident, name.offset());
        self.backend.jump_user_label(ident);
        expect!(self, TokenType::Semicolon, "';' after goto");
        Ok(())
    }

    // <label> ::= <identifier> ':'
    fn parse_label(&mut self, name: &Token) -> CompileResult<()> {
        let ident = name.ident().unwrap_or_default();
        if let Err(previous) = self.labels.define(ident, name.offset()) {
            return Err(
                error!(Semantic, name.offset(), "redefinition of label '{}'", ident)
                    .with_note(previous, "first defined here"),
            );
        }
        self.backend.user_label(ident);
        Ok(())
    }

    fn parse_break(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        let exit = self.controls.break_target().ok_or_else(|| {
            error!(Semantic, keyword.offset(), "break outside of a loop or switch")
        })?;
        self.backend.jump(exit);
        expect!(self, TokenType::Semicolon, "';' after break");
        Ok(())
    }

    fn parse_continue(&mut self) -> CompileResult<()> {
        let keyword = self.next()?;
        let again = self
            .controls
            .continue_target()
            .ok_or_else(|| error!(Semantic, keyword.offset(), "continue outside of a loop"))?;
        self.backend.jump(again);
        expect!(self, TokenType::Semicolon, "';' after continue");
        Ok(())
    }

    // <return> ::= 'return' <expression>? ';'
    fn parse_return(&mut self) -> CompileResult<()> {
        self.next()?;
        if self.accept(TokenType::Semicolon)?.is_some() {
            self.backend.return_value(Value::Empty);
            return Ok(());
        }
        let value = self.parse_expression()?;
        self.backend.return_value(value);
        expect!(self, TokenType::Semicolon, "';' after return");
        Ok(())
    }
}
