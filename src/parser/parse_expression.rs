use std::collections::HashMap;

use lazy_static::lazy_static;
use smallvec::SmallVec;

use super::Parser;
use crate::backend::{BinaryOp, CallTarget, UnaryOp, Value};
use crate::error::CompileResult;
use crate::table::SymbolKind;
use crate::token::{Token, TokenType};
use crate::{error, warning};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Associativity {
    Left,
    Right,
}

lazy_static! {
    // Operator classes from the loosest to the tightest binding
    static ref OPERATOR_CLASSES: Vec<(Vec<TokenType>, Associativity)> = vec![
        (
            vec![
                TokenType::Assign,
                TokenType::AssignAdd,
                TokenType::AssignSub,
                TokenType::AssignMul,
                TokenType::AssignDiv,
                TokenType::AssignMod,
                TokenType::AssignShl,
                TokenType::AssignShr,
                TokenType::AssignAnd,
                TokenType::AssignOr,
                TokenType::AssignXor,
            ],
            Associativity::Right,
        ),
        (vec![TokenType::QuestionMark], Associativity::Right),
        (vec![TokenType::LogicalOr], Associativity::Left),
        (vec![TokenType::LogicalAnd], Associativity::Left),
        (vec![TokenType::Or], Associativity::Left),
        (vec![TokenType::Xor], Associativity::Left),
        (vec![TokenType::And], Associativity::Left),
        (vec![TokenType::Equal, TokenType::Inequal], Associativity::Left),
        (
            vec![
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
            ],
            Associativity::Left,
        ),
        (
            vec![TokenType::ShiftLeft, TokenType::ShiftRight],
            Associativity::Left,
        ),
        (vec![TokenType::Plus, TokenType::Minus], Associativity::Left),
        (
            vec![TokenType::Asterisk, TokenType::Divide, TokenType::Percent],
            Associativity::Left,
        ),
    ];
    static ref PRECEDENCE: HashMap<TokenType, (usize, Associativity)> = {
        let mut table = HashMap::new();
        for (level, (operators, associativity)) in OPERATOR_CLASSES.iter().enumerate() {
            for operator in operators {
                table.insert(operator.clone(), (level + 1, *associativity));
            }
        }
        table
    };
}

/// Binding strength of a binary operator, higher binds tighter.
pub fn precedence(token: &TokenType) -> Option<(usize, Associativity)> {
    PRECEDENCE.get(token).copied()
}

fn binary_op(token: &TokenType) -> Option<BinaryOp> {
    use TokenType::*;
    let op = match token {
        Plus | AssignAdd => BinaryOp::Add,
        Minus | AssignSub => BinaryOp::Sub,
        Asterisk | AssignMul => BinaryOp::Mul,
        Divide | AssignDiv => BinaryOp::Div,
        Percent | AssignMod => BinaryOp::Mod,
        And | AssignAnd => BinaryOp::And,
        Or | AssignOr => BinaryOp::Or,
        Xor | AssignXor => BinaryOp::Xor,
        ShiftLeft | AssignShl => BinaryOp::Shl,
        ShiftRight | AssignShr => BinaryOp::Shr,
        Equal => BinaryOp::Equal,
        Inequal => BinaryOp::Inequal,
        Less => BinaryOp::Less,
        LessEqual => BinaryOp::LessEqual,
        Greater => BinaryOp::Greater,
        GreaterEqual => BinaryOp::GreaterEqual,
        _ => return None,
    };
    Some(op)
}

impl<'a> Parser<'a> {
    // <expression> ::= <unary> (<binary-operator> <unary>)*
    pub(super) fn parse_expression(&mut self) -> CompileResult<Value> {
        let left = self.parse_unary()?;
        self.parse_rhs(left, 1)
    }

    // Folds every following operator binding at least as tight as
    // `min_precedence` into `left`
    fn parse_rhs(&mut self, mut left: Value, min_precedence: usize) -> CompileResult<Value> {
        loop {
            let operator = self.peek()?;
            let (level, associativity) = match precedence(operator.token()) {
                Some((level, associativity)) if level >= min_precedence => (level, associativity),
                _ => return Ok(left),
            };
            self.next()?;
            left = match operator.token() {
                TokenType::QuestionMark => self.parse_conditional(left, level)?,
                TokenType::LogicalAnd | TokenType::LogicalOr => {
                    self.parse_short_circuit(&operator, left, level)?
                }
                _ => {
                    let right = self.parse_operand(level, associativity)?;
                    self.emit_op(&operator, left, right)?
                }
            };
        }
    }

    // The right operand of an operator at `level`, including all operators
    // that bind tighter
    fn parse_operand(&mut self, level: usize, associativity: Associativity) -> CompileResult<Value> {
        let operand = self.parse_unary()?;
        match associativity {
            Associativity::Left => self.parse_rhs(operand, level + 1),
            Associativity::Right => self.parse_rhs(operand, level),
        }
    }

    // <conditional> ::= <expression> '?' <expression> ':' <conditional>
    fn parse_conditional(&mut self, condition: Value, level: usize) -> CompileResult<Value> {
        let result = self.alloc_slot();
        let otherwise = self.new_label();
        let end = self.new_label();
        self.backend.jump_if_zero(condition, otherwise);

        let then = self.parse_expression()?;
        self.backend.copy(result, then);
        self.backend.jump(end);
        expect!(self, TokenType::Colon, "':' in conditional expression");

        self.backend.label(otherwise);
        let otherwise = self.parse_operand(level, Associativity::Right)?;
        self.backend.copy(result, otherwise);
        self.backend.label(end);
        Ok(Value::RValue(result))
    }

    // Both operators yield 0 or 1 and skip the right operand when the left
    // one decides the result
    fn parse_short_circuit(&mut self, operator: &Token, left: Value, level: usize) -> CompileResult<Value> {
        let result = self.alloc_slot();
        let skip = self.new_label();
        if let TokenType::LogicalAnd = operator.token() {
            self.backend.load_constant(result, 0);
            self.backend.jump_if_zero(left, skip);
        } else {
            self.backend.load_constant(result, 1);
            self.backend.jump_if_not_zero(left, skip);
        }
        let right = self.parse_operand(level, Associativity::Left)?;
        self.backend.to_bool(result, right);
        self.backend.label(skip);
        Ok(Value::RValue(result))
    }

    fn emit_op(&mut self, operator: &Token, left: Value, right: Value) -> CompileResult<Value> {
        let op = binary_op(operator.token());
        match operator.token() {
            TokenType::Assign
            | TokenType::AssignAdd
            | TokenType::AssignSub
            | TokenType::AssignMul
            | TokenType::AssignDiv
            | TokenType::AssignMod
            | TokenType::AssignShl
            | TokenType::AssignShr
            | TokenType::AssignAnd
            | TokenType::AssignOr
            | TokenType::AssignXor => {
                if !left.is_lvalue() {
                    return Err(error!(Semantic, operator.offset(), "trying to assign to rvalue"));
                }
                match op {
                    Some(op) => self.backend.compound_assign(op, left, right),
                    None => self.backend.store(left, right),
                }
                Ok(left)
            }
            _ => match op {
                Some(op) => {
                    let result = self.alloc_slot();
                    self.backend.binary(op, result, left, right);
                    Ok(Value::RValue(result))
                }
                None => unreachable!("{} is not a binary operator", operator),
            },
        }
    }

    // <unary> ::= ('&' | '*' | '-' | '~' | '!' | '++' | '--') <unary> | <postfix>
    fn parse_unary(&mut self) -> CompileResult<Value> {
        use TokenType::*;
        let operator = self.peek()?;
        let unary = match operator.token() {
            Minus => UnaryOp::Negate,
            Tilde => UnaryOp::Complement,
            Exclamation => UnaryOp::Not,
            And => return self.parse_address_of(),
            Asterisk => return self.parse_dereference(),
            Increment | Decrement => return self.parse_prefix_increment(),
            _ => return self.parse_postfix(),
        };
        self.next()?;
        let operand = self.parse_unary()?;
        let result = self.alloc_slot();
        self.backend.unary(unary, result, operand);
        Ok(Value::RValue(result))
    }

    fn parse_address_of(&mut self) -> CompileResult<Value> {
        let operator = self.next()?;
        let operand = self.parse_unary()?;
        if !operand.is_lvalue() {
            return Err(error!(
                Semantic,
                operator.offset(),
                "cannot take the address of an rvalue"
            ));
        }
        let result = self.alloc_slot();
        self.backend.address_of(result, operand);
        Ok(Value::RValue(result))
    }

    // The word read from the operand is itself the address of the result
    fn parse_dereference(&mut self) -> CompileResult<Value> {
        self.next()?;
        match self.parse_unary()? {
            Value::RValue(offset) | Value::LValueAuto(offset) => Ok(Value::LValuePtr(offset)),
            pointer @ Value::LValuePtr(_) => {
                let result = self.alloc_slot();
                self.backend.copy(result, pointer);
                Ok(Value::LValuePtr(result))
            }
            Value::Empty => unreachable!("dereferencing an empty value"),
        }
    }

    fn parse_prefix_increment(&mut self) -> CompileResult<Value> {
        let operator = self.next()?;
        let operand = self.parse_unary()?;
        if !operand.is_lvalue() {
            return Err(error!(Semantic, operator.offset(), "trying to assign to rvalue"));
        }
        let delta = if let TokenType::Increment = operator.token() { 1 } else { -1 };
        self.backend.increment(operand, delta, None);
        Ok(operand)
    }

    // <postfix> ::= <primary> ('[' <expression> ']' | '++' | '--')*
    fn parse_postfix(&mut self) -> CompileResult<Value> {
        let mut value = self.parse_primary()?;
        loop {
            let operator = self.peek()?;
            match operator.token() {
                TokenType::LSquare => {
                    self.next()?;
                    let index = self.parse_expression()?;
                    self.expect_closing(&operator, TokenType::RSquare)?;
                    let result = self.alloc_slot();
                    self.backend.index(result, value, index);
                    value = Value::LValuePtr(result);
                }
                TokenType::Increment | TokenType::Decrement => {
                    self.next()?;
                    if !value.is_lvalue() {
                        return Err(error!(Semantic, operator.offset(), "trying to assign to rvalue"));
                    }
                    let delta = if let TokenType::Increment = operator.token() { 1 } else { -1 };
                    let old = self.alloc_slot();
                    self.backend.increment(value, delta, Some(old));
                    value = Value::RValue(old);
                }
                _ => return Ok(value),
            }
        }
    }

    // <primary> ::= '(' <expression> ')' | <constant> | <string> | <identifier> | <call>
    fn parse_primary(&mut self) -> CompileResult<Value> {
        let token = self.next()?;
        match token.token() {
            TokenType::LParenthesis => {
                let value = self.parse_expression()?;
                self.expect_closing(&token, TokenType::RParenthesis)?;
                Ok(value)
            }
            TokenType::ConstI(value) | TokenType::ConstC(value) => {
                let result = self.alloc_slot();
                self.backend.load_constant(result, *value as i64);
                Ok(Value::RValue(result))
            }
            TokenType::CString(string) => {
                let offset = self.lexer.strings().offset_of(*string);
                let result = self.alloc_slot();
                self.backend.load_string(result, offset);
                Ok(Value::RValue(result))
            }
            TokenType::Ident(_) => {
                if let TokenType::LParenthesis = self.peek_type()? {
                    self.parse_call(&token)
                } else {
                    self.parse_identifier(&token)
                }
            }
            _ => Err(error!(Syntax, token.offset(), "expected expression, got {}", token)),
        }
    }

    fn lookup(&self, name: &Token) -> CompileResult<crate::table::Symbol> {
        let ident = name.ident().unwrap_or_default();
        match self.symbols.lookup(ident) {
            Some(symbol) => Ok(symbol.clone()),
            None => Err(error!(
                Semantic,
                name.offset(),
                "'{}' has not been defined yet",
                ident
            )),
        }
    }

    fn parse_identifier(&mut self, name: &Token) -> CompileResult<Value> {
        let symbol = self.lookup(name)?;
        match symbol.kind {
            SymbolKind::Local => Ok(Value::LValueAuto(symbol.offset)),
            SymbolKind::Global if symbol.callable => {
                let result = self.alloc_slot();
                self.backend.load_symbol_address(result, &symbol);
                Ok(Value::RValue(result))
            }
            SymbolKind::Global | SymbolKind::External => {
                let result = self.alloc_slot();
                self.backend.load_symbol_address(result, &symbol);
                Ok(Value::LValuePtr(result))
            }
        }
    }

    // <call> ::= <identifier> '(' (<expression> (',' <expression>)*)? ')'
    fn parse_call(&mut self, name: &Token) -> CompileResult<Value> {
        let symbol = self.lookup(name)?;
        let open = self.next()?;
        let limit = self.backend.argument_count();

        let mut arguments = SmallVec::<[Value; 6]>::new();
        if self.accept(TokenType::RParenthesis)?.is_none() {
            loop {
                arguments.push(self.parse_expression()?);
                let comma = match self.accept(TokenType::Comma)? {
                    Some(comma) => comma,
                    None => break,
                };
                if arguments.len() == limit {
                    self.warn(warning!(
                        comma.offset(),
                        "only the first {} arguments of '{}' are passed",
                        limit,
                        symbol.name
                    ));
                    self.skip_balanced()?;
                    break;
                }
            }
            self.expect_closing(&open, TokenType::RParenthesis)?;
        }

        let target = match symbol.kind {
            SymbolKind::External => CallTarget::External(&symbol.name),
            SymbolKind::Global if symbol.callable => CallTarget::Global(symbol.id),
            SymbolKind::Global => {
                let pointer = self.alloc_slot();
                self.backend.load_symbol_address(pointer, &symbol);
                CallTarget::Indirect(Value::LValuePtr(pointer))
            }
            SymbolKind::Local => CallTarget::Indirect(Value::LValueAuto(symbol.offset)),
        };
        let result = self.alloc_slot();
        log::debug!(target: "parser", "call {} with {} arguments", symbol.name, arguments.len());
        self.backend.call(target, &arguments, result);
        Ok(Value::RValue(result))
    }
}
