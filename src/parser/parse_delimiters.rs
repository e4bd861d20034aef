use super::Parser;
use crate::error;
use crate::error::CompileResult;
use crate::token::{Token, TokenType};

impl<'a> Parser<'a> {
    // Consumes the delimiter closing `open`. A mismatch points back at the
    // opening delimiter as well.
    pub(super) fn expect_closing(&mut self, open: &Token, close: TokenType) -> CompileResult<Token> {
        let token = self.next()?;
        if *token.token() == close {
            return Ok(token);
        }
        Err(error!(Syntax, token.offset(), "expected {}, got {}", close, token)
            .with_note(open.offset(), format!("to match this {}", open)))
    }

    // Skips tokens up to, but not including, the parenthesis closing the
    // current argument list
    pub(super) fn skip_balanced(&mut self) -> CompileResult<()> {
        use TokenType::*;
        let mut depth = 0usize;
        loop {
            match self.peek()?.token() {
                LParenthesis | LSquare | LBrace => depth += 1,
                RParenthesis | RSquare | RBrace if depth == 0 => return Ok(()),
                RParenthesis | RSquare | RBrace => depth -= 1,
                Eof => return Ok(()),
                _ => (),
            }
            self.next()?;
        }
    }
}
