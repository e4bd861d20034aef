use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error;
use crate::error::CompileResult;
use crate::table::StringPool;
use crate::token::{Token, TokenType};

// Punctuation is matched by taking the first entry that prefixes the input.
// Any operator that is a prefix of another one must come after it.
lazy_static! {
    static ref PUNCTUATION: Vec<(&'static str, TokenType)> = vec![
        ("<<=", TokenType::AssignShl),
        (">>=", TokenType::AssignShr),
        ("<<", TokenType::ShiftLeft),
        (">>", TokenType::ShiftRight),
        ("<=", TokenType::LessEqual),
        (">=", TokenType::GreaterEqual),
        ("==", TokenType::Equal),
        ("!=", TokenType::Inequal),
        ("&&", TokenType::LogicalAnd),
        ("||", TokenType::LogicalOr),
        ("++", TokenType::Increment),
        ("--", TokenType::Decrement),
        ("+=", TokenType::AssignAdd),
        ("-=", TokenType::AssignSub),
        ("*=", TokenType::AssignMul),
        ("/=", TokenType::AssignDiv),
        ("%=", TokenType::AssignMod),
        ("&=", TokenType::AssignAnd),
        ("|=", TokenType::AssignOr),
        ("^=", TokenType::AssignXor),
        ("<", TokenType::Less),
        (">", TokenType::Greater),
        ("=", TokenType::Assign),
        ("!", TokenType::Exclamation),
        ("+", TokenType::Plus),
        ("-", TokenType::Minus),
        ("*", TokenType::Asterisk),
        ("/", TokenType::Divide),
        ("%", TokenType::Percent),
        ("&", TokenType::And),
        ("|", TokenType::Or),
        ("^", TokenType::Xor),
        ("~", TokenType::Tilde),
        ("?", TokenType::QuestionMark),
        (":", TokenType::Colon),
        (";", TokenType::Semicolon),
        (",", TokenType::Comma),
        ("(", TokenType::LParenthesis),
        (")", TokenType::RParenthesis),
        ("{", TokenType::LBrace),
        ("}", TokenType::RBrace),
        ("[", TokenType::LSquare),
        ("]", TokenType::RSquare),
    ];
    static ref KEYWORDS: HashMap<&'static str, TokenType> = {
        use TokenType::*;
        let mut keywords = HashMap::new();
        keywords.insert("auto", Auto);
        keywords.insert("break", Break);
        keywords.insert("case", Case);
        keywords.insert("continue", Continue);
        keywords.insert("else", Else);
        keywords.insert("extrn", Extrn);
        keywords.insert("goto", Goto);
        keywords.insert("if", If);
        keywords.insert("return", Return);
        keywords.insert("switch", Switch);
        keywords.insert("while", While);
        keywords
    };
}

// End-of-transmission, the value of the *e escape
const EOT: u8 = 0x04;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IntegerError {
    Invalid,
    Overflow,
}

/// Convert the text of an integer literal to its value.
/// Supports decimal, 0 prefixed octal, 0o octal and 0x hexadecimal.
/// Underscores between digits are ignored.
pub fn parse_integer(text: &str) -> Result<u64, IntegerError> {
    let (digits, base) = if let Some(rest) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (rest, 8)
    } else if text.starts_with('0') {
        (text, 8)
    } else {
        (text, 10)
    };

    let mut result: u64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(base).ok_or(IntegerError::Invalid)?;
        result = result
            .checked_mul(base as u64)
            .and_then(|result| result.checked_add(digit as u64))
            .ok_or(IntegerError::Overflow)?;
        seen_digit = true;
    }

    match seen_digit {
        true => Ok(result),
        false => Err(IntegerError::Invalid),
    }
}

// The Lexer is a cursor into the source buffer.
// Scanning is lazy: the parser asks for one token at a time and can save and
// restore the cursor to look further ahead.
// String literals are interned into the pool owned by the lexer.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    strings: StringPool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            cursor: 0,
            strings: StringPool::new(),
        }
    }

    pub fn save(&self) -> usize {
        self.cursor
    }

    pub fn restore(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// Scan the next token without consuming it.
    pub fn peek(&mut self) -> CompileResult<Token> {
        let cursor = self.save();
        let token = self.scan();
        self.restore(cursor);
        token
    }

    /// Scan the entire remaining input, including the final `Eof`.
    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan()?;
            let done = *token.token() == TokenType::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn scan(&mut self) -> CompileResult<Token> {
        self.skip_blanks()?;
        let start = self.cursor;
        let token = match self.source.as_bytes().get(start) {
            None => Token::new(TokenType::Eof, start, 0),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'0'..=b'9') => self.lex_word()?,
            Some(b'"') => self.lex_string()?,
            Some(b'\'') => self.lex_char()?,
            Some(_) => self.lex_punctuation()?,
        };
        log::trace!(target: "lexer", "{} at {}", token, start);
        Ok(token)
    }

    fn byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.cursor).copied()
    }

    // Whitespace and /* */ comments
    fn skip_blanks(&mut self) -> CompileResult<()> {
        loop {
            while let Some(c) = self.byte() {
                if !c.is_ascii_whitespace() {
                    break;
                }
                self.cursor += 1;
            }
            if !self.source[self.cursor..].starts_with("/*") {
                return Ok(());
            }
            let start = self.cursor;
            match self.source[start + 2..].find("*/") {
                Some(end) => self.cursor = start + 2 + end + 2,
                None => {
                    return Err(error!(
                        Lexical,
                        start, "expected end of comment, got end of file"
                    ))
                }
            }
        }
    }

    // Identifiers, keywords and integer literals share the same character set
    fn lex_word(&mut self) -> CompileResult<Token> {
        let start = self.cursor;
        while let Some(c) = self.byte() {
            if !(c.is_ascii_alphanumeric() || c == b'_') {
                break;
            }
            self.cursor += 1;
        }
        let text = &self.source[start..self.cursor];
        let length = text.len();

        if text.as_bytes()[0].is_ascii_digit() {
            return match parse_integer(text) {
                Ok(value) => Ok(Token::new(TokenType::ConstI(value), start, length)),
                Err(IntegerError::Invalid) => {
                    Err(error!(Lexical, start, "invalid integer literal {}", text))
                }
                Err(IntegerError::Overflow) => Err(error!(
                    Lexical,
                    start, "integer literal {} does not fit in 64 bits", text
                )),
            };
        }

        let token = match KEYWORDS.get(text) {
            Some(keyword) => keyword.clone(),
            None => TokenType::Ident(text.to_string()),
        };
        Ok(Token::new(token, start, length))
    }

    // Reads the character after a '*' and returns the byte it stands for
    fn lex_escape(&mut self) -> CompileResult<u8> {
        let start = self.cursor;
        self.cursor += 1;
        let value = match self.byte() {
            Some(b'0') => 0,
            Some(b'e') => EOT,
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b'*') => b'*',
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            Some(_) => {
                let c = self.source[self.cursor..].chars().next().unwrap_or('?');
                return Err(error!(Lexical, start, "unknown escape sequence *{}", c));
            }
            None => {
                return Err(error!(
                    Lexical,
                    start, "expected escape sequence, got end of file"
                ))
            }
        };
        self.cursor += 1;
        Ok(value)
    }

    fn lex_string(&mut self) -> CompileResult<Token> {
        let start = self.cursor;
        self.cursor += 1;
        let mut bytes = Vec::new();
        loop {
            match self.byte() {
                None => {
                    return Err(error!(
                        Lexical,
                        start, "expected end of string literal, got end of file"
                    ))
                }
                Some(b'"') => {
                    self.cursor += 1;
                    break;
                }
                Some(b'*') => bytes.push(self.lex_escape()?),
                Some(c) => {
                    bytes.push(c);
                    self.cursor += 1;
                }
            }
        }
        let string = self.strings.intern(bytes);
        Ok(Token::new(
            TokenType::CString(string),
            start,
            self.cursor - start,
        ))
    }

    fn lex_char(&mut self) -> CompileResult<Token> {
        let start = self.cursor;
        self.cursor += 1;
        let value = match self.byte() {
            None => {
                return Err(error!(
                    Lexical,
                    start, "expected character literal, got end of file"
                ))
            }
            Some(b'\'') => return Err(error!(Lexical, start, "empty character constant")),
            Some(b'*') => self.lex_escape()?,
            Some(c) => {
                self.cursor += 1;
                c
            }
        };
        match self.byte() {
            Some(b'\'') => {
                self.cursor += 1;
                Ok(Token::new(
                    TokenType::ConstC(value as u64),
                    start,
                    self.cursor - start,
                ))
            }
            None => Err(error!(
                Lexical,
                start, "expected end of character literal, got end of file"
            )),
            Some(_) => Err(error!(
                Lexical,
                start, "character literal must contain exactly one character"
            )),
        }
    }

    fn lex_punctuation(&mut self) -> CompileResult<Token> {
        let start = self.cursor;
        let rest = &self.source[start..];
        for (text, token) in PUNCTUATION.iter() {
            if rest.starts_with(text) {
                self.cursor += text.len();
                return Ok(Token::new(token.clone(), start, text.len()));
            }
        }
        let c = rest.chars().next().unwrap_or('?');
        Err(error!(Lexical, start, "unknown character '{}'", c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use TokenType::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.token().clone())
            .collect()
    }

    fn lex_error(source: &str) -> crate::error::Diagnostic {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn longer_operators_are_listed_first() {
        for (i, (short, _)) in PUNCTUATION.iter().enumerate() {
            for (long, _) in PUNCTUATION[i + 1..].iter() {
                assert!(
                    !long.starts_with(short),
                    "{} must be listed before {}",
                    long,
                    short
                );
            }
        }
    }

    #[test]
    fn operators_take_longest_match() {
        assert_eq!(
            kinds("a<<=b<=c<d<<e"),
            vec![
                Ident("a".into()),
                AssignShl,
                Ident("b".into()),
                LessEqual,
                Ident("c".into()),
                Less,
                Ident("d".into()),
                ShiftLeft,
                Ident("e".into()),
                Eof
            ]
        );
        assert_eq!(kinds("x+++y"), vec![Ident("x".into()), Increment, Plus, Ident("y".into()), Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("auto autox extrn while_ goto"),
            vec![
                Auto,
                Ident("autox".into()),
                Extrn,
                Ident("while_".into()),
                Goto,
                Eof
            ]
        );
    }

    #[test]
    fn integer_bases_and_separators() {
        assert_eq!(parse_integer("42"), Ok(42));
        assert_eq!(parse_integer("1_000"), Ok(1000));
        assert_eq!(parse_integer("017"), Ok(15));
        assert_eq!(parse_integer("0o17"), Ok(15));
        assert_eq!(parse_integer("0x1F"), Ok(31));
        assert_eq!(parse_integer("0XfF"), Ok(255));
        assert_eq!(parse_integer("0"), Ok(0));
        assert_eq!(parse_integer("09"), Err(IntegerError::Invalid));
        assert_eq!(parse_integer("0x"), Err(IntegerError::Invalid));
        assert_eq!(parse_integer("12ab"), Err(IntegerError::Invalid));
        assert_eq!(parse_integer("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(
            parse_integer("18446744073709551616"),
            Err(IntegerError::Overflow)
        );
    }

    #[test]
    fn overflow_is_a_lexical_error() {
        let error = lex_error("x = 0xffff_ffff_ffff_ffff_f;");
        assert_eq!(error.kind, ErrorKind::Lexical);
        assert_eq!(error.at, 4);
    }

    #[test]
    fn character_literals_and_escapes() {
        assert_eq!(
            kinds("'a' '*n' '*0' '*e' '**' '*''"),
            vec![
                ConstC(b'a' as u64),
                ConstC(b'\n' as u64),
                ConstC(0),
                ConstC(4),
                ConstC(b'*' as u64),
                ConstC(b'\'' as u64),
                Eof
            ]
        );
        assert_eq!(lex_error("''").message, "empty character constant");
        assert_eq!(lex_error("'ab'").kind, ErrorKind::Lexical);
        assert_eq!(lex_error("'*q'").message, "unknown escape sequence *q");
    }

    #[test]
    fn strings_are_interned() {
        let mut lexer = Lexer::new("\"hello*n\" \"lo*n\" /* skipped \"x\" */ \"unterminated");
        let hello = lexer.scan().unwrap();
        let lo = lexer.scan().unwrap();
        match (hello.token(), lo.token()) {
            (CString(hello), CString(lo)) => {
                assert_eq!(lexer.strings().get(*hello), b"hello\n");
                assert_eq!(lexer.strings().get(*lo), b"lo\n");
                assert_eq!(lexer.strings().total(), 7);
            }
            other => panic!("expected two strings, got {:?}", other),
        }
        let error = lexer.scan().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Lexical);
    }

    #[test]
    fn comments_and_offsets() {
        let tokens = Lexer::new("/* a */ main /* b */ ( )").tokenize().unwrap();
        assert_eq!(tokens[0].offset(), 8);
        assert_eq!(tokens[0].length(), 4);
        assert_eq!(*tokens[1].token(), LParenthesis);
        assert_eq!(tokens[1].offset(), 21);
        assert_eq!(lex_error("/* open").message, "expected end of comment, got end of file");
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.peek().unwrap().ident(), Some("a"));
        assert_eq!(lexer.scan().unwrap().ident(), Some("a"));
        let mark = lexer.save();
        assert_eq!(lexer.scan().unwrap().ident(), Some("b"));
        lexer.restore(mark);
        assert_eq!(lexer.scan().unwrap().ident(), Some("b"));
        assert_eq!(*lexer.scan().unwrap().token(), Eof);
    }

    #[test]
    fn unknown_character() {
        let error = lex_error("a @ b");
        assert_eq!(error.message, "unknown character '@'");
        assert_eq!(error.at, 2);
    }
}
