use std::fmt::Display;

use crate::table::StringRef;

#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub enum TokenType {
    //Statement keywords
    Auto,
    Break,
    Case,
    Continue,
    Else,
    Extrn,
    Goto,
    If,
    Return,
    Switch,
    While,

    //Punctuation symbols
    LBrace,
    RBrace,
    LParenthesis,
    RParenthesis,
    LSquare,
    RSquare,
    Semicolon,
    Comma,
    Colon,
    QuestionMark,

    //Assignment operators
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    AssignShl,
    AssignShr,
    AssignAnd,
    AssignOr,
    AssignXor,

    //Other operators
    LogicalOr,
    LogicalAnd,
    Or,
    Xor,
    And,
    Equal,
    Inequal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    Plus,
    Minus,
    Asterisk,
    Divide,
    Percent,
    Increment,
    Decrement,
    Tilde,
    Exclamation,

    //Types with a value
    ConstI(u64),
    ConstC(u64),
    CString(StringRef),
    Ident(String),

    Eof,
}

/// A token and the bytes of the source buffer it was scanned from.
/// The offset is kept for diagnostics only.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Token {
    token: TokenType,
    offset: usize,
    length: usize,
}

impl Token {
    pub fn new(token: TokenType, offset: usize, length: usize) -> Token {
        Token {
            token,
            offset,
            length,
        }
    }
    pub fn token(&self) -> &TokenType {
        &self.token
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn length(&self) -> usize {
        self.length
    }

    /// The identifier name, if this token is one.
    pub fn ident(&self) -> Option<&str> {
        match &self.token {
            TokenType::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenType::*;
        let text = match self {
            Auto => "auto keyword",
            Break => "break keyword",
            Case => "case keyword",
            Continue => "continue keyword",
            Else => "else keyword",
            Extrn => "extrn keyword",
            Goto => "goto keyword",
            If => "if keyword",
            Return => "return keyword",
            Switch => "switch keyword",
            While => "while keyword",

            LBrace => "'{'",
            RBrace => "'}'",
            LParenthesis => "'('",
            RParenthesis => "')'",
            LSquare => "'['",
            RSquare => "']'",
            Semicolon => "';'",
            Comma => "','",
            Colon => "':'",
            QuestionMark => "'?'",

            Assign => "'='",
            AssignAdd => "'+='",
            AssignSub => "'-='",
            AssignMul => "'*='",
            AssignDiv => "'/='",
            AssignMod => "'%='",
            AssignShl => "'<<='",
            AssignShr => "'>>='",
            AssignAnd => "'&='",
            AssignOr => "'|='",
            AssignXor => "'^='",

            LogicalOr => "'||'",
            LogicalAnd => "'&&'",
            Or => "'|'",
            Xor => "'^'",
            And => "'&'",
            Equal => "'=='",
            Inequal => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            ShiftLeft => "'<<'",
            ShiftRight => "'>>'",
            Plus => "'+'",
            Minus => "'-'",
            Asterisk => "'*'",
            Divide => "'/'",
            Percent => "'%'",
            Increment => "'++'",
            Decrement => "'--'",
            Tilde => "'~'",
            Exclamation => "'!'",

            ConstI(value) => return write!(f, "integer literal {}", value),
            ConstC(value) => return write!(f, "character literal {}", value),
            CString(_) => "string literal",
            Ident(name) => return write!(f, "identifier '{}'", name),

            Eof => "end of file",
        };
        write!(f, "{}", text)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token)
    }
}
