use smol_str::SmolStr;

use crate::lang::Keyword;

/// Token kinds.
///
/// The set is closed: any lexeme the scanner cannot classify comes out as
/// `Unknown` and is rejected later by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    Str,
    Identifier,

    // Keywords
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Var,
    True,
    False,
    Null,

    // Operators
    Assign,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Not,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,

    // Special
    Newline,
    Eof,
    Unknown,
}

impl TokenKind {
    /// The token kind a canonical keyword lexes to.
    pub fn from_keyword(kw: Keyword) -> TokenKind {
        match kw {
            Keyword::If => TokenKind::If,
            Keyword::Else => TokenKind::Else,
            Keyword::While => TokenKind::While,
            Keyword::For => TokenKind::For,
            Keyword::Function => TokenKind::Function,
            Keyword::Return => TokenKind::Return,
            Keyword::Var => TokenKind::Var,
            Keyword::True => TokenKind::True,
            Keyword::False => TokenKind::False,
            Keyword::Null => TokenKind::Null,
        }
    }

    /// True for keywords that can begin a statement; the parser resynchronizes
    /// on these after an error.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
        )
    }

    /// True for keywords and identifiers, the lexeme classes the keyword
    /// translator may re-spell.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Var
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }
}

/// A single token: kind, surface text and 1-based source position.
///
/// For string literals `text` holds the unescaped contents; for everything
/// else it is the lexeme as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<SmolStr>, line: usize, col: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Str => write!(f, "\"{}\"", self.text),
            TokenKind::Newline => write!(f, "\\n"),
            TokenKind::Eof => write!(f, "EOF"),
            _ => write!(f, "{}", self.text),
        }
    }
}
