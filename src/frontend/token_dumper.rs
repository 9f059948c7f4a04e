use crate::frontend::token::{Token, TokenKind};

/// Renders a token stream for the CLI `--tokens` mode.
pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";
    const RED: &'static str = "\x1b[31m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        for token in tokens {
            println!("{}", self.render(token));
        }
    }

    fn render(&self, token: &Token) -> String {
        let color = if self.color { self.color_for(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };
        format!(
            "[{:02}:{:02}] {}{:<10} {}{}",
            token.line,
            token.col,
            color,
            self.class(token.kind),
            token,
            reset
        )
    }

    fn class(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Newline => "NEWLINE",
            Eof => "EOF",
            Unknown => "UNKNOWN",

            Number => "NUMBER",
            Str => "STRING",
            Identifier => "IDENT",

            LParen | RParen => "PAREN",
            LBrace | RBrace => "BRACE",
            Semicolon | Comma => "DELIM",

            Plus | Minus | Multiply | Divide | Modulo | Assign => "OP",
            Equal | NotEqual | LessThan | GreaterThan | LessEqual | GreaterEqual => "CMP",
            And | Or | Not => "LOGIC",

            _ => "KEYWORD",
        }
    }

    fn color_for(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Newline | Eof => Self::DIM,
            Unknown => Self::RED,
            Str => Self::GRN,
            Number | True | False | Null => Self::CYN,
            Identifier => Self::YEL,
            Plus | Minus | Multiply | Divide | Modulo | Assign => Self::MAG,
            Equal | NotEqual | LessThan | GreaterThan | LessEqual | GreaterEqual => Self::MAG,
            And | Or | Not => Self::MAG,
            _ => Self::RESET,
        }
    }
}
