use smol_str::SmolStr;

use crate::frontend::token::{Token, TokenKind};
use crate::lang::LanguageEntry;

/// Single-pass scanner, parameterized by a language entry.
///
/// The lexer never aborts: a character it cannot classify becomes a single
/// `Unknown` token and scanning continues, so the parser is the one place
/// that rejects malformed input. Newlines are emitted as tokens (and
/// filtered out before parsing) to keep positions accurate.
pub struct Lexer<'a> {
    entry: &'a LanguageEntry,
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &str, entry: &'a LanguageEntry) -> Self {
        Lexer {
            entry,
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    /// Scan the whole source into a token list terminated by `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current() {
            let line = self.line;
            let col = self.col;

            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Newline, "\n", line, col));
                }
                '"' | '\'' => {
                    let text = self.read_string(ch);
                    tokens.push(Token::new(TokenKind::Str, text, line, col));
                }
                c if c.is_ascii_digit() => {
                    let text = self.read_number();
                    tokens.push(Token::new(TokenKind::Number, text, line, col));
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let text = self.read_identifier();
                    let kind = match self.entry.keyword_of(&text) {
                        Some(kw) => TokenKind::from_keyword(kw),
                        None => TokenKind::Identifier,
                    };
                    tokens.push(Token::new(kind, text, line, col));
                }
                c => {
                    let token = self.read_operator(c, line, col);
                    tokens.push(token);
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
        tokens
    }

    /// Maximal run of digits and dots. Multi-dot lexemes are accepted here;
    /// the conversion failure surfaces when the constant is loaded at run
    /// time.
    fn read_number(&mut self) -> SmolStr {
        let mut text = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        SmolStr::new(text)
    }

    /// String literal delimited by the quote character that opened it.
    ///
    /// Recognized escapes: `\n`, `\t`, `\r`, `\\`, `\"`, `\'`; any other
    /// escaped character stands for itself. An unterminated literal takes
    /// the rest of the source.
    fn read_string(&mut self, quote: char) -> SmolStr {
        self.advance();

        let mut text = String::new();
        loop {
            match self.current() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('r') => text.push('\r'),
                        Some('\\') => text.push('\\'),
                        Some('"') => text.push('"'),
                        Some('\'') => text.push('\''),
                        Some(other) => text.push(other),
                        None => break,
                    }
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => break,
            }
        }
        SmolStr::new(text)
    }

    fn read_identifier(&mut self) -> SmolStr {
        let mut text = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        SmolStr::new(text)
    }

    /// Two-character operators take precedence over their one-character
    /// prefixes; anything left over is an `Unknown` token.
    fn read_operator(&mut self, ch: char, line: usize, col: usize) -> Token {
        let two = self.peek().map(|next| {
            let mut s = String::with_capacity(2);
            s.push(ch);
            s.push(next);
            s
        });

        if let Some(two) = two {
            let kind = match two.as_str() {
                "==" => Some(TokenKind::Equal),
                "!=" => Some(TokenKind::NotEqual),
                "<=" => Some(TokenKind::LessEqual),
                ">=" => Some(TokenKind::GreaterEqual),
                "&&" => Some(TokenKind::And),
                "||" => Some(TokenKind::Or),
                _ => None,
            };
            if let Some(kind) = kind {
                self.advance();
                self.advance();
                return Token::new(kind, two, line, col);
            }
        }

        self.advance();
        let kind = match ch {
            '=' => TokenKind::Assign,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multiply,
            '/' => TokenKind::Divide,
            '%' => TokenKind::Modulo,
            '!' => TokenKind::Not,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            _ => TokenKind::Unknown,
        };
        Token::new(kind, SmolStr::new(ch.to_string()), line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let en = lookup("en").unwrap();
        Lexer::new(source, en)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Newline | TokenKind::Eof))
            .collect()
    }

    fn texts(source: &str) -> Vec<String> {
        let en = lookup("en").unwrap();
        Lexer::new(source, en)
            .tokenize()
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn test_var_declaration() {
        assert_eq!(
            kinds("var x = 10;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && ||"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::And,
                TokenKind::Or
            ]
        );
    }

    #[test]
    fn test_single_char_operators() {
        assert_eq!(
            kinds("= < > + - * / % !"),
            vec![
                TokenKind::Assign,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Multiply,
                TokenKind::Divide,
                TokenKind::Modulo,
                TokenKind::Not
            ]
        );
    }

    #[test]
    fn test_keywords_in_english() {
        assert_eq!(
            kinds("if else while for function return var true false null"),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::Function,
                TokenKind::Return,
                TokenKind::Var,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null
            ]
        );
    }

    #[test]
    fn test_keywords_in_hindi() {
        let hi = lookup("hi").unwrap();
        let kinds: Vec<TokenKind> = Lexer::new("agar warna jabtak sach", hi)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::True,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_english_keyword_is_identifier_in_hindi() {
        let hi = lookup("hi").unwrap();
        let tokens = Lexer::new("while", hi).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "while");
    }

    #[test]
    fn test_builtin_surface_lexes_as_identifier() {
        // `print` is a builtin, not a keyword; the compiler resolves it.
        assert_eq!(
            kinds("print(x)"),
            vec![
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen
            ]
        );
    }

    #[test]
    fn test_number_lexemes() {
        assert_eq!(texts("10 3.14 1.2.3"), vec!["10", "3.14", "1.2.3"]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(texts(r#""a\nb" "q\"q" 'single'"#), vec!["a\nb", "q\"q", "single"]);
    }

    #[test]
    fn test_unknown_escape_keeps_raw_character() {
        assert_eq!(texts(r#""a\zb""#), vec!["azb"]);
    }

    #[test]
    fn test_positions_are_one_based() {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new("var x;\n  x = 1;", en).tokenize();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1)); // var
        assert_eq!((tokens[1].line, tokens[1].col), (1, 5)); // x
        assert_eq!((tokens[3].line, tokens[3].col), (1, 7)); // newline
        assert_eq!((tokens[4].line, tokens[4].col), (2, 3)); // x
    }

    #[test]
    fn test_newlines_are_tokens() {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new("a\nb", en).tokenize();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new("var @ x", en).tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].text, "@");
        // Scanning continues past it.
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_lone_ampersand_is_unknown() {
        assert_eq!(kinds("a & b"), vec![
            TokenKind::Identifier,
            TokenKind::Unknown,
            TokenKind::Identifier
        ]);
    }

    #[test]
    fn test_eof_token_terminates_stream() {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new("", en).tokenize();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
