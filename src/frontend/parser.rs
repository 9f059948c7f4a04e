use thiserror::Error;

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, UnaryOp};
use crate::frontend::token::{Token, TokenKind};

/// A grammar violation, positioned at the offending token.
///
/// `lexical` marks errors whose offending token was `Unknown`: the scanner
/// could not classify the lexeme, so the failure is lexical rather than
/// syntactic. Hosts map the flag to their diagnostic kinds.
#[derive(Debug, Clone, Error)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub lexical: bool,
}

/// Recursive-descent parser over a lexed token stream.
///
/// Newline tokens are filtered out up front; they exist only so token
/// positions stay accurate. On an error the parser synchronizes to the next
/// statement boundary and keeps going, but only the first error is
/// surfaced.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .collect();
        if !matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)) {
            let (line, col) = tokens.last().map(|t| (t.line, t.col)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, col));
        }
        Parser { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        let mut first_error: Option<ParseError> = None;

        while !self.check(TokenKind::Eof) {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                    self.synchronize();
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(Program { statements }),
        }
    }

    // Cursor

    fn peek(&self) -> &Token {
        // The stream always ends with Eof, so indexing is clamped to it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        let token = self.peek();
        let message = if token.kind == TokenKind::Eof {
            format!("{}, found end of input", message)
        } else {
            format!("{}, found '{}'", message, token)
        };
        ParseError {
            message,
            line: token.line,
            col: token.col,
            lexical: token.kind == TokenKind::Unknown,
        }
    }

    /// Skip forward until a semicolon has been consumed or the next token
    /// starts a statement. Always makes progress.
    fn synchronize(&mut self) {
        let mut previous = self.advance();
        loop {
            if previous.kind == TokenKind::Semicolon {
                return;
            }
            if self.check(TokenKind::Eof) || self.peek().kind.starts_statement() {
                return;
            }
            previous = self.advance();
        }
    }

    // Declarations and statements

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Var => self.var_declaration(),
            TokenKind::Function => self.fun_declaration(),
            _ => self.statement(),
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // var
        let name = self.expect(TokenKind::Identifier, "expected variable name")?;
        let initializer = if self.eat(TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "expected ';' after variable declaration",
        )?;
        Ok(Stmt::VarDecl {
            name: name.text,
            initializer,
        })
    }

    fn fun_declaration(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // function
        let name = self.expect(TokenKind::Identifier, "expected function name")?;
        self.expect(TokenKind::LParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self.expect(TokenKind::Identifier, "expected parameter name")?;
                params.push(param.text);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;

        let body = self.block_statements()?;
        Ok(Stmt::FunDecl {
            name: name.text,
            params,
            body,
        })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::LBrace => Ok(Stmt::Block(self.block_statements()?)),
            _ => self.expression_statement(),
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // if
        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // while
        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // for
        self.expect(TokenKind::LParen, "expected '(' after 'for'")?;

        // Each initializer form consumes its own trailing ';'.
        let initializer = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after loop condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, "expected ')' after for clauses")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // return
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after return value")?;
        Ok(Stmt::Return { value })
    }

    fn block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace, "expected '{'")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.declaration()?);
        }
        self.expect(TokenKind::RBrace, "expected '}' after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
        Ok(Stmt::Expr(expr))
    }

    // Expressions, lowest precedence first

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or_expression()?;

        if self.check(TokenKind::Assign) {
            let assign = self.advance();
            let value = self.assignment()?;
            return match expr {
                Expr::Identifier { name, .. } => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                _ => Err(ParseError {
                    message: "Invalid assignment target".to_string(),
                    line: assign.line,
                    col: assign.col,
                    lexical: false,
                }),
            };
        }

        Ok(expr)
    }

    fn or_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and_expression()?;
        while self.eat(TokenKind::Or) {
            let right = self.and_expression()?;
            expr = binary(expr, BinaryOp::Or, right);
        }
        Ok(expr)
    }

    fn and_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.eat(TokenKind::And) {
            let right = self.equality()?;
            expr = binary(expr, BinaryOp::And, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Equal => BinaryOp::Equal,
                TokenKind::NotEqual => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.comparison()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::LessThan => BinaryOp::LessThan,
                TokenKind::GreaterThan => BinaryOp::GreaterThan,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Multiply => BinaryOp::Multiply,
                TokenKind::Divide => BinaryOp::Divide,
                TokenKind::Modulo => BinaryOp::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        while self.eat(TokenKind::LParen) {
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.expression()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after arguments")?;
            expr = Expr::Call {
                callee: Box::new(expr),
                args,
            };
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Number(token.text)))
            }
            TokenKind::Str => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Str(token.text.to_string())))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Identifier {
                    name: token.text,
                    line: token.line,
                    col: token.col,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::Unknown => Err(self.error_here("unexpected character")),
            _ => Err(self.error_here("expected expression")),
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
