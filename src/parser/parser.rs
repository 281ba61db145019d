use crate::interpreter::constants::MAX_NESTING_DEPTH;
use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("SyntaxError at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the dynamic subset
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Open nesting levels, bounded by [`MAX_NESTING_DEPTH`]
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the whole snippet
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        while !self.is_at_end() {
            program.statements.push(self.parse_statement()?);
        }
        Ok(program)
    }

    /// Parse a standalone expression (the whole input must be consumed)
    pub fn parse_standalone_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.match_token(&TokenKind::Semicolon);
        if !self.is_at_end() {
            return Err(self.error_here("Unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();

        match self.peek().kind.clone() {
            TokenKind::LBrace => {
                let body = self.parse_block()?;
                Ok(Stmt::Block { body, location })
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon)
                    || self.check(&TokenKind::RBrace)
                    || self.is_at_end()
                    || self.current_location().line != location.line
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Return { value, location })
            }
            TokenKind::Break => {
                self.advance();
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Break { location })
            }
            TokenKind::Continue => {
                self.advance();
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Continue { location })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Block {
                    body: Vec::new(),
                    location,
                })
            }
            _ => {
                let stmt = self.parse_simple_statement()?;
                self.match_token(&TokenKind::Semicolon);
                Ok(stmt)
            }
        }
    }

    /// Declarations, assignments, updates and expression statements, without the
    /// trailing semicolon (shared with `for` headers)
    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();

        let kind = match self.peek().kind {
            TokenKind::Let => Some(DeclKind::Let),
            TokenKind::Const => Some(DeclKind::Const),
            TokenKind::Var => Some(DeclKind::Var),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            let name = self.expect_identifier()?;
            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            return Ok(Stmt::VarDecl {
                kind,
                name,
                init,
                location,
            });
        }

        // Prefix update: ++x / --x
        if self.check(&TokenKind::PlusPlus) || self.check(&TokenKind::MinusMinus) {
            let delta = if self.check(&TokenKind::PlusPlus) { 1 } else { -1 };
            self.advance();
            let target = self.expect_identifier()?;
            return Ok(Stmt::Update {
                target,
                delta,
                location,
            });
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            let next = self.peek_ahead(1).map(|t| t.kind.clone());
            let compound = match next {
                Some(TokenKind::Eq) => Some(None),
                Some(TokenKind::PlusEq) => Some(Some(BinOp::Add)),
                Some(TokenKind::MinusEq) => Some(Some(BinOp::Sub)),
                Some(TokenKind::StarEq) => Some(Some(BinOp::Mul)),
                Some(TokenKind::SlashEq) => Some(Some(BinOp::Div)),
                Some(TokenKind::PercentEq) => Some(Some(BinOp::Mod)),
                _ => None,
            };
            if let Some(op) = compound {
                self.advance();
                self.advance();
                let value = self.parse_expression()?;
                return Ok(Stmt::Assign {
                    target: name,
                    op,
                    value,
                    location,
                });
            }
            if matches!(next, Some(TokenKind::PlusPlus) | Some(TokenKind::MinusMinus)) {
                let delta = if next == Some(TokenKind::PlusPlus) { 1 } else { -1 };
                self.advance();
                self.advance();
                return Ok(Stmt::Update {
                    target: name,
                    delta,
                    location,
                });
            }
        }

        let expr = self.parse_expression()?;
        if self.check(&TokenKind::Eq) {
            return Err(self.error_here("Only plain variables can be assigned"));
        }
        if self.check(&TokenKind::FatArrow) {
            return Err(self.error_here("Arrow functions are not supported"));
        }
        Ok(Stmt::Expression { expr, location })
    }

    /// Run `parse` one nesting level deeper; too deep is a syntax error
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here("Nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse `{ ... }` or a single statement used as a body
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.match_token(&TokenKind::LBrace) {
            return Ok(vec![self.parse_statement()?]);
        }

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.error_here("Expected '}' before end of input"));
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'if'
        let condition = self.parse_parenthesized()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(vec![self.nested(Self::parse_if_statement)?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'while'
        let condition = self.parse_parenthesized()?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'for'
        self.expect_token(&TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for initializer")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for condition")?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_token(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = self.parse_block()?;
        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            location,
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'function'
        let name = self.expect_identifier()?;
        self.expect_token(&TokenKind::LParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(&TokenKind::RParen, "Expected ')' after parameters")?;

        if !self.check(&TokenKind::LBrace) {
            return Err(self.error_here("Expected '{' before function body"));
        }
        let body = self.parse_block()?;

        Ok(Stmt::Function {
            name,
            params,
            body,
            location,
        })
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        self.expect_token(&TokenKind::LParen, "Expected '('")?;
        let expr = self.parse_expression()?;
        self.expect_token(&TokenKind::RParen, "Expected ')'")?;
        Ok(expr)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn error_here(&self, message: &str) -> ParseError {
        ParseError {
            message: format!("{}, found {}", message, self.peek().kind),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here("Expected identifier"))
        }
    }
}
