//! Expression parsing implementation
//!
//! Precedence climbing for binary operators, recursive descent for the rest.
//!
//! # Precedence (loosest first)
//!
//! ```text
//! ?:  ||  &&  === !==  < <= > >=  + -  * / %  unary  postfix  primary
//! ```
//!
//! Postfix covers calls `f(a)`, indexing `a[i]` and member access `a.b`.

use crate::memory::value;
use crate::memory::Value;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_ternary)
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(0)?;

        if self.match_token(&TokenKind::Question) {
            let then_expr = self.parse_expression()?;
            self.expect_token(&TokenKind::Colon, "Expected ':' in ternary expression")?;
            let else_expr = self.parse_expression()?;
            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }

        Ok(condition)
    }

    /// Precedence climbing over left-associative binary operators
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = binary_operator(&self.peek().kind) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::LParen) {
                let args = self.parse_argument_list()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.match_token(&TokenKind::Dot) {
                let property = self.expect_identifier()?;
                expr = Expr::Member {
                    target: Box::new(expr),
                    property,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Arguments after an already consumed '('
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_token(&TokenKind::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let kind = self.peek().kind.clone();

        let expr = match kind {
            TokenKind::Number(n) => Expr::Literal(value::number(n)),
            TokenKind::StringLiteral(s) => Expr::Literal(Value::String(s)),
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::Null => Expr::Literal(Value::Null),
            TokenKind::Undefined => Expr::Ident("undefined".to_string()),
            TokenKind::Ident(name) => Expr::Ident(name),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_token(&TokenKind::RParen, "Expected ')'")?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                self.advance();
                return self.parse_array_literal();
            }
            TokenKind::LBrace => {
                self.advance();
                return self.parse_object_literal();
            }
            _ => return Err(self.error_here("Unexpected token in expression")),
        };

        self.advance();
        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBracket, "Expected ']' to close array")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut fields = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let key = match self.peek().kind.clone() {
                TokenKind::Ident(name) => name,
                TokenKind::StringLiteral(s) => s,
                TokenKind::Number(n) => value::display_value(&value::number(n)),
                _ => return Err(self.error_here("Expected property name")),
            };
            self.advance();

            let field = if self.match_token(&TokenKind::Colon) {
                self.parse_expression()?
            } else {
                // shorthand `{ x }`
                Expr::Ident(key.clone())
            };
            fields.push((key, field));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBrace, "Expected '}' to close object")?;
        Ok(Expr::Object(fields))
    }
}

/// Binary operator and its precedence for the current token
fn binary_operator(kind: &TokenKind) -> Option<(BinOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinOp::Or, 1),
        TokenKind::AndAnd => (BinOp::And, 2),
        TokenKind::EqEq => (BinOp::Eq, 3),
        TokenKind::NotEq => (BinOp::Ne, 3),
        TokenKind::Lt => (BinOp::Lt, 4),
        TokenKind::Le => (BinOp::Le, 4),
        TokenKind::Gt => (BinOp::Gt, 4),
        TokenKind::Ge => (BinOp::Ge, 4),
        TokenKind::Plus => (BinOp::Add, 5),
        TokenKind::Minus => (BinOp::Sub, 5),
        TokenKind::Star => (BinOp::Mul, 6),
        TokenKind::Slash => (BinOp::Div, 6),
        TokenKind::Percent => (BinOp::Mod, 6),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expr(src: &str) -> Expr {
        Parser::new(src).unwrap().parse_standalone_expression().unwrap()
    }

    #[test]
    fn test_precedence() {
        match expr("1 + 2 * 3") {
            Expr::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_left_associative() {
        match expr("10 - 4 - 3") {
            Expr::Binary { op: BinOp::Sub, left, .. } => {
                assert!(matches!(*left, Expr::Binary { op: BinOp::Sub, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_member_call() {
        match expr("console.log(\"hi\", x)") {
            Expr::Call { callee, args } => {
                assert_eq!(callee.callee_path().as_deref(), Some("console.log"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("2.5"), Expr::Literal(json!(2.5)));
        assert_eq!(expr("7"), Expr::Literal(json!(7)));
        assert!(matches!(expr("[1, 2,]"), Expr::Array(ref v) if v.len() == 2));
        assert!(matches!(expr("{a: 1, 'b': 2}"), Expr::Object(ref f) if f.len() == 2));
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(Parser::new("1 2").unwrap().parse_standalone_expression().is_err());
    }
}
