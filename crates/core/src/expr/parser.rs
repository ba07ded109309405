//! Recursive-descent parser.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | 'π' | 'pi'
//!          | IDENT '(' (expr (',' expr)*)? ')'
//!          | '√' unary
//!          | '(' expr ')'
//! ```
//!
//! Every `unary` level and every operator in a chain counts toward
//! [`MAX_DEPTH`], which bounds the depth of the resulting tree and so the
//! recursion of the parser, the interpreter and `Drop`.
//!
//! A closing parenthesis missing at the very end of the input is implied.
//! The keypad builds `pow(2, 3` and leaves the user no way to type the `)`
//! in basic mode, so `pow(2, 3` must evaluate to 8.

use crate::error::CalcError;
use crate::expr::ast::{BinaryOp, Expr, Func};
use crate::expr::lexer::{Spanned, Token};

/// Deepest expression tree the parser will build.
pub const MAX_DEPTH: usize = 256;

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[Spanned<Token>]) -> Result<Expr, CalcError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(unexpected(tok)),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    pos: usize,
    depth: usize,
}

fn unexpected(tok: &Spanned<Token>) -> CalcError {
    CalcError::UnexpectedToken {
        found: tok.value.to_string(),
        pos: tok.pos,
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    /// Take one level of depth, failing past [`MAX_DEPTH`].
    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let pos = self
                .tokens
                .get(self.pos.min(self.tokens.len().saturating_sub(1)))
                .map_or(0, |t| t.pos);
            return Err(CalcError::TooDeep { pos });
        }
        Ok(())
    }

    fn eat(&mut self, token: &Token) -> bool {
        match self.peek() {
            Some(tok) if &tok.value == token => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expression(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.term()?;
        let mut links = 0;
        loop {
            let op = match self.peek().map(|t| &t.value) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => {
                    self.depth -= links;
                    return Ok(lhs);
                }
            };
            self.descend()?;
            links += 1;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek().map(|t| &t.value) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => {
                    self.depth -= links;
                    return Ok(lhs);
                }
            };
            self.descend()?;
            links += 1;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        self.descend()?;
        let expr = if self.eat(&Token::Minus) {
            Expr::Neg(Box::new(self.unary()?))
        } else if self.eat(&Token::Plus) {
            self.unary()?
        } else {
            self.primary()?
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, CalcError> {
        let tok = self.next().ok_or(CalcError::UnexpectedEnd)?;
        match &tok.value {
            Token::Number(n) => Ok(Expr::Number(*n)),
            Token::Pi => Ok(Expr::Pi),
            Token::Radical => {
                let operand = self.unary()?;
                Ok(Expr::Call {
                    func: Func::Sqrt,
                    args: vec![operand],
                })
            }
            Token::LParen => {
                let inner = self.expression()?;
                self.close_paren()?;
                Ok(inner)
            }
            Token::Ident(name) if name == "pi" => Ok(Expr::Pi),
            Token::Ident(name) => {
                let func = Func::from_name(name).ok_or_else(|| CalcError::UnknownFunction {
                    name: name.clone(),
                    pos: tok.pos,
                })?;
                self.call(func)
            }
            _ => Err(unexpected(tok)),
        }
    }

    fn call(&mut self, func: Func) -> Result<Expr, CalcError> {
        match self.next() {
            Some(tok) if tok.value == Token::LParen => {}
            Some(tok) => return Err(unexpected(tok)),
            None => return Err(CalcError::UnexpectedEnd),
        }

        let mut args = Vec::new();
        if !matches!(self.peek().map(|t| &t.value), Some(Token::RParen)) {
            args.push(self.expression()?);
            while self.eat(&Token::Comma) {
                args.push(self.expression()?);
            }
        }
        self.close_paren()?;

        if args.len() != func.arity() {
            return Err(CalcError::WrongArity {
                name: func.name(),
                expected: func.arity(),
                found: args.len(),
            });
        }
        Ok(Expr::Call { func, args })
    }

    /// Consume `)`, or accept end of input as an implied close.
    fn close_paren(&mut self) -> Result<(), CalcError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) if tok.value == Token::RParen => {
                self.pos += 1;
                Ok(())
            }
            Some(tok) => Err(unexpected(tok)),
        }
    }
}
