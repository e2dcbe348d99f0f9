//! Sandboxed evaluator for thickness-scaling formulas.
//!
//! The layer thickness can be rescaled between layers by a user-supplied
//! formula over the previous thickness `x`, e.g. `x*1.3` for a 30% growth
//! rate. Only arithmetic is supported: numbers, `x`, `+ - * / ^`, unary
//! minus, and parentheses.

use crate::error::ExprError;

/// Evaluates a formula at the given value of `x`.
///
/// # Errors
///
/// Returns [`ExprError`] if the source fails to parse or the result is not
/// finite (e.g. division by zero).
pub fn eval(src: &str, x: f64) -> Result<f64, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
        x,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(ExprError::TrailingInput {
            offset: parser.tokens[parser.pos].1,
        });
    }
    if !value.is_finite() {
        return Err(ExprError::NonFinite);
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Var,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '^' => {
                tokens.push((Token::Caret, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            'x' => {
                tokens.push((Token::Var, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                let text = &src[start..i];
                let value = text.parse::<f64>().map_err(|_| ExprError::UnexpectedChar {
                    found: '.',
                    offset: start,
                })?;
                tokens.push((Token::Number(value), start));
            }
            other => {
                return Err(ExprError::UnexpectedChar {
                    found: other,
                    offset: i,
                })
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    x: f64,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(t, _)| t)
    }

    fn next(&mut self) -> Result<(Token, usize), ExprError> {
        let tok = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        if self.peek() == Some(Token::Minus) {
            self.pos += 1;
            return Ok(-self.factor()?);
        }
        let base = self.primary()?;
        // Right-associative power binds tighter than unary minus on the left.
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exponent = self.factor()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        let (tok, offset) = self.next()?;
        match tok {
            Token::Number(v) => Ok(v),
            Token::Var => Ok(self.x),
            Token::LParen => {
                let value = self.expr()?;
                match self.next()? {
                    (Token::RParen, _) => Ok(value),
                    (_, offset) => Err(ExprError::UnexpectedToken { offset }),
                }
            }
            _ => Err(ExprError::UnexpectedToken { offset }),
        }
    }
}
