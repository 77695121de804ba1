// crates/weft-runtime/src/script/parser.rs
//! Tokenizer and precedence-climbing parser for template expressions.

use weft_core::Value;

use super::EvalError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

/// Longest operators first so that `===` is not read as `==` followed by `=`.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "(", ")", "[", "]", ".", ",",
    ";", "?", ":", "!", "+", "-", "*", "/", "%", "<", ">", "=",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),
}

impl Expr {
    fn is_assignable(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Member(..) | Expr::Index(..))
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = start;
            let mut seen_dot = false;
            while let Some(&(i, d)) = chars.peek() {
                let fraction_dot = d == '.'
                    && !seen_dot
                    && source[i + 1..].starts_with(|next: char| next.is_ascii_digit());
                if d.is_ascii_digit() || fraction_dot {
                    seen_dot |= d == '.';
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let number = source[start..end]
                .parse()
                .map_err(|_| EvalError::syntax(source, format!("bad number '{}'", &source[start..end])))?;
            tokens.push(Token::Number(number));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' || d == '$' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(source[start..end].to_string()));
            continue;
        }

        if c == '\'' || c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, d)) = chars.next() {
                match d {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, 'r')) => text.push('\r'),
                        Some((_, other)) => text.push(other),
                        None => break,
                    },
                    d if d == c => {
                        closed = true;
                        break;
                    }
                    d => text.push(d),
                }
            }
            if !closed {
                return Err(EvalError::syntax(source, "unterminated string"));
            }
            tokens.push(Token::Str(text));
            continue;
        }

        let rest = &source[start..];
        let Some(punct) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) else {
            return Err(EvalError::syntax(source, format!("unexpected character '{}'", c)));
        };
        for _ in 0..punct.len() {
            chars.next();
        }
        tokens.push(Token::Punct(*punct));
    }

    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

/// Parses a `;`-separated statement list. An empty source yields `undefined`.
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    let mut parser = Parser {
        source,
        tokens: tokenize(source)?,
        pos: 0,
    };
    parser.program()
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_punct(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Punct(p)) => Some(*p),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.peek_punct() == Some(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), EvalError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", punct)))
        }
    }

    fn error(&self, message: impl Into<String>) -> EvalError {
        let message = message.into();
        match self.peek() {
            Some(token) => EvalError::syntax(self.source, format!("{} near {:?}", message, token)),
            None => EvalError::syntax(self.source, format!("{} at end of input", message)),
        }
    }

    fn program(&mut self) -> Result<Expr, EvalError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            if self.eat(";") {
                continue;
            }
            statements.push(self.expression()?);
            if self.peek().is_some() && !self.eat(";") {
                return Err(self.error("unexpected token"));
            }
        }
        Ok(match statements.len() {
            0 => Expr::Literal(Value::Undefined),
            1 => statements.remove(0),
            _ => Expr::Sequence(statements),
        })
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        let target = self.conditional()?;
        let op = match self.peek_punct() {
            Some("=") => AssignOp::Set,
            Some("+=") => AssignOp::Add,
            Some("-=") => AssignOp::Sub,
            _ => return Ok(target),
        };
        if !target.is_assignable() {
            return Err(self.error("invalid assignment target"));
        }
        self.pos += 1;
        let value = self.expression()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn conditional(&mut self) -> Result<Expr, EvalError> {
        let test = self.binary(0)?;
        if !self.eat("?") {
            return Ok(test);
        }
        let then = self.expression()?;
        self.expect(":")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn binary_operator(&self) -> Option<(&'static str, u8)> {
        let punct = self.peek_punct()?;
        let precedence = match punct {
            "||" => 1,
            "&&" => 2,
            "==" | "!=" | "===" | "!==" => 3,
            "<" | "<=" | ">" | ">=" => 4,
            "+" | "-" => 5,
            "*" | "/" | "%" => 6,
            _ => return None,
        };
        Some((punct, precedence))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;
        while let Some((punct, precedence)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let right = Box::new(self.binary(precedence + 1)?);
            let lhs = Box::new(left);
            left = match punct {
                "||" => Expr::Or(lhs, right),
                "&&" => Expr::And(lhs, right),
                other => {
                    let op = match other {
                        "*" => BinaryOp::Mul,
                        "/" => BinaryOp::Div,
                        "%" => BinaryOp::Rem,
                        "+" => BinaryOp::Add,
                        "-" => BinaryOp::Sub,
                        "<" => BinaryOp::Lt,
                        "<=" => BinaryOp::Le,
                        ">" => BinaryOp::Gt,
                        ">=" => BinaryOp::Ge,
                        "==" => BinaryOp::Eq,
                        "!=" => BinaryOp::Ne,
                        "===" => BinaryOp::StrictEq,
                        _ => BinaryOp::StrictNe,
                    };
                    Expr::Binary(op, lhs, right)
                }
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek_punct() {
            Some("!") => UnaryOp::Not,
            Some("-") => UnaryOp::Negate,
            Some("+") => UnaryOp::Plus,
            _ => return self.postfix(),
        };
        self.pos += 1;
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(".") {
                match self.advance() {
                    Some(Token::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    _ => return Err(self.error("expected property name after '.'")),
                }
            } else if self.eat("[") {
                let index = self.expression()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.peek_punct() == Some("(") {
                let Expr::Ident(name) = expr else {
                    return Err(self.error("only named functions can be called"));
                };
                self.pos += 1;
                let args = self.list(")")?;
                expr = Expr::Call(name, args);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to `close`, which is consumed.
    fn list(&mut self, close: &str) -> Result<Vec<Expr>, EvalError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.expression()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                _ => Expr::Ident(name),
            }),
            Some(Token::Punct("(")) => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(Token::Punct("[")) => Ok(Expr::Array(self.list("]")?)),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected an expression"))
            }
        }
    }
}
