//! Boolean condition expressions for action gating and `{{#if}}` blocks.
//!
//! Grammar, smallest-to-largest:
//!
//! ```text
//! operand    := string | number | true | false | null | path
//! unary      := "!" unary | operand
//! comparison := unary ( ("==" | "!=") unary )?
//! and        := comparison ( "&&" comparison )*
//! expr       := and ( "||" and )*
//! ```
//!
//! `!` binds tightest, then `==`/`!=`, then `&&`, then `||`. No parentheses,
//! no function calls, no arithmetic — conditions stay terminating and
//! side-effect-free by construction. String literals take single or double
//! quotes, without escape sequences.
//!
//! Paths resolve against the [`ExecutionContext`]; a missing path is `null`
//! (falsy, and `!=` anything non-null). Malformed input is a
//! [`DomainError::ConditionEvalError`], never a silent false.

use serde_json::Value;

use crate::domain::context::{ExecutionContext, truthy};
use crate::domain::error::DomainError;

/// Evaluate a condition expression against the context.
pub fn evaluate(expr: &str, ctx: &ExecutionContext) -> Result<bool, DomainError> {
    let tokens = tokenize(expr).map_err(|reason| DomainError::ConditionEvalError {
        expr: expr.to_owned(),
        reason,
    })?;

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        ctx,
    };
    let value = parser.expr().map_err(|reason| DomainError::ConditionEvalError {
        expr: expr.to_owned(),
        reason,
    })?;

    if parser.pos != tokens.len() {
        return Err(DomainError::ConditionEvalError {
            expr: expr.to_owned(),
            reason: format!("unexpected trailing input at token {}", parser.pos + 1),
        });
    }

    Ok(truthy(&value))
}

// ── Tokens ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Literal(Value),
    Path(String),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    tokens.push(Token::Bang);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    return Err("single '=' (use '==' for comparison)".into());
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::AndAnd);
                    i += 2;
                } else {
                    return Err("single '&' (use '&&')".into());
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::OrOr);
                    i += 2;
                } else {
                    return Err("single '|' (use '||')".into());
                }
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end == chars.len() {
                    return Err("unterminated string literal".into());
                }
                let text: String = chars[start..end].iter().collect();
                tokens.push(Token::Literal(Value::String(text)));
                i = end + 1;
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = if let Ok(n) = text.parse::<i64>() {
                    Value::from(n)
                } else if let Ok(f) = text.parse::<f64>() {
                    Value::from(f)
                } else {
                    return Err(format!("invalid number '{text}'"));
                };
                tokens.push(Token::Literal(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                match text.as_str() {
                    "true" => tokens.push(Token::Literal(Value::Bool(true))),
                    "false" => tokens.push(Token::Literal(Value::Bool(false))),
                    "null" => tokens.push(Token::Literal(Value::Null)),
                    _ => tokens.push(Token::Path(text)),
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    if tokens.is_empty() {
        return Err("empty expression".into());
    }
    Ok(tokens)
}

// ── Parser / evaluator ───────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ctx: &'a ExecutionContext,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Result<Value, String> {
        let mut result = truthy(&self.and()?);
        while self.peek() == Some(&Token::OrOr) {
            self.pos += 1;
            // No short-circuit skipping: operands are side-effect-free, so
            // evaluating both keeps error reporting uniform.
            let rhs = truthy(&self.and()?);
            result = result || rhs;
        }
        Ok(Value::Bool(result))
    }

    fn and(&mut self) -> Result<Value, String> {
        let mut result = truthy(&self.comparison()?);
        while self.peek() == Some(&Token::AndAnd) {
            self.pos += 1;
            let rhs = truthy(&self.comparison()?);
            result = result && rhs;
        }
        Ok(Value::Bool(result))
    }

    fn comparison(&mut self) -> Result<Value, String> {
        let left = self.unary()?;
        let negate = match self.peek() {
            Some(Token::EqEq) => false,
            Some(Token::NotEq) => true,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.unary()?;
        let equal = values_equal(&left, &right);
        Ok(Value::Bool(if negate { !equal } else { equal }))
    }

    fn unary(&mut self) -> Result<Value, String> {
        if self.peek() == Some(&Token::Bang) {
            self.pos += 1;
            let value = self.unary()?;
            return Ok(Value::Bool(!truthy(&value)));
        }
        self.operand()
    }

    fn operand(&mut self) -> Result<Value, String> {
        match self.tokens.get(self.pos) {
            Some(Token::Literal(value)) => {
                self.pos += 1;
                Ok(value.clone())
            }
            Some(Token::Path(path)) => {
                self.pos += 1;
                Ok(self.ctx.get(path).cloned().unwrap_or(Value::Null))
            }
            Some(other) => Err(format!("expected a value, found {other:?}")),
            None => Err("expected a value, found end of expression".into()),
        }
    }
}

/// Value equality with numbers compared numerically, so `1 == 1.0` holds
/// regardless of how the context encoded the number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
