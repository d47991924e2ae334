//! Arithmetic expression evaluator.
//!
//! A tokenizer plus recursive-descent parser over numbers, `+ - * / ^` and
//! parentheses. Nothing else is accepted: no identifiers, no functions.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | '(' expr ')'
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so
//! `-2^2 == -4` and `2^3^2 == 512`.

use std::fmt;

use crate::error::EvalError;

/// Longest accepted input, in characters.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Evaluate `input` and return a finite result.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let len = input.chars().count();
    if len > MAX_EXPRESSION_LEN {
        return Err(EvalError::TooLong {
            len,
            max: MAX_EXPRESSION_LEN,
        });
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some((pos, tok)) = parser.peek_positioned() {
        return Err(EvalError::UnexpectedToken {
            found: tok.to_string(),
            pos,
        });
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

// ---- tokenizer ----

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let end = scan_number(&chars, i);
                let text: String = chars[i..end].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(text.clone()))?;
                i = end;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            other => return Err(EvalError::UnexpectedChar { ch: other, pos: i }),
        };
        tokens.push((start, token));
        i += 1;
    }

    Ok(tokens)
}

/// Index one past the end of the numeric literal starting at `start`.
///
/// Consumes digits, one decimal point, and an exponent part. Malformed
/// literals (`1.2.3`, `2e`) are left for `str::parse` to reject.
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        i += 1;
        if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            i += 1;
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

// ---- parser ----

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_positioned(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(p, t)| (*p, t))
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) => {
                let negate = matches!(self.advance(), Some(Token::Minus));
                self.descend()?;
                let operand = self.unary();
                self.ascend();
                let operand = operand?;
                Ok(if negate { -operand } else { operand })
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.primary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            self.descend()?;
            let exponent = self.unary();
            self.ascend();
            return Ok(base.powf(exponent?));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        let pos = self.peek_positioned().map(|(p, _)| p);
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.expr();
                self.ascend();
                let inner = inner?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(EvalError::UnexpectedToken {
                        found: other.to_string(),
                        pos: self.tokens[self.pos - 1].0,
                    }),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(other) => Err(EvalError::UnexpectedToken {
                found: other.to_string(),
                pos: pos.unwrap_or_default(),
            }),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Render a result as JSON: an integer when integral and exactly
/// representable, otherwise a float.
pub fn to_json_number(value: f64) -> serde_json::Value {
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < EXACT_LIMIT {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        if b == 0.0 {
            return a.abs() < 1e-12;
        }
        ((a - b) / b).abs() < 1e-12
    }

    // ---- arithmetic ----

    #[test]
    fn test_basic_operations() {
        assert_eq!(evaluate("2+2").unwrap(), 4.0);
        assert_eq!(evaluate("7 - 10").unwrap(), -3.0);
        assert_eq!(evaluate("6*7").unwrap(), 42.0);
        assert_eq!(evaluate("1/4").unwrap(), 0.25);
        assert_eq!(evaluate("2^10").unwrap(), 1024.0);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("10-4-3").unwrap(), 3.0);
        assert_eq!(evaluate("100/10/5").unwrap(), 2.0);
        assert_eq!(evaluate("2*3^2").unwrap(), 18.0);
    }

    #[test]
    fn test_power_right_associative() {
        assert_eq!(evaluate("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-5").unwrap(), -5.0);
        assert_eq!(evaluate("--5").unwrap(), 5.0);
        assert_eq!(evaluate("+5").unwrap(), 5.0);
        assert_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_eq!(evaluate("2^-1").unwrap(), 0.5);
        assert_eq!(evaluate("3*-2").unwrap(), -6.0);
    }

    #[test]
    fn test_scientific_notation() {
        assert!(approx(evaluate("2e23*3").unwrap(), 6e23));
        assert!(approx(evaluate("1.5E-3").unwrap(), 0.0015));
        assert!(approx(evaluate("1e+2").unwrap(), 100.0));
        assert_eq!(evaluate(".5 + .5").unwrap(), 1.0);
    }

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(evaluate("  ( 1 +\t2 )\n* 3 ").unwrap(), 9.0);
    }

    // ---- rejection ----

    #[test]
    fn test_empty_rejected() {
        assert_eq!(evaluate("").unwrap_err(), EvalError::Empty);
        assert_eq!(evaluate("   ").unwrap_err(), EvalError::Empty);
    }

    #[test]
    fn test_identifiers_rejected() {
        let err = evaluate("process.exit(1)").unwrap_err();
        assert_eq!(err, EvalError::UnexpectedChar { ch: 'p', pos: 0 });
        assert!(matches!(
            evaluate("2 + x").unwrap_err(),
            EvalError::UnexpectedChar { ch: 'x', .. }
        ));
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        assert!(matches!(
            evaluate("1.2.3").unwrap_err(),
            EvalError::InvalidNumber(_)
        ));
        assert!(matches!(evaluate("2e").unwrap_err(), EvalError::InvalidNumber(_)));
    }

    #[test]
    fn test_unbalanced_parens_rejected() {
        assert_eq!(evaluate("(1+2").unwrap_err(), EvalError::UnexpectedEnd);
        assert!(matches!(
            evaluate("1+2)").unwrap_err(),
            EvalError::UnexpectedToken { ref found, pos: 3 } if found == ")"
        ));
    }

    #[test]
    fn test_dangling_operator_rejected() {
        assert_eq!(evaluate("1+").unwrap_err(), EvalError::UnexpectedEnd);
        assert!(matches!(
            evaluate("*2").unwrap_err(),
            EvalError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_adjacent_numbers_rejected() {
        assert!(matches!(
            evaluate("2 3").unwrap_err(),
            EvalError::UnexpectedToken { pos: 2, .. }
        ));
    }

    #[test]
    fn test_division_by_zero_non_finite() {
        assert_eq!(evaluate("1/0").unwrap_err(), EvalError::NonFinite);
        assert_eq!(evaluate("0/0").unwrap_err(), EvalError::NonFinite);
        assert_eq!(evaluate("10^400").unwrap_err(), EvalError::NonFinite);
    }

    #[test]
    fn test_length_limit() {
        let long = "1+".repeat(600) + "1";
        assert!(matches!(
            evaluate(&long).unwrap_err(),
            EvalError::TooLong { max: MAX_EXPRESSION_LEN, .. }
        ));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&deep).unwrap_err(), EvalError::TooDeep(MAX_DEPTH));

        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&ok).unwrap(), 1.0);

        let signs = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&signs).unwrap_err(), EvalError::TooDeep(MAX_DEPTH));
    }

    // ---- json rendering ----

    #[test]
    fn test_to_json_number_integral() {
        assert_eq!(to_json_number(4.0), serde_json::json!(4));
        assert_eq!(to_json_number(-3.0), serde_json::json!(-3));
        assert_eq!(serde_json::json!({"result": to_json_number(4.0)}).to_string(), r#"{"result":4}"#);
    }

    #[test]
    fn test_to_json_number_fractional_and_large() {
        assert_eq!(to_json_number(0.25), serde_json::json!(0.25));
        let big = to_json_number(evaluate("2e23*3").unwrap());
        assert!(big.is_f64());
        assert!(approx(big.as_f64().unwrap(), 6e23));
    }
}
