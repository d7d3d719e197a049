//! Scientific calculator expression evaluator.
//!
//! Evaluation runs in four stages:
//!
//! 1. symbol normalization (`×`, `÷`, `−`, `%`, `π`);
//! 2. resolution of `fn(number)` calls (`sqrt`, `square`, `inv`, `sin`,
//!    `cos`, `tan`, `log`, `ln`) into plain numbers, repeated until the
//!    expression stops changing so nested calls resolve inside-out;
//! 3. tokenization and shunting-yard conversion to reverse Polish notation;
//! 4. stack evaluation of the RPN sequence.
//!
//! Precedence: unary minus 4, `^` 3, `*` `/` 2, `+` `-` 1. Unary minus and
//! `^` are right-associative, so `2^3^2` is `2^(3^2)`. Unary minus binds
//! tighter than `^`: `-2^2` is `(-2)^2`.

use regex::Regex;
use std::f64::consts::PI;
use std::sync::LazyLock;
use thiserror::Error;

static FUNCTION_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sqrt|square|inv|sin|cos|tan|log|ln)\((-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\)")
        .expect("function call regex is valid")
});

/// Upper bound on resolution passes; each pass removes at least one call.
const MAX_RESOLVE_PASSES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("mismatched parentheses")]
    MismatchedParentheses,
    #[error("malformed expression")]
    Malformed,
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("empty expression")]
    Empty,
}

/// How trigonometric arguments are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

impl AngleMode {
    fn to_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Degrees => x.to_radians(),
            AngleMode::Radians => x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Op(Op),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Neg => 4,
            Op::Pow => 3,
            Op::Mul | Op::Div => 2,
            Op::Add | Op::Sub => 1,
        }
    }

    fn right_assoc(self) -> bool {
        matches!(self, Op::Neg | Op::Pow)
    }
}

/// Evaluates an expression. Finite results are rounded to 10 decimal places.
pub fn evaluate(expr: &str, mode: AngleMode) -> Result<f64, CalcError> {
    let normalized = normalize_symbols(expr);
    let resolved = resolve_functions(&normalized, mode)?;
    let tokens = tokenize(&resolved)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }
    let rpn = to_rpn(&tokens)?;
    let value = eval_rpn(&rpn)?;
    Ok(round10(value))
}

fn round10(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = (value * 1e10).round() / 1e10;
    // Huge magnitudes overflow the scaling; keep them as-is.
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Replaces display symbols with their ASCII operator equivalents.
pub fn normalize_symbols(expr: &str) -> String {
    expr.replace('×', "*")
        .replace('÷', "/")
        .replace('−', "-")
        .replace('%', "*0.01")
        .replace('π', &PI.to_string())
}

/// Applies a named scientific function.
pub fn apply_function(name: &str, x: f64, mode: AngleMode) -> Result<f64, CalcError> {
    let y = match name {
        "sqrt" => x.sqrt(),
        "square" => x * x,
        "inv" => 1.0 / x,
        "sin" => mode.to_radians(x).sin(),
        "cos" => mode.to_radians(x).cos(),
        "tan" => mode.to_radians(x).tan(),
        "log" => x.log10(),
        "ln" => x.ln(),
        other => return Err(CalcError::UnknownFunction(other.to_string())),
    };
    Ok(y)
}

/// Rewrites every `fn(number)` call into its value until none remain.
pub fn resolve_functions(expr: &str, mode: AngleMode) -> Result<String, CalcError> {
    let mut current = expr.to_string();
    for _ in 0..MAX_RESOLVE_PASSES {
        let mut failure = None;
        let next = FUNCTION_CALL_RE
            .replace_all(&current, |caps: &regex::Captures| {
                let arg = caps[2].parse::<f64>();
                match arg.map_err(|_| CalcError::InvalidNumber(caps[2].to_string())) {
                    Ok(x) => match apply_function(&caps[1], x, mode) {
                        Ok(y) => format_number(y),
                        Err(e) => {
                            failure = Some(e);
                            String::new()
                        }
                    },
                    Err(e) => {
                        failure = Some(e);
                        String::new()
                    }
                }
            })
            .into_owned();
        if let Some(e) = failure {
            return Err(e);
        }
        if next == current {
            break;
        }
        current = next;
    }
    Ok(current)
}

/// Formats a resolved value so both the tokenizer and the next resolution
/// pass can read it back. Negative values stay bare (`inv(-0.5)` must still
/// match a call); the tokenizer reads `-` after an operator as unary.
fn format_number(y: f64) -> String {
    if y.is_nan() {
        return "(0/0)".to_string();
    }
    if y.is_infinite() {
        return if y > 0.0 { "(1/0)" } else { "(-1/0)" }.to_string();
    }
    format!("{:?}", y)
}

/// Splits an expression into tokens. Whitespace is ignored; `-` is unary at
/// the start, after an operator or after `(`.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().filter(|c| !c.is_whitespace()).collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Exponent form produced by `{:?}` formatting (e.g. 1e-7).
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<f64>()
                .map_err(|_| CalcError::InvalidNumber(literal.clone()))?;
            tokens.push(Token::Number(value));
            continue;
        }

        let unary_position = matches!(tokens.last(), None | Some(Token::Op(_)) | Some(Token::LParen));
        let token = match c {
            '-' if unary_position => Token::Op(Op::Neg),
            '+' => Token::Op(Op::Add),
            '-' => Token::Op(Op::Sub),
            '*' => Token::Op(Op::Mul),
            '/' => Token::Op(Op::Div),
            '^' => Token::Op(Op::Pow),
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(CalcError::InvalidCharacter(other)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// Shunting-yard conversion to reverse Polish notation.
pub fn to_rpn(tokens: &[Token]) -> Result<Vec<Token>, CalcError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = ops.last() {
                    let pops = if op.right_assoc() {
                        op.precedence() < top.precedence()
                    } else {
                        op.precedence() <= top.precedence()
                    };
                    if !pops {
                        break;
                    }
                    output.push(Token::Op(top));
                    ops.pop();
                }
                ops.push(token);
            }
            Token::LParen => ops.push(token),
            Token::RParen => loop {
                match ops.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(CalcError::MismatchedParentheses),
                }
            },
        }
    }

    while let Some(op) = ops.pop() {
        if matches!(op, Token::LParen | Token::RParen) {
            return Err(CalcError::MismatchedParentheses);
        }
        output.push(op);
    }

    Ok(output)
}

/// Evaluates an RPN sequence; exactly one value must remain.
pub fn eval_rpn(rpn: &[Token]) -> Result<f64, CalcError> {
    let mut stack: Vec<f64> = Vec::new();

    for token in rpn {
        match *token {
            Token::Number(n) => stack.push(n),
            Token::Op(Op::Neg) => {
                let a = stack.pop().ok_or(CalcError::Malformed)?;
                stack.push(-a);
            }
            Token::Op(op) => {
                let b = stack.pop().ok_or(CalcError::Malformed)?;
                let a = stack.pop().ok_or(CalcError::Malformed)?;
                let value = match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div => a / b,
                    Op::Pow => a.powf(b),
                    Op::Neg => unreachable!("negation handled above"),
                };
                stack.push(value);
            }
            Token::LParen | Token::RParen => return Err(CalcError::MismatchedParentheses),
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(CalcError::Malformed),
    }
}
