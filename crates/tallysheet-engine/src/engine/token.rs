//! Formula tokenizer.
//!
//! Splits formula text into maximal lexemes: parentheses, the four binary
//! operators, variables (`[A-Za-z_][A-Za-z0-9_]*`) and floating-point
//! numerals. Whitespace separates tokens and is never emitted.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::error::FormatError;

/// Binary operators understood by formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    /// Operators with higher precedence bind tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    fn from_symbol(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            _ => None,
        }
    }
}

/// A single lexeme of a formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Op(Op),
    Variable(String),
    Number(f64),
}

impl Token {
    /// Numerals and variables.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Variable(_) | Token::Number(_))
    }

    /// Tokens that may begin a sub-expression: operands and `(`.
    pub fn opens_term(&self) -> bool {
        self.is_operand() || matches!(self, Token::LParen)
    }

    /// Tokens that may end a sub-expression: operands and `)`.
    pub fn closes_term(&self) -> bool {
        self.is_operand() || matches!(self, Token::RParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::Variable(name) => f.write_str(name),
            Token::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Check whether `ident` is a syntactically valid variable.
///
/// ```
/// use tallysheet_engine::engine::is_variable;
///
/// assert!(is_variable("_tmp3"));
/// assert!(is_variable("A1"));
/// assert!(!is_variable("3a"));
/// assert!(!is_variable(""));
/// ```
pub fn is_variable(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?<space>\s+)|(?<lp>\()|(?<rp>\))|(?<op>[+\-*/])|(?<var>[A-Za-z_][A-Za-z0-9_]*)|(?<num>(?:\d+\.\d*|\d*\.\d+|\d+)(?:[eE][+\-]?\d+)?))",
        )
        .expect("token regex must compile")
    })
}

/// Split formula text into tokens.
///
/// Fails with [`FormatError::InvalidToken`] carrying the first run of
/// characters that matches none of the token patterns.
pub fn tokenize(text: &str) -> Result<Vec<Token>, FormatError> {
    let re = token_re();
    let mut tokens = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(caps) = re.captures(rest) else {
            return Err(FormatError::InvalidToken(unmatched_prefix(rest).to_string()));
        };
        let whole = caps.get(0).map_or("", |m| m.as_str());

        if caps.name("space").is_some() {
            // separator only
        } else if caps.name("lp").is_some() {
            tokens.push(Token::LParen);
        } else if caps.name("rp").is_some() {
            tokens.push(Token::RParen);
        } else if let Some(op) = caps.name("op") {
            let symbol = op.as_str().chars().next().and_then(Op::from_symbol);
            match symbol {
                Some(op) => tokens.push(Token::Op(op)),
                None => return Err(FormatError::InvalidToken(op.as_str().to_string())),
            }
        } else if let Some(var) = caps.name("var") {
            tokens.push(Token::Variable(var.as_str().to_string()));
        } else if let Some(num) = caps.name("num") {
            let value = num
                .as_str()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FormatError::InvalidToken(num.as_str().to_string()))?;
            tokens.push(Token::Number(value));
        }

        rest = &rest[whole.len()..];
    }

    Ok(tokens)
}

/// The longest prefix of `rest` at which no token pattern starts.
fn unmatched_prefix(rest: &str) -> &str {
    let re = token_re();
    for (idx, _) in rest.char_indices().skip(1) {
        if re.is_match(&rest[idx..]) {
            return &rest[..idx];
        }
    }
    rest
}
