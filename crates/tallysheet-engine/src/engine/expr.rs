//! Validated, immutable formulas.
//!
//! An [`Expression`] is built once from formula text. Construction is the
//! only validation point: every later operation (canonical form, variable
//! listing, evaluation) relies on the grammar having been checked here.
//!
//! Grammar rules, checked in order (first failure wins):
//! - at least one token
//! - the first token is a number, variable or `(`
//! - the last token is a number, variable or `)`
//! - the running parenthesis balance never goes negative and ends at zero
//! - a token after `(` or an operator is a number, variable or `(`
//! - a token after a number, variable or `)` is an operator or `)`
//! - every variable is still a variable after normalization and passes the
//!   caller's validator

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::error::{EvalError, FormatError};
use super::eval::evaluate_tokens;
use super::token::{Token, is_variable, tokenize};

/// A syntactically valid formula over numbers, variables and `+ - * /`.
#[derive(Debug, Clone)]
pub struct Expression {
    /// Tokens with variables already normalized.
    tokens: Vec<Token>,
    canonical: String,
    /// Distinct normalized variables, in order of first appearance.
    variables: Vec<String>,
}

impl Expression {
    /// Build a formula with no normalization and no extra validation.
    pub fn new(text: &str) -> Result<Expression, FormatError> {
        Self::with_rules(text, |name: &str| name.to_string(), |_: &str| true)
    }

    /// Build a formula, normalizing every variable with `normalize` and
    /// requiring `is_valid` to accept each normalized variable.
    pub fn with_rules<N, V>(text: &str, normalize: N, is_valid: V) -> Result<Expression, FormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let mut tokens = tokenize(text)?;
        check_grammar(&tokens)?;

        let mut canonical = String::with_capacity(text.len());
        let mut variables: Vec<String> = Vec::new();
        let mut seen = HashSet::new();

        for token in &mut tokens {
            match token {
                Token::Variable(name) => {
                    let normalized = normalize(name.as_str());
                    if !is_variable(&normalized) {
                        return Err(FormatError::InvalidVariable {
                            token: name.clone(),
                            normalized,
                        });
                    }
                    if !is_valid(&normalized) {
                        return Err(FormatError::RejectedVariable {
                            token: name.clone(),
                            normalized,
                        });
                    }
                    canonical.push_str(&normalized);
                    if seen.insert(normalized.clone()) {
                        variables.push(normalized.clone());
                    }
                    *name = normalized;
                }
                Token::Number(n) => canonical.push_str(&normalize(&n.to_string())),
                other => canonical.push_str(&other.to_string()),
            }
        }

        Ok(Expression {
            tokens,
            canonical,
            variables,
        })
    }

    /// Distinct normalized variable names referenced by this formula.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The variables as a set, for edge bookkeeping.
    pub fn variable_set(&self) -> HashSet<String> {
        self.variables.iter().cloned().collect()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Evaluate against `lookup`, which maps a normalized variable to its
    /// value or `None` when the variable is undefined.
    ///
    /// Never panics for a constructed expression; division by zero and
    /// undefined variables come back as [`EvalError`].
    pub fn evaluate<L>(&self, lookup: L) -> Result<f64, EvalError>
    where
        L: Fn(&str) -> Option<f64>,
    {
        evaluate_tokens(&self.tokens, lookup)
    }

    /// Comparison key for one token: numerals compare by their canonical
    /// text, everything else by its rendered form.
    fn token_keys(&self) -> impl Iterator<Item = TokenKey<'_>> {
        self.tokens.iter().map(|token| match token {
            Token::Number(n) => TokenKey::Number(n.to_string()),
            Token::Variable(name) => TokenKey::Variable(name.as_str()),
            Token::Op(op) => TokenKey::Symbol(op.symbol()),
            Token::LParen => TokenKey::Symbol('('),
            Token::RParen => TokenKey::Symbol(')'),
        })
    }
}

#[derive(PartialEq, Eq, Hash)]
enum TokenKey<'a> {
    Number(String),
    Variable(&'a str),
    Symbol(char),
}

fn check_grammar(tokens: &[Token]) -> Result<(), FormatError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(FormatError::Empty);
    };
    if !first.opens_term() {
        return Err(FormatError::BadStart(first.to_string()));
    }
    if !last.closes_term() {
        return Err(FormatError::BadEnd(last.to_string()));
    }

    let mut depth = 0usize;
    let mut open = 0usize;
    let mut close = 0usize;
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => {
                open += 1;
                depth += 1;
            }
            Token::RParen => {
                close += 1;
                depth = depth
                    .checked_sub(1)
                    .ok_or(FormatError::UnmatchedClose { position })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(FormatError::Unbalanced { open, close });
    }

    for pair in tokens.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.closes_term() {
            if !matches!(next, Token::Op(_) | Token::RParen) {
                return Err(FormatError::ExpectedOperator {
                    after: prev.to_string(),
                    found: next.to_string(),
                });
            }
        } else if !next.opens_term() {
            return Err(FormatError::ExpectedOperand {
                after: prev.to_string(),
                found: next.to_string(),
            });
        }
    }

    Ok(())
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.tokens.len() == other.tokens.len() && self.token_keys().eq(other.token_keys())
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.len().hash(state);
        for key in self.token_keys() {
            key.hash(state);
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Expression {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::new(s)
    }
}
