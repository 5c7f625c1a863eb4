//! Cell data structures for the store.
//!
//! - [`Content`] - what the user assigned (number, text or formula)
//! - [`Value`] - what the cell currently evaluates to
//! - [`is_cell_name`] - the `letters digits` naming grammar

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use tallysheet_engine::engine::{EvalError, Expression, FormatError};

/// The content assigned to a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Number(f64),
    Text(String),
    Formula(Expression),
}

impl Content {
    /// Classify raw input.
    /// - Parses as a finite number (surrounding whitespace allowed) -> Number
    /// - Starts with '=' -> Formula over the rest, built by `build_formula`
    /// - Otherwise -> Text, verbatim
    pub fn classify<F>(raw: &str, build_formula: F) -> Result<Content, FormatError>
    where
        F: FnOnce(&str) -> Result<Expression, FormatError>,
    {
        if let Some(n) = parse_number(raw) {
            return Ok(Content::Number(n));
        }
        if let Some(formula) = raw.strip_prefix('=') {
            return build_formula(formula).map(Content::Formula);
        }
        Ok(Content::Text(raw.to_string()))
    }

    /// Empty text; a cell holding it is logically absent.
    pub fn empty() -> Content {
        Content::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Text(s) if s.is_empty())
    }

    pub fn as_formula(&self) -> Option<&Expression> {
        match self {
            Content::Formula(expr) => Some(expr),
            _ => None,
        }
    }

    /// The string that reproduces this content when assigned again.
    pub fn to_input_string(&self) -> String {
        match self {
            Content::Number(n) => n.to_string(),
            Content::Text(s) => s.clone(),
            Content::Formula(expr) => format!("={}", expr),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_input_string())
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl Value {
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Error(err) => write!(f, "#ERR: {}", err.reason()),
        }
    }
}

/// A stored cell. Only non-empty cells are stored.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub content: Content,
    pub value: Value,
}

fn cell_name_re() -> &'static Regex {
    static CELL_NAME_RE: OnceLock<Regex> = OnceLock::new();
    CELL_NAME_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<digits>[0-9]+)$")
            .expect("cell name regex must compile")
    })
}

/// Check whether `name` is one or more ASCII letters followed by one or
/// more digits.
pub fn is_cell_name(name: &str) -> bool {
    cell_name_re().is_match(name)
}

/// Sheet order: by column letters (shorter first, then alphabetical,
/// ignoring case), then by row number.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

fn sort_key(name: &str) -> (usize, String, usize, &str) {
    let Some(caps) = cell_name_re().captures(name) else {
        return (usize::MAX, String::new(), usize::MAX, name);
    };
    let letters = caps.name("letters").map_or("", |m| m.as_str());
    let digits = caps.name("digits").map_or("", |m| m.as_str());
    let digits = digits.trim_start_matches('0');
    // Same-length digit strings without leading zeros compare numerically.
    let start = name.len() - digits.len();
    (
        letters.len(),
        letters.to_ascii_uppercase(),
        digits.len(),
        &name[start..],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> Result<Content, FormatError> {
        Content::classify(raw, Expression::new)
    }

    #[test]
    fn test_classify_number() {
        assert_eq!(classify("42").unwrap(), Content::Number(42.0));
        assert_eq!(classify(" 2.5 ").unwrap(), Content::Number(2.5));
        assert_eq!(classify("1e3").unwrap(), Content::Number(1000.0));
        assert_eq!(classify("-7").unwrap(), Content::Number(-7.0));
    }

    #[test]
    fn test_classify_non_finite_is_text() {
        assert_eq!(classify("inf").unwrap(), Content::Text("inf".to_string()));
        assert_eq!(classify("NaN").unwrap(), Content::Text("NaN".to_string()));
    }

    #[test]
    fn test_classify_formula() {
        let content = classify("=A1 + 2").unwrap();
        assert_eq!(content.as_formula().unwrap().to_string(), "A1+2");
        assert_eq!(content.to_input_string(), "=A1+2");
    }

    #[test]
    fn test_classify_bad_formula() {
        assert_eq!(classify("=1 +"), Err(FormatError::BadEnd("+".to_string())));
        assert_eq!(classify("="), Err(FormatError::Empty));
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify("Total").unwrap(), Content::Text("Total".to_string()));
        assert_eq!(classify("  ").unwrap(), Content::Text("  ".to_string()));
        assert!(classify("").unwrap().is_empty());
        assert!(!classify(" ").unwrap().is_empty());
    }

    #[test]
    fn test_input_string_round_trips() {
        for raw in ["0.1", "hello world", "=(a1+2)*b3", "-0.25"] {
            let content = classify(raw).unwrap();
            assert_eq!(classify(&content.to_input_string()).unwrap(), content);
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Text("x".to_string()).to_string(), "x");
        assert_eq!(
            Value::Error(EvalError::DivisionByZero).to_string(),
            "#ERR: Division by 0"
        );
        assert_eq!(Value::Number(4.0).as_number(), Some(4.0));
        assert_eq!(Value::empty().as_number(), None);
    }

    #[test]
    fn test_is_cell_name() {
        assert!(is_cell_name("A1"));
        assert!(is_cell_name("zz100"));
        assert!(!is_cell_name("A"));
        assert!(!is_cell_name("1A"));
        assert!(!is_cell_name("A1B"));
        assert!(!is_cell_name("_A1"));
        assert!(!is_cell_name(""));
    }

    #[test]
    fn test_compare_names() {
        let mut names = vec!["B1", "A10", "AA1", "A2", "a3", "Z9", "A01"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["A01", "A2", "a3", "A10", "B1", "Z9", "AA1"]);
    }
}
