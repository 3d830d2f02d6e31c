//! Query-string evaluation for the in-memory backend.
//!
//! Supports the subset of the Lucene query syntax clients actually send:
//! bare and quoted terms, `*`/`?` wildcards, `field:value`,
//! `field:[lo TO hi]` / `field:{lo TO hi}` ranges, `AND`/`OR`/`NOT`
//! (also `&&`, `||`, `!`, `-`), and parentheses.

use regex::Regex;

use crate::error::{AppError, Result};

/// Operator applied between adjacent clauses without an explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOperator {
    And,
    Or,
}

impl DefaultOperator {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("or") {
            Self::Or
        } else {
            Self::And
        }
    }
}

/// Parsed query expression.
#[derive(Debug, Clone)]
pub enum Expr {
    All,
    Nothing,
    Term {
        field: Option<String>,
        value: TermValue,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// Right-hand side of a term clause.
#[derive(Debug, Clone)]
pub enum TermValue {
    Word(String),
    /// Pattern with its case-sensitive and case-folded matchers
    Wildcard(String, Regex, Regex),
    Phrase(String),
    Range {
        lo: Option<String>,
        hi: Option<String>,
        inclusive_lo: bool,
        inclusive_hi: bool,
    },
}

/// How a document exposes a field to the matcher.
pub trait FieldSource {
    /// Raw string values of a field (empty when absent).
    fn values(&self, field: &str) -> Vec<String>;

    /// Whether the field is analyzed (tokenized, case-folded).
    fn is_text(&self, field: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Field(String),
    Word(String),
    Phrase(String),
    Range(String, bool, bool),
}

/// Parse a query string.
pub fn parse(query: &str, default_op: DefaultOperator) -> Result<Expr> {
    let tokens = tokenize(query)?;
    if tokens.is_empty() {
        return Ok(Expr::Nothing);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        default_op,
    };
    let expr = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(invalid(query, "unexpected trailing input"));
    }
    Ok(expr)
}

fn invalid(query: &str, message: &str) -> AppError {
    AppError::InvalidQuery(format!("Failed to parse query [{query}]: {message}"))
}

fn tokenize(query: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = query.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '"')
                    .ok_or_else(|| invalid(query, "unterminated phrase"))?;
                tokens.push(Token::Phrase(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            '[' | '{' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']' || ch == '}')
                    .ok_or_else(|| invalid(query, "unterminated range"))?;
                let close = chars[i + 1 + end];
                let body: String = chars[i + 1..i + 1 + end].iter().collect();
                tokens.push(Token::Range(body, c == '[', close == ']'));
                i += end + 2;
            }
            '-' | '!' | '+' if i + 1 < chars.len() && !chars[i + 1].is_whitespace() => {
                if c != '+' {
                    tokens.push(Token::Not);
                }
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '(' | ')' | '"' | '[' | '{')
                {
                    if chars[i] == ':' {
                        break;
                    }
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if i < chars.len() && chars[i] == ':' {
                    i += 1;
                    tokens.push(Token::Field(word));
                    continue;
                }
                tokens.push(match word.as_str() {
                    "AND" | "&&" => Token::And,
                    "OR" | "||" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Word(word),
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    default_op: DefaultOperator,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: &str) -> AppError {
        AppError::InvalidQuery(format!("Failed to parse query at token {}: {message}", self.pos))
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.next();
                    let right = self.parse_unary()?;
                    left = Expr::And(Box::new(left), Box::new(right));
                }
                Some(Token::Or) | Some(Token::RParen) | None => break,
                Some(_) => {
                    let right = self.parse_unary()?;
                    left = match self.default_op {
                        DefaultOperator::And => Expr::And(Box::new(left), Box::new(right)),
                        DefaultOperator::Or => Expr::Or(Box::new(left), Box::new(right)),
                    };
                }
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(self.error("missing closing parenthesis")),
                }
            }
            Some(Token::Field(field)) => match self.next() {
                Some(token) => {
                    let value = self.term_value(token)?;
                    Ok(Expr::Term {
                        field: Some(field),
                        value,
                    })
                }
                None => Err(self.error("field without value")),
            },
            Some(token) => {
                if token == Token::Word("*".to_string()) {
                    return Ok(Expr::All);
                }
                let value = self.term_value(token)?;
                Ok(Expr::Term { field: None, value })
            }
            None => Err(self.error("unexpected end of query")),
        }
    }

    fn term_value(&self, token: Token) -> Result<TermValue> {
        match token {
            Token::Word(word) if word.contains(['*', '?']) => {
                let exact = wildcard_regex(&word, false).map_err(|e| self.error(&e.to_string()))?;
                let folded = wildcard_regex(&word, true).map_err(|e| self.error(&e.to_string()))?;
                Ok(TermValue::Wildcard(word, exact, folded))
            }
            Token::Word(word) => Ok(TermValue::Word(word)),
            Token::Phrase(phrase) => Ok(TermValue::Phrase(phrase)),
            Token::Range(body, inclusive_lo, inclusive_hi) => {
                let (lo, hi) = body
                    .split_once(" TO ")
                    .ok_or_else(|| self.error("range needs 'lo TO hi'"))?;
                let bound = |s: &str| {
                    let s = s.trim();
                    (s != "*").then(|| s.to_string())
                };
                Ok(TermValue::Range {
                    lo: bound(lo),
                    hi: bound(hi),
                    inclusive_lo,
                    inclusive_hi,
                })
            }
            _ => Err(self.error("expected a term")),
        }
    }
}

fn wildcard_regex(pattern: &str, fold_case: bool) -> std::result::Result<Regex, regex::Error> {
    let mut re = String::from(if fold_case { "(?i)^" } else { "^" });
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}

/// Lowercased word tokens of a text value.
pub fn analyze(text: &str) -> Vec<String> {
    use unicode_segmentation::UnicodeSegmentation;
    text.unicode_words().map(str::to_lowercase).collect()
}

impl Expr {
    /// Evaluate the expression against a document.
    pub fn matches(&self, doc: &dyn FieldSource, default_field: &str) -> bool {
        match self {
            Expr::All => true,
            Expr::Nothing => false,
            Expr::And(a, b) => a.matches(doc, default_field) && b.matches(doc, default_field),
            Expr::Or(a, b) => a.matches(doc, default_field) || b.matches(doc, default_field),
            Expr::Not(inner) => !inner.matches(doc, default_field),
            Expr::Term { field, value } => {
                let field = field.as_deref().unwrap_or(default_field);
                term_matches(doc, field, value)
            }
        }
    }
}

fn term_matches(doc: &dyn FieldSource, field: &str, value: &TermValue) -> bool {
    let values = doc.values(field);
    if values.is_empty() {
        return false;
    }
    let text = doc.is_text(field);

    match value {
        TermValue::Wildcard(pattern, _, _) if pattern == "*" => true,
        TermValue::Wildcard(_, exact, folded) => {
            if text {
                values
                    .iter()
                    .flat_map(|v| analyze(v))
                    .any(|token| folded.is_match(&token))
            } else {
                values.iter().any(|v| exact.is_match(v))
            }
        }
        TermValue::Word(word) | TermValue::Phrase(word) if text => {
            let needle = analyze(word);
            if needle.is_empty() {
                return false;
            }
            values.iter().any(|v| contains_sequence(&analyze(v), &needle))
        }
        TermValue::Word(word) | TermValue::Phrase(word) => values.iter().any(|v| v == word),
        TermValue::Range {
            lo,
            hi,
            inclusive_lo,
            inclusive_hi,
        } => values.iter().any(|v| {
            let above = lo.as_deref().is_none_or(|lo| match compare(v, lo) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => *inclusive_lo,
                std::cmp::Ordering::Less => false,
            });
            let below = hi.as_deref().is_none_or(|hi| match compare(v, hi) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => *inclusive_hi,
                std::cmp::Ordering::Greater => false,
            });
            above && below
        }),
    }
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Compare numerically when both sides are numbers, otherwise as strings.
///
/// Date-like bounds are compared on their common prefix so that
/// `2023-12-01` covers `2023-12-01T10:00:00`.
fn compare(value: &str, bound: &str) -> std::cmp::Ordering {
    if let (Ok(a), Ok(b)) = (value.parse::<f64>(), bound.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal);
    }
    if looks_like_date(value) && looks_like_date(bound) {
        let n = value.len().min(bound.len());
        return value.as_bytes()[..n].cmp(&bound.as_bytes()[..n]);
    }
    value.cmp(bound)
}

fn looks_like_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10 && b[4] == b'-' && b[7] == b'-' && b[..4].iter().all(u8::is_ascii_digit)
}
