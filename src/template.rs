//! Template substitution primitive.
//!
//! Templates use Go-template-style actions delimited by `{{` and `}}`:
//!
//! - `{{ .A.B }}` looks up a dotted path in the values document and
//!   `{{ . }}` renders the whole document.
//! - `{{- ... -}}` trims whitespace on the marked side of the action.
//! - `{{/* ... */}}` is a comment and renders to nothing.
//! - Pipelines pass the value on the left as the last argument of the
//!   function on the right: `{{ .Name | default "web" | quote }}`.
//!
//! Available functions are `default`, `quote`, `upper`, `lower`, `trim` and
//! `toJson`. A reference to a missing key is an error unless it is consumed
//! by `default`.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::values::{Value, ValuesDocument};

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.$|^(\.[A-Za-z_][A-Za-z0-9_-]*)+$").expect("reference pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Failure while compiling a template.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct TemplateError {
    pub message: String,
    /// The unresolved reference, for missing-key failures
    pub variable: Option<String>,
}

impl TemplateError {
    fn syntax(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            variable: None,
        }
    }

    fn missing(reference: &str) -> Self {
        Self {
            message: format!("map has no entry for key {}", reference),
            variable: Some(reference.to_string()),
        }
    }
}

type TemplateResult<T> = std::result::Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Reference(String),
    Literal(Value),
    Function(String),
}

/// An evaluated argument: a value, or a reference that did not resolve.
#[derive(Debug, Clone)]
enum Operand {
    Present(Value),
    Missing(String),
}

impl Operand {
    fn require(self) -> TemplateResult<Value> {
        match self {
            Operand::Present(value) => Ok(value),
            Operand::Missing(reference) => Err(TemplateError::missing(&reference)),
        }
    }
}

/// Substitute `values` into `text`.
pub fn compile(text: &str, values: &ValuesDocument) -> TemplateResult<String> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let literal = &rest[..start];
        let after_open = &rest[start + 2..];
        let end = find_close(after_open)
            .ok_or_else(|| TemplateError::syntax("unclosed action: missing '}}'"))?;

        let mut action = &after_open[..end];
        let trim_left = action.starts_with('-') && action[1..].starts_with(char::is_whitespace);
        let trim_right = action.ends_with('-')
            && action[..action.len() - 1].ends_with(char::is_whitespace);

        if trim_left {
            output.push_str(literal.trim_end());
            action = &action[1..];
        } else {
            output.push_str(literal);
        }
        if trim_right {
            action = &action[..action.len() - 1];
        }

        output.push_str(&evaluate(action.trim(), values)?);

        rest = &after_open[end + 2..];
        if trim_right {
            rest = rest.trim_start();
        }
    }

    // Stray closing delimiters are plain text.
    output.push_str(rest);
    Ok(output)
}

/// Evaluate the inside of one `{{ }}` action.
fn evaluate(action: &str, values: &ValuesDocument) -> TemplateResult<String> {
    if action.starts_with("/*") {
        if action.ends_with("*/") {
            return Ok(String::new());
        }
        return Err(TemplateError::syntax("unclosed comment"));
    }
    if action.is_empty() {
        return Err(TemplateError::syntax("missing value for command"));
    }

    let mut piped: Option<Operand> = None;
    for stage in split_pipeline(action)? {
        let tokens = tokenize(stage)?;
        piped = Some(evaluate_stage(&tokens, piped, values)?);
    }

    match piped {
        Some(operand) => Ok(operand.require()?.to_string()),
        None => Err(TemplateError::syntax("missing value for command")),
    }
}

fn evaluate_stage(
    tokens: &[Token],
    piped: Option<Operand>,
    values: &ValuesDocument,
) -> TemplateResult<Operand> {
    match tokens {
        [] => Err(TemplateError::syntax("missing command in pipeline")),
        [Token::Function(name), args @ ..] => {
            let mut operands = args
                .iter()
                .map(|arg| resolve_operand(arg, values))
                .collect::<TemplateResult<Vec<_>>>()?;
            operands.extend(piped);
            call(name, operands)
        }
        [operand] if piped.is_none() => resolve_operand(operand, values),
        _ => Err(TemplateError::syntax(format!(
            "can't give argument to non-function {}",
            describe(&tokens[0])
        ))),
    }
}

fn resolve_operand(token: &Token, values: &ValuesDocument) -> TemplateResult<Operand> {
    match token {
        Token::Literal(value) => Ok(Operand::Present(value.clone())),
        Token::Reference(reference) if reference == "." => {
            Ok(Operand::Present(values.root().clone()))
        }
        Token::Reference(reference) => {
            let path: Vec<&str> = reference[1..].split('.').collect();
            Ok(match values.lookup(&path) {
                Some(value) => Operand::Present(value.clone()),
                None => Operand::Missing(reference.clone()),
            })
        }
        Token::Function(name) => Err(TemplateError::syntax(format!(
            "function {} used as an argument",
            name
        ))),
    }
}

fn call(name: &str, mut args: Vec<Operand>) -> TemplateResult<Operand> {
    if name == "default" {
        if args.len() != 2 {
            return Err(arity(name, 2, args.len()));
        }
        let given = args.pop();
        let fallback = args.pop();
        return match (fallback, given) {
            (Some(_), Some(Operand::Present(value))) if !value.is_empty() => {
                Ok(Operand::Present(value))
            }
            (Some(fallback), _) => Ok(Operand::Present(fallback.require()?)),
            _ => Err(arity(name, 2, 0)),
        };
    }

    if args.len() != 1 {
        return Err(arity(name, 1, args.len()));
    }
    let value = args.remove(0).require()?;

    let result = match name {
        "quote" => Value::String(
            serde_json::to_string(&value.to_string())
                .map_err(|e| TemplateError::syntax(e.to_string()))?,
        ),
        "upper" => Value::String(value.to_string().to_uppercase()),
        "lower" => Value::String(value.to_string().to_lowercase()),
        "trim" => Value::String(value.to_string().trim().to_string()),
        "toJson" => Value::String(
            serde_json::to_string(&value).map_err(|e| TemplateError::syntax(e.to_string()))?,
        ),
        other => {
            return Err(TemplateError::syntax(format!(
                "function \"{}\" not defined",
                other
            )))
        }
    };
    Ok(Operand::Present(result))
}

fn arity(name: &str, expected: usize, got: usize) -> TemplateError {
    TemplateError::syntax(format!(
        "wrong number of args for {}: want {} got {}",
        name, expected, got
    ))
}

fn describe(token: &Token) -> String {
    match token {
        Token::Reference(r) => r.clone(),
        Token::Literal(v) => v.to_string(),
        Token::Function(f) => f.clone(),
    }
}

/// Tracks whether a scan is inside a double-quoted literal.
#[derive(Default)]
struct Quotes {
    in_string: bool,
    escaped: bool,
}

impl Quotes {
    /// Feed the next character; true when it lies outside any literal.
    fn outside(&mut self, ch: char) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escaped = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ => !self.in_string,
        }
    }
}

/// Offset of the `}}` closing the action that `text` starts. Delimiters
/// inside string literals do not close it; comments end at the first one.
fn find_close(text: &str) -> Option<usize> {
    if text.trim_start_matches('-').trim_start().starts_with("/*") {
        return text.find("}}");
    }
    let mut quotes = Quotes::default();
    text.char_indices()
        .find(|&(i, ch)| quotes.outside(ch) && text[i..].starts_with("}}"))
        .map(|(i, _)| i)
}

/// Split an action on `|` outside of string literals.
fn split_pipeline(action: &str) -> TemplateResult<Vec<&str>> {
    let mut stages = Vec::new();
    let mut quotes = Quotes::default();
    let mut start = 0;

    for (i, ch) in action.char_indices() {
        if quotes.outside(ch) && ch == '|' {
            stages.push(action[start..i].trim());
            start = i + 1;
        }
    }
    if quotes.in_string {
        return Err(TemplateError::syntax("unterminated quoted string"));
    }
    stages.push(action[start..].trim());
    Ok(stages)
}

fn tokenize(stage: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = stage.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch == '"' {
            chars.next();
            let mut literal = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, 'n')) => literal.push('\n'),
                        Some((_, 't')) => literal.push('\t'),
                        Some((_, other)) => literal.push(other),
                        None => break,
                    },
                    c => literal.push(c),
                }
            }
            if !closed {
                return Err(TemplateError::syntax("unterminated quoted string"));
            }
            tokens.push(Token::Literal(Value::String(literal)));
            continue;
        }

        let mut end = stage.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                end = i;
                break;
            }
            chars.next();
        }
        tokens.push(classify(&stage[start..end])?);
    }

    Ok(tokens)
}

fn classify(word: &str) -> TemplateResult<Token> {
    if word.starts_with('.') {
        if REFERENCE.is_match(word) {
            return Ok(Token::Reference(word.to_string()));
        }
        return Err(TemplateError::syntax(format!("bad reference {}", word)));
    }

    match word {
        "true" => return Ok(Token::Literal(Value::Bool(true))),
        "false" => return Ok(Token::Literal(Value::Bool(false))),
        "nil" => return Ok(Token::Literal(Value::Null)),
        _ => {}
    }
    if let Ok(i) = word.parse::<i64>() {
        return Ok(Token::Literal(Value::Integer(i)));
    }
    if let Ok(f) = word.parse::<f64>() {
        return Ok(Token::Literal(Value::Float(f)));
    }
    if IDENTIFIER.is_match(word) {
        return Ok(Token::Function(word.to_string()));
    }

    Err(TemplateError::syntax(format!(
        "unexpected \"{}\" in command",
        word
    )))
}
