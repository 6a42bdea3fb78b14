use chumsky::error::Simple;
use std::fmt::Display;

/// Formulas are single-line strings embedded in rule definitions, so the
/// span is a plain byte range into the formula source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

pub(crate) fn to_parse_error<T: Display + std::hash::Hash + std::cmp::Eq>(
    err: Simple<T>,
) -> ParseError {
    let span = err.span();
    ParseError {
        message: err.to_string(),
        start: span.start,
        end: span.end,
    }
}
