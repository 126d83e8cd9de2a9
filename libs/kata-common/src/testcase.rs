//! Example testcase decoding
//!
//! The catalog ships examples as newline-delimited text with one argument per
//! line. Lines are trimmed, blanks dropped, and consecutive lines grouped into
//! cases of `arity` arguments. Every line is decoded as JSON on its own; a line
//! that is not valid JSON is kept as its trimmed text so one bad literal never
//! sinks the batch.

use crate::error::ParseError;
use crate::types::ExampleCase;
use serde_json::Value;

fn non_blank_lines(raw: &str) -> Vec<&str> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn decode_line(line: &str) -> Value {
    serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string()))
}

/// Group lines into cases. A trailing partial chunk is dropped without error.
pub fn parse(raw: &str, arity: usize) -> Result<Vec<ExampleCase>, ParseError> {
    if arity == 0 {
        return Err(ParseError::Arity(arity));
    }

    let lines = non_blank_lines(raw);
    let cases = lines
        .chunks_exact(arity)
        .map(|chunk| ExampleCase(chunk.iter().map(|line| decode_line(line)).collect()))
        .collect();

    Ok(cases)
}

/// Like [`parse`], but a trailing partial chunk is reported as `MalformedCases`
pub fn parse_strict(raw: &str, arity: usize) -> Result<Vec<ExampleCase>, ParseError> {
    if arity == 0 {
        return Err(ParseError::Arity(arity));
    }

    let lines = non_blank_lines(raw).len();
    if lines % arity != 0 {
        return Err(ParseError::MalformedCases { lines, arity });
    }

    parse(raw, arity)
}

/// Write cases back as newline-delimited text, one argument per line.
///
/// A string that would not decode as JSON on its own is written bare, the way
/// the catalog wrote it; everything else is written as JSON. Parsing the output
/// yields the same values.
pub fn serialize(cases: &[ExampleCase]) -> String {
    cases
        .iter()
        .flat_map(|case| case.arguments().iter())
        .map(encode_value)
        .collect::<Vec<_>>()
        .join("\n")
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) if is_bare_text(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_bare_text(s: &str) -> bool {
    !s.is_empty()
        && s.trim() == s
        && !s.contains(['\n', '\r'])
        && serde_json::from_str::<Value>(s).is_err()
}
