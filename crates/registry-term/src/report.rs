//! Human-readable lines for registry error responses.
//!
//! Works on a body that already went through
//! [`decode_and_validate`](crate::decode_and_validate).

use crate::term::{Term, TermMap};

/// Status line for a response with no usable body.
pub fn pretty_http_code(status: u16) -> String {
    match status {
        401 => "Authentication failed (401)".to_string(),
        403 => "Forbidden (403)".to_string(),
        404 => "Entity not found (404)".to_string(),
        422 => "Validation failed (422)".to_string(),
        _ => format!("HTTP status code: {}", status),
    }
}

/// Lines describing an error response.
///
/// - `nil` or an empty binary body yields the status line.
/// - A text body yields the text.
/// - A map body yields its `"message"` and then its `"errors"`, nested maps
///   indented two spaces per level. Without either field, the status line.
pub fn error_lines(status: u16, body: &Term) -> Vec<String> {
    match body {
        Term::Nil => vec![pretty_http_code(status)],
        Term::Binary(bytes) if bytes.is_empty() => vec![pretty_http_code(status)],
        Term::Binary(_) => vec![render(body)],
        Term::Map(map) => {
            let message = map.get_text("message").filter(|m| !m.is_nil());
            let errors = map.get_text("errors").filter(|e| !e.is_nil());
            if message.is_none() && errors.is_none() {
                return vec![pretty_http_code(status)];
            }

            let mut lines = Vec::new();
            if let Some(message) = message {
                lines.push(render(message));
            }
            match errors {
                Some(Term::Map(errors)) => push_errors(&mut lines, errors, 0),
                Some(other) => lines.push(format!("{}{}", indent(0), render(other))),
                None => {}
            }
            lines
        }
        _ => vec![pretty_http_code(status)],
    }
}

fn push_errors(lines: &mut Vec<String>, errors: &TermMap, depth: usize) {
    for (key, value) in errors {
        match value {
            Term::Map(nested) => {
                lines.push(format!("{}{}:", indent(depth), render(key)));
                push_errors(lines, nested, depth + 1);
            }
            _ => lines.push(format!("{}{}: {}", indent(depth), render(key), render(value))),
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth + 1)
}

/// Text binaries print bare; everything else in inspect form.
fn render(term: &Term) -> String {
    match term.as_str() {
        Some(text) => text.to_string(),
        None => term.to_string(),
    }
}
