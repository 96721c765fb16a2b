use crate::error::{ChartError, Result};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Expand `$name` and `${name}` in a pipeline string before parsing.
/// `$$` is a literal dollar; a `$` not followed by a name is kept as is.
pub fn expand_variables(input: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }

        let name = match chars.peek() {
            Some('$') => {
                chars.next();
                output.push('$');
                continue;
            }
            Some('{') => {
                chars.next();
                let name = consume_identifier(&mut chars);
                if chars.next() != Some('}') {
                    return Err(ChartError::Parse(format!("unterminated '${{{}'", name)));
                }
                name
            }
            _ => consume_identifier(&mut chars),
        };

        if name.is_empty() {
            output.push('$');
            continue;
        }

        let value = variables
            .get(&name)
            .ok_or_else(|| ChartError::Variable(name.clone()))?;
        output.push_str(value);
    }

    Ok(output)
}

/// Parse `NAME=VALUE` pairs as given on the command line
pub fn parse_assignments<S: AsRef<str>>(pairs: &[S]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| ChartError::Parse(format!("expected NAME=VALUE, got '{}'", pair)))
        })
        .collect()
}

fn consume_identifier(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    if let Some(&c) = chars.peek() {
        if !c.is_alphabetic() && c != '_' {
            return name;
        }
    }

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}
