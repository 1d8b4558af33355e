//! Option codec: command-line tokens <-> configuration objects
//!
//! The codec is stateless. `decode` applies `-flag value` pairs to an object,
//! `encode` produces the pairs that reconstruct an object's current
//! command-line-visible values. Nested objects travel as a single quoted
//! token holding the nested type name followed by its own options, e.g.
//! `-dist "NormalDistribution -mean 0.001 -std 1"`.

use crate::error::{ConfigError, DecodeIssue, Result};
use crate::options::descriptor::{FieldDescriptor, FieldKind, Value};
use crate::options::object::ConfigObject;
use crate::options::registry::{self, Schema};
use log::debug;

/// Help metadata for one command-line option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionInfo {
    pub flag: &'static str,
    pub synopsis: String,
    pub display_name: &'static str,
    pub description: &'static str,
    pub legal_values: Vec<&'static str>,
    pub default: String,
}

fn flag_of(token: &str) -> Option<&str> {
    token.strip_prefix('-').filter(|flag| !flag.is_empty())
}

fn lookup_flag(schema: &'static Schema, token: &str) -> Option<&'static FieldDescriptor> {
    schema.by_flag(flag_of(token)?)
}

/// Parses one raw value token for `field`.
///
/// Returns the reason as a message when the token does not parse.
pub fn parse_value(field: &FieldDescriptor, raw: &str) -> std::result::Result<Value, String> {
    match field.kind {
        FieldKind::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "expected an integer".to_string()),
        FieldKind::Double => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Value::Double(value)),
            Ok(_) => Err("expected a finite number".to_string()),
            Err(_) => Err("expected a floating-point number".to_string()),
        },
        FieldKind::Str => Ok(Value::Str(raw.to_string())),
        FieldKind::Enum(values) => values
            .iter()
            .copied()
            .find(|legal| *legal == raw)
            .map(Value::Enum)
            .ok_or_else(|| format!("expected one of {}", values.join(", "))),
        FieldKind::Object(schemas) => parse_object(schemas, raw).map(|object| Value::Object(Box::new(object))),
        FieldKind::IntArray(len) => {
            let values = raw
                .split(',')
                .map(|part| part.trim().parse::<i64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| format!("expected {} comma-separated integers", len))?;
            if values.len() != len {
                return Err(format!("expected {} comma-separated integers", len));
            }
            Ok(Value::IntArray(values))
        }
    }
}

fn parse_object(schemas: &[&'static Schema], raw: &str) -> std::result::Result<ConfigObject, String> {
    let tokens = split_options(raw).map_err(|err| err.to_string())?;
    let legal: Vec<&str> = schemas.iter().map(|schema| schema.name).collect();
    let Some((name, options)) = tokens.split_first() else {
        return Err(format!("expected a specification of type {}", legal.join(", ")));
    };
    let schema = schemas
        .iter()
        .copied()
        .find(|schema| schema.name == name.as_str())
        .ok_or_else(|| format!("unknown type '{}', expected {}", name, legal.join(", ")))?;

    let mut object = ConfigObject::new(schema);
    match decode(&mut object, options) {
        Ok(()) => Ok(object),
        Err(ConfigError::Decode { issues, .. }) => Err(issues
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ")),
        Err(err) => Err(err.to_string()),
    }
}

/// Applies `tokens` to `object`.
///
/// Flags may appear in any order and may be omitted; omitted fields keep
/// their current value. When a flag repeats, the last occurrence wins.
/// A token following a flag is taken as its value unless it is itself a
/// declared flag, so negative numbers need no quoting. String and nested
/// object fields always take the next token, whatever it looks like.
///
/// The update is all-or-nothing: every problem is collected into a single
/// `ConfigError::Decode` and the object is left untouched if any is found.
///
/// # Errors
///
/// - `FinalizedObject` if the object is finalized
/// - `Decode` listing every unrecognized flag, malformed value and missing value
///
/// # Example
///
/// ```
/// use weka_dl4j_layers::layers::convolution::CONVOLUTION;
/// use weka_dl4j_layers::options::{codec, ConfigObject};
///
/// let mut conv = ConfigObject::new(&CONVOLUTION);
/// codec::decode(&mut conv, &["-nFilters", "16", "-kernelSizeX", "3"]).unwrap();
/// assert_eq!(conv.int("nOut").unwrap(), 16);
/// assert_eq!(conv.int_array("kernelSize").unwrap(), &[3, 5]);
/// ```
pub fn decode<S: AsRef<str>>(object: &mut ConfigObject, tokens: &[S]) -> Result<()> {
    let schema = object.schema();
    if object.is_finalized() {
        return Err(ConfigError::FinalizedObject {
            field: schema.name.to_string(),
        });
    }

    // Every descriptor must resolve before anything is staged.
    registry::descriptors_for(object)?;
    let is_flag = |token: &str| lookup_flag(schema, token).is_some();

    let mut staged = object.clone();
    let mut issues = Vec::new();
    let mut applied = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_ref();
        let next = tokens.get(i + 1).map(|next| next.as_ref());

        let Some(field) = lookup_flag(schema, token) else {
            issues.push(DecodeIssue::UnrecognizedFlag {
                token: token.to_string(),
            });
            // An unknown flag's value is not reported a second time.
            let swallows_value = flag_of(token).is_some() && next.map_or(false, |next| !is_flag(next));
            i += if swallows_value { 2 } else { 1 };
            continue;
        };

        let flag = field.label();
        // Strings and nested specifications take the next token verbatim.
        let verbatim = matches!(field.kind, FieldKind::Str | FieldKind::Object(_));
        match next {
            Some(raw) if verbatim || !is_flag(raw) => {
                match parse_value(field, raw).and_then(|value| {
                    staged.write(field, value).map_err(|err| err.to_string())
                }) {
                    Ok(()) => applied += 1,
                    Err(reason) => issues.push(DecodeIssue::MalformedValue {
                        flag: flag.to_string(),
                        value: raw.to_string(),
                        reason,
                    }),
                }
                i += 2;
            }
            _ => {
                issues.push(DecodeIssue::MissingValue {
                    flag: flag.to_string(),
                });
                i += 1;
            }
        }
    }

    if !issues.is_empty() {
        debug!(
            "rejected {} option token(s) for {}: {} issue(s)",
            tokens.len(),
            schema.name,
            issues.len()
        );
        return Err(ConfigError::Decode {
            schema: schema.name.to_string(),
            issues,
        });
    }

    if applied > 0 {
        *object = staged;
    }
    debug!("applied {} option(s) to {}", applied, schema.name);
    Ok(())
}

/// Splits `line` with `split_options` and decodes the result.
pub fn decode_line(object: &mut ConfigObject, line: &str) -> Result<()> {
    let tokens = split_options(line)?;
    decode(object, &tokens)
}

/// Renders a value as a single command-line token.
pub fn render_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Int(value) => value.to_string(),
        Value::Double(value) => value.to_string(),
        Value::Str(value) => value.clone(),
        Value::Enum(value) => value.to_string(),
        Value::Object(object) => {
            let mut tokens = vec![object.schema().name.to_string()];
            tokens.extend(encode(object)?);
            join_options(&tokens)
        }
        Value::IntArray(values) => values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(","),
    })
}

/// Produces `-flag value` pairs for every command-line-visible field, in
/// display order. Composite fields appear through their per-axis flags;
/// programmatic fields are never emitted.
pub fn encode(object: &ConfigObject) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for field in registry::descriptors_for(object)? {
        let Some(flag) = field.cli_flag() else {
            continue;
        };
        tokens.push(format!("-{}", flag));
        tokens.push(render_value(&object.read(field)?)?);
    }
    Ok(tokens)
}

/// `encode` joined into one quoted option line.
pub fn encode_line(object: &ConfigObject) -> Result<String> {
    Ok(join_options(&encode(object)?))
}

/// Splits an option line into tokens.
///
/// Whitespace separates tokens; a double-quoted token may contain
/// whitespace, and inside quotes a backslash escapes the next character.
///
/// # Errors
///
/// Returns `UnbalancedQuotes` if a quoted token is not closed.
pub fn split_options(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut token = String::new();
        if first == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => break,
                    },
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(ConfigError::UnbalancedQuotes(line.to_string()));
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                token.push(c);
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Quotes a token if `split_options` would otherwise break it apart.
pub fn quote(token: &str) -> String {
    let plain = !token.is_empty()
        && !token
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if plain {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Joins tokens into one line; the inverse of `split_options`.
pub fn join_options<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| quote(token.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Help metadata for every command-line option of `schema`, in display order.
pub fn list_options(schema: &'static Schema) -> Vec<OptionInfo> {
    let defaults = ConfigObject::new(schema);
    schema
        .cli_fields()
        .into_iter()
        .filter_map(|field| {
            let flag = field.cli_flag()?;
            let default = defaults
                .read(field)
                .and_then(|value| render_value(&value))
                .unwrap_or_default();
            let legal_values = match field.kind {
                FieldKind::Enum(values) => values.to_vec(),
                FieldKind::Object(schemas) => schemas.iter().map(|schema| schema.name).collect(),
                _ => Vec::new(),
            };
            Some(OptionInfo {
                flag,
                synopsis: format!("-{} <{}>", flag, field.kind.synopsis()),
                display_name: field.display_name,
                description: field.description,
                legal_values,
                default,
            })
        })
        .collect()
}

/// Renders the help text for `schema`.
pub fn describe(schema: &'static Schema) -> String {
    let mut text = format!("{}\n\nOptions:\n", schema.global_info);
    for option in list_options(schema) {
        text.push_str(&format!("\n\t{}\n\t\t{}\n", option.synopsis, option.description));
        if !option.legal_values.is_empty() {
            text.push_str(&format!("\t\tOne of: {}\n", option.legal_values.join(", ")));
        }
    }
    text
}
