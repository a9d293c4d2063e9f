//! Compact serialization of document trees and freestanding values.
//!
//! Output contains no insignificant whitespace. Object members and array elements are written
//! in their stored order, integers without a decimal point, and doubles using the shortest
//! representation that reads back to the same value. JSON has no representation for NaN or
//! the infinities, so those are written as `null`.
use std::fmt::{Result, Write};

use crate::value::{Shape, Shaped};

/// Serialize a value into a freshly allocated string owned by the caller
pub(crate) fn to_json_string<'s, T: Shaped<'s>>(value: T) -> String {
    let mut output = String::new();
    // Writing into a String can't fail
    let _ = write_value(value, &mut output);
    output
}

/// A container whose opening bracket has been written
struct Open<'s, T> {
    remaining: Remaining<'s, T>,
    first: bool,
}

enum Remaining<'s, T> {
    Elements(std::vec::IntoIter<T>),
    Members(std::vec::IntoIter<(&'s str, T)>),
}

/// Write a value, keeping open containers on an explicit stack so that trees of any depth can
/// be written
pub(crate) fn write_value<'s, T: Shaped<'s>, W: Write>(value: T, w: &mut W) -> Result {
    let mut stack: Vec<Open<'s, T>> = vec![];
    write_or_open(value, w, &mut stack)?;
    while let Some(top) = stack.last_mut() {
        let next = match &mut top.remaining {
            Remaining::Elements(elements) => elements.next().map(|element| (None, element)),
            Remaining::Members(members) => members.next().map(|(key, value)| (Some(key), value)),
        };
        match next {
            Some((key, value)) => {
                if !top.first {
                    w.write_char(',')?;
                }
                top.first = false;
                if let Some(key) = key {
                    write_string(key, w)?;
                    w.write_char(':')?;
                }
                write_or_open(value, w, &mut stack)?;
            }
            None => {
                let close = match top.remaining {
                    Remaining::Elements(_) => ']',
                    Remaining::Members(_) => '}',
                };
                w.write_char(close)?;
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Write a scalar outright, or write the opening bracket of a container and push it
fn write_or_open<'s, T: Shaped<'s>, W: Write>(
    value: T,
    w: &mut W,
    stack: &mut Vec<Open<'s, T>>,
) -> Result {
    let remaining = match value.shape() {
        Shape::Null => return w.write_str("null"),
        Shape::Bool(value) => return w.write_str(if value { "true" } else { "false" }),
        Shape::Integer(value) => return w.write_str(itoa::Buffer::new().format(value)),
        Shape::Double(value) => return write_double(value, w),
        Shape::String(value) => return write_string(value, w),
        Shape::Array(elements) => {
            w.write_char('[')?;
            Remaining::Elements(elements.into_iter())
        }
        Shape::Object(members) => {
            w.write_char('{')?;
            Remaining::Members(members.into_iter())
        }
    };
    stack.push(Open {
        remaining,
        first: true,
    });
    Ok(())
}

/// The `Debug` representation of an `f64` is the shortest round-trip form and always carries
/// either a decimal point or an exponent, so it reads back as a double rather than an integer
fn write_double<W: Write>(value: f64, w: &mut W) -> Result {
    if value.is_finite() {
        write!(w, "{:?}", value)
    } else {
        w.write_str("null")
    }
}

/// Write a quoted string, escaping quotes, backslashes and control characters
pub fn write_string<W: Write>(value: &str, w: &mut W) -> Result {
    w.write_char('"')?;
    let mut start = 0;
    for (index, c) in value.char_indices() {
        let escape = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{08}' => "\\b",
            '\u{0c}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if c < '\u{20}' => "",
            _ => continue,
        };
        w.write_str(&value[start..index])?;
        if escape.is_empty() {
            write!(w, "\\u{:04x}", c as u32)?;
        } else {
            w.write_str(escape)?;
        }
        start = index + c.len_utf8();
    }
    w.write_str(&value[start..])?;
    w.write_char('"')
}
