//! Positional template formatting
//!
//! Item and separator templates bind values by ordinal: `{0}` is the first
//! resolved field, `{1}` the second, and so on. Supported placeholder shapes:
//! - `{n}` plain substitution
//! - `{n,width}` padded to `width` (right-aligned, negative width left-aligns)
//! - `{n:fmt}` format suffix, accepted and ignored for string values
//! - `{{` and `}}` emit literal braces

use thiserror::Error;

/// Alignment widths at or beyond this magnitude are rejected as malformed
pub const MAX_ALIGNMENT: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("placeholder {{{index}}} has no value ({available} supplied)")]
    IndexOutOfRange { index: usize, available: usize },
    #[error("malformed placeholder at byte {0}")]
    Malformed(usize),
    #[error("unbalanced '}}' at byte {0}")]
    UnbalancedBrace(usize),
}

/// Substitute positional placeholders in `template` with `args`
///
/// # Arguments
/// * `template` - Format string containing `{n}` placeholders
/// * `args` - Values bound by position
///
/// # Returns
/// The formatted string, or a `FormatError` if a placeholder is malformed or
/// refers past the end of `args`
///
/// # Examples
/// ```
/// use listrender::logic::format::format_positional;
///
/// assert_eq!(format_positional("<li>{0}</li>", &["Home"]).unwrap(), "<li>Home</li>");
/// assert_eq!(format_positional("{{{0}}}", &["x"]).unwrap(), "{x}");
/// assert!(format_positional("{1}", &["only one"]).is_err());
/// ```
pub fn format_positional<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut spec = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    if inner == '{' {
                        return Err(FormatError::Malformed(pos));
                    }
                    spec.push(inner);
                }
                if !closed {
                    return Err(FormatError::Malformed(pos));
                }

                let placeholder = parse_placeholder(&spec).ok_or(FormatError::Malformed(pos))?;
                let value = args
                    .get(placeholder.index)
                    .ok_or(FormatError::IndexOutOfRange {
                        index: placeholder.index,
                        available: args.len(),
                    })?
                    .as_ref();
                push_aligned(&mut out, value, placeholder.width);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(FormatError::UnbalancedBrace(pos));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

struct Placeholder {
    index: usize,
    width: Option<i64>,
}

fn parse_placeholder(spec: &str) -> Option<Placeholder> {
    // Format suffix is irrelevant for string values
    let body = spec.split(':').next().unwrap_or("");
    let mut parts = body.splitn(2, ',');

    let index = parts.next()?.trim().parse::<usize>().ok()?;
    let width = match parts.next() {
        Some(w) => {
            let width = w.trim().parse::<i64>().ok()?;
            if width.unsigned_abs() >= MAX_ALIGNMENT {
                return None;
            }
            Some(width)
        }
        None => None,
    };

    Some(Placeholder { index, width })
}

fn push_aligned(out: &mut String, value: &str, width: Option<i64>) {
    let Some(width) = width else {
        out.push_str(value);
        return;
    };

    let len = value.chars().count();
    let target = width.unsigned_abs() as usize;
    let padding = " ".repeat(target.saturating_sub(len));
    if width < 0 {
        out.push_str(value);
        out.push_str(&padding);
    } else {
        out.push_str(&padding);
        out.push_str(value);
    }
}
