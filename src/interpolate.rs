//! `%`-style template interpolation: `%%` and `%(field)[-0][width][.precision](s|d|f)`.
//!
//! This is the plain rendering step the colored templates are handed to. It
//! knows nothing about styles; escape codes spliced into a template are
//! copied through like any other literal text.
use crate::error::TemplateError;
use crate::placeholder::{Conversion, Placeholder};
use crate::record::FieldValue;

/// Render `template`, resolving each placeholder through `lookup`
pub fn interpolate<F>(template: &str, lookup: F) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<FieldValue>,
{
    let mut output = String::with_capacity(template.len() + 64);
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('%') {
        output.push_str(&rest[..pos]);
        let directive = &rest[pos..];
        let at = offset + pos;

        let consumed = match directive.as_bytes().get(1) {
            Some(b'%') => {
                output.push('%');
                2
            }
            Some(b'(') => {
                let len = placeholder_len(directive, at)?;
                let placeholder = Placeholder::parse(&directive[..len])
                    .ok_or(TemplateError::Incomplete(at))?;
                let value = lookup(placeholder.field.as_str())
                    .ok_or_else(|| TemplateError::MissingField(placeholder.field.clone()))?;
                output.push_str(&render_value(&placeholder, &value)?);
                len
            }
            Some(_) => {
                let conversion = directive[1..].chars().next().unwrap_or('%');
                return Err(TemplateError::UnsupportedConversion {
                    conversion,
                    offset: at,
                });
            }
            None => return Err(TemplateError::Incomplete(at)),
        };

        rest = &directive[consumed..];
        offset = at + consumed;
    }
    output.push_str(rest);

    Ok(output)
}

/// Length of the `%(...)...c` directive at the start of `directive`
fn placeholder_len(directive: &str, at: usize) -> Result<usize, TemplateError> {
    let close = directive.find(')').ok_or(TemplateError::Incomplete(at))?;
    let after = &directive[close + 1..];
    let modifiers = after
        .find(|c: char| !matches!(c, '-' | '0'..='9' | '.'))
        .ok_or(TemplateError::Incomplete(at))?;
    let conversion = after[modifiers..]
        .chars()
        .next()
        .ok_or(TemplateError::Incomplete(at))?;

    if Conversion::from_char(conversion).is_none() {
        return Err(TemplateError::UnsupportedConversion {
            conversion,
            offset: at,
        });
    }
    Ok(close + 1 + modifiers + conversion.len_utf8())
}

/// Render one value the way its placeholder asks for, including padding
pub fn render_value(
    placeholder: &Placeholder,
    value: &FieldValue,
) -> Result<String, TemplateError> {
    let mismatch = || TemplateError::TypeMismatch {
        field: placeholder.field.clone(),
        conversion: placeholder.conversion.as_char(),
    };

    let body = match placeholder.conversion {
        Conversion::Str => {
            let text = value.to_string();
            match placeholder.precision {
                Some(max) => text.chars().take(max).collect(),
                None => text,
            }
        }
        Conversion::Int => match value {
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(x) if x.is_finite() => (x.trunc() as i64).to_string(),
            _ => return Err(mismatch()),
        },
        Conversion::Float => {
            let x = match value {
                FieldValue::Int(n) => *n as f64,
                FieldValue::Float(x) => *x,
                FieldValue::Str(_) => return Err(mismatch()),
            };
            format!("{:.*}", placeholder.precision.unwrap_or(6), x)
        }
    };

    Ok(pad(placeholder, body))
}

fn pad(placeholder: &Placeholder, body: String) -> String {
    let width = match placeholder.width {
        Some(width) => width,
        None => return body,
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;

    if placeholder.left_align {
        return format!("{}{}", body, " ".repeat(fill));
    }

    let numeric = placeholder.conversion != Conversion::Str;
    if placeholder.zero_pad && numeric {
        // Zeros go between the sign and the digits
        let (sign, digits) = match body.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", body.as_str()),
        };
        return format!("{}{}{}", sign, "0".repeat(fill), digits);
    }

    format!("{}{}", " ".repeat(fill), body)
}
