use crate::domain::model::DisplayAmount;
use crate::utils::error::FormatError;

/// Anything the formatter accepts: a number, or text holding one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl From<i64> for Numeric<'_> {
    fn from(v: i64) -> Self {
        Numeric::Int(v)
    }
}

impl From<i32> for Numeric<'_> {
    fn from(v: i32) -> Self {
        Numeric::Int(v.into())
    }
}

impl From<u32> for Numeric<'_> {
    fn from(v: u32) -> Self {
        Numeric::Int(v.into())
    }
}

impl From<f64> for Numeric<'_> {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

impl<'a> From<&'a str> for Numeric<'a> {
    fn from(v: &'a str) -> Self {
        Numeric::Text(v)
    }
}

impl<'a> From<&'a String> for Numeric<'a> {
    fn from(v: &'a String) -> Self {
        Numeric::Text(v)
    }
}

/// Group the integer part with commas, keeping any fractional part as given.
///
/// Separators already present in text input are stripped first, so feeding
/// the output back in returns it unchanged.
pub fn format_number<'a>(value: impl Into<Numeric<'a>>) -> Result<String, FormatError> {
    let plain = match value.into() {
        Numeric::Int(v) => v.to_string(),
        Numeric::Float(v) if v.is_finite() => v.to_string(),
        Numeric::Float(v) => {
            return Err(FormatError {
                input: v.to_string(),
            })
        }
        Numeric::Text(text) => text.trim().replace(',', ""),
    };

    let invalid = || FormatError {
        input: plain.clone(),
    };

    let (negative, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) {
        return Err(invalid());
    }

    let mut out = String::with_capacity(plain.len() + int_part.len() / 3);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    Ok(out)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formatting with local recovery: non-numeric input becomes
/// [`DisplayAmount::Unavailable`] and a warning, never an error.
pub fn display_amount(text: Option<&str>) -> DisplayAmount {
    let Some(text) = text else {
        return DisplayAmount::Unavailable;
    };
    match format_number(text) {
        Ok(grouped) => DisplayAmount::Grouped(grouped),
        Err(e) => {
            tracing::warn!("Amount not displayable, using placeholder: {}", e);
            DisplayAmount::Unavailable
        }
    }
}
