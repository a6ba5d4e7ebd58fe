use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A price or area as it comes over the wire.
///
/// The API mostly sends JSON numbers, but listings created through forms
/// carry numeric strings, and some records carry `null` or nothing at all.
/// Anything that does not parse is kept verbatim so it can still be
/// displayed; it simply never satisfies a numeric bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Default for Numeric {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl Numeric {
    /// Integer reading, fractional part truncated. Text is read up to the
    /// first character that cannot continue an integer, so `"1e5"` is 1.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => truncate(*n),
            Self::Text(s) => integer_prefix(s),
            Self::Other(_) => None,
        }
    }

    /// Float reading. Text is read up to the first character that cannot
    /// continue a decimal literal, so `"64.5 m²"` is 64.5.
    pub fn as_float(&self) -> Option<f64> {
        let reading = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => float_prefix(s),
            Self::Other(_) => None,
        };
        reading.filter(|n| n.is_finite())
    }
}

fn truncate(n: f64) -> Option<i64> {
    if n.is_finite() && n.abs() < i64::MAX as f64 {
        Some(n.trunc() as i64)
    } else {
        None
    }
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign(bytes: &[u8], at: usize) -> usize {
    usize::from(matches!(bytes.get(at), Some(b'+' | b'-')))
}

fn integer_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let start = sign(bytes, 0);
    let len = digits(&bytes[start..]);
    if len == 0 {
        return None;
    }
    s[..start + len].parse().ok()
}

fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();

    let mut end = sign(bytes, 0);
    let whole = digits(&bytes[end..]);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(&bytes[end + 1..]);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1 + sign(bytes, end + 1);
        let exp = digits(&bytes[exp_start..]);
        if exp > 0 {
            end = exp_start + exp;
        }
    }

    s[..end].parse().ok()
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(Value::Null) => f.write_str("n/a"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_reading_truncates() {
        assert_eq!(Numeric::from(1500.9).as_integer(), Some(1500));
        assert_eq!(Numeric::from("1500.9").as_integer(), Some(1500));
        assert_eq!(Numeric::from(" 2000 ").as_integer(), Some(2000));
        assert_eq!(Numeric::from("-15").as_integer(), Some(-15));
    }

    #[test]
    fn text_is_read_up_to_its_numeric_prefix() {
        assert_eq!(Numeric::from("64.5 m²").as_float(), Some(64.5));
        assert_eq!(Numeric::from("120000 ₾").as_integer(), Some(120000));
        assert_eq!(Numeric::from("1e5").as_integer(), Some(1));
        assert_eq!(Numeric::from("1e5").as_float(), Some(100000.0));
        assert_eq!(Numeric::from("2e").as_float(), Some(2.0));
        assert_eq!(Numeric::from(".5").as_float(), Some(0.5));
        assert_eq!(Numeric::from("7.").as_float(), Some(7.0));
        assert_eq!(Numeric::from("-").as_float(), None);
        assert_eq!(Numeric::from(".").as_float(), None);
    }

    #[test]
    fn garbage_has_no_reading() {
        let junk = Numeric::from("call for price");
        assert_eq!(junk.as_integer(), None);
        assert_eq!(junk.as_float(), None);
        assert_eq!(Numeric::from("NaN").as_float(), None);
        assert_eq!(Numeric::from(f64::INFINITY).as_integer(), None);
        assert_eq!(Numeric::default().as_integer(), None);
        assert_eq!(Numeric::Other(Value::Bool(true)).as_float(), None);
    }

    #[test]
    fn deserializes_numbers_strings_and_leftovers() {
        let values: Vec<Numeric> =
            serde_json::from_str(r#"[50, 50.5, "75", "n/a", null, {"v": 1}]"#).unwrap();
        assert_eq!(values[0].as_float(), Some(50.0));
        assert_eq!(values[1].as_float(), Some(50.5));
        assert_eq!(values[2].as_integer(), Some(75));
        assert_eq!(values[3], Numeric::Text("n/a".to_string()));
        assert_eq!(values[4], Numeric::default());
        assert!(matches!(values[5], Numeric::Other(Value::Object(_))));
    }

    #[test]
    fn non_finite_number_reads_back_as_unknown() {
        let json = serde_json::to_string(&Numeric::from(f64::NAN)).unwrap();
        let back: Numeric = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_float(), None);
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(Numeric::from(120000_i64).to_string(), "120000");
        assert_eq!(Numeric::from(85.5).to_string(), "85.5");
        assert_eq!(Numeric::default().to_string(), "n/a");
    }
}
