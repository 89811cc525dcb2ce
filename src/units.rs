//! Normalization of backend metrics.
//!
//! The optimizer reports `distance` (km) and `duration` (minutes) either as
//! numbers or as free text such as `"4.2 km"`. Everything is converted to
//! `f64` here so no other module has to care.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetric {
    Number(f64),
    Text(String),
    Missing(()),
}

/// Extracts the first numeric token from `text`, or 0 when there is none.
///
/// `"4.2 km"` gives `4.2`, `"approx. 35 mins"` gives `35.0`, `"n/a"` gives `0.0`.
pub fn parse_metric(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
        return 0.0;
    };

    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    text[start..end].parse().unwrap_or(0.0)
}

/// Serde adapter for string-or-number metric fields. Null becomes 0.
pub fn deserialize_metric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawMetric::deserialize(deserializer)? {
        RawMetric::Number(value) if value.is_finite() => value,
        RawMetric::Number(_) | RawMetric::Missing(()) => 0.0,
        RawMetric::Text(text) => parse_metric(&text),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_metric")]
        distance: f64,
    }

    fn probe(json: &str) -> f64 {
        serde_json::from_str::<Probe>(json).unwrap().distance
    }

    #[test]
    fn test_parse_metric_with_unit() {
        assert_eq!(parse_metric("4.2 km"), 4.2);
        assert_eq!(parse_metric("35 mins"), 35.0);
    }

    #[test]
    fn test_parse_metric_leading_text() {
        assert_eq!(parse_metric("approx. 12.5km"), 12.5);
    }

    #[test]
    fn test_parse_metric_trailing_dot() {
        assert_eq!(parse_metric("7. km"), 7.0);
    }

    #[test]
    fn test_parse_metric_unparsable() {
        assert_eq!(parse_metric("unknown"), 0.0);
        assert_eq!(parse_metric(""), 0.0);
    }

    #[test]
    fn test_deserialize_number_and_text() {
        assert_eq!(probe(r#"{"distance": 3.5}"#), 3.5);
        assert_eq!(probe(r#"{"distance": "8.1 km"}"#), 8.1);
        assert_eq!(probe(r#"{"distance": null}"#), 0.0);
        assert_eq!(probe(r#"{}"#), 0.0);
    }
}
