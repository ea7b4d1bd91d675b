use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON number, a numeric string, or null. Upstream APIs are not
/// consistent about which one they send for decimal fields.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "number_or_string")]
        value: Option<f64>,
    }

    fn probe(raw: &str) -> Option<f64> {
        serde_json::from_str::<Probe>(raw).expect("probe json").value
    }

    #[test]
    fn reads_numbers_and_numeric_strings() {
        assert_eq!(probe(r#"{"value": 1.5}"#), Some(1.5));
        assert_eq!(probe(r#"{"value": "0.25"}"#), Some(0.25));
        assert_eq!(probe(r#"{"value": "n/a"}"#), None);
        assert_eq!(probe(r#"{"value": null}"#), None);
        assert_eq!(probe(r#"{}"#), None);
    }
}
