//! Deserialization helpers for loosely-typed RPC payloads.

use serde::{Deserialize, Deserializer};

/// Decode a numeric column that may be `null`, a number or a numeric string.
///
/// PostgREST returns `numeric` columns as JSON numbers but views built with
/// `to_char` or casts can hand back strings; anything else is a decode error.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Numeric::Number(n)) => Ok(n),
        Some(Numeric::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Numeric::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric value: {}", s))),
    }
}

/// Decode a text column that may be `null` into an empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "f64_or_zero")]
        amount: f64,
    }

    fn amount(json: serde_json::Value) -> Result<f64, serde_json::Error> {
        serde_json::from_value::<Row>(json).map(|r| r.amount)
    }

    #[test]
    fn accepts_numbers_strings_and_null() {
        assert_eq!(amount(serde_json::json!({"amount": 12.5})).unwrap(), 12.5);
        assert_eq!(amount(serde_json::json!({"amount": "7.25"})).unwrap(), 7.25);
        assert_eq!(amount(serde_json::json!({"amount": null})).unwrap(), 0.0);
        assert_eq!(amount(serde_json::json!({})).unwrap(), 0.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(amount(serde_json::json!({"amount": "doce"})).is_err());
        assert!(amount(serde_json::json!({"amount": [1]})).is_err());
    }

    #[derive(Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "string_or_empty")]
        name: String,
    }

    #[test]
    fn null_text_becomes_empty() {
        let named: Named = serde_json::from_value(serde_json::json!({"name": null})).unwrap();
        assert_eq!(named.name, "");
        let named: Named = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(named.name, "");
        let named: Named = serde_json::from_value(serde_json::json!({"name": "ES11"})).unwrap();
        assert_eq!(named.name, "ES11");
    }
}
