//! Deterministic cache keys derived from request parameters.

use std::collections::BTreeMap;
use std::fmt;

/// Delimiter between the namespace and each `key=value` pair.
pub const KEY_DELIMITER: char = ':';

/// A scalar request parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            // f64 Display prints the shortest round-tripping form: 40.7, 20, -0.5
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Build a cache key from a namespace and request parameters.
///
/// Absent and blank values are skipped. Surviving keys and values are
/// trimmed and lower-cased, sorted by key, and joined as
/// `namespace:k1=v1:k2=v2`. When two keys normalize to the same string the
/// later one wins.
pub fn generate_cache_key<I, K, V>(namespace: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: Into<ParamValue>,
{
    let mut significant = BTreeMap::new();

    for (key, value) in params {
        let Some(value) = value else { continue };
        let value = value.into().to_string();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let key = key.as_ref().trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        significant.insert(key, value.to_lowercase());
    }

    let mut out = String::from(namespace);
    out.push(KEY_DELIMITER);
    let pairs: Vec<String> = significant
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    out.push_str(&pairs.join(&KEY_DELIMITER.to_string()));

    tracing::trace!(key = %out, "Generated cache key");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_case_do_not_matter() {
        let a = generate_cache_key(
            "external-items",
            vec![("term", Some("Pizza")), ("location", Some("  New York "))],
        );
        let b = generate_cache_key(
            "external-items",
            vec![("LOCATION", Some("new york")), (" Term ", Some("PIZZA "))],
        );
        assert_eq!(a, b);
        assert_eq!(a, "external-items:location=new york:term=pizza");
    }

    #[test]
    fn blank_and_absent_values_are_dropped() {
        let key = generate_cache_key(
            "ns",
            vec![
                ("location", Some(ParamValue::from("Paris"))),
                ("term", Some(ParamValue::from("   "))),
                ("categories", None),
                ("offset", Some(ParamValue::from(""))),
            ],
        );
        assert_eq!(key, "ns:location=paris");
        assert!(!key.contains("term"));
        assert!(!key.contains("categories"));
        assert!(!key.contains("offset"));
    }

    #[test]
    fn numbers_use_natural_decimal_form() {
        let key = generate_cache_key(
            "ns",
            vec![
                ("latitude", Some(ParamValue::from(40.7))),
                ("longitude", Some(ParamValue::from(-74.0))),
                ("limit", Some(ParamValue::from(20u32))),
                ("open", Some(ParamValue::from(true))),
            ],
        );
        assert_eq!(key, "ns:latitude=40.7:limit=20:longitude=-74:open=true");
    }

    #[test]
    fn differing_significant_param_changes_key() {
        let a = generate_cache_key("ns", vec![("term", Some("pizza"))]);
        let b = generate_cache_key("ns", vec![("term", Some("sushi"))]);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_params_keep_namespace_prefix() {
        let key = generate_cache_key::<_, &str, &str>("ns", Vec::new());
        assert_eq!(key, "ns:");
    }
}
