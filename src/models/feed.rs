use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Shape-validated feed response: the raw features of one fetch.
///
/// Features stay as opaque JSON until the normalizer turns each one into a
/// [`RawFeature`]; this keeps a per-record failure from poisoning the batch
/// and preserves the original payload for `raw_data`.
#[derive(Debug, Default)]
pub struct WarningBatch {
    pub features: Vec<Value>,
}

impl WarningBatch {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Typed view of one feed feature. Everything the feed does not guarantee
/// is optional; numeric fields tolerate string encoding.
#[derive(Debug, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub properties: RawProperties,
    #[serde(default)]
    pub geometry: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawProperties {
    #[serde(default, deserialize_with = "parse_string_option")]
    pub warnid: Option<String>,
    #[serde(default, deserialize_with = "parse_code_option")]
    pub wtype: Option<i64>,
    #[serde(default, deserialize_with = "parse_code_option")]
    pub wlevel: Option<i64>,
    #[serde(default, deserialize_with = "parse_epoch_option")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "parse_epoch_option")]
    pub end: Option<i64>,
    #[serde(default, deserialize_with = "parse_string_vec")]
    pub gemeinden: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Float(f64),
    String(String),
}

impl IntOrString {
    /// Canonical string form: integral floats lose their trailing `.0`
    /// so an id like `148327.0` stores as `"148327"`.
    fn into_string(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => (f as i64).to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s,
        }
    }
}

/// Warning ids arrive as strings or bare numbers depending on feed version.
fn parse_string_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<IntOrString> = Option::deserialize(deserializer)?;
    Ok(match v {
        Some(IntOrString::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(numeric) => Some(numeric.into_string()),
        None => None,
    })
}

/// Lenient code parser: anything that is not an integer maps to `None`,
/// so an unknown or garbage code never drops the record.
fn parse_code_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Strict epoch parser: a present but non-numeric value is an error, which
/// fails deserialization of the single feature and drops that record.
fn parse_epoch_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<IntOrString> = Option::deserialize(deserializer)?;
    match v {
        Some(IntOrString::Int(i)) => Ok(Some(i)),
        Some(IntOrString::Float(f)) => Ok(Some(f as i64)),
        Some(IntOrString::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<i64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

/// Municipality codes arrive as an array of strings or numbers.
fn parse_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Vec<IntOrString>> = Option::deserialize(deserializer)?;
    Ok(v.unwrap_or_default()
        .into_iter()
        .map(IntOrString::into_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_realistic_feature() {
        let payload = r#"
        {
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[16.37, 48.21], [16.41, 48.19], [16.37, 48.21]]]
            },
            "properties": {
                "warnid": 148327,
                "wtype": "5",
                "wlevel": 2,
                "start": "1764396900",
                "end": 1764418500,
                "gemeinden": [90001, "90201", 90301],
                "text": "Gewitter mit Starkregen"
            }
        }
        "#;

        let feature: RawFeature = serde_json::from_str(payload).unwrap();
        assert_eq!(feature.properties.warnid, Some("148327".to_string()));
        assert_eq!(feature.properties.wtype, Some(5));
        assert_eq!(feature.properties.wlevel, Some(2));
        assert_eq!(feature.properties.start, Some(1764396900));
        assert_eq!(feature.properties.end, Some(1764418500));
        assert_eq!(
            feature.properties.gemeinden,
            vec!["90001", "90201", "90301"]
        );
        assert!(feature.geometry.is_some());
    }

    #[test]
    fn test_integral_float_ids_are_canonicalized() {
        let payload = r#"{"properties": {"warnid": 148327.0, "gemeinden": [90001.0, "90201"]}}"#;
        let feature: RawFeature = serde_json::from_str(payload).unwrap();
        assert_eq!(feature.properties.warnid, Some("148327".to_string()));
        assert_eq!(feature.properties.gemeinden, vec!["90001", "90201"]);
    }

    #[test]
    fn test_unknown_code_is_none_not_error() {
        let payload = r#"{"properties": {"warnid": "w1", "wtype": "gale", "wlevel": null}}"#;
        let feature: RawFeature = serde_json::from_str(payload).unwrap();
        assert_eq!(feature.properties.wtype, None);
        assert_eq!(feature.properties.wlevel, None);
    }

    #[test]
    fn test_non_numeric_epoch_is_an_error() {
        let payload = r#"{"properties": {"warnid": "w1", "start": "tomorrow"}}"#;
        assert!(serde_json::from_str::<RawFeature>(payload).is_err());
    }

    #[test]
    fn test_missing_properties_defaults() {
        let feature: RawFeature = serde_json::from_str("{}").unwrap();
        assert_eq!(feature.properties.warnid, None);
        assert!(feature.properties.gemeinden.is_empty());
        assert!(feature.geometry.is_none());
    }
}
