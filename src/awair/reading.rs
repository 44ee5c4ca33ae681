use std::fmt;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::metrics::Metric;

/// One `air-data/latest` payload as reported by an Awair device's local API.
///
/// Keys the device adds in newer firmware are ignored, and keys it omits or sends as `null`
/// decode as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Reading {
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(deserialize_with = "null_as_zero")]
    pub score: i64,

    #[serde(rename = "dew_point", deserialize_with = "null_as_zero")]
    pub dew_point_celsius: f64,

    #[serde(rename = "temp", deserialize_with = "null_as_zero")]
    pub temperature_celsius: f64,

    #[serde(rename = "humid", deserialize_with = "null_as_zero")]
    pub relative_humidity_percent: f64,

    #[serde(rename = "abs_humid", deserialize_with = "null_as_zero")]
    pub absolute_humidity: f64,

    #[serde(rename = "co2", deserialize_with = "null_as_zero")]
    pub co2_ppm: i64,

    #[serde(rename = "co2_est", deserialize_with = "null_as_zero")]
    pub co2_estimate_ppm: i64,

    #[serde(rename = "co2_est_baseline", deserialize_with = "null_as_zero")]
    pub co2_estimate_baseline: i64,

    #[serde(rename = "voc", deserialize_with = "null_as_zero")]
    pub voc_ppb: i64,

    #[serde(deserialize_with = "null_as_zero")]
    pub voc_baseline: i64,

    #[serde(deserialize_with = "null_as_zero")]
    pub voc_h2_raw: i64,

    #[serde(deserialize_with = "null_as_zero")]
    pub voc_ethanol_raw: i64,

    #[serde(rename = "pm25", deserialize_with = "null_as_zero")]
    pub pm25_ug_m3: i64,

    #[serde(rename = "pm10_est", deserialize_with = "null_as_zero")]
    pub pm10_estimate_ug_m3: i64,
}

impl Reading {
    /// Key names match case-insensitively, and a repeated key overrides the earlier one.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let Fields(fields) =
            serde_json::from_slice(body).context("failed to decode Awair reading as JSON")?;

        serde_json::from_value(Value::Object(fields))
            .context("failed to decode Awair reading fields")
    }

    /// The six exported values, in [`Metric::ALL`] order.
    pub fn metric_values(&self) -> [(Metric, f64); 6] {
        [
            (Metric::Temperature, self.temperature_celsius),
            (Metric::RelativeHumidity, self.relative_humidity_percent),
            (Metric::Co2, self.co2_ppm as f64),
            (Metric::Voc, self.voc_ppb as f64),
            (Metric::Pm25, self.pm25_ug_m3 as f64),
            (Metric::Score, self.score as f64),
        ]
    }
}

fn null_as_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level object entries with keys folded to lowercase, applied in document order.
struct Fields(Map<String, Value>);

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Fields, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Map::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    fields.insert(key.to_lowercase(), value);
                }

                Ok(Fields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
