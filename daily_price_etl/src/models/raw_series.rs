//! The per-date payload of a daily time-series response, kept as strings.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One date's record exactly as the upstream encodes it.
///
/// All fields are optional here; the transformer decides whether a missing
/// or non-numeric value is acceptable. Bare JSON numbers are kept in their
/// textual form so they reach the same validation as quoted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(
        rename = "1. open",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub open: Option<String>,
    #[serde(
        rename = "2. high",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub high: Option<String>,
    #[serde(
        rename = "3. low",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub low: Option<String>,
    #[serde(
        rename = "4. close",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub close: Option<String>,
    #[serde(
        rename = "5. volume",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub volume: Option<String>,
}

/// ISO date → record, in the order the upstream returned them.
pub type RawSeries = IndexMap<String, RawBar>;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}
