use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Train identity as sent by the API. Rows coming out of the database carry
/// integer ids, but strings are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainId {
    Int(i64),
    Text(CompactString),
}

#[cfg(test)]
impl From<i64> for TrainId {
    fn from(id: i64) -> Self {
        TrainId::Int(id)
    }
}

#[cfg(test)]
impl From<&str> for TrainId {
    fn from(id: &str) -> Self {
        TrainId::Text(CompactString::from(id))
    }
}

/// A single train record. Only `id` is interpreted, everything else is kept
/// verbatim so the view can hand it back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: TrainId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
impl Train {
    pub fn new(id: impl Into<TrainId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Opaque metadata block, replaced wholesale on every fetch.
pub type Infos = Map<String, Value>;

/// Body of `GET {API_ENDPOINT}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainsPayload {
    #[serde(default)]
    pub aller: Vec<Train>,
    #[serde(default)]
    pub retour: Vec<Train>,
    #[serde(default)]
    pub infos: Option<Infos>,
}

/// Grouping accepted by `GET {API_ENDPOINT}/aggregate/{frequency}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hour,
    #[default]
    Day,
    Month,
    Year,
    HourOverall,
    Weekday,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hour => "hour",
            Frequency::Day => "day",
            Frequency::Month => "month",
            Frequency::Year => "year",
            Frequency::HourOverall => "hour_overall",
            Frequency::Weekday => "weekday",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket of the aggregate endpoint. `date` is a date prefix string for
/// calendar groupings and a number for `weekday`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub date: Value,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
}
