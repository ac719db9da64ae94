use crate::store::TrainsState;
use crate::types::{AggregateRow, Frequency, Infos, Train};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct TimetableView {
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub infos: Option<Infos>,
    pub aller: Vec<Train>,
    pub retour: Vec<Train>,
    pub last_updated: Option<i64>,
}

impl From<TrainsState> for TimetableView {
    fn from(state: TrainsState) -> Self {
        let label = |key: &str| {
            state
                .infos
                .as_ref()
                .and_then(|infos| infos.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let from_station = label("from_station");
        let to_station = label("to_station");

        Self {
            from_station,
            to_station,
            infos: state.infos,
            aller: state.trains.aller,
            retour: state.trains.retour,
            last_updated: state.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub frequency: Frequency,
    pub rows: Vec<AggregateRow>,
    /// Sum of `count` per train type across all buckets.
    pub totals: BTreeMap<String, u64>,
}

impl StatsView {
    pub fn new(frequency: Frequency, rows: Vec<AggregateRow>) -> Self {
        let mut totals = BTreeMap::new();
        for row in &rows {
            *totals.entry(row.kind.clone()).or_insert(0) += row.count;
        }
        Self {
            frequency,
            rows,
            totals,
        }
    }
}
