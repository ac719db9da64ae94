use crate::error::FetchError;
use crate::service::TrainsSource;
use crate::types::{Infos, Train, TrainId, TrainsPayload};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Directions {
    pub aller: Vec<Train>,
    pub retour: Vec<Train>,
}

/// Everything the views render from.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrainsState {
    pub infos: Option<Infos>,
    pub trains: Directions,
    pub last_updated: Option<i64>,
}

impl TrainsState {
    /// Merge a fetched payload. A direction that came back empty keeps its
    /// current list; `infos` is always overwritten.
    pub fn add(&mut self, payload: TrainsPayload) {
        if !payload.aller.is_empty() {
            self.trains.aller = merge_by_id(payload.aller, &self.trains.aller);
        }
        if !payload.retour.is_empty() {
            self.trains.retour = merge_by_id(payload.retour, &self.trains.retour);
        }
        self.infos = payload.infos;
    }

    pub fn record_last_updated(&mut self) {
        self.record_last_updated_at(Utc::now().timestamp());
    }

    // Never moves the cursor backwards, even if the wall clock does.
    pub fn record_last_updated_at(&mut self, now: i64) {
        let now = self.last_updated.map_or(now, |prev| prev.max(now));
        self.last_updated = Some(now);
    }
}

/// Union of `incoming` and `existing` keyed by id. Incoming records come
/// first and win over existing ones with the same id; the first occurrence of
/// an id is the one kept.
pub fn merge_by_id(incoming: Vec<Train>, existing: &[Train]) -> Vec<Train> {
    let mut seen: HashSet<TrainId> = HashSet::with_capacity(incoming.len() + existing.len());
    let mut merged = Vec::with_capacity(incoming.len() + existing.len());

    for train in incoming {
        if seen.insert(train.id.clone()) {
            merged.push(train);
        }
    }
    for train in existing {
        if seen.insert(train.id.clone()) {
            merged.push(train.clone());
        }
    }

    merged
}

/// What a successful fetch did to the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The API had nothing newer than the cursor.
    NoNewData,
    Updated { aller: usize, retour: usize },
}

/// Owner of `TrainsState`. The only way to change the state is through
/// `fetch` (or `commit` for an already fetched payload).
#[derive(Default)]
pub struct Store {
    state: RwLock<TrainsState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> TrainsState {
        self.state.read().await.clone()
    }

    pub async fn last_updated(&self) -> Option<i64> {
        self.state.read().await.last_updated
    }

    /// Query `source` with the current cursor and commit the result. On error
    /// the state is left untouched.
    pub async fn fetch<S: TrainsSource>(&self, source: &S) -> Result<FetchOutcome, FetchError> {
        let since = self.last_updated().await;
        // No lock held across the request.
        let payload = source.query(since).await?;
        Ok(self.commit(payload).await)
    }

    /// Apply `add` then `record_last_updated` under one write guard.
    pub async fn commit(&self, payload: TrainsPayload) -> FetchOutcome {
        let outcome = if payload.aller.is_empty() && payload.retour.is_empty() {
            FetchOutcome::NoNewData
        } else {
            FetchOutcome::Updated {
                aller: payload.aller.len(),
                retour: payload.retour.len(),
            }
        };

        let mut state = self.state.write().await;
        state.add(payload);
        state.record_last_updated();
        outcome
    }
}
