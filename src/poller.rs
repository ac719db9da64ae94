use crate::error::FetchError;
use crate::service::TrainsSource;
use crate::store::{FetchOutcome, Store};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Poll `source` forever, merging every answer into `store`. The first poll
/// happens immediately.
pub async fn run<S: TrainsSource>(store: &Store, source: &S, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        // Outcome is logged inside; the next tick retries either way.
        poll_once(store, source).await.ok();
    }
}

pub async fn poll_once<S: TrainsSource>(
    store: &Store,
    source: &S,
) -> Result<FetchOutcome, FetchError> {
    let res = store.fetch(source).await;
    match &res {
        Ok(FetchOutcome::NoNewData) => debug!("no new trains"),
        Ok(FetchOutcome::Updated { aller, retour }) => {
            info!(aller, retour, "merged new trains")
        }
        // Already logged by the service; keep the previous state until next tick.
        Err(e) => warn!(error = %e, "skipping update"),
    }
    res
}
